use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::history::History;
use super::rules::{ensure_ai_board_size, IllegalMoveReason, Outcome, RuleError};
use super::state::{
    Board, CellIndex, GameEvent, Mark, MoveRecord, Position, Scoreboard, DEFAULT_BOARD_SIZE,
};
use crate::ai::{AiAgent, AiConfig, AiDecision, AiDifficulty};

const DEFAULT_AI_DELAY_MS: u32 = 500;

/// 对局配置，可由前端以 JSON 传入，缺省字段取默认值。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub size: usize,
    pub ai_mode: bool,
    pub difficulty: AiDifficulty,
    pub ai_mark: Mark,
    /// AI 应手前的停顿，只由 wasm 层使用。
    pub ai_delay_ms: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
            ai_mode: false,
            difficulty: AiDifficulty::default(),
            ai_mark: Mark::O,
            ai_delay_ms: DEFAULT_AI_DELAY_MS,
        }
    }
}

/// 每次状态变化后交给前端的快照。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub position: Position,
    pub scoreboard: Scoreboard,
    pub events: Vec<GameEvent>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub status: String,
    pub revision: u32,
}

impl Resolution {
    fn new(session: &GameSession, events: Vec<GameEvent>) -> Self {
        Self {
            position: session.position.clone(),
            scoreboard: session.scoreboard,
            events,
            can_undo: session.history.can_undo(),
            can_redo: session.history.can_redo(),
            status: session.status_text(),
            revision: session.revision,
        }
    }

    pub fn outcome(&self) -> &Outcome {
        &self.position.outcome
    }
}

/// 一局井字棋及整个会话的比分。
///
/// 调用方持有会话并逐步驱动，每次变化返回描述新状态与所产生事件的 [`Resolution`]。
/// 被拒绝的落子不改变会话。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    config: GameConfig,
    position: Position,
    history: History,
    scoreboard: Scoreboard,
    #[serde(default)]
    revision: u32,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Result<Self, RuleError> {
        if config.ai_mode {
            ensure_ai_board_size(config.size)?;
        }
        let position = Position::new(config.size)?;
        Ok(Self {
            config,
            position,
            history: History::new(),
            scoreboard: Scoreboard::default(),
            revision: 0,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn board(&self) -> &Board {
        &self.position.board
    }

    pub fn turn(&self) -> Mark {
        self.position.turn
    }

    pub fn is_active(&self) -> bool {
        self.position.active
    }

    pub fn outcome(&self) -> &Outcome {
        &self.position.outcome
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn scoreboard(&self) -> Scoreboard {
        self.scoreboard
    }

    /// 每次局面变化（落子、悔棋、重做、重开）加一。
    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub fn ai_config(&self) -> AiConfig {
        AiConfig::from_difficulty(self.config.difficulty)
    }

    pub fn snapshot(&self) -> Resolution {
        Resolution::new(self, Vec::new())
    }

    /// 新建 `size` 尺寸的空棋盘，X 先手，清空历史，比分保留。
    pub fn initialize(&mut self, size: usize) -> Result<Resolution, RuleError> {
        if self.config.ai_mode {
            ensure_ai_board_size(size)?;
        }
        let position = Position::new(size)?;
        self.config.size = size;
        self.position = position;
        self.history.clear();
        self.revision += 1;
        debug!("initialized {size}x{size} board");
        Ok(Resolution::new(self, vec![GameEvent::GameReset { size }]))
    }

    pub fn restart(&mut self) -> Resolution {
        self.position.reset();
        self.history.clear();
        self.revision += 1;
        debug!("restarted {0}x{0} board", self.config.size);
        Resolution::new(
            self,
            vec![GameEvent::GameReset {
                size: self.config.size,
            }],
        )
    }

    pub fn set_difficulty(&mut self, difficulty: AiDifficulty) {
        self.config.difficulty = difficulty;
    }

    pub fn set_ai_mode(&mut self, enabled: bool) -> Result<Resolution, RuleError> {
        if enabled {
            ensure_ai_board_size(self.config.size)?;
        }
        self.config.ai_mode = enabled;
        Ok(self.restart())
    }

    pub fn set_board_size(&mut self, size: usize) -> Result<Resolution, RuleError> {
        self.initialize(size)
    }

    /// 对局正在等待 AI 落子；AI 执 X 时重开后即为真。
    pub fn ai_to_move(&self) -> bool {
        self.config.ai_mode && self.position.active && self.position.turn == self.config.ai_mark
    }

    pub fn apply_human_move(&mut self, cell: CellIndex) -> Result<Resolution, RuleError> {
        if self.ai_to_move() {
            return self.reject(
                cell,
                RuleError::NotPlayerTurn {
                    to_move: self.position.turn,
                },
            );
        }
        self.apply_move(cell)
    }

    /// 落下已为 AI 选好的格子，例如延迟计算的结果。
    pub fn apply_ai_move(&mut self, cell: CellIndex) -> Result<Resolution, RuleError> {
        if self.position.active && !self.ai_to_move() {
            return self.reject(
                cell,
                RuleError::NotPlayerTurn {
                    to_move: self.position.turn,
                },
            );
        }
        self.apply_move(cell)
    }

    /// 只在局面仍是 `revision` 时落下延迟得出的 AI 选点。
    pub fn apply_ai_decision(
        &mut self,
        cell: CellIndex,
        revision: u32,
    ) -> Result<Resolution, RuleError> {
        if revision != self.revision {
            return self.reject(
                cell,
                RuleError::StaleDecision {
                    decided_at: revision,
                    current: self.revision,
                },
            );
        }
        self.apply_ai_move(cell)
    }

    pub fn request_ai_move(
        &mut self,
        agent: &mut AiAgent,
    ) -> Result<(AiDecision, Resolution), RuleError> {
        if !self.position.active {
            return Err(RuleError::NoLegalMove);
        }
        if !self.ai_to_move() {
            return Err(RuleError::NotPlayerTurn {
                to_move: self.position.turn,
            });
        }
        let decision = agent.decide_move(&self.position.board, self.position.turn)?;
        let resolution = self.apply_move(decision.cell)?;
        Ok((decision, resolution))
    }

    /// 写入当前行棋方的标记，记入历史并判定局面。
    pub fn apply_move(&mut self, cell: CellIndex) -> Result<Resolution, RuleError> {
        if !self.position.active {
            return self.reject(
                cell,
                RuleError::IllegalMove {
                    cell,
                    reason: IllegalMoveReason::GameInactive,
                },
            );
        }

        let mark = self.position.turn;
        if let Err(error) = self.position.board.place(cell, mark) {
            return self.reject(cell, error);
        }
        self.history.record(MoveRecord::new(cell, mark));
        self.revision += 1;
        debug!("{mark} played cell {cell}");

        let mut events = vec![GameEvent::MovePlayed { cell, mark }];
        match self.position.settle(mark) {
            Outcome::Ongoing => events.push(GameEvent::TurnChanged {
                next: self.position.turn,
            }),
            Outcome::Win { mark: winner, line } => {
                self.scoreboard.record_win(winner);
                info!("player {winner} wins on line {line:?}");
                events.push(GameEvent::GameWon { winner, line });
                events.push(GameEvent::ScoreUpdated {
                    x: self.scoreboard.x,
                    o: self.scoreboard.o,
                });
            }
            Outcome::Draw => {
                info!("game drawn");
                events.push(GameEvent::GameDrawn);
            }
        }
        Ok(Resolution::new(self, events))
    }

    pub fn undo(&mut self) -> Resolution {
        let events = self.history.undo(&mut self.position, self.config.ai_mode);
        if !events.is_empty() {
            self.revision += 1;
        }
        Resolution::new(self, events)
    }

    /// 重做再次连成一线时不改动比分。
    pub fn redo(&mut self) -> Resolution {
        let events = self.history.redo(&mut self.position);
        if !events.is_empty() {
            self.revision += 1;
        }
        Resolution::new(self, events)
    }

    pub fn status_text(&self) -> String {
        match &self.position.outcome {
            Outcome::Win { mark, .. } => format!("Player {mark} wins!"),
            Outcome::Draw => "It's a draw!".to_string(),
            Outcome::Ongoing => format!("Player {}'s turn", self.position.turn),
        }
    }

    pub fn mode_text(&self) -> &'static str {
        if self.config.ai_mode {
            "Playing against AI"
        } else {
            "2 Player Mode"
        }
    }

    fn reject<T>(&self, cell: CellIndex, error: RuleError) -> Result<T, RuleError> {
        warn!("rejected move at cell {cell}: {error}");
        Err(error)
    }
}

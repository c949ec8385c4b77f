//! 悔棋 / 重做历史。

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::rules::Outcome;
use super::state::{GameEvent, MoveRecord, Position};

/// 一局棋的两个落子栈：`applied` 按落子顺序，`undone` 栈顶是最近撤销的一步。
///
/// 每个格子下标至多出现在一个栈中，两栈合起来恰好覆盖所对应棋盘上的已占格子。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct History {
    applied: Vec<MoveRecord>,
    undone: Vec<MoveRecord>,
    /// 每次悔棋弹出的步数，重做时整体重放。
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    gestures: Vec<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&self) -> &[MoveRecord] {
        &self.applied
    }

    pub fn undone(&self) -> &[MoveRecord] {
        &self.undone
    }

    pub fn len(&self) -> usize {
        self.applied.len() + self.undone.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn can_undo(&self) -> bool {
        !self.applied.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    pub fn clear(&mut self) {
        self.applied.clear();
        self.undone.clear();
        self.gestures.clear();
    }

    /// 新的落子会让重做链失效。
    pub fn record(&mut self, record: MoveRecord) {
        self.applied.push(record);
        self.undone.clear();
        self.gestures.clear();
    }

    /// 撤销最后一步。人机模式下连同前一步一起撤销，一次悔棋即收回玩家落子与 AI 应手。
    pub fn undo(&mut self, position: &mut Position, ai_mode: bool) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let Some(event) = self.step_back(position) else {
            return events;
        };
        events.push(event);
        let mut popped = 1;

        if ai_mode {
            if let Some(event) = self.step_back(position) {
                events.push(event);
                popped += 1;
            }
        }

        self.gestures.push(popped);
        debug!("undid {popped} move(s), {} to move", position.turn);
        events.push(GameEvent::TurnChanged {
            next: position.turn,
        });
        events
    }

    /// 重放最近一次悔棋撤下的落子，每步之后重新判定胜负。
    pub fn redo(&mut self, position: &mut Position) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.undone.is_empty() {
            return events;
        }

        let steps = self.gestures.pop().unwrap_or(1);
        for _ in 0..steps {
            if !position.active || !self.step_forward(position, &mut events) {
                break;
            }
        }
        debug!("redo finished, {} to move", position.turn);
        events
    }

    fn step_back(&mut self, position: &mut Position) -> Option<GameEvent> {
        let record = self.applied.pop()?;
        if let Err(error) = position.board.clear(record.cell) {
            warn!("history and board disagree on cell {}: {error}", record.cell);
        }
        position.turn = record.mark;
        position.active = true;
        position.outcome = Outcome::Ongoing;
        self.undone.push(record);
        Some(GameEvent::MoveUndone {
            cell: record.cell,
            mark: record.mark,
        })
    }

    fn step_forward(&mut self, position: &mut Position, events: &mut Vec<GameEvent>) -> bool {
        let Some(record) = self.undone.pop() else {
            return false;
        };
        if let Err(error) = position.board.place(record.cell, record.mark) {
            warn!("cannot redo move at cell {}: {error}", record.cell);
            self.undone.push(record);
            return false;
        }
        self.applied.push(record);
        events.push(GameEvent::MoveRedone {
            cell: record.cell,
            mark: record.mark,
        });

        match position.settle(record.mark) {
            Outcome::Ongoing => events.push(GameEvent::TurnChanged {
                next: position.turn,
            }),
            Outcome::Win { mark, line } => events.push(GameEvent::GameWon { winner: mark, line }),
            Outcome::Draw => events.push(GameEvent::GameDrawn),
        }
        true
    }
}

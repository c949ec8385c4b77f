use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::rules::{self, IllegalMoveReason, Line, Outcome, RuleError};

pub const MIN_BOARD_SIZE: usize = 3;
pub const MAX_BOARD_SIZE: usize = 7;
/// 穷举搜索只在 3x3 上可行，人机对战与 medium/hard AI 不接受更大的棋盘。
pub const MAX_AI_BOARD_SIZE: usize = 3;
pub const DEFAULT_BOARD_SIZE: usize = 3;

/// 棋盘格子下标（行优先）。
pub type CellIndex = usize;

/// 玩家标记。X 永远先手。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl Default for Mark {
    fn default() -> Self {
        Mark::X
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => f.write_str("X"),
            Mark::O => f.write_str("O"),
        }
    }
}

impl FromStr for Mark {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "X" | "x" => Ok(Mark::X),
            "O" | "o" => Ok(Mark::O),
            _ => Err(()),
        }
    }
}

/// 单个格子。序列化为 `""` / `"X"` / `"O"`，与前端的格子数组一致。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Cell {
    #[serde(rename = "")]
    Empty,
    X,
    O,
}

impl Cell {
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Mark::X),
            Cell::O => Some(Mark::O),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Empty
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Cell::X,
            Mark::O => Cell::O,
        }
    }
}

/// N×N 棋盘，格子按行优先存储。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<Cell>", into = "Vec<Cell>")]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

impl Board {
    pub fn new(size: usize) -> Result<Self, RuleError> {
        rules::ensure_board_size(size)?;
        Ok(Self {
            size,
            cells: vec![Cell::Empty; size * size],
        })
    }

    /// 由行优先的格子列表构造棋盘，长度必须是受支持尺寸的平方。
    pub fn from_cells(cells: Vec<Cell>) -> Result<Self, RuleError> {
        let size = (cells.len() as f64).sqrt().round() as usize;
        if size * size != cells.len() {
            return Err(RuleError::InvalidBoardSize {
                size: cells.len(),
                min: MIN_BOARD_SIZE,
                max: MAX_BOARD_SIZE,
            });
        }
        rules::ensure_board_size(size)?;
        Ok(Self { size, cells })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, cell: CellIndex) -> Option<Cell> {
        self.cells.get(cell).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_empty())
    }

    pub fn is_full(&self) -> bool {
        !self.cells.iter().any(|cell| cell.is_empty())
    }

    pub fn empty_cells(&self) -> Vec<CellIndex> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn count(&self, mark: Mark) -> usize {
        let target = Cell::from(mark);
        self.cells.iter().filter(|cell| **cell == target).count()
    }

    /// 偶数手由 X 落子，奇数手由 O 落子。
    pub fn side_to_move(&self) -> Mark {
        if self.count(Mark::X) > self.count(Mark::O) {
            Mark::O
        } else {
            Mark::X
        }
    }

    pub fn place(&mut self, cell: CellIndex, mark: Mark) -> Result<(), RuleError> {
        let slot = self.cells.get_mut(cell).ok_or(RuleError::IllegalMove {
            cell,
            reason: IllegalMoveReason::OutOfBounds,
        })?;
        if !slot.is_empty() {
            return Err(RuleError::IllegalMove {
                cell,
                reason: IllegalMoveReason::Occupied,
            });
        }
        *slot = Cell::from(mark);
        Ok(())
    }

    pub fn clear(&mut self, cell: CellIndex) -> Result<Mark, RuleError> {
        let slot = self.cells.get_mut(cell).ok_or(RuleError::IllegalMove {
            cell,
            reason: IllegalMoveReason::OutOfBounds,
        })?;
        let mark = slot.mark().ok_or(RuleError::IllegalMove {
            cell,
            reason: IllegalMoveReason::AlreadyEmpty,
        })?;
        *slot = Cell::Empty;
        Ok(mark)
    }

    pub fn reset(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    /// 供搜索回溯使用的直接写入，调用方保证 `cell` 在范围内。
    pub(crate) fn put(&mut self, cell: CellIndex, value: Cell) {
        self.cells[cell] = value;
    }
}

impl TryFrom<Vec<Cell>> for Board {
    type Error = RuleError;

    fn try_from(cells: Vec<Cell>) -> Result<Self, Self::Error> {
        Board::from_cells(cells)
    }
}

impl From<Board> for Vec<Cell> {
    fn from(board: Board) -> Self {
        board.cells
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, chunk) in self.cells.chunks(self.size).enumerate() {
            if row > 0 {
                f.write_str("\n")?;
            }
            for cell in chunk {
                let symbol = match cell {
                    Cell::Empty => '.',
                    Cell::X => 'X',
                    Cell::O => 'O',
                };
                write!(f, "{symbol}")?;
            }
        }
        Ok(())
    }
}

/// 一次已落子的记录。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveRecord {
    pub cell: CellIndex,
    pub mark: Mark,
}

impl MoveRecord {
    pub fn new(cell: CellIndex, mark: Mark) -> Self {
        Self { cell, mark }
    }
}

/// 棋盘、行棋方与对局是否仍在进行；撤销/重做回滚的正是这一部分。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Position {
    pub board: Board,
    pub turn: Mark,
    pub active: bool,
    #[serde(default)]
    pub outcome: Outcome,
}

impl Position {
    pub fn new(size: usize) -> Result<Self, RuleError> {
        Ok(Self::from_board(Board::new(size)?))
    }

    pub fn from_board(board: Board) -> Self {
        let mut position = Self {
            turn: board.side_to_move(),
            board,
            active: true,
            outcome: Outcome::Ongoing,
        };
        let outcome = rules::evaluate(&position.board);
        if outcome.is_terminal() {
            position.active = false;
            position.outcome = outcome;
        }
        position
    }

    pub fn reset(&mut self) {
        self.board.reset();
        self.turn = Mark::X;
        self.active = true;
        self.outcome = Outcome::Ongoing;
    }

    /// `mover` 落子后判定局面：未分胜负则交换行棋方，胜或和则结束对局。
    pub fn settle(&mut self, mover: Mark) -> Outcome {
        let outcome = rules::evaluate(&self.board);
        if outcome.is_terminal() {
            self.active = false;
        } else {
            self.turn = mover.opponent();
        }
        self.outcome = outcome.clone();
        outcome
    }
}

/// 比分，只随胜局增加，撤销不会回退。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scoreboard {
    pub x: u32,
    pub o: u32,
}

impl Scoreboard {
    pub fn record_win(&mut self, winner: Mark) {
        match winner {
            Mark::X => self.x += 1,
            Mark::O => self.o += 1,
        }
    }

    pub fn wins(&self, mark: Mark) -> u32 {
        match mark {
            Mark::X => self.x,
            Mark::O => self.o,
        }
    }
}

/// 引擎对外发出的事件流，前端据此播放音效、高亮连线等。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    GameReset {
        size: usize,
    },
    MovePlayed {
        cell: CellIndex,
        mark: Mark,
    },
    MoveUndone {
        cell: CellIndex,
        mark: Mark,
    },
    MoveRedone {
        cell: CellIndex,
        mark: Mark,
    },
    TurnChanged {
        next: Mark,
    },
    GameWon {
        winner: Mark,
        line: Line,
    },
    GameDrawn,
    ScoreUpdated {
        x: u32,
        o: u32,
    },
}

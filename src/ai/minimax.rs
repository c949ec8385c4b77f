use log::debug;
use serde::{Deserialize, Serialize};

use crate::game::{find_winner, winning_lines, Board, Cell, CellIndex, Line, Mark};

/// 以最大化一方视角给出的 minimax 估值。
pub const WIN: i8 = 1;
pub const DRAW: i8 = 0;
pub const LOSS: i8 = -1;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoredMove {
    pub cell: CellIndex,
    pub score: i8,
}

/// 在棋盘副本上做穷举 minimax。
///
/// 每个分支先写入副本、搜索、再清除，调用方的棋盘不会被改动。
/// 不限深度也不剪枝，每条变化都搜到有人获胜或棋盘下满为止。
pub struct Minimax {
    board: Board,
    lines: Vec<Line>,
    maximizing: Mark,
    stats: SearchStats,
}

impl Minimax {
    pub fn new(board: &Board, maximizing: Mark) -> Self {
        Self {
            lines: winning_lines(board.size()),
            board: board.clone(),
            maximizing,
            stats: SearchStats::default(),
        }
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// 轮到 `to_move` 落子时当前局面的估值。
    pub fn score(&mut self, to_move: Mark) -> i8 {
        self.search(to_move)
    }

    /// 为 `mark` 逐个评估空格，保留第一个达到最优值的格子：
    /// `mark` 是最大化一方时取最高分，否则取最低分。不区分快胜与慢胜。
    pub fn best_move(&mut self, mark: Mark) -> Option<ScoredMove> {
        let prefers_high = mark == self.maximizing;
        let mut best: Option<ScoredMove> = None;

        for cell in 0..self.board.len() {
            if self.board.get(cell) != Some(Cell::Empty) {
                continue;
            }
            self.board.put(cell, Cell::from(mark));
            let score = self.search(mark.opponent());
            self.board.put(cell, Cell::Empty);

            let improves = match best {
                None => true,
                Some(current) if prefers_high => score > current.score,
                Some(current) => score < current.score,
            };
            if improves {
                best = Some(ScoredMove { cell, score });
            }
        }

        if let Some(choice) = best {
            debug!(
                "minimax picked cell {} for {mark} (score {}, {} nodes)",
                choice.cell, choice.score, self.stats.nodes
            );
        }
        best
    }

    fn search(&mut self, to_move: Mark) -> i8 {
        self.stats.nodes += 1;
        if let Some(value) = self.terminal_value() {
            return value;
        }

        let maximizing_turn = to_move == self.maximizing;
        let mut best = if maximizing_turn { i8::MIN } else { i8::MAX };
        for cell in 0..self.board.len() {
            if self.board.get(cell) != Some(Cell::Empty) {
                continue;
            }
            self.board.put(cell, Cell::from(to_move));
            let value = self.search(to_move.opponent());
            self.board.put(cell, Cell::Empty);

            best = if maximizing_turn {
                best.max(value)
            } else {
                best.min(value)
            };
        }
        best
    }

    fn terminal_value(&self) -> Option<i8> {
        match find_winner(&self.board, &self.lines) {
            Some((_, mark)) if mark == self.maximizing => Some(WIN),
            Some(_) => Some(LOSS),
            None if self.board.is_full() => Some(DRAW),
            None => None,
        }
    }
}

/// `board` 对 `maximizing` 一方的博弈值，行棋方由双方棋子数推出。
pub fn score(board: &Board, maximizing: Mark) -> i8 {
    Minimax::new(board, maximizing).score(board.side_to_move())
}

pub fn best_move_for(board: &Board, mark: Mark, maximizing: Mark) -> Option<ScoredMove> {
    Minimax::new(board, maximizing).best_move(mark)
}

pub fn best_move(board: &Board, mark: Mark) -> Option<ScoredMove> {
    best_move_for(board, mark, mark)
}

use std::fmt;

use log::trace;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::{Board, CellIndex, Mark, MAX_AI_BOARD_SIZE, MAX_BOARD_SIZE, MIN_BOARD_SIZE};

/// 一条获胜连线：N 个互不相同的格子下标。
pub type Line = Vec<CellIndex>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IllegalMoveReason {
    Occupied,
    OutOfBounds,
    GameInactive,
    AlreadyEmpty,
}

impl fmt::Display for IllegalMoveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IllegalMoveReason::Occupied => "cell is already occupied",
            IllegalMoveReason::OutOfBounds => "cell is outside the board",
            IllegalMoveReason::GameInactive => "game is not accepting moves",
            IllegalMoveReason::AlreadyEmpty => "cell is already empty",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum RuleError {
    #[error("illegal move at cell {cell}: {reason}")]
    IllegalMove {
        cell: CellIndex,
        reason: IllegalMoveReason,
    },
    #[error("not this player's turn, {to_move} is to move")]
    NotPlayerTurn { to_move: Mark },
    #[error("no empty cell is left to play")]
    NoLegalMove,
    #[error("board size {size} is outside the supported range {min}..={max}")]
    InvalidBoardSize { size: usize, min: usize, max: usize },
    #[error("AI decision was made at revision {decided_at}, the game is at {current}")]
    StaleDecision { decided_at: u32, current: u32 },
}

/// 局面判定结果。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Outcome {
    Ongoing,
    Win { mark: Mark, line: Line },
    Draw,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }

    pub fn winner(&self) -> Option<Mark> {
        match self {
            Outcome::Win { mark, .. } => Some(*mark),
            _ => None,
        }
    }
}

impl Default for Outcome {
    fn default() -> Self {
        Outcome::Ongoing
    }
}

pub fn ensure_board_size(size: usize) -> Result<(), RuleError> {
    if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
        return Err(RuleError::InvalidBoardSize {
            size,
            min: MIN_BOARD_SIZE,
            max: MAX_BOARD_SIZE,
        });
    }
    Ok(())
}

/// 同 [`ensure_board_size`]，上限收紧到穷举搜索能应付的棋盘尺寸。
pub fn ensure_ai_board_size(size: usize) -> Result<(), RuleError> {
    ensure_board_size(size)?;
    if size > MAX_AI_BOARD_SIZE {
        return Err(RuleError::InvalidBoardSize {
            size,
            min: MIN_BOARD_SIZE,
            max: MAX_AI_BOARD_SIZE,
        });
    }
    Ok(())
}

/// 只含整行整列：先自上而下的行，再自左而右的列，最后主对角线与副对角线。
pub fn winning_lines(size: usize) -> Vec<Line> {
    let mut lines = Vec::with_capacity(2 * size + 2);
    for row in 0..size {
        lines.push((0..size).map(|col| row * size + col).collect());
    }
    for col in 0..size {
        lines.push((0..size).map(|row| row * size + col).collect());
    }
    lines.push((0..size).map(|i| i * size + i).collect());
    lines.push((0..size).map(|i| i * size + (size - 1 - i)).collect());
    lines
}

/// `lines` 中第一条同色连线的下标及其标记。
pub fn find_winner(board: &Board, lines: &[Line]) -> Option<(usize, Mark)> {
    lines.iter().enumerate().find_map(|(index, line)| {
        let (first, rest) = line.split_first()?;
        let mark = board.get(*first)?.mark()?;
        rest.iter()
            .all(|cell| board.get(*cell).and_then(|c| c.mark()) == Some(mark))
            .then_some((index, mark))
    })
}

pub fn evaluate_lines(board: &Board, lines: &[Line]) -> Outcome {
    if let Some((index, mark)) = find_winner(board, lines) {
        trace!("line {index} completed by {mark}");
        return Outcome::Win {
            mark,
            line: lines[index].clone(),
        };
    }
    if board.is_full() {
        Outcome::Draw
    } else {
        Outcome::Ongoing
    }
}

pub fn evaluate(board: &Board) -> Outcome {
    evaluate_lines(board, &winning_lines(board.size()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::Cell;
    use std::collections::HashSet;

    fn board_from(text: &str) -> Board {
        let cells = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| match c {
                'X' => Cell::X,
                'O' => Cell::O,
                _ => Cell::Empty,
            })
            .collect();
        Board::from_cells(cells).expect("test board should be square")
    }

    #[test]
    fn line_set_has_two_n_plus_two_lines_of_distinct_cells() {
        for size in MIN_BOARD_SIZE..=MAX_BOARD_SIZE {
            let lines = winning_lines(size);
            assert_eq!(lines.len(), 2 * size + 2, "size {size}");
            for line in &lines {
                assert_eq!(line.len(), size);
                let distinct: HashSet<_> = line.iter().collect();
                assert_eq!(distinct.len(), size, "duplicate index in {line:?}");
                assert!(line.iter().all(|cell| *cell < size * size));
            }
        }
    }

    #[test]
    fn line_set_order_matches_the_classic_board() {
        let expected: Vec<Line> = vec![
            vec![0, 1, 2],
            vec![3, 4, 5],
            vec![6, 7, 8],
            vec![0, 3, 6],
            vec![1, 4, 7],
            vec![2, 5, 8],
            vec![0, 4, 8],
            vec![2, 4, 6],
        ];
        assert_eq!(winning_lines(3), expected);
    }

    #[test]
    fn top_row_wins_for_x() {
        let board = board_from("XXX .O. O..");
        assert_eq!(
            evaluate(&board),
            Outcome::Win {
                mark: Mark::X,
                line: vec![0, 1, 2]
            }
        );
    }

    #[test]
    fn full_board_without_a_line_is_a_draw() {
        let board = board_from("XOX OXO OXO");
        assert_eq!(evaluate(&board), Outcome::Draw);
    }

    #[test]
    fn partial_board_is_ongoing() {
        let board = board_from("XO. .X. ..O");
        assert_eq!(evaluate(&board), Outcome::Ongoing);
        assert!(!evaluate(&board).is_terminal());
    }

    #[test]
    fn anti_diagonal_wins_on_a_larger_board() {
        let board = board_from("...O ..O. .O.. O...");
        assert_eq!(evaluate(&board).winner(), Some(Mark::O));
    }

    #[test]
    fn shorter_runs_do_not_win_on_a_larger_board() {
        let board = board_from("XXX. OOO. .... ....");
        assert_eq!(evaluate(&board), Outcome::Ongoing);
    }

    #[test]
    fn first_line_in_order_is_reported() {
        // 第 0 行与第 0 列同时连成，行优先。
        let board = board_from("XXX XO. XOO");
        assert_eq!(
            evaluate(&board),
            Outcome::Win {
                mark: Mark::X,
                line: vec![0, 1, 2]
            }
        );
    }

    #[test]
    fn errors_serialize_with_a_type_tag() {
        let error = RuleError::IllegalMove {
            cell: 4,
            reason: IllegalMoveReason::Occupied,
        };
        let json = serde_json::to_value(&error).expect("error should serialize");
        assert_eq!(json["type"], "IllegalMove");
        assert_eq!(json["cell"], 4);
        assert_eq!(error.to_string(), "illegal move at cell 4: cell is already occupied");
    }

    #[test]
    fn ai_boards_stop_at_three_by_three() {
        assert_eq!(ensure_ai_board_size(MAX_AI_BOARD_SIZE), Ok(()));
        assert_eq!(
            ensure_ai_board_size(4),
            Err(RuleError::InvalidBoardSize {
                size: 4,
                min: MIN_BOARD_SIZE,
                max: MAX_AI_BOARD_SIZE,
            })
        );
        assert_eq!(
            ensure_ai_board_size(2),
            Err(RuleError::InvalidBoardSize {
                size: 2,
                min: MIN_BOARD_SIZE,
                max: MAX_BOARD_SIZE,
            })
        );
    }
}

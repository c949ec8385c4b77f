//! 游戏核心逻辑模块（棋盘状态、胜负判定、悔棋历史、对局流程）。

pub mod history;
pub mod rules;
pub mod session;
pub mod state;

pub use history::History;
pub use rules::{
    ensure_ai_board_size,
    ensure_board_size,
    evaluate,
    evaluate_lines,
    find_winner,
    winning_lines,
    IllegalMoveReason,
    Line,
    Outcome,
    RuleError,
};
pub use session::{GameConfig, GameSession, Resolution};
pub use state::{
    Board,
    Cell,
    CellIndex,
    GameEvent,
    Mark,
    MoveRecord,
    Position,
    Scoreboard,
    DEFAULT_BOARD_SIZE,
    MAX_AI_BOARD_SIZE,
    MAX_BOARD_SIZE,
    MIN_BOARD_SIZE,
};

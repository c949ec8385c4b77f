//! AI 算法模块（穷举 minimax 与难度分级的选点策略）。

pub mod agent;
pub mod minimax;

pub use agent::{AiAgent, AiConfig, AiDecision, AiDifficulty, AiStrategy};
pub use minimax::{best_move, best_move_for, score, Minimax, ScoredMove, SearchStats};

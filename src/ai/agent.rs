use std::fmt;
use std::str::FromStr;

use log::debug;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::minimax::Minimax;
use crate::game::{Board, CellIndex, Mark, RuleError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    Easy,
    Medium,
    Hard,
}

impl FromStr for AiDifficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(AiDifficulty::Easy),
            "medium" | "normal" => Ok(AiDifficulty::Medium),
            "hard" | "expert" => Ok(AiDifficulty::Hard),
            _ => Err(()),
        }
    }
}

impl fmt::Display for AiDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiDifficulty::Easy => f.write_str("easy"),
            AiDifficulty::Medium => f.write_str("medium"),
            AiDifficulty::Hard => f.write_str("hard"),
        }
    }
}

impl Default for AiDifficulty {
    fn default() -> Self {
        AiDifficulty::Hard
    }
}

/// 实际采用的选点方式。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiStrategy {
    Random,
    Minimax,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AiConfig {
    pub difficulty: AiDifficulty,
    /// 单步落子改用 minimax 而非随机选点的概率。
    pub optimal_probability: f64,
}

impl AiConfig {
    pub fn from_difficulty(difficulty: AiDifficulty) -> Self {
        let optimal_probability = match difficulty {
            AiDifficulty::Easy => 0.0,
            AiDifficulty::Medium => 0.5,
            AiDifficulty::Hard => 1.0,
        };
        Self {
            difficulty,
            optimal_probability,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig::from_difficulty(AiDifficulty::default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiDecision {
    pub cell: CellIndex,
    pub mark: Mark,
    pub strategy: AiStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<i8>,
    pub nodes: u64,
}

pub struct AiAgent {
    config: AiConfig,
    rng: SmallRng,
}

impl AiAgent {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(config: AiConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> AiConfig {
        self.config
    }

    pub fn set_config(&mut self, config: AiConfig) {
        self.config = config;
    }

    /// 为 `mark` 选点。每次调用单独掷骰，medium 难度在同一局中混合最优与随机落子。
    pub fn decide_move(&mut self, board: &Board, mark: Mark) -> Result<AiDecision, RuleError> {
        let empty = board.empty_cells();
        if empty.is_empty() {
            return Err(RuleError::NoLegalMove);
        }

        let decision = if self.roll_optimal() {
            self.minimax_decision(board, mark)?
        } else {
            self.random_decision(&empty, mark)?
        };
        debug!(
            "{} ai chose cell {} for {mark} via {:?}",
            self.config.difficulty, decision.cell, decision.strategy
        );
        Ok(decision)
    }

    fn roll_optimal(&mut self) -> bool {
        let p = self.config.optimal_probability;
        if p <= 0.0 {
            false
        } else if p >= 1.0 {
            true
        } else {
            self.rng.gen_bool(p)
        }
    }

    fn random_decision(
        &mut self,
        empty: &[CellIndex],
        mark: Mark,
    ) -> Result<AiDecision, RuleError> {
        let cell = *empty.choose(&mut self.rng).ok_or(RuleError::NoLegalMove)?;
        Ok(AiDecision {
            cell,
            mark,
            strategy: AiStrategy::Random,
            evaluation: None,
            nodes: 0,
        })
    }

    fn minimax_decision(&mut self, board: &Board, mark: Mark) -> Result<AiDecision, RuleError> {
        let mut search = Minimax::new(board, mark);
        let choice = search.best_move(mark).ok_or(RuleError::NoLegalMove)?;
        Ok(AiDecision {
            cell: choice.cell,
            mark,
            strategy: AiStrategy::Minimax,
            evaluation: Some(choice.score),
            nodes: search.stats().nodes,
        })
    }
}

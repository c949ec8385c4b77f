pub mod ai;
pub mod game;
pub mod utils;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{AiAgent, AiConfig, AiDecision, AiDifficulty, AiStrategy, Minimax, ScoredMove};
pub use game::{
    Board, Cell, CellIndex, GameConfig, GameEvent, GameSession, History, IllegalMoveReason, Line,
    Mark, MoveRecord, Outcome, Position, Resolution, RuleError, Scoreboard,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
    utils::init_logging(log::Level::Info);
}

fn to_js_error(error: RuleError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(serde_to_js_error)
}

fn parse_mark(value: &str) -> Result<Mark, JsValue> {
    Mark::from_str(value).map_err(|_| JsValue::from_str(&format!("unknown mark: {value}")))
}

fn parse_difficulty(value: &str) -> Result<AiDifficulty, JsValue> {
    AiDifficulty::from_str(value)
        .map_err(|_| JsValue::from_str(&format!("unknown difficulty: {value}")))
}

/// 落子结果。被拒绝的落子不会抛出异常，而是返回 `accepted: false` 与未改变的局面。
#[derive(Serialize)]
struct MoveResponse {
    accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RuleError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    decision: Option<AiDecision>,
    #[serde(flatten)]
    resolution: Resolution,
}

impl MoveResponse {
    fn from_result(session: &GameSession, result: Result<Resolution, RuleError>) -> Self {
        match result {
            Ok(resolution) => Self {
                accepted: true,
                error: None,
                decision: None,
                resolution,
            },
            Err(error) => Self {
                accepted: false,
                error: Some(error),
                decision: None,
                resolution: session.snapshot(),
            },
        }
    }
}

/// 延迟计算出的 AI 选点，附带计算时的局面版本。
#[derive(Serialize)]
struct PendingDecision {
    #[serde(flatten)]
    decision: AiDecision,
    revision: u32,
}

#[wasm_bindgen]
pub struct GameEngine {
    session: GameSession,
    agent: AiAgent,
}

#[wasm_bindgen]
impl GameEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<GameEngine, JsValue> {
        let config = if let Some(json) = config_json {
            serde_json::from_str(&json).map_err(serde_to_js_error)?
        } else {
            GameConfig::default()
        };
        let session = GameSession::new(config).map_err(to_js_error)?;
        let agent = AiAgent::new(session.ai_config());
        Ok(GameEngine { session, agent })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        to_json(&self.session.snapshot())
    }

    /// 完整对局：配置、历史与比分。
    pub fn session_json(&self) -> Result<String, JsValue> {
        to_json(&self.session)
    }

    pub fn apply_human_move_json(&mut self, cell: usize) -> Result<String, JsValue> {
        let result = self.session.apply_human_move(cell);
        to_json(&MoveResponse::from_result(&self.session, result))
    }

    /// 传入 `think_ai` 给出的 `revision` 时，局面已变化的选点会被拒绝。
    pub fn apply_ai_move_json(
        &mut self,
        cell: usize,
        revision: Option<u32>,
    ) -> Result<String, JsValue> {
        let result = match revision {
            Some(revision) => self.session.apply_ai_decision(cell, revision),
            None => self.session.apply_ai_move(cell),
        };
        to_json(&MoveResponse::from_result(&self.session, result))
    }

    pub fn request_ai_move_json(&mut self) -> Result<String, JsValue> {
        let response = match self.session.request_ai_move(&mut self.agent) {
            Ok((decision, resolution)) => MoveResponse {
                accepted: true,
                error: None,
                decision: Some(decision),
                resolution,
            },
            Err(error) => MoveResponse::from_result(&self.session, Err(error)),
        };
        to_json(&response)
    }

    /// 等待 `delay_ms`（缺省为配置中的停顿）后为当前局面选点，不修改对局；
    /// 结果连同 `revision` 交给 `apply_ai_move_json` 落子。
    pub fn think_ai(&self, delay_ms: Option<u32>) -> Promise {
        let board = self.session.board().clone();
        let mark = self.session.turn();
        let revision = self.session.revision();
        let config = self.session.ai_config();
        let delay = delay_ms.unwrap_or(self.session.config().ai_delay_ms);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let mut agent = AiAgent::new(config);
            let decision = agent.decide_move(&board, mark).map_err(to_js_error)?;
            let pending = PendingDecision { decision, revision };
            let json = serde_json::to_string(&pending).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }

    pub fn undo_json(&mut self) -> Result<String, JsValue> {
        to_json(&self.session.undo())
    }

    pub fn redo_json(&mut self) -> Result<String, JsValue> {
        to_json(&self.session.redo())
    }

    pub fn restart_json(&mut self) -> Result<String, JsValue> {
        to_json(&self.session.restart())
    }

    pub fn set_difficulty(&mut self, difficulty: &str) -> Result<(), JsValue> {
        let difficulty = parse_difficulty(difficulty)?;
        self.session.set_difficulty(difficulty);
        self.agent.set_config(self.session.ai_config());
        Ok(())
    }

    pub fn set_ai_mode(&mut self, enabled: bool) -> Result<String, JsValue> {
        let resolution = self.session.set_ai_mode(enabled).map_err(to_js_error)?;
        to_json(&resolution)
    }

    pub fn set_board_size(&mut self, size: usize) -> Result<String, JsValue> {
        let resolution = self.session.set_board_size(size).map_err(to_js_error)?;
        to_json(&resolution)
    }

    pub fn status_text(&self) -> String {
        self.session.status_text()
    }

    pub fn mode_text(&self) -> String {
        self.session.mode_text().to_string()
    }

    pub fn ai_to_move(&self) -> bool {
        self.session.ai_to_move()
    }

    pub fn ai_delay_ms(&self) -> u32 {
        self.session.config().ai_delay_ms
    }
}

/// 返回指定尺寸棋盘的全部获胜连线。
#[wasm_bindgen(js_name = "winningLines")]
pub fn list_winning_lines(size: usize) -> Result<JsValue, JsValue> {
    game::ensure_board_size(size).map_err(to_js_error)?;
    to_value(&game::winning_lines(size)).map_err(JsValue::from)
}

/// 判定传入棋盘（格子数组）的胜负状态。
#[wasm_bindgen(js_name = "evaluateBoard")]
pub fn evaluate_board(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    to_value(&game::evaluate(&board)).map_err(JsValue::from)
}

/// 为传入棋盘计算一步 AI 落子，默认替轮到的一方以 hard 难度选点。
/// medium/hard 只接受 3x3 棋盘。
#[wasm_bindgen(js_name = "computeAiMove")]
pub fn compute_ai_move(
    board: JsValue,
    mark: Option<String>,
    difficulty: Option<String>,
) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    let mark = match mark.as_deref() {
        Some(value) => parse_mark(value)?,
        None => board.side_to_move(),
    };
    let difficulty = match difficulty.as_deref() {
        Some(value) => parse_difficulty(value)?,
        None => AiDifficulty::Hard,
    };
    if difficulty != AiDifficulty::Easy {
        game::ensure_ai_board_size(board.size()).map_err(to_js_error)?;
    }
    let mut agent = AiAgent::new(AiConfig::from_difficulty(difficulty));
    let decision = agent.decide_move(&board, mark).map_err(to_js_error)?;
    to_value(&decision).map_err(JsValue::from)
}

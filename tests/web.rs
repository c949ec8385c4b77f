//! 浏览器端测试，使用 `wasm-pack test --headless --chrome` 运行。

#![cfg(target_arch = "wasm32")]

use serde_json::Value;
use wasm_bindgen_test::*;
use wasm_tictactoe::{compute_ai_move, evaluate_board, list_winning_lines, GameEngine};

wasm_bindgen_test_configure!(run_in_browser);

fn parse(json: &str) -> Value {
    serde_json::from_str(json).expect("engine should return valid JSON")
}

#[wasm_bindgen_test]
fn engine_starts_with_an_empty_board() {
    let engine = GameEngine::new(None).expect("default engine should build");
    let state = parse(&engine.state_json().expect("state should serialize"));
    assert_eq!(state["position"]["board"].as_array().map(Vec::len), Some(9));
    assert_eq!(engine.status_text(), "Player X's turn");
    assert_eq!(engine.mode_text(), "2 Player Mode");
}

#[wasm_bindgen_test]
fn occupied_cell_is_reported_not_thrown() {
    let mut engine = GameEngine::new(None).expect("default engine should build");
    engine.apply_human_move_json(4).expect("first move");
    let response = parse(&engine.apply_human_move_json(4).expect("second move"));
    assert_eq!(response["accepted"], false);
    assert_eq!(response["error"]["type"], "IllegalMove");
}

#[wasm_bindgen_test]
fn ai_mode_round_trip_through_undo() {
    let config = r#"{"ai_mode": true, "difficulty": "hard", "ai_delay_ms": 0}"#;
    let mut engine = GameEngine::new(Some(config.to_string())).expect("config should parse");
    engine.apply_human_move_json(0).expect("human move");
    assert!(engine.ai_to_move());

    let reply = parse(&engine.request_ai_move_json().expect("ai move"));
    assert_eq!(reply["accepted"], true);
    assert_eq!(reply["decision"]["mark"], "O");

    let undone = parse(&engine.undo_json().expect("undo"));
    let board = undone["position"]["board"].as_array().cloned().unwrap_or_default();
    assert!(board.iter().all(|cell| cell == ""));
    assert_eq!(undone["position"]["turn"], "X");
}

#[wasm_bindgen_test]
fn invalid_board_size_is_rejected() {
    let mut engine = GameEngine::new(None).expect("default engine should build");
    assert!(engine.set_board_size(1).is_err());
    assert!(engine.set_difficulty("nightmare").is_err());
    assert!(engine.set_board_size(4).is_ok());
}

#[wasm_bindgen_test]
fn stateless_helpers_work_on_plain_arrays() {
    let lines = list_winning_lines(3).expect("size 3 is supported");
    let lines: Vec<Vec<usize>> = serde_wasm_bindgen::from_value(lines).expect("lines array");
    assert_eq!(lines.len(), 8);

    let board = serde_wasm_bindgen::to_value(&["X", "X", "X", "O", "O", "", "", "", ""])
        .expect("board array");
    let outcome: Value = serde_wasm_bindgen::from_value(
        evaluate_board(board).expect("board should evaluate"),
    )
    .expect("outcome object");
    assert_eq!(outcome["type"], "Win");

    let blocked = serde_wasm_bindgen::to_value(&["X", "X", "", "", "O", "", "", "", ""])
        .expect("board array");
    let decision = compute_ai_move(blocked, Some("O".into()), Some("hard".into()))
        .expect("ai should find a move");
    let decision: Value = serde_wasm_bindgen::from_value(decision).expect("decision object");
    assert_eq!(decision["cell"], 2);
}

#[wasm_bindgen_test]
async fn delayed_ai_decision_resolves() {
    let config = r#"{"ai_mode": true, "ai_delay_ms": 10}"#;
    let mut engine = GameEngine::new(Some(config.to_string())).expect("config should parse");
    engine.apply_human_move_json(4).expect("human move");

    let promise = engine.think_ai(None);
    let value = wasm_bindgen_futures::JsFuture::from(promise)
        .await
        .expect("decision should resolve");
    let decision = parse(&value.as_string().expect("decision is a JSON string"));
    let cell = decision["cell"].as_u64().expect("cell index") as usize;
    let revision = decision["revision"].as_u64().expect("revision") as u32;

    let applied = parse(
        &engine
            .apply_ai_move_json(cell, Some(revision))
            .expect("apply decision"),
    );
    assert_eq!(applied["accepted"], true);
}

#[wasm_bindgen_test]
async fn decision_for_an_undone_position_is_refused() {
    let config = r#"{"ai_mode": true, "ai_delay_ms": 10}"#;
    let mut engine = GameEngine::new(Some(config.to_string())).expect("config should parse");
    engine.apply_human_move_json(4).expect("human move");

    let promise = engine.think_ai(None);
    engine.undo_json().expect("undo");
    engine.apply_human_move_json(0).expect("human replays");

    let value = wasm_bindgen_futures::JsFuture::from(promise)
        .await
        .expect("decision should resolve");
    let decision = parse(&value.as_string().expect("decision is a JSON string"));
    let cell = decision["cell"].as_u64().expect("cell index") as usize;
    let revision = decision["revision"].as_u64().expect("revision") as u32;

    let rejected = parse(
        &engine
            .apply_ai_move_json(cell, Some(revision))
            .expect("engine answers"),
    );
    assert_eq!(rejected["accepted"], false);
    assert_eq!(rejected["error"]["type"], "StaleDecision");
    assert_eq!(rejected["position"]["board"][0], "X");
}

#[wasm_bindgen_test]
fn hard_ai_refuses_boards_above_three_by_three() {
    let board = serde_wasm_bindgen::to_value(&vec![""; 16]).expect("board array");
    assert!(compute_ai_move(board, None, Some("hard".into())).is_err());

    let config = r#"{"ai_mode": true, "size": 4}"#;
    assert!(GameEngine::new(Some(config.to_string())).is_err());
}

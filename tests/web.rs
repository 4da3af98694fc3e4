// Browser smoke tests, run with `wasm-pack test --headless --chrome`.
// Most tests run without a host SDK on the page, so every host call fails
// and is logged; the game has to keep going regardless. One test installs a
// recording stand-in for the SDK.

#![cfg(target_arch = "wasm32")]

use hidden_friends::game::{
    hud_json, layout_json, load_saved_state, play_again, start_game, stop_game, tap_sprite,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

// Minimal stand-in for the host SDK that records every call.
#[wasm_bindgen(inline_js = r#"
export function install_sdk_stub(onGameOver) {
  const calls = [];
  globalThis.__hfCalls = calls;
  globalThis.FarcadeSDK = { singlePlayer: { actions: {
    ready() { calls.push("ready"); return Promise.resolve({ initialGameState: null }); },
    gameOver(p) { calls.push("gameOver:" + p.score); onGameOver(); },
    hapticFeedback() { calls.push("haptic"); },
    saveGameState() { calls.push("save"); },
  } } };
}
export function sdk_calls() { return (globalThis.__hfCalls || []).join(","); }
export function remove_sdk_stub() {
  delete globalThis.FarcadeSDK;
  delete globalThis.__hfCalls;
}
"#)]
extern "C" {
    fn install_sdk_stub(on_game_over: &JsValue);
    fn sdk_calls() -> String;
    fn remove_sdk_stub();
}

fn hud() -> serde_json::Value {
    serde_json::from_str(&hud_json()).unwrap()
}

#[wasm_bindgen_test]
fn starts_without_host_sdk() {
    start_game(None).unwrap();
    let hud: serde_json::Value = serde_json::from_str(&hud_json()).unwrap();
    assert_eq!(hud["level"], 1);
    assert_eq!(hud["phase"], "intro");
    assert_eq!(hud["countdown"], 3);

    let layout: serde_json::Value = serde_json::from_str(&layout_json()).unwrap();
    assert_eq!(layout["mapAsset"], "assets/maps/level-1.png");
    assert!(!layout["sprites"].as_array().unwrap().is_empty());
    stop_game();
    assert_eq!(hud_json(), "null");
}

#[wasm_bindgen_test]
fn taps_during_countdown_are_ignored() {
    start_game(Some(r#"{"logLevel":"warn"}"#.to_string())).unwrap();
    assert_eq!(tap_sprite(0, 0.0), "ignored");
    assert_eq!(tap_sprite(0, 50.0), "ignored");
    play_again();
    let hud: serde_json::Value = serde_json::from_str(&hud_json()).unwrap();
    assert_eq!(hud["score"], 0);
    stop_game();
}

#[wasm_bindgen_test]
fn rejects_bad_config() {
    assert!(start_game(Some("{not json".to_string())).is_err());
}

#[wasm_bindgen_test]
fn saved_state_before_start_is_applied() {
    stop_game();
    assert!(load_saved_state(r#"{"gameState":{"coins":120,"characters":[]}}"#).unwrap());
    start_game(None).unwrap();
    assert_eq!(hud()["coins"], 120);

    assert!(load_saved_state(r#"{"gameState":{"coins":300,"characters":[]}}"#).unwrap());
    assert_eq!(hud()["coins"], 300);
    stop_game();
}

#[wasm_bindgen_test]
fn host_may_restart_from_inside_game_over() {
    let on_game_over = Closure::wrap(Box::new(play_again) as Box<dyn FnMut()>);
    install_sdk_stub(on_game_over.as_ref());
    start_game(Some(r#"{"introCountdownTicks":0}"#.to_string())).unwrap();

    let layout: serde_json::Value = serde_json::from_str(&layout_json()).unwrap();
    let decoy = layout["sprites"]
        .as_array()
        .unwrap()
        .iter()
        .position(|s| s["isTarget"] == false)
        .unwrap();
    assert_eq!(tap_sprite(decoy, 0.0), "ignored");
    assert_eq!(tap_sprite(decoy, 50.0), "failed");

    let calls = sdk_calls();
    assert!(calls.starts_with("ready"), "{calls}");
    assert!(calls.contains("haptic,gameOver:0"), "{calls}");
    // play_again ran from the gameOver call
    assert_eq!(hud()["phase"], "active");
    assert_eq!(hud()["level"], 1);

    stop_game();
    remove_sdk_stub();
}

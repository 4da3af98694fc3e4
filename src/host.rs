//! Bridge to the host platform SDK (`window.FarcadeSDK`).
//!
//! Every host call is one-way. Failures come back as `HostError` so callers
//! can log them; nothing here retries.
//!
//! `SdkHost` never calls the SDK while game state is borrowed: `gameOver`
//! and `hapticFeedback` are queued and only sent by `flush_outbox()`, which
//! the browser runtime calls once it has released the game. A host that
//! answers `gameOver` by synchronously requesting "play again" therefore
//! finds the game free.

use std::cell::RefCell;

use log::{info, warn};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

use crate::error::HostError;
use crate::progress::SavedGameState;

/// Run-lifecycle calls the game makes to its host.
pub trait Host {
    /// Announce the game is loaded and playable. A host with saved progress
    /// delivers it afterwards, through whatever channel it was built with.
    fn ready(&mut self) -> Result<(), HostError>;
    fn game_over(&mut self, score: u64) -> Result<(), HostError>;
    fn haptic_feedback(&mut self) -> Result<(), HostError>;
}

/// Where the progress store persists its state.
pub trait SaveSink {
    fn save_game_state(&mut self, state: &SavedGameState) -> Result<(), HostError>;
}

// -----------------------------------------------------------------------------
// Browser SDK bindings
// -----------------------------------------------------------------------------

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = JSON, js_name = parse)]
    fn json_parse(text: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = JSON, js_name = stringify)]
    fn json_stringify(value: &JsValue) -> Result<JsValue, JsValue>;

    /// Whatever `ready()` hands back; a promise of the game info in
    /// current SDKs.
    type ReadyResult;

    #[wasm_bindgen(method, catch)]
    fn then(this: &ReadyResult, on_fulfilled: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["FarcadeSDK", "singlePlayer", "actions"], js_name = ready)]
    fn sdk_ready() -> Result<ReadyResult, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["FarcadeSDK", "singlePlayer", "actions"], js_name = gameOver)]
    fn sdk_game_over(payload: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["FarcadeSDK", "singlePlayer", "actions"], js_name = hapticFeedback)]
    fn sdk_haptic_feedback() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["FarcadeSDK", "singlePlayer", "actions"], js_name = saveGameState)]
    fn sdk_save_game_state(payload: JsValue) -> Result<JsValue, JsValue>;
}

fn call_failed(action: &'static str, err: JsValue) -> HostError {
    HostError::Call {
        action,
        message: err.as_string().unwrap_or_else(|| format!("{err:?}")),
    }
}

/// Serialize `value` and hand it to JS as a plain object.
fn to_js_object<T: serde::Serialize>(value: &T) -> Result<JsValue, HostError> {
    let text = serde_json::to_string(value)?;
    json_parse(&text).map_err(|e| call_failed("JSON.parse", e))
}

/// Parts of the `ready()` game info the game cares about.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GameInfo {
    initial_game_state: Option<serde_json::Value>,
}

/// The saved-state envelope (`{ "gameState": ... }`) out of the JSON text of
/// a `ready()` result, `None` if the host had nothing saved.
pub fn initial_state_from_game_info(info_json: &str) -> Option<String> {
    let info: GameInfo = match serde_json::from_str(info_json) {
        Ok(info) => info,
        Err(e) => {
            warn!("unreadable game info from host: {e}");
            return None;
        }
    };
    info.initial_game_state
        .filter(|v| !v.is_null())
        .map(|v| v.to_string())
}

type StateHandler = Box<dyn FnOnce(Option<String>)>;

/// Host implementation backed by the page's SDK object. Only usable on
/// wasm32 inside a browser; a page without the SDK makes every call fail
/// with `HostError::Call`.
#[derive(Default)]
pub struct SdkHost {
    on_initial_state: Option<StateHandler>,
}

impl SdkHost {
    /// Host whose `ready()` passes the saved-state envelope (or `None`) to
    /// `handler` once the SDK resolves it.
    pub fn with_initial_state_handler(handler: impl FnOnce(Option<String>) + 'static) -> Self {
        Self { on_initial_state: Some(Box::new(handler)) }
    }
}

impl Host for SdkHost {
    fn ready(&mut self) -> Result<(), HostError> {
        let result = sdk_ready().map_err(|e| call_failed("ready", e))?;
        let Some(handler) = self.on_initial_state.take() else {
            return Ok(());
        };
        let on_info = Closure::once_into_js(move |game_info: JsValue| {
            let state = json_stringify(&game_info)
                .ok()
                .and_then(|text| text.as_string())
                .and_then(|text| initial_state_from_game_info(&text));
            if state.is_none() {
                info!("host has no saved game state");
            }
            handler(state);
        });
        result.then(&on_info).map(|_| ()).map_err(|e| call_failed("ready", e))
    }

    fn game_over(&mut self, score: u64) -> Result<(), HostError> {
        OUTBOX.with(|o| o.borrow_mut().push(Outgoing::GameOver(score)));
        Ok(())
    }

    fn haptic_feedback(&mut self) -> Result<(), HostError> {
        OUTBOX.with(|o| o.borrow_mut().push(Outgoing::Haptic));
        Ok(())
    }
}

impl SaveSink for SdkHost {
    fn save_game_state(&mut self, state: &SavedGameState) -> Result<(), HostError> {
        let payload = to_js_object(&serde_json::json!({ "gameState": state }))?;
        sdk_save_game_state(payload)
            .map(|_| ())
            .map_err(|e| call_failed("saveGameState", e))
    }
}

// -----------------------------------------------------------------------------
// Outbox
// -----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outgoing {
    GameOver(u64),
    Haptic,
}

thread_local! {
    static OUTBOX: RefCell<Vec<Outgoing>> = const { RefCell::new(Vec::new()) };
}

fn send(call: Outgoing) -> Result<(), HostError> {
    match call {
        Outgoing::GameOver(score) => {
            let payload = to_js_object(&serde_json::json!({ "score": score }))?;
            sdk_game_over(payload).map(|_| ()).map_err(|e| call_failed("gameOver", e))
        }
        Outgoing::Haptic => sdk_haptic_feedback()
            .map(|_| ())
            .map_err(|e| call_failed("hapticFeedback", e)),
    }
}

/// Send every queued host call, oldest first. Must not be called while the
/// game state is borrowed.
pub fn flush_outbox() {
    let calls = OUTBOX.with(|o| std::mem::take(&mut *o.borrow_mut()));
    for call in calls {
        if let Err(e) = send(call) {
            warn!("{call:?} not delivered: {e}");
        }
    }
}

#[cfg(test)]
fn queued() -> Vec<Outgoing> {
    OUTBOX.with(|o| o.borrow().clone())
}

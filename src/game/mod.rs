//! Browser runtime: wires a `Run` to the page.
//!
//! The run lives in a `thread_local!` cell (the page has one event loop, so
//! the interval callback, feedback timeouts and JS calls never overlap).
//! Rendering the map and sprites is left to the JS side, which reads
//! `layout_json()` / `camera_json()` and reports taps via `tap_sprite()`.

mod hud;
mod ticker;

use std::cell::{Cell, RefCell};

use log::{error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::window;

use crate::album::{album_entries, album_summary};
use crate::assets::AssetRegistry;
use crate::catalog::Catalog;
use crate::config::GameConfig;
use crate::error::ProgressError;
use crate::host::{SdkHost, flush_outbox};
use crate::progress::{ProgressBook, parse_saved_state};
use crate::run::Run;
use crate::session::AttemptOutcome;

pub use ticker::IntervalTicker;

type BrowserRun = Run<ProgressBook<SdkHost>, SdkHost, IntervalTicker>;

struct Runtime {
    run: BrowserRun,
    assets: AssetRegistry,
}

thread_local! {
    static GAME: RefCell<Option<Runtime>> = const { RefCell::new(None) };
    /// Saved state handed over before `start_game`.
    static PENDING_STATE: RefCell<Option<String>> = const { RefCell::new(None) };
    /// Bumped whenever a feedback timeout is scheduled or play restarts; a
    /// timeout only resumes play if the epoch it captured is still current.
    /// Lives outside `Runtime` so it keeps counting across `start_game`.
    static EPOCH: Cell<u64> = const { Cell::new(0) };
}

fn next_epoch() -> u64 {
    EPOCH.with(|e| {
        let next = e.get().wrapping_add(1);
        e.set(next);
        next
    })
}

fn is_current_epoch(epoch: u64) -> bool {
    EPOCH.with(|e| e.get() == epoch)
}

/// Run `f` against the live game, then deliver any host calls it queued
/// once the game is no longer borrowed.
fn with_runtime<R>(f: impl FnOnce(&mut Runtime) -> R) -> Option<R> {
    let out = GAME.with(|cell| cell.borrow_mut().as_mut().map(f));
    flush_outbox();
    out
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        error!("could not serialize view: {e}");
        String::from("null")
    })
}

// --- Entry points -----------------------------------------------------------

/// Start (or restart) the game. `config_json` may override any field of
/// `GameConfig`.
#[wasm_bindgen]
pub fn start_game(config_json: Option<String>) -> Result<(), JsValue> {
    let cfg = match config_json.as_deref() {
        Some(text) => GameConfig::from_json(text).map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => GameConfig::default(),
    };
    crate::logging::init(cfg.log_filter());

    let catalog = Catalog::builtin().map_err(|e| JsValue::from_str(&e.to_string()))?;
    let assets = AssetRegistry::resolve(&catalog, cfg.catalog_cycle_length)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    // Stale feedback timeouts from the previous runtime must not match.
    next_epoch();

    // Carry saved progress over a restart; dropping the old runtime clears
    // its interval.
    let saved = GAME
        .with(|cell| cell.borrow_mut().take())
        .map(|prev| prev.run.store().snapshot())
        .unwrap_or_default();
    let store = ProgressBook::with_state(saved, SdkHost::default());

    hud::ensure_overlays()?;

    let host = SdkHost::with_initial_state_handler(|state| {
        if let Some(json) = state {
            if let Err(e) = apply_saved_state(&json) {
                warn!("saved game state from host ignored: {e}");
            }
        }
    });
    let rng = StdRng::from_entropy();
    let ticker = IntervalTicker::new(on_tick);
    let mut run = Run::new(cfg, catalog, store, host, ticker, rng);
    if let Some(json) = PENDING_STATE.with(|p| p.borrow_mut().take()) {
        if let Err(e) = run.load_saved_state(&json) {
            warn!("queued game state ignored: {e}");
        }
    }
    run.boot();
    hud::render(&run.hud());
    info!("game started with {} assets registered", assets.len());

    GAME.with(|cell| cell.replace(Some(Runtime { run, assets })));
    flush_outbox();
    Ok(())
}

/// Load saved progress into the live game, or queue it for the next
/// `start_game` if no game is running.
fn apply_saved_state(json: &str) -> Result<bool, ProgressError> {
    let applied = with_runtime(|rt| -> Result<bool, ProgressError> {
        let loaded = rt.run.load_saved_state(json)?;
        hud::render(&rt.run.hud());
        Ok(loaded)
    });
    match applied {
        Some(result) => result,
        None => {
            let found = parse_saved_state(json)?.is_some();
            if found {
                info!("game state queued until start_game");
                PENDING_STATE.with(|p| p.replace(Some(json.to_string())));
            }
            Ok(found)
        }
    }
}

/// Feed the host's saved state (`initialGameState` from `ready()`). Safe to
/// call before or after `start_game`; returns whether any state was found.
#[wasm_bindgen]
pub fn load_saved_state(json: &str) -> Result<bool, JsValue> {
    apply_saved_state(json).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn on_tick() {
    with_runtime(|rt| {
        rt.run.tick();
        hud::render(&rt.run.hud());
    });
}

/// A raw tap on sprite `index`; returns the outcome kind.
#[wasm_bindgen]
pub fn tap_sprite(index: usize, timestamp_ms: f64) -> String {
    let outcome = with_runtime(|rt| {
        let out = rt.run.tap(index, timestamp_ms);
        if matches!(out, AttemptOutcome::Progress { .. })
            && !schedule_resume(next_epoch(), rt.run.config().feedback_pause_ms)
        {
            rt.run.resume();
        }
        hud::render(&rt.run.hud());
        out
    });
    let kind = match outcome.unwrap_or(AttemptOutcome::Ignored) {
        AttemptOutcome::Ignored => "ignored",
        AttemptOutcome::Progress { .. } => "progress",
        AttemptOutcome::LevelComplete { .. } => "complete",
        AttemptOutcome::AlreadyFound => "already-found",
        AttemptOutcome::Strike { .. } => {
            hud::flash("WRONG!");
            "strike"
        }
        AttemptOutcome::LevelFailed { .. } => "failed",
    };
    kind.to_string()
}

/// Resume play after `delay_ms` unless the epoch moved on. Returns false if
/// the timeout could not be scheduled.
fn schedule_resume(epoch: u64, delay_ms: u32) -> bool {
    let Some(w) = window() else {
        return false;
    };
    let cb = Closure::once_into_js(move || {
        if !is_current_epoch(epoch) {
            return;
        }
        with_runtime(|rt| {
            if rt.run.resume() {
                hud::render(&rt.run.hud());
            }
        });
    });
    match w.set_timeout_with_callback_and_timeout_and_arguments_0(
        cb.unchecked_ref(),
        delay_ms.min(i32::MAX as u32) as i32,
    ) {
        Ok(_) => true,
        Err(e) => {
            warn!("setTimeout failed: {e:?}; resuming immediately");
            false
        }
    }
}

/// Close the feedback modal early (e.g. player tapped "continue").
#[wasm_bindgen]
pub fn resume_play() -> bool {
    next_epoch();
    with_runtime(|rt| {
        let resumed = rt.run.resume();
        hud::render(&rt.run.hud());
        resumed
    })
    .unwrap_or(false)
}

#[wasm_bindgen]
pub fn play_again() {
    next_epoch();
    with_runtime(|rt| {
        rt.run.play_again();
        hud::render(&rt.run.hud());
    });
}

/// Tear everything down; the ticker's interval is cleared on drop.
#[wasm_bindgen]
pub fn stop_game() {
    next_epoch();
    GAME.with(|cell| cell.borrow_mut().take());
}

// --- Camera -----------------------------------------------------------------

#[wasm_bindgen]
pub fn drag_camera(dx: f64, dy: f64) {
    with_runtime(|rt| rt.run.camera_mut().drag(dx, dy));
}

#[wasm_bindgen]
pub fn zoom_camera(factor: f64) {
    with_runtime(|rt| rt.run.camera_mut().zoom_by(factor));
}

#[wasm_bindgen]
pub fn camera_json() -> String {
    with_runtime(|rt| to_json(rt.run.camera())).unwrap_or_else(|| String::from("null"))
}

// --- Views ------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutView<'a> {
    level: u32,
    map_asset: Option<&'a str>,
    sprites: &'a [crate::placement::Sprite],
}

#[wasm_bindgen]
pub fn layout_json() -> String {
    with_runtime(|rt| {
        let base = rt.run.session().map(|s| s.plan().base_level).unwrap_or(1);
        to_json(&LayoutView {
            level: rt.run.level(),
            map_asset: rt.assets.level_map(base),
            sprites: &rt.run.layout().sprites,
        })
    })
    .unwrap_or_else(|| String::from("null"))
}

#[wasm_bindgen]
pub fn hud_json() -> String {
    with_runtime(|rt| to_json(&rt.run.hud())).unwrap_or_else(|| String::from("null"))
}

#[wasm_bindgen]
pub fn album_json() -> String {
    with_runtime(|rt| {
        let entries = album_entries(rt.run.catalog(), rt.run.store());
        let summary = album_summary(&entries);
        to_json(&serde_json::json!({ "summary": summary, "entries": entries }))
    })
    .unwrap_or_else(|| String::from("null"))
}

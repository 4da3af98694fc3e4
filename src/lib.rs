//! Hidden Friends core crate.
//!
//! Seek-and-find gameplay: each level hides one or more catalog characters on
//! a large map among decoys, and the player has to double-tap every target
//! before the clock runs out. Levels cycle through the catalog every 13
//! levels, each cycle asking for one more target instance.
//!
//! Everything except `game` (the browser runtime) is plain Rust and runs
//! under `cargo test` on the host.

use wasm_bindgen::prelude::*;

pub mod album;
pub mod assets;
pub mod camera;
pub mod catalog;
pub mod config;
pub mod error;
pub mod game;
pub mod host;
pub mod level;
pub mod logging;
pub mod placement;
pub mod progress;
pub mod run;
pub mod session;
pub mod tap;

pub use catalog::{CHARACTERS, Catalog, CharacterRecord};
pub use config::GameConfig;
pub use level::{LevelPlan, plan_level};
pub use progress::{CharacterProgressRecord, ProgressBook, ProgressStore, SavedGameState};
pub use run::{Run, RunStatus, Ticker};
pub use session::{AttemptOutcome, LevelSession, Phase, TickOutcome};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Milliseconds from the page's high resolution clock, 0 outside a browser.
#[wasm_bindgen]
pub fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

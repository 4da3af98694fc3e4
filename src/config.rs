//! Tunable game parameters.
//!
//! Every threshold the gameplay depends on lives here instead of being a
//! literal at the call site. The host may pass a JSON object with any subset
//! of these fields (camelCase) to `start_game`; missing fields keep their
//! defaults.

use serde::Deserialize;

use crate::error::ConfigError;

// -----------------------------------------------------------------------------
// Defaults
// -----------------------------------------------------------------------------

/// Number of distinct base levels before the catalog assignment repeats.
pub const CATALOG_CYCLE_LENGTH: u32 = 13;
pub const MAX_STRIKES: u32 = 1;
pub const DOUBLE_TAP_WINDOW_MS: f64 = 300.0;

pub const BASE_POINTS: u32 = 100;
pub const MAX_TIME_MULTIPLIER: f64 = 4.0;
pub const COINS_PER_TARGET: u32 = 50;

// time limit = max(MIN_TIME_SECONDS, BASE_TIME_SECONDS - base_level)
pub const BASE_TIME_SECONDS: u32 = 16;
pub const MIN_TIME_SECONDS: u32 = 10;

pub const INTRO_COUNTDOWN_TICKS: u32 = 3;
pub const FEEDBACK_PAUSE_MS: u32 = 1200;

pub const CANVAS_WIDTH: f64 = 720.0;
pub const CANVAS_HEIGHT: f64 = 1080.0;
pub const HEADER_HEIGHT: f64 = 120.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub catalog_cycle_length: u32,
    pub max_strikes: u32,
    pub double_tap_window_ms: f64,

    pub base_points: u32,
    pub max_time_multiplier: f64,
    pub coins_per_target: u32,

    pub base_time_seconds: u32,
    pub min_time_seconds: u32,
    pub intro_countdown_ticks: u32,
    pub feedback_pause_ms: u32,

    // Map / sprite layout
    pub map_width: f64,
    pub map_height: f64,
    pub sprite_size: f64,
    pub sprite_padding: f64,
    pub sprite_min_gap: f64,
    pub placement_attempts: u32,
    pub decoy_count: usize,

    // Camera. `min_zoom` is a floor; the camera never zooms out past the
    // point where the map stops covering the view.
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub header_height: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,

    /// One of "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            catalog_cycle_length: CATALOG_CYCLE_LENGTH,
            max_strikes: MAX_STRIKES,
            double_tap_window_ms: DOUBLE_TAP_WINDOW_MS,
            base_points: BASE_POINTS,
            max_time_multiplier: MAX_TIME_MULTIPLIER,
            coins_per_target: COINS_PER_TARGET,
            base_time_seconds: BASE_TIME_SECONDS,
            min_time_seconds: MIN_TIME_SECONDS,
            intro_countdown_ticks: INTRO_COUNTDOWN_TICKS,
            feedback_pause_ms: FEEDBACK_PAUSE_MS,
            map_width: 2048.0,
            map_height: 2048.0,
            sprite_size: 96.0,
            sprite_padding: 64.0,
            sprite_min_gap: 140.0,
            placement_attempts: 200,
            decoy_count: 6,
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            header_height: HEADER_HEIGHT,
            min_zoom: 0.5,
            max_zoom: 2.5,
            log_level: String::from("info"),
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: GameConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });
        if self.catalog_cycle_length == 0 {
            return invalid("catalogCycleLength", "must be at least 1");
        }
        if self.max_strikes == 0 {
            return invalid("maxStrikes", "must be at least 1");
        }
        if self.min_time_seconds == 0 {
            return invalid("minTimeSeconds", "must be at least 1");
        }
        if self.max_time_multiplier < 1.0 {
            return invalid("maxTimeMultiplier", "must be >= 1");
        }
        if self.double_tap_window_ms <= 0.0 {
            return invalid("doubleTapWindowMs", "must be positive");
        }
        if self.min_zoom <= 0.0 || self.max_zoom < self.min_zoom {
            return invalid("minZoom", "zoom range must be positive and ordered");
        }
        if self.map_width <= 2.0 * self.sprite_padding || self.map_height <= 2.0 * self.sprite_padding {
            return invalid("spritePadding", "padding leaves no room on the map");
        }
        Ok(())
    }

    /// Seconds allowed for a level with the given base level.
    pub fn time_limit_for(&self, base_level: u32) -> u32 {
        self.base_time_seconds
            .saturating_sub(base_level)
            .max(self.min_time_seconds)
    }

    pub fn log_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

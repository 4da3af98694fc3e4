//! A run: consecutive levels from level 1 until the first failed level.
//!
//! The run owns the active `LevelSession` plus its collaborators, all passed
//! in explicitly: the progress store, the host, and the 1 Hz ticker. Before a
//! finished session is dropped the ticker is stopped, so a late tick can never
//! reach a discarded session.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use serde::Serialize;

use crate::camera::Camera;
use crate::catalog::Catalog;
use crate::config::GameConfig;
use crate::error::ProgressError;
use crate::host::Host;
use crate::level::plan_level;
use crate::placement::LevelLayout;
use crate::progress::ProgressStore;
use crate::session::{AttemptOutcome, FailReason, LevelSession, Phase, RunCarry, TickOutcome};
use crate::tap::DoubleTap;

/// Once-per-second timer driving `Run::tick`.
pub trait Ticker {
    fn start(&mut self);
    fn stop(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    NotStarted,
    Playing,
    Over { score: u64, reason: FailReason },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetView {
    pub id: &'static str,
    pub name: &'static str,
    pub found: u32,
    pub required: u32,
}

/// Everything the HUD overlays show.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HudView {
    pub level: u32,
    pub score: u64,
    pub coins: u64,
    pub remaining_seconds: u32,
    pub time_fraction: f64,
    pub strikes: u32,
    pub max_strikes: u32,
    pub phase: &'static str,
    pub countdown: Option<u32>,
    pub targets: Vec<TargetView>,
}

pub struct Run<P: ProgressStore, H: Host, T: Ticker> {
    cfg: GameConfig,
    catalog: Catalog,
    store: P,
    host: H,
    ticker: T,
    rng: StdRng,
    level: u32,
    session: Option<LevelSession>,
    layout: LevelLayout,
    camera: Camera,
    taps: DoubleTap,
    status: RunStatus,
}

impl<P: ProgressStore, H: Host, T: Ticker> Run<P, H, T> {
    pub fn new(cfg: GameConfig, catalog: Catalog, store: P, host: H, ticker: T, rng: StdRng) -> Self {
        Self {
            camera: Camera::new(&cfg),
            taps: DoubleTap::new(cfg.double_tap_window_ms),
            cfg,
            catalog,
            store,
            host,
            ticker,
            rng,
            level: 1,
            session: None,
            layout: LevelLayout::default(),
            status: RunStatus::NotStarted,
        }
    }

    /// Startup: tell the host the game is ready, then start at level 1.
    pub fn boot(&mut self) {
        if let Err(e) = self.host.ready() {
            warn!("host ready() failed: {e}");
        }
        self.start();
    }

    /// Load the host's saved progress, before or during a run. A live
    /// session picks up the loaded coin balance.
    pub fn load_saved_state(&mut self, json: &str) -> Result<bool, ProgressError> {
        let loaded = self.store.load_saved_state(json)?;
        if loaded {
            let coins = self.store.coins();
            if let Some(session) = self.session.as_mut() {
                session.sync_coins(coins);
            }
        }
        Ok(loaded)
    }

    /// Begin a fresh run at level 1 with score 0 and the stored coin balance.
    pub fn start(&mut self) {
        self.start_at(1);
    }

    /// Begin a fresh run at an arbitrary level (debug / level select).
    pub fn start_at(&mut self, level: u32) {
        self.ticker.stop();
        self.session = None;
        self.level = level.max(1);
        let carry = RunCarry {
            score: 0,
            coins: self.store.coins(),
            ..RunCarry::default()
        };
        self.status = RunStatus::Playing;
        self.begin_level(carry);
    }

    /// Host "play again" request.
    pub fn play_again(&mut self) {
        info!("play again requested");
        self.start();
    }

    fn begin_level(&mut self, carry: RunCarry) {
        let plan = plan_level(self.level, &self.catalog, &self.cfg);
        info!(
            "level {} (base {}): {} target(s), {}s",
            plan.level,
            plan.base_level,
            plan.total_targets(),
            plan.time_limit_seconds
        );
        self.layout = LevelLayout::build(&mut self.rng, &plan, &self.catalog, &self.cfg);
        self.session = Some(LevelSession::new(plan, carry, &self.cfg));
        self.camera = Camera::new(&self.cfg);
        self.taps.reset();
        self.ticker.start();
    }

    // --- Events ------------------------------------------------------------

    pub fn tick(&mut self) -> TickOutcome {
        let Some(session) = self.session.as_mut() else {
            return TickOutcome::Ignored;
        };
        let out = session.tick();
        if out == TickOutcome::TimeExpired {
            self.fail(FailReason::TimeExpired);
        }
        out
    }

    /// Raw tap on sprite `index` at `now_ms` (host clock, milliseconds).
    pub fn tap(&mut self, index: usize, now_ms: f64) -> AttemptOutcome {
        let Some(session) = self.session.as_mut() else {
            return AttemptOutcome::Ignored;
        };
        let Some(sprite) = self.layout.get(index) else {
            return AttemptOutcome::Ignored;
        };
        if sprite.found || session.phase() != Phase::Active {
            return AttemptOutcome::Ignored;
        }
        let character_id = sprite.character_id;
        let confirmed = self.taps.tap(index, now_ms);
        let out = session.register_attempt(character_id, confirmed);
        debug!("tap on sprite {index} ({character_id}): {out:?}");

        match &out {
            AttemptOutcome::Progress { .. } => {
                self.layout.mark_found(index);
                self.haptic();
            }
            AttemptOutcome::LevelComplete { .. } => {
                self.layout.mark_found(index);
                self.haptic();
                self.complete_level();
            }
            AttemptOutcome::Strike { .. } => self.haptic(),
            AttemptOutcome::LevelFailed { .. } => {
                self.haptic();
                self.fail(FailReason::Strikes);
            }
            AttemptOutcome::Ignored | AttemptOutcome::AlreadyFound => {}
        }
        out
    }

    /// Close partial-progress feedback.
    pub fn resume(&mut self) -> bool {
        self.session.as_mut().is_some_and(LevelSession::resume)
    }

    fn complete_level(&mut self) {
        self.ticker.stop();
        let Some(session) = self.session.take() else {
            return;
        };
        if let Some(rewards) = session.rewards() {
            self.store.add_coins(rewards.coins);
            for (id, count) in &rewards.unlocks {
                self.store.unlock_character(id, *count);
            }
            info!("level {} rewards: {} coins", self.level, rewards.coins);
        }
        let mut carry = session.into_carry();
        carry.coins = self.store.coins();
        self.level += 1;
        self.begin_level(carry);
    }

    fn fail(&mut self, reason: FailReason) {
        self.ticker.stop();
        let Some(session) = self.session.take() else {
            return;
        };
        let score = session.score();
        self.status = RunStatus::Over { score, reason };
        info!("run over at level {} ({reason:?}), score {score}", self.level);
        if let Err(e) = self.host.game_over(score) {
            warn!("gameOver not delivered: {e}");
        }
    }

    fn haptic(&mut self) {
        if let Err(e) = self.host.haptic_feedback() {
            debug!("haptic feedback unavailable: {e}");
        }
    }

    // --- Views -------------------------------------------------------------

    pub fn status(&self) -> RunStatus {
        self.status
    }
    pub fn level(&self) -> u32 {
        self.level
    }
    pub fn session(&self) -> Option<&LevelSession> {
        self.session.as_ref()
    }
    pub fn layout(&self) -> &LevelLayout {
        &self.layout
    }
    pub fn camera(&self) -> &Camera {
        &self.camera
    }
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
    pub fn config(&self) -> &GameConfig {
        &self.cfg
    }
    pub fn store(&self) -> &P {
        &self.store
    }
    pub fn store_mut(&mut self) -> &mut P {
        &mut self.store
    }
    pub fn host(&self) -> &H {
        &self.host
    }
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    pub fn hud(&self) -> HudView {
        let coins = self.store.coins();
        let Some(s) = self.session.as_ref() else {
            let score = match self.status {
                RunStatus::Over { score, .. } => score,
                _ => 0,
            };
            return HudView {
                level: self.level,
                score,
                coins,
                remaining_seconds: 0,
                time_fraction: 0.0,
                strikes: 0,
                max_strikes: self.cfg.max_strikes,
                phase: if self.status == RunStatus::NotStarted { "idle" } else { "over" },
                countdown: None,
                targets: Vec::new(),
            };
        };
        let (phase, countdown) = match s.phase() {
            Phase::Intro { countdown } => ("intro", Some(countdown)),
            Phase::Active => ("active", None),
            Phase::Paused => ("paused", None),
            Phase::Complete => ("complete", None),
            Phase::Failed(_) => ("failed", None),
        };
        let targets = s
            .plan()
            .unique_targets()
            .into_iter()
            .map(|r| TargetView {
                id: r.id,
                name: r.name,
                found: s.progress_for(r.id),
                required: s.plan().required(r.id),
            })
            .collect();
        HudView {
            level: self.level,
            score: s.score(),
            coins,
            remaining_seconds: s.remaining_seconds(),
            time_fraction: s.time_fraction(),
            strikes: s.strikes(),
            max_strikes: self.cfg.max_strikes,
            phase,
            countdown,
            targets,
        }
    }
}

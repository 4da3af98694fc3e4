//! Find-session state machine for a single level attempt.
//!
//! ```text
//! Intro --(countdown ticks)--> Active <--> Paused
//!                                |
//!                                +--> Complete
//!                                +--> Failed(Strikes | TimeExpired)
//! ```
//!
//! The session only owns plain data. Timers, persistence and the host are
//! driven by `run::Run`, which feeds `tick()` once per second and routes
//! confirmed picks into `register_attempt()`.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};

use crate::config::GameConfig;
use crate::level::LevelPlan;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailReason {
    Strikes,
    TimeExpired,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Intro modal + scripted countdown, timer not running.
    Intro { countdown: u32 },
    Active,
    /// Feedback modal after a partial find; timer frozen.
    Paused,
    Complete,
    Failed(FailReason),
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Complete | Phase::Failed(_))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AttemptOutcome {
    /// Not double-confirmed, or the session is not accepting picks.
    Ignored,
    /// Correct pick, more targets remain. Session is now `Paused`.
    Progress {
        id: &'static str,
        points: u32,
        found: u32,
        required: u32,
    },
    /// Correct pick that met every requirement.
    LevelComplete { id: &'static str, points: u32 },
    /// Valid target whose requirement is already met. No penalty.
    AlreadyFound,
    Strike { strikes: u32 },
    LevelFailed { strikes: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Ignored,
    Countdown { remaining: u32 },
    /// Countdown finished, the level timer is now running.
    Started,
    Tick { remaining_seconds: u32 },
    TimeExpired,
}

/// State threaded from one level into the next within a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunCarry {
    pub score: u64,
    pub coins: u64,
    pub found_catalog_ids: BTreeSet<&'static str>,
}

/// What a completed level pays out; applied to the progress store by the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelRewards {
    pub coins: u64,
    /// (character id, required count) for every unique target.
    pub unlocks: Vec<(&'static str, u32)>,
}

#[derive(Clone, Copy, Debug)]
struct Rules {
    max_strikes: u32,
    base_points: u32,
    max_time_multiplier: f64,
    coins_per_target: u32,
}

pub struct LevelSession {
    plan: LevelPlan,
    rules: Rules,
    phase: Phase,
    score: u64,
    coins: u64,
    strikes: u32,
    remaining_seconds: u32,
    progress: BTreeMap<&'static str, u32>,
    found_instances: u32,
    found_catalog_ids: BTreeSet<&'static str>,
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

impl LevelSession {
    pub fn new(plan: LevelPlan, carry: RunCarry, cfg: &GameConfig) -> Self {
        let progress = plan.required_counts.keys().map(|id| (*id, 0)).collect();
        let phase = if cfg.intro_countdown_ticks == 0 {
            Phase::Active
        } else {
            Phase::Intro { countdown: cfg.intro_countdown_ticks }
        };
        Self {
            remaining_seconds: plan.time_limit_seconds,
            plan,
            rules: Rules {
                max_strikes: cfg.max_strikes.max(1),
                base_points: cfg.base_points,
                max_time_multiplier: cfg.max_time_multiplier,
                coins_per_target: cfg.coins_per_target,
            },
            phase,
            score: carry.score,
            coins: carry.coins,
            strikes: 0,
            progress,
            found_instances: 0,
            found_catalog_ids: carry.found_catalog_ids,
        }
    }

    // --- Accessors ---------------------------------------------------------

    pub fn plan(&self) -> &LevelPlan {
        &self.plan
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn score(&self) -> u64 {
        self.score
    }
    pub fn coins(&self) -> u64 {
        self.coins
    }
    /// Adopt the store's balance, e.g. after saved progress arrived late.
    pub fn sync_coins(&mut self, coins: u64) {
        self.coins = coins;
    }
    pub fn strikes(&self) -> u32 {
        self.strikes
    }
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }
    pub fn found_instances(&self) -> u32 {
        self.found_instances
    }
    pub fn found_catalog_ids(&self) -> &BTreeSet<&'static str> {
        &self.found_catalog_ids
    }
    pub fn progress_for(&self, id: &str) -> u32 {
        self.progress.get(id).copied().unwrap_or(0)
    }

    pub fn is_complete(&self) -> bool {
        self.progress.values().sum::<u32>() == self.plan.total_targets()
    }

    /// Fraction of the level's time still left, in `0..=1`.
    pub fn time_fraction(&self) -> f64 {
        if self.plan.time_limit_seconds == 0 {
            return 0.0;
        }
        (self.remaining_seconds as f64 / self.plan.time_limit_seconds as f64).clamp(0.0, 1.0)
    }

    /// Points for a find right now: base scaled from 1x (out of time) up to
    /// `max_time_multiplier` (instant find).
    pub fn points_now(&self) -> u32 {
        let mult = lerp(1.0, self.rules.max_time_multiplier, self.time_fraction());
        (self.rules.base_points as f64 * mult).round() as u32
    }

    // --- Events ------------------------------------------------------------

    pub fn tick(&mut self) -> TickOutcome {
        match self.phase {
            Phase::Intro { countdown } => {
                let left = countdown.saturating_sub(1);
                if left == 0 {
                    self.phase = Phase::Active;
                    debug!("level {} started ({}s)", self.plan.level, self.remaining_seconds);
                    TickOutcome::Started
                } else {
                    self.phase = Phase::Intro { countdown: left };
                    TickOutcome::Countdown { remaining: left }
                }
            }
            Phase::Active => {
                self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
                if self.remaining_seconds == 0 {
                    self.phase = Phase::Failed(FailReason::TimeExpired);
                    info!("level {} failed: time expired", self.plan.level);
                    TickOutcome::TimeExpired
                } else {
                    TickOutcome::Tick { remaining_seconds: self.remaining_seconds }
                }
            }
            Phase::Paused | Phase::Complete | Phase::Failed(_) => TickOutcome::Ignored,
        }
    }

    /// Apply a pick. Single taps (`is_double_confirmed == false`) never
    /// change state.
    pub fn register_attempt(&mut self, character_id: &str, is_double_confirmed: bool) -> AttemptOutcome {
        if !is_double_confirmed || self.phase != Phase::Active {
            return AttemptOutcome::Ignored;
        }

        let Some((&id, &required)) = self.plan.required_counts.get_key_value(character_id) else {
            self.strikes += 1;
            if self.strikes >= self.rules.max_strikes {
                self.phase = Phase::Failed(FailReason::Strikes);
                info!("level {} failed: {} strike(s)", self.plan.level, self.strikes);
                return AttemptOutcome::LevelFailed { strikes: self.strikes };
            }
            return AttemptOutcome::Strike { strikes: self.strikes };
        };

        let found = self.progress.entry(id).or_insert(0);
        if *found >= required {
            return AttemptOutcome::AlreadyFound;
        }
        *found += 1;
        let found = *found;

        let points = self.points_now();
        self.score += points as u64;
        self.found_instances += 1;
        self.found_catalog_ids.insert(id);

        if self.is_complete() {
            self.phase = Phase::Complete;
            info!("level {} complete, score {}", self.plan.level, self.score);
            AttemptOutcome::LevelComplete { id, points }
        } else {
            self.phase = Phase::Paused;
            AttemptOutcome::Progress { id, points, found, required }
        }
    }

    /// Close the partial-progress feedback and keep playing.
    pub fn resume(&mut self) -> bool {
        if self.phase == Phase::Paused {
            self.phase = Phase::Active;
            true
        } else {
            false
        }
    }

    /// Rewards for a completed level, `None` before completion.
    pub fn rewards(&self) -> Option<LevelRewards> {
        if self.phase != Phase::Complete {
            return None;
        }
        let unlocks = self
            .plan
            .unique_targets()
            .into_iter()
            .map(|r| (r.id, self.plan.required(r.id)))
            .collect();
        Some(LevelRewards {
            coins: self.rules.coins_per_target as u64 * self.plan.total_targets() as u64,
            unlocks,
        })
    }

    /// Consume the session, keeping what crosses level boundaries.
    pub fn into_carry(self) -> RunCarry {
        RunCarry {
            score: self.score,
            coins: self.coins,
            found_catalog_ids: self.found_catalog_ids,
        }
    }
}

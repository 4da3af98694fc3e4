//! Level target selection.
//!
//! Levels cycle through the catalog: level `n` maps to base level
//! `((n - 1) mod cycle) + 1`, and every completed cycle adds one more target
//! instance, drawn from the base level's pool with wraparound so the same
//! character can be required several times.

use std::collections::BTreeMap;

use log::debug;

use crate::catalog::{Catalog, CharacterRecord};
use crate::config::GameConfig;

#[derive(Clone, Debug, PartialEq)]
pub struct LevelPlan {
    pub level: u32,
    pub base_level: u32,
    pub target_instances: Vec<CharacterRecord>,
    /// Character id -> how many instances must be found.
    pub required_counts: BTreeMap<&'static str, u32>,
    pub time_limit_seconds: u32,
}

impl LevelPlan {
    pub fn total_targets(&self) -> u32 {
        self.required_counts.values().sum()
    }

    pub fn is_target(&self, id: &str) -> bool {
        self.required_counts.contains_key(id)
    }

    pub fn required(&self, id: &str) -> u32 {
        self.required_counts.get(id).copied().unwrap_or(0)
    }

    /// Unique target characters in first-appearance order.
    pub fn unique_targets(&self) -> Vec<&CharacterRecord> {
        let mut out: Vec<&CharacterRecord> = Vec::new();
        for r in &self.target_instances {
            if !out.iter().any(|o| o.id == r.id) {
                out.push(r);
            }
        }
        out
    }
}

pub fn base_level(level: u32, cycle_length: u32) -> u32 {
    let cycle = cycle_length.max(1);
    (level.max(1) - 1) % cycle + 1
}

pub fn instance_count(level: u32, cycle_length: u32, catalog_size: usize) -> u32 {
    let cycle = cycle_length.max(1);
    let wanted = (level.max(1) - 1) / cycle + 1;
    wanted.min(catalog_size as u32)
}

/// Compute the plan for `level` (levels below 1 are treated as 1).
///
/// A base level with no tagged characters falls back to the whole catalog
/// instead of failing.
pub fn plan_level(level: u32, catalog: &Catalog, cfg: &GameConfig) -> LevelPlan {
    let level = level.max(1);
    let base = base_level(level, cfg.catalog_cycle_length);

    let mut pool: Vec<&CharacterRecord> = catalog.by_level(base).collect();
    if pool.is_empty() {
        debug!("no characters tagged for base level {base}; using full catalog");
        pool = catalog.records().iter().collect();
    }

    let count = instance_count(level, cfg.catalog_cycle_length, catalog.len());
    let target_instances: Vec<CharacterRecord> =
        (0..count as usize).map(|i| *pool[i % pool.len()]).collect();

    let mut required_counts = BTreeMap::new();
    for r in &target_instances {
        *required_counts.entry(r.id).or_insert(0) += 1;
    }

    LevelPlan {
        level,
        base_level: base,
        target_instances,
        required_counts,
        time_limit_seconds: cfg.time_limit_for(base),
    }
}

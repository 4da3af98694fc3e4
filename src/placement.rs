//! Scatter character sprites across the map.
//!
//! Candidates are drawn uniformly inside the padded map and rejected when
//! they land closer than `min_gap` to an already placed sprite. After
//! `max_attempts` rejections for one sprite the last candidate is kept
//! anyway, so placement always terminates even on a crowded map.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::catalog::{Catalog, CharacterRecord};
use crate::config::GameConfig;
use crate::level::LevelPlan;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ScatterArea {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

pub fn scatter<R: Rng + ?Sized>(
    rng: &mut R,
    area: ScatterArea,
    count: usize,
    min_gap: f64,
    max_attempts: u32,
) -> Vec<Point> {
    let (lo_x, hi_x) = span(area.padding, area.width - area.padding);
    let (lo_y, hi_y) = span(area.padding, area.height - area.padding);
    let mut placed: Vec<Point> = Vec::with_capacity(count);
    for _ in 0..count {
        let mut candidate = Point { x: lo_x, y: lo_y };
        for _ in 0..max_attempts.max(1) {
            candidate = Point {
                x: rng.gen_range(lo_x..=hi_x),
                y: rng.gen_range(lo_y..=hi_y),
            };
            if placed.iter().all(|p| p.distance(candidate) >= min_gap) {
                break;
            }
        }
        placed.push(candidate);
    }
    placed
}

// Padding larger than half the map collapses the range to its midpoint.
fn span(lo: f64, hi: f64) -> (f64, f64) {
    if hi >= lo { (lo, hi) } else { ((lo + hi) / 2.0, (lo + hi) / 2.0) }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprite {
    pub character_id: &'static str,
    pub asset: &'static str,
    pub position: Point,
    pub is_target: bool,
    pub found: bool,
}

/// Every sprite on the current level's map. Indices are stable for the
/// lifetime of the level and are what the input layer reports on tap.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LevelLayout {
    pub sprites: Vec<Sprite>,
}

impl LevelLayout {
    /// Place every target instance plus up to `decoy_count` characters that
    /// are not targets this level.
    pub fn build<R: Rng + ?Sized>(rng: &mut R, plan: &LevelPlan, catalog: &Catalog, cfg: &GameConfig) -> Self {
        let mut decoys: Vec<&CharacterRecord> =
            catalog.records().iter().filter(|r| !plan.is_target(r.id)).collect();
        decoys.shuffle(rng);
        decoys.truncate(cfg.decoy_count);

        let mut chars: Vec<(&CharacterRecord, bool)> = plan
            .target_instances
            .iter()
            .map(|r| (r, true))
            .chain(decoys.into_iter().map(|r| (r, false)))
            .collect();
        chars.shuffle(rng);

        let area = ScatterArea {
            width: cfg.map_width,
            height: cfg.map_height,
            padding: cfg.sprite_padding,
        };
        let points = scatter(rng, area, chars.len(), cfg.sprite_min_gap, cfg.placement_attempts);

        let sprites = chars
            .into_iter()
            .zip(points)
            .map(|((r, is_target), position)| Sprite {
                character_id: r.id,
                asset: r.map_asset,
                position,
                is_target,
                found: false,
            })
            .collect();
        Self { sprites }
    }

    pub fn get(&self, index: usize) -> Option<&Sprite> {
        self.sprites.get(index)
    }

    pub fn mark_found(&mut self, index: usize) {
        if let Some(s) = self.sprites.get_mut(index) {
            s.found = true;
        }
    }

    pub fn targets_remaining(&self) -> usize {
        self.sprites.iter().filter(|s| s.is_target && !s.found).count()
    }
}

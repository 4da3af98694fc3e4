//! Album screen model: every catalog character as a card, locked or not.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::progress::ProgressStore;

pub const LOCKED_PLACEHOLDER: &str = "You haven't unlocked this yet";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub level: u32,
    pub card_asset: &'static str,
    pub unlocked: bool,
    /// Best "found together" count; 0 while locked.
    pub badge_level: u32,
    pub description: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AlbumSummary {
    pub unlocked: usize,
    pub total: usize,
}

/// Cards ordered by level (catalog order within a level).
pub fn album_entries<P: ProgressStore + ?Sized>(catalog: &Catalog, store: &P) -> Vec<AlbumEntry> {
    let mut entries: Vec<AlbumEntry> = catalog
        .records()
        .iter()
        .map(|r| {
            let progress = store.character_progress(r.id);
            AlbumEntry {
                id: r.id,
                name: r.name,
                level: r.level,
                card_asset: r.card_asset,
                unlocked: progress.unlocked,
                badge_level: if progress.unlocked { progress.max_level.max(1) } else { 0 },
                description: if progress.unlocked { r.description } else { LOCKED_PLACEHOLDER },
            }
        })
        .collect();
    entries.sort_by_key(|e| e.level);
    entries
}

pub fn album_summary(entries: &[AlbumEntry]) -> AlbumSummary {
    AlbumSummary {
        unlocked: entries.iter().filter(|e| e.unlocked).count(),
        total: entries.len(),
    }
}

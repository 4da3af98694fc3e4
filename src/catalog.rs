//! Character catalog: the static list of hideable characters.
//!
//! Records are immutable and loaded once at startup. `Catalog::new` rejects
//! configuration mistakes (empty list, duplicate ids, level 0, blank asset
//! paths) before any level is played.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::CatalogError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRecord {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Base level at which this character is the one to find.
    pub level: u32,
    pub map_asset: &'static str,
    pub card_asset: &'static str,
}

// -----------------------------------------------------------------------------
// Shipped characters, one per base level 1..=13.
// -----------------------------------------------------------------------------

macro_rules! character {
    ($id:literal, $name:literal, $level:literal, $desc:literal) => {
        CharacterRecord {
            id: $id,
            name: $name,
            description: $desc,
            level: $level,
            map_asset: concat!("assets/characters/", $id, "-map.png"),
            card_asset: concat!("assets/characters/", $id, "-card.png"),
        }
    };
}

pub const CHARACTERS: &[CharacterRecord] = &[
    character!("graceful-goldfish", "Graceful Goldfish", 1,
        "A beautiful and elegant goldfish that moves with grace and poise."),
    character!("patient-panda", "Patient Panda", 2,
        "Never rushes a thing. Waits for the bamboo to come to it."),
    character!("brave-bison", "Brave Bison", 3,
        "Charges head first into every challenge on the plains."),
    character!("kind-koala", "Kind Koala", 4,
        "Shares its eucalyptus with anyone who climbs up to say hello."),
    character!("witty-walrus", "Witty Walrus", 5,
        "Has a pun ready for every occasion, especially the cold ones."),
    character!("humble-hedgehog", "Humble Hedgehog", 6,
        "Small, spiky and always the last to take credit."),
    character!("eager-eagle", "Eager Eagle", 7,
        "First one up every morning, circling before the sun."),
    character!("loyal-llama", "Loyal Llama", 8,
        "Sticks with the herd through every mountain pass."),
    character!("calm-chameleon", "Calm Chameleon", 9,
        "Blends into any crowd without ever losing its cool."),
    character!("optimistic-otter", "Optimistic Otter", 10,
        "Floats on its back and sees the bright side of every river."),
    character!("resilient-rhino", "Resilient Rhino", 11,
        "Knocked down often, back on its feet every time."),
    character!("generous-giraffe", "Generous Giraffe", 12,
        "Reaches the highest leaves and passes them down."),
    character!("fearless-fox", "Fearless Fox", 13,
        "Slips through the shadows where others would not dare."),
];

/// Validated, ordered character list. Never empty.
#[derive(Clone, Debug)]
pub struct Catalog {
    records: Vec<CharacterRecord>,
}

impl Catalog {
    pub fn new(records: Vec<CharacterRecord>) -> Result<Self, CatalogError> {
        if records.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for r in &records {
            if !seen.insert(r.id) {
                return Err(CatalogError::DuplicateId(r.id.to_string()));
            }
            if r.level == 0 {
                return Err(CatalogError::InvalidLevel { id: r.id.to_string(), level: r.level });
            }
            if r.map_asset.is_empty() {
                return Err(CatalogError::MissingAsset { owner: r.id.to_string(), kind: "map sprite" });
            }
            if r.card_asset.is_empty() {
                return Err(CatalogError::MissingAsset { owner: r.id.to_string(), kind: "card" });
            }
        }
        Ok(Self { records })
    }

    /// The catalog shipped with the game.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(CHARACTERS.to_vec())
    }

    pub fn records(&self) -> &[CharacterRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn by_id(&self, id: &str) -> Option<&CharacterRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn by_level(&self, level: u32) -> impl Iterator<Item = &CharacterRecord> + '_ {
        self.records.iter().filter(move |r| r.level == level)
    }

    /// Highest level any character is assigned to.
    pub fn total_levels(&self) -> u32 {
        self.records.iter().map(|r| r.level).max().unwrap_or(0)
    }
}

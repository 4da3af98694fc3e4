//! Typed asset keys, resolved once against the catalog at load time.
//!
//! A missing map background, sprite, card or sound is reported as a
//! `CatalogError` before the first level starts instead of surfacing as a
//! blank texture mid-game.

use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::error::CatalogError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Countdown,
    Found,
    Wrong,
    LevelComplete,
    GameOver,
    MenuMusic,
}

impl SoundCue {
    pub const ALL: [SoundCue; 6] = [
        SoundCue::Countdown,
        SoundCue::Found,
        SoundCue::Wrong,
        SoundCue::LevelComplete,
        SoundCue::GameOver,
        SoundCue::MenuMusic,
    ];

    fn path(self) -> &'static str {
        match self {
            SoundCue::Countdown => "assets/audio/countdown.mp3",
            SoundCue::Found => "assets/audio/found.mp3",
            SoundCue::Wrong => "assets/audio/wrong.mp3",
            SoundCue::LevelComplete => "assets/audio/level-complete.mp3",
            SoundCue::GameOver => "assets/audio/game-over.mp3",
            SoundCue::MenuMusic => "assets/audio/bgm-menu.mp3",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AssetKey {
    /// Background map for a base level (1..=cycle).
    LevelMap(u32),
    CharacterSprite(&'static str),
    CharacterCard(&'static str),
    Sound(SoundCue),
}

#[derive(Debug, Clone)]
pub struct AssetRegistry {
    paths: HashMap<AssetKey, String>,
}

impl AssetRegistry {
    /// Build the registry for every base level in the cycle and every
    /// catalog character.
    pub fn resolve(catalog: &Catalog, cycle_length: u32) -> Result<Self, CatalogError> {
        let mut paths = HashMap::new();
        for base in 1..=cycle_length {
            paths.insert(AssetKey::LevelMap(base), format!("assets/maps/level-{base}.png"));
        }
        for r in catalog.records() {
            paths.insert(AssetKey::CharacterSprite(r.id), r.map_asset.to_string());
            paths.insert(AssetKey::CharacterCard(r.id), r.card_asset.to_string());
        }
        for cue in SoundCue::ALL {
            paths.insert(AssetKey::Sound(cue), cue.path().to_string());
        }
        let registry = Self { paths };
        registry.check(catalog, cycle_length)?;
        Ok(registry)
    }

    fn check(&self, catalog: &Catalog, cycle_length: u32) -> Result<(), CatalogError> {
        let missing = |owner: String, kind| CatalogError::MissingAsset { owner, kind };
        for base in 1..=cycle_length {
            if self.get(&AssetKey::LevelMap(base)).is_none() {
                return Err(missing(format!("level {base}"), "map background"));
            }
        }
        for r in catalog.records() {
            if self.get(&AssetKey::CharacterSprite(r.id)).is_none() {
                return Err(missing(r.id.to_string(), "map sprite"));
            }
            if self.get(&AssetKey::CharacterCard(r.id)).is_none() {
                return Err(missing(r.id.to_string(), "card"));
            }
        }
        Ok(())
    }

    /// Path for a key, `None` if the key was never registered or is blank.
    pub fn get(&self, key: &AssetKey) -> Option<&str> {
        self.paths.get(key).map(String::as_str).filter(|p| !p.is_empty())
    }

    pub fn level_map(&self, base_level: u32) -> Option<&str> {
        self.get(&AssetKey::LevelMap(base_level))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_every_builtin_asset() {
        let cat = Catalog::builtin().unwrap();
        let reg = AssetRegistry::resolve(&cat, 13).unwrap();
        // 13 maps + 2 per character + sound cues
        assert_eq!(reg.len(), 13 + 13 * 2 + SoundCue::ALL.len());
        assert_eq!(reg.level_map(4), Some("assets/maps/level-4.png"));
        assert_eq!(
            reg.get(&AssetKey::CharacterCard("kind-koala")),
            Some("assets/characters/kind-koala-card.png")
        );
        assert!(reg.get(&AssetKey::Sound(SoundCue::Found)).is_some());
    }

    #[test]
    fn unknown_keys_resolve_to_none() {
        let cat = Catalog::builtin().unwrap();
        let reg = AssetRegistry::resolve(&cat, 13).unwrap();
        assert!(reg.level_map(14).is_none());
        assert!(reg.get(&AssetKey::CharacterSprite("nobody")).is_none());
    }
}

//! Persistent player progress: coins and per-character unlocks.
//!
//! Note: the current level is never saved; every run starts at level 1.
//! Character records only move forward (unlocked stays unlocked, `max_level`
//! only grows). Every change is pushed to a `SaveSink`; save failures are
//! logged and the game keeps going with the in-memory state.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{HostError, ProgressError};
use crate::host::SaveSink;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterProgressRecord {
    pub id: String,
    pub unlocked: bool,
    /// Highest number of instances of this character found in one level.
    #[serde(default)]
    pub max_level: u32,
}

impl CharacterProgressRecord {
    fn locked(id: &str) -> Self {
        Self { id: id.to_string(), unlocked: false, max_level: 0 }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SavedGameState {
    pub coins: u64,
    pub characters: Vec<CharacterProgressRecord>,
}

/// Host initial-state wrapper: `{ "gameState": { ... } }`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SavedEnvelope {
    game_state: Option<SavedGameState>,
}

/// Parse the host's saved-state envelope. `Ok(None)` when the host had
/// nothing saved.
pub fn parse_saved_state(json: &str) -> Result<Option<SavedGameState>, ProgressError> {
    let trimmed = json.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let envelope: SavedEnvelope = serde_json::from_str(trimmed)?;
    Ok(envelope.game_state)
}

/// Read/write view of player progress used by the level and album screens.
pub trait ProgressStore {
    fn coins(&self) -> u64;
    fn add_coins(&mut self, amount: u64);
    /// Deduct `amount` if affordable; returns whether it was spent.
    fn spend_coins(&mut self, amount: u64) -> bool;
    /// Unlock `id` and raise its `max_level` to at least `level`.
    fn unlock_character(&mut self, id: &str, level: u32);
    /// Progress for `id`; a locked record with level 0 if never seen.
    fn character_progress(&self, id: &str) -> CharacterProgressRecord;
    fn unlocked_characters(&self) -> Vec<CharacterProgressRecord>;
    /// Replace progress with the host's saved-state JSON. Returns `Ok(false)`
    /// when the host had nothing saved (progress is left as it is).
    fn load_saved_state(&mut self, json: &str) -> Result<bool, ProgressError>;

    fn is_unlocked(&self, id: &str) -> bool {
        self.character_progress(id).unlocked
    }
}

pub struct ProgressBook<S: SaveSink> {
    state: SavedGameState,
    sink: S,
}

impl<S: SaveSink> ProgressBook<S> {
    pub fn new(sink: S) -> Self {
        Self::with_state(SavedGameState::default(), sink)
    }

    pub fn with_state(state: SavedGameState, sink: S) -> Self {
        Self { state, sink }
    }

    pub fn snapshot(&self) -> SavedGameState {
        self.state.clone()
    }

    pub fn reset_progress(&mut self) {
        self.state = SavedGameState::default();
        self.save();
        info!("game state reset");
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn save(&mut self) {
        match self.sink.save_game_state(&self.state) {
            Ok(()) => debug!("game state saved ({} coins)", self.state.coins),
            Err(e) => warn!("could not save game state: {e}"),
        }
    }
}

impl<S: SaveSink> ProgressStore for ProgressBook<S> {
    fn coins(&self) -> u64 {
        self.state.coins
    }

    fn add_coins(&mut self, amount: u64) {
        if amount == 0 {
            return;
        }
        self.state.coins = self.state.coins.saturating_add(amount);
        self.save();
    }

    fn spend_coins(&mut self, amount: u64) -> bool {
        if self.state.coins < amount {
            return false;
        }
        self.state.coins -= amount;
        self.save();
        true
    }

    fn unlock_character(&mut self, id: &str, level: u32) {
        match self.state.characters.iter_mut().find(|c| c.id == id) {
            Some(current) => {
                if current.unlocked && level <= current.max_level {
                    return;
                }
                current.unlocked = true;
                current.max_level = current.max_level.max(level);
                info!("character {id} updated to level {}", current.max_level);
            }
            None => {
                self.state.characters.push(CharacterProgressRecord {
                    id: id.to_string(),
                    unlocked: true,
                    max_level: level,
                });
                info!("character {id} unlocked at level {level}");
            }
        }
        self.save();
    }

    fn character_progress(&self, id: &str) -> CharacterProgressRecord {
        self.state
            .characters
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .unwrap_or_else(|| CharacterProgressRecord::locked(id))
    }

    fn unlocked_characters(&self) -> Vec<CharacterProgressRecord> {
        self.state.characters.iter().filter(|c| c.unlocked).cloned().collect()
    }

    fn load_saved_state(&mut self, json: &str) -> Result<bool, ProgressError> {
        match parse_saved_state(json)? {
            Some(state) => {
                info!(
                    "game state loaded: {} coins, {} character record(s)",
                    state.coins,
                    state.characters.len()
                );
                self.state = state;
                Ok(true)
            }
            None => {
                info!("no previous game state, starting fresh");
                Ok(false)
            }
        }
    }
}

/// In-memory sink that records every save. Handy for native embedding and
/// tests; set `fail` to simulate an unavailable host.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub saves: Vec<SavedGameState>,
    pub fail: bool,
}

impl SaveSink for MemorySink {
    fn save_game_state(&mut self, state: &SavedGameState) -> Result<(), HostError> {
        if self.fail {
            return Err(HostError::Call {
                action: "saveGameState",
                message: "host unavailable".into(),
            });
        }
        self.saves.push(state.clone());
        Ok(())
    }
}

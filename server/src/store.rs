use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use aimtrainer_shared::protocol::{GameMode, LeaderboardEntry};

/// A stored leaderboard entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub id: String,
    pub name: String,
    pub tag: String,
    pub score: u32,
    pub accuracy: f64,
    pub hits: u32,
    pub misses: u32,
    pub ts: u64,
}

impl ScoreRecord {
    pub fn into_entry(self, rank: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            rank,
            id: self.id,
            name: self.name,
            tag: self.tag,
            score: self.score,
            accuracy: self.accuracy,
            hits: self.hits,
            misses: self.misses,
            ts: self.ts,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store lock poisoned")]
    Poisoned,
}

/// Per-mode score-ordered sets.
pub trait LeaderboardStore: Send + Sync {
    /// Insert, then drop everything below the mode's top `max` entries.
    fn insert(&self, mode: GameMode, record: ScoreRecord, max: usize) -> Result<(), StoreError>;

    /// Highest scores first; equal scores newest first.
    fn top(&self, mode: GameMode, limit: usize) -> Result<Vec<ScoreRecord>, StoreError>;
}

type ModeSet = BTreeMap<(u32, String), ScoreRecord>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    modes: Mutex<HashMap<GameMode, ModeSet>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LeaderboardStore for MemoryStore {
    fn insert(&self, mode: GameMode, record: ScoreRecord, max: usize) -> Result<(), StoreError> {
        let mut modes = self.modes.lock().map_err(|_| StoreError::Poisoned)?;
        let set = modes.entry(mode).or_default();
        set.insert((record.score, record.id.clone()), record);
        while set.len() > max {
            set.pop_first();
        }
        Ok(())
    }

    fn top(&self, mode: GameMode, limit: usize) -> Result<Vec<ScoreRecord>, StoreError> {
        let modes = self.modes.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(modes
            .get(&mode)
            .map(|set| set.values().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

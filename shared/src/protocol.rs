use rand::Rng;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::Mode;

/// Highest score the leaderboard accepts.
pub const MAX_SCORE: f64 = 999_999.0;
/// Stored name length (chars).
pub const NAME_MAX_CHARS: usize = 20;
/// Stored tag length (chars).
pub const TAG_MAX_CHARS: usize = 30;
/// Name length accepted by the name prompt.
pub const NAME_INPUT_MAX_CHARS: usize = 16;
pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 100;
/// Entries kept per mode after each insert.
pub const MAX_ENTRIES_PER_MODE: usize = 200;

// === Engine -> Presentation ===

/// Live HUD numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/shared/generated/")]
#[serde(rename_all = "camelCase")]
pub struct StatsUpdate {
    pub score: u32,
    pub hits: u32,
    pub misses: u32,
    /// Milliseconds, never negative
    #[ts(type = "number")]
    pub time_left: u64,
}

/// Final result of a naturally-ended session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/shared/generated/")]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub score: u32,
    pub hits: u32,
    pub misses: u32,
    /// Configured duration in milliseconds
    #[ts(type = "number")]
    pub total_time: u64,
    /// 0-100
    pub accuracy: f64,
}

/// Percentage of attempts that hit, 0 when there were none.
pub fn accuracy(hits: u32, misses: u32) -> f64 {
    let attempts = hits + misses;
    if attempts == 0 {
        return 0.0;
    }
    f64::from(hits) / f64::from(attempts) * 100.0
}

/// Round to one decimal place (leaderboard accuracy).
#[inline]
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

// === Leaderboard ===

/// Leaderboard categories. The four planar modes plus the first-person mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/shared/generated/")]
pub enum GameMode {
    #[serde(rename = "GRIDSHOT")]
    Gridshot,
    #[serde(rename = "SPIDERSHOT")]
    Spidershot,
    #[serde(rename = "MICROFLICK")]
    Microflick,
    #[serde(rename = "TRACKING")]
    Tracking,
    #[serde(rename = "FPS3D")]
    Fps3d,
}

impl GameMode {
    pub const ALL: [GameMode; 5] = [
        GameMode::Gridshot,
        GameMode::Spidershot,
        GameMode::Microflick,
        GameMode::Tracking,
        GameMode::Fps3d,
    ];

    /// Exact wire name; no case folding.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gridshot => "GRIDSHOT",
            Self::Spidershot => "SPIDERSHOT",
            Self::Microflick => "MICROFLICK",
            Self::Tracking => "TRACKING",
            Self::Fps3d => "FPS3D",
        }
    }
}

impl From<Mode> for GameMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Gridshot => Self::Gridshot,
            Mode::Spidershot => Self::Spidershot,
            Mode::Microflick => Self::Microflick,
            Mode::Tracking => Self::Tracking,
        }
    }
}

/// `POST /api/leaderboard` body as the game sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/shared/generated/")]
pub struct SubmitScore {
    pub mode: GameMode,
    pub name: String,
    pub tag: String,
    pub score: f64,
    pub accuracy: f64,
    pub hits: u32,
    pub misses: u32,
}

impl SubmitScore {
    pub fn from_stats(mode: GameMode, identity: &PlayerIdentity, stats: &GameStats) -> Self {
        Self {
            mode,
            name: identity.name.clone(),
            tag: identity.tag.clone(),
            score: f64::from(stats.score),
            accuracy: stats.accuracy,
            hits: stats.hits,
            misses: stats.misses,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/shared/generated/")]
pub struct SubmitResponse {
    pub ok: bool,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/shared/generated/")]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/shared/generated/")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub id: String,
    pub name: String,
    pub tag: String,
    pub score: u32,
    pub accuracy: f64,
    pub hits: u32,
    pub misses: u32,
    /// Unix milliseconds
    #[ts(type = "number")]
    pub ts: u64,
}

// === Identity ===

/// Display name plus a `name#NNNN` tag that disambiguates equal names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/shared/generated/")]
pub struct PlayerIdentity {
    pub name: String,
    pub tag: String,
}

impl PlayerIdentity {
    /// Returns None for a blank name. Names are trimmed and cut to the
    /// prompt's maximum length.
    pub fn generate(name: &str, rng: &mut impl Rng) -> Option<Self> {
        let name: String = name.trim().chars().take(NAME_INPUT_MAX_CHARS).collect();
        if name.is_empty() {
            return None;
        }
        let suffix: u32 = rng.gen_range(1000..=9999);
        let tag = format!("{}#{}", name, suffix);
        Some(Self { name, tag })
    }
}

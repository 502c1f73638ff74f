use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Session lengths offered by the settings screen (seconds).
pub const DURATION_OPTIONS: [u32; 4] = [15, 30, 60, 120];

/// Default mouse sensitivity for the first-person mode (radians per pixel).
pub const DEFAULT_SENSITIVITY: f64 = 0.0015;

/// Target-acquisition rules. The first-person mode runs the same four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/shared/generated/")]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    Gridshot,
    Spidershot,
    Microflick,
    Tracking,
}

impl Mode {
    pub const ALL: [Mode; 4] = [
        Mode::Gridshot,
        Mode::Spidershot,
        Mode::Microflick,
        Mode::Tracking,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gridshot" => Some(Self::Gridshot),
            "spidershot" => Some(Self::Spidershot),
            "microflick" => Some(Self::Microflick),
            "tracking" => Some(Self::Tracking),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/shared/generated/")]
#[serde(rename_all = "lowercase")]
pub enum TargetSize {
    Small,
    Medium,
    Large,
}

impl TargetSize {
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Small => 0.6,
            Self::Medium => 1.0,
            Self::Large => 1.4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/shared/generated/")]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    Slow,
    Normal,
    Fast,
}

impl Speed {
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Slow => 0.6,
            Self::Normal => 1.0,
            Self::Fast => 1.5,
        }
    }
}

/// First-person scene layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/shared/generated/")]
#[serde(rename_all = "lowercase")]
pub enum MapId {
    Arena,
    Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/shared/generated/")]
#[serde(rename_all = "camelCase")]
pub struct FpsSettings {
    pub map: MapId,
    /// Radians of camera rotation per pixel of locked pointer motion
    pub sensitivity: f64,
}

impl Default for FpsSettings {
    fn default() -> Self {
        Self {
            map: MapId::Arena,
            sensitivity: DEFAULT_SENSITIVITY,
        }
    }
}

/// Per-session settings handed to an engine at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/shared/generated/")]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub duration_secs: u32,
    pub target_size: TargetSize,
    pub speed: Speed,
    #[serde(default)]
    pub fps: FpsSettings,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            duration_secs: 60,
            target_size: TargetSize::Medium,
            speed: Speed::Normal,
            fps: FpsSettings::default(),
        }
    }
}

impl GameSettings {
    pub fn with_duration(duration_secs: u32) -> Self {
        Self {
            duration_secs,
            ..Self::default()
        }
    }

    pub fn duration_ms(&self) -> u64 {
        u64::from(self.duration_secs) * 1000
    }

    pub fn size_multiplier(&self) -> f64 {
        self.target_size.multiplier()
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.speed.multiplier()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.duration_secs == 0 {
            return Err("duration_secs must be > 0".to_string());
        }
        if !self.fps.sensitivity.is_finite() || self.fps.sensitivity <= 0.0 {
            return Err("fps.sensitivity must be finite and > 0".to_string());
        }
        Ok(())
    }
}

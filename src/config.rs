//! Game-wide limits and presentation settings.
//!
//! Loaded from an optional JSON file. Every field has a default, so a
//! partial file (or no file at all) is valid.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::alignment::Alignment;
use crate::error::ConfigError;
use crate::negotiation::selection::ExhaustionPolicy;

/// Lowest and highest accepted difficulty level.
pub const DIFFICULTY_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Closed range for session rapport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RapportBounds {
    pub min: i32,
    pub max: i32,
}

impl Default for RapportBounds {
    fn default() -> Self {
        Self { min: -3, max: 3 }
    }
}

impl RapportBounds {
    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min >= self.max {
            return Err(ConfigError::InvertedBounds { field: "rapport", min: self.min, max: self.max });
        }
        Ok(())
    }
}

/// Accepted range for a demon's `tolerance` threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceBounds {
    pub min: i32,
    pub max: i32,
}

impl Default for ToleranceBounds {
    fn default() -> Self {
        Self { min: 1, max: 5 }
    }
}

impl ToleranceBounds {
    pub fn contains(&self, tolerance: i32) -> bool {
        (self.min..=self.max).contains(&tolerance)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min >= self.max {
            return Err(ConfigError::InvertedBounds { field: "tolerance", min: self.min, max: self.max });
        }
        Ok(())
    }
}

/// Console presentation settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Pause between rounds in milliseconds (cosmetic pacing only).
    pub round_delay_ms: u64,
    /// Emit ANSI colors.
    pub color: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { round_delay_ms: 0, color: true }
    }
}

/// What the player carries into the first negotiation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub starting_gold: u32,
    /// Item name -> count. Names are canonicalized on use.
    pub starting_items: BTreeMap<String, u32>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self { starting_gold: 10, starting_items: BTreeMap::from([("bead".to_string(), 1)]) }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rapport: RapportBounds,
    pub tolerance: ToleranceBounds,
    /// Fixed RNG seed; a random one is drawn when absent.
    pub rng_seed: Option<u64>,
    pub ui: UiConfig,
    /// What the default question selector does once every question was asked.
    pub question_exhaustion: ExhaustionPolicy,
    pub player: PlayerConfig,
}

impl GameConfig {
    /// Parse and validate a JSON config string.
    pub fn from_json(json: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json).map_err(|e| ConfigError::Malformed {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file is missing.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_json(&contents, path)?;
        info!(
            "config loaded: rapport {}..{}, tolerance {}..{}, delay {}ms",
            config.rapport.min,
            config.rapport.max,
            config.tolerance.min,
            config.tolerance.max,
            config.ui.round_delay_ms,
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rapport.validate()?;
        self.tolerance.validate()
    }
}

/// Reject difficulty levels outside [`DIFFICULTY_RANGE`].
pub fn validate_difficulty(level: u8) -> Result<u8, ConfigError> {
    if DIFFICULTY_RANGE.contains(&level) {
        Ok(level)
    } else {
        Err(ConfigError::DifficultyOutOfRange(level))
    }
}

/// The player's core alignment from raw input. Out-of-range axes are an error.
pub fn core_alignment(law_chaos: i32, light_dark: i32) -> Result<Alignment, ConfigError> {
    Alignment::checked(law_chaos, light_dark).ok_or(ConfigError::AlignmentOutOfRange {
        owner: "player core".to_string(),
        law_chaos,
        light_dark,
    })
}

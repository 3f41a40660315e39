//! Demon catalog entries loaded from JSON.

use serde::{Deserialize, Serialize};

use crate::alignment::Alignment;
use crate::error::{ConfigError, DataError};
use crate::negotiation::{canonical_id, Demon, Personality};

fn default_patience() -> u32 {
    4
}

fn default_tolerance() -> i32 {
    3
}

fn default_rapport_needed() -> i32 {
    2
}

/// One demon as written in `demons.json`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DemonEntry {
    /// Derived from `name` when omitted.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    /// Taken as written; out-of-range axes are rejected, not clamped.
    #[serde(default)]
    pub alignment: Alignment,
    pub personality: String,
    #[serde(default = "default_patience")]
    pub patience: u32,
    #[serde(default = "default_tolerance")]
    pub tolerance: i32,
    #[serde(default = "default_rapport_needed")]
    pub rapport_needed: i32,
}

impl DemonEntry {
    /// Build the runtime demon. `index` is only used in error messages.
    pub fn into_demon(self, index: usize) -> Result<Demon, DataError> {
        if self.name.trim().is_empty() {
            return Err(DataError::UnnamedDemon(index));
        }
        let personality = Personality::from_name(&self.personality).ok_or_else(|| {
            DataError::UnknownPersonality { demon: self.name.clone(), value: self.personality.clone() }
        })?;
        let raw = self.alignment;
        let alignment = Alignment::checked(raw.law_chaos, raw.light_dark).ok_or_else(|| {
            ConfigError::AlignmentOutOfRange {
                owner: format!("demon '{}'", self.name.trim()),
                law_chaos: raw.law_chaos,
                light_dark: raw.light_dark,
            }
        })?;
        let mut demon = Demon::new(self.name.trim(), alignment, personality)
            .with_thresholds(self.patience, self.tolerance, self.rapport_needed);
        if let Some(id) = self.id.as_deref().map(canonical_id).filter(|id| !id.is_empty()) {
            demon.id = id;
        }
        Ok(demon)
    }
}

/// Container for deserializing the demons JSON file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DemonsFile {
    pub demons: Vec<DemonEntry>,
}

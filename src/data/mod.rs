//! Data-driven game data registry.
//!
//! Loads the demon catalog, the question pool, personality cue lines, and
//! the whim table from JSON data files. Defaults are embedded in the binary via
//! `include_str!`; an optional data directory can override them.

pub mod cue_data;
pub mod demon_data;
pub mod question_data;
pub mod whim_data;

use std::collections::HashSet;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{info, warn};

pub use cue_data::CueTable;
pub use demon_data::{DemonEntry, DemonsFile};
pub use question_data::{validate_questions, QuestionsFile};
pub use whim_data::{validate_event_refs, validate_whims};

use crate::config::GameConfig;
use crate::error::{ConfigError, DataError};
use crate::negotiation::{Demon, Question, WhimTable};

// Embedded default data files
const DEFAULT_DEMONS_JSON: &str = include_str!("../../data/defaults/demons.json");
const DEFAULT_QUESTIONS_JSON: &str = include_str!("../../data/defaults/questions.json");
const DEFAULT_CUES_JSON: &str = include_str!("../../data/defaults/cues.json");
const DEFAULT_WHIMS_JSON: &str = include_str!("../../data/defaults/whims.json");

/// Read-only game data, loaded once at startup.
///
/// The shell clones `demons` into its own mutable catalog; this registry is
/// never mutated after loading.
#[derive(Clone, Debug)]
pub struct GameData {
    /// Demon catalog in file order.
    pub demons: Vec<Demon>,
    /// Shared question pool in file order.
    pub questions: Vec<Question>,
    pub cues: CueTable,
    pub whims: WhimTable,
}

impl GameData {
    /// Load from embedded defaults compiled into the binary.
    pub fn defaults() -> Result<Self, DataError> {
        let demons: DemonsFile = parse("embedded demons.json", DEFAULT_DEMONS_JSON)?;
        let questions: QuestionsFile = parse("embedded questions.json", DEFAULT_QUESTIONS_JSON)?;
        let cues: CueTable = parse("embedded cues.json", DEFAULT_CUES_JSON)?;
        let whims: WhimTable = parse("embedded whims.json", DEFAULT_WHIMS_JSON)?;

        let data = Self { demons: build_demons(demons)?, questions: questions.questions, cues, whims };
        data.validate()?;
        Ok(data)
    }

    /// Load from a directory, merging with embedded defaults.
    ///
    /// Demons and questions override defaults with the same id and append
    /// new ones; cue files replace whole personalities; a whim file replaces
    /// the whole table. Missing files fall
    /// back to defaults. A file that exists but is malformed is an error.
    pub fn load_from(dir: &Path) -> Result<Self, DataError> {
        let mut data = Self::defaults()?;
        if !dir.is_dir() {
            warn!("data directory {} not found, using embedded defaults", dir.display());
            return Ok(data);
        }

        if let Some(file) = read_override::<DemonsFile>(&dir.join("demons.json"))? {
            let demons = build_demons(file)?;
            ensure_unique_ids(&demons)?;
            for demon in demons {
                match data.demons.iter_mut().find(|d| d.id == demon.id) {
                    Some(existing) => *existing = demon,
                    None => data.demons.push(demon),
                }
            }
        }

        if let Some(file) = read_override::<QuestionsFile>(&dir.join("questions.json"))? {
            for question in file.questions {
                match data.questions.iter_mut().find(|q| q.id == question.id) {
                    Some(existing) => *existing = question,
                    None => data.questions.push(question),
                }
            }
        }

        if let Some(cues) = read_override::<CueTable>(&dir.join("cues.json"))? {
            data.cues.merge(cues);
        }

        if let Some(whims) = read_override::<WhimTable>(&dir.join("whims.json"))? {
            data.whims = whims;
        }

        data.validate()?;
        info!(
            "game data loaded from {}: {} demons, {} questions",
            dir.display(),
            data.demons.len(),
            data.questions.len()
        );
        Ok(data)
    }

    /// Structural checks: unique ids, non-empty and unique choices, sane
    /// whim odds, and answer events that resolve.
    pub fn validate(&self) -> Result<(), DataError> {
        ensure_unique_ids(&self.demons)?;
        validate_questions(&self.questions)?;
        validate_whims(&self.whims)?;
        validate_event_refs(&self.questions, &self.whims)
    }

    /// Check every demon against the configured limits, so a bad catalog is
    /// reported at startup rather than when its demon is first met.
    pub fn check_limits(&self, config: &GameConfig) -> Result<(), ConfigError> {
        if self.questions.is_empty() {
            return Err(ConfigError::EmptyQuestionPool);
        }
        for demon in &self.demons {
            if demon.patience == 0 {
                return Err(ConfigError::ZeroPatience { demon: demon.name.clone() });
            }
            if !config.tolerance.contains(demon.tolerance) {
                return Err(ConfigError::ToleranceOutOfRange {
                    demon: demon.name.clone(),
                    tolerance: demon.tolerance,
                    min: config.tolerance.min,
                    max: config.tolerance.max,
                });
            }
            if demon.rapport_needed > config.rapport.max {
                return Err(ConfigError::UnreachableRapport {
                    demon: demon.name.clone(),
                    needed: demon.rapport_needed,
                    ceiling: config.rapport.max,
                });
            }
        }
        Ok(())
    }

    /// Find a demon by id or display name.
    pub fn demon(&self, name: &str) -> Option<&Demon> {
        self.demons.iter().find(|d| d.matches(name))
    }
}

fn parse<T: DeserializeOwned>(origin: &str, json: &str) -> Result<T, DataError> {
    serde_json::from_str(json).map_err(|source| DataError::Parse { origin: origin.to_string(), source })
}

fn read_override<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, DataError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)
        .map_err(|source| DataError::Io { path: path.to_path_buf(), source })?;
    let parsed = parse(&path.display().to_string(), &contents)?;
    info!("override loaded: {}", path.display());
    Ok(Some(parsed))
}

fn ensure_unique_ids(demons: &[Demon]) -> Result<(), DataError> {
    let mut ids = HashSet::new();
    for demon in demons {
        if !ids.insert(demon.id.as_str()) {
            return Err(DataError::DuplicateId { kind: "demon", id: demon.id.clone() });
        }
    }
    Ok(())
}

fn build_demons(file: DemonsFile) -> Result<Vec<Demon>, DataError> {
    file.demons.into_iter().enumerate().map(|(i, entry)| entry.into_demon(i)).collect()
}

//! Error types for configuration, game data, and negotiation sessions.

use std::path::PathBuf;

use thiserror::Error;

/// Rejected configuration. Raised at load or session construction time;
/// configuration values are never silently clamped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("difficulty {0} is outside the accepted range 1..=5")]
    DifficultyOutOfRange(u8),

    #[error("demon '{demon}' has patience 0; at least one turn is required")]
    ZeroPatience { demon: String },

    #[error("demon '{demon}' has tolerance {tolerance}, outside {min}..={max}")]
    ToleranceOutOfRange { demon: String, tolerance: i32, min: i32, max: i32 },

    #[error("demon '{demon}' needs rapport {needed} but rapport is capped at {ceiling}")]
    UnreachableRapport { demon: String, needed: i32, ceiling: i32 },

    #[error("demon '{0}' has already been recruited")]
    DemonUnavailable(String),

    #[error("the question pool is empty")]
    EmptyQuestionPool,

    #[error("{owner} alignment ({law_chaos}, {light_dark}) is outside -5..=5 on some axis")]
    AlignmentOutOfRange { owner: String, law_chaos: i32, light_dark: i32 },

    #[error("{field}.min ({min}) must be lower than {field}.max ({max})")]
    InvertedBounds { field: &'static str, min: i32, max: i32 },

    #[error("failed to read config {path}: {message}")]
    Unreadable { path: PathBuf, message: String },

    #[error("failed to parse config {path}: {message}")]
    Malformed { path: PathBuf, message: String },
}

/// Problems with demon, question, or cue data files.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("question '{0}' has no choices")]
    NoChoices(String),

    #[error("question '{question}' lists choice '{label}' more than once")]
    DuplicateChoice { question: String, label: String },

    #[error("demon entry #{0} has an empty name")]
    UnnamedDemon(usize),

    #[error("demon '{demon}' has unknown personality '{value}'")]
    UnknownPersonality { demon: String, value: String },

    #[error("whim '{id}': {message}")]
    BadWhim { id: String, message: String },

    #[error("question '{question}' links unknown event '{event}'")]
    UnknownEvent { question: String, event: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Recoverable failures while driving a session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("'{label}' is not an answer to question '{question}'")]
    InvalidChoice { question: String, label: String },

    #[error("guess {0} is outside 0..=2")]
    InvalidGuess(u8),

    #[error("no question has been asked yet")]
    NoPendingQuestion,

    #[error("the demon has run out of questions")]
    QuestionsExhausted,

    #[error("selector picked question #{index} from a pool of {pool_len}")]
    InvalidSelection { index: usize, pool_len: usize },

    #[error("the negotiation is already over")]
    NotInProgress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_descriptive() {
        let err = ConfigError::DifficultyOutOfRange(9);
        assert_eq!(err.to_string(), "difficulty 9 is outside the accepted range 1..=5");

        let err = SessionError::InvalidChoice {
            question: "q_rules".into(),
            label: "Maybe".into(),
        };
        assert!(err.to_string().contains("q_rules"));
    }

    #[test]
    fn test_config_error_lifts_into_data_error() {
        let err: DataError =
            ConfigError::AlignmentOutOfRange { owner: "demon 'Titan'".into(), law_chaos: -9, light_dark: 7 }.into();
        assert!(matches!(err, DataError::Config(ConfigError::AlignmentOutOfRange { law_chaos: -9, .. })));
        assert_eq!(err.to_string(), "demon 'Titan' alignment (-9, 7) is outside -5..=5 on some axis");
    }
}

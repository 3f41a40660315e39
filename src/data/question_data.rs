//! Question pool loaded from JSON.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::negotiation::Question;

/// Container for deserializing the questions JSON file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuestionsFile {
    pub questions: Vec<Question>,
}

/// Reject duplicate ids, empty choice lists, and repeated labels.
pub fn validate_questions(questions: &[Question]) -> Result<(), DataError> {
    let mut ids = HashSet::new();
    for question in questions {
        if !ids.insert(question.id.as_str()) {
            return Err(DataError::DuplicateId { kind: "question", id: question.id.clone() });
        }
        if question.choices.is_empty() {
            return Err(DataError::NoChoices(question.id.clone()));
        }
        let mut labels = HashSet::new();
        for choice in &question.choices {
            if !labels.insert(choice.label.as_str()) {
                return Err(DataError::DuplicateChoice {
                    question: question.id.clone(),
                    label: choice.label.clone(),
                });
            }
        }
    }
    Ok(())
}

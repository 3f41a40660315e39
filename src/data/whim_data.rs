//! Whim table loaded from JSON.
//!
//! `whims.json` holds the firing odds, the random pool (`entries`), and the
//! events answers can link by id (`events`).

use std::collections::HashSet;

use crate::error::DataError;
use crate::negotiation::{canonical_id, Personality, Question, WhimEntry, WhimKind, WhimTable};

fn bad(id: &str, message: impl Into<String>) -> DataError {
    DataError::BadWhim { id: id.to_string(), message: message.into() }
}

fn check_probability(id: &str, field: &str, value: f64) -> Result<(), DataError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(bad(id, format!("{} {} is outside 0..=1", field, value)));
    }
    Ok(())
}

/// Reject odds outside `[0, 1]`, unknown personalities, duplicate ids,
/// and item demands without an item.
pub fn validate_whims(table: &WhimTable) -> Result<(), DataError> {
    check_probability("*", "base_chance", table.base_chance)?;
    for (name, &bonus) in &table.personality_mod {
        if Personality::from_name(name).is_none() {
            return Err(bad("*", format!("unknown personality '{}' in personality_mod", name)));
        }
        if !(-1.0..=1.0).contains(&bonus) {
            return Err(bad("*", format!("personality_mod {} for {} is outside -1..=1", bonus, name)));
        }
    }

    let mut ids = HashSet::new();
    for entry in table.entries.iter().chain(&table.events) {
        if entry.id.trim().is_empty() {
            return Err(bad("", "empty id"));
        }
        if !ids.insert(entry.id.as_str()) {
            return Err(DataError::DuplicateId { kind: "whim", id: entry.id.clone() });
        }
        validate_entry(entry)?;
    }
    Ok(())
}

fn validate_entry(entry: &WhimEntry) -> Result<(), DataError> {
    match &entry.kind {
        WhimKind::AskItem { item, .. } if canonical_id(item).is_empty() => {
            Err(bad(&entry.id, "item demand names no item"))
        }
        WhimKind::Trap { flee_chance, .. } => check_probability(&entry.id, "flee_chance", *flee_chance),
        _ => Ok(()),
    }
}

/// Every event an answer links must exist in the table.
pub fn validate_event_refs(questions: &[Question], table: &WhimTable) -> Result<(), DataError> {
    for question in questions {
        for choice in &question.choices {
            if let Some(event) = &choice.effect.event {
                if table.event(event).is_none() {
                    return Err(DataError::UnknownEvent { question: question.id.clone(), event: event.clone() });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::negotiation::{Choice, Effect};

    fn parse(json: &str) -> WhimTable {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_valid_table_passes() {
        let table = parse(
            r#"{"base_chance": 0.1, "personality_mod": {"moody": 0.2},
                "entries": [{"id": "a", "kind": "trap", "flee_chance": 0.5}],
                "events": [{"id": "b", "kind": "ask_item", "item": "bead"}]}"#,
        );
        assert!(validate_whims(&table).is_ok());
    }

    #[test]
    fn test_bad_odds_rejected() {
        let table = parse(r#"{"base_chance": 1.5}"#);
        assert!(matches!(validate_whims(&table), Err(DataError::BadWhim { .. })));

        let table = parse(r#"{"entries": [{"id": "a", "kind": "trap", "flee_chance": -0.1}]}"#);
        assert!(matches!(validate_whims(&table), Err(DataError::BadWhim { id, .. }) if id == "a"));

        let table = parse(r#"{"personality_mod": {"GOOEY": 0.1}}"#);
        assert!(matches!(validate_whims(&table), Err(DataError::BadWhim { .. })));
    }

    #[test]
    fn test_duplicate_ids_across_pools_rejected() {
        let table = parse(
            r#"{"entries": [{"id": "a", "kind": "ask_gold"}], "events": [{"id": "a", "kind": "ask_gold"}]}"#,
        );
        assert!(matches!(validate_whims(&table), Err(DataError::DuplicateId { kind: "whim", .. })));
    }

    #[test]
    fn test_item_demand_needs_item() {
        let table = parse(r#"{"entries": [{"id": "a", "kind": "ask_item", "item": " ! "}]}"#);
        assert!(matches!(validate_whims(&table), Err(DataError::BadWhim { .. })));
    }

    #[test]
    fn test_event_refs_must_resolve() {
        let table = parse(r#"{"events": [{"id": "toll", "kind": "ask_gold"}]}"#);
        let mut questions = vec![Question {
            id: "q".into(),
            text: "?".into(),
            choices: vec![Choice { label: "Pay".into(), effect: Effect::default().with_event("toll") }],
            tags: Vec::new(),
        }];
        assert!(validate_event_refs(&questions, &table).is_ok());

        questions[0].choices[0].effect.event = Some("bridge".into());
        assert!(matches!(
            validate_event_refs(&questions, &table),
            Err(DataError::UnknownEvent { event, .. }) if event == "bridge"
        ));
    }
}

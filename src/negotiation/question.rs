//! Questions a demon can ask and the effect of each answer.

use serde::{Deserialize, Serialize};

/// What picking an answer does to the stance and to rapport.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Effect {
    pub delta_law_chaos: i32,
    pub delta_light_dark: i32,
    pub delta_rapport: i32,
    /// Per-answer affinity tags, merged with the question's own tags.
    pub tags: Vec<String>,
    /// Id of a whim event this answer provokes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

impl Effect {
    pub fn new(delta_law_chaos: i32, delta_light_dark: i32, delta_rapport: i32) -> Self {
        Self { delta_law_chaos, delta_light_dark, delta_rapport, tags: Vec::new(), event: None }
    }

    pub fn with_event(mut self, event: &str) -> Self {
        self.event = Some(event.to_string());
        self
    }
}

/// One labelled answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    #[serde(flatten)]
    pub effect: Effect,
}

/// An immutable catalog entry. Choice order is display order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Question {
    /// Answer labels in display order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.choices.iter().map(|c| c.label.as_str())
    }

    /// Resolve an answer label to its effect.
    pub fn effect_for(&self, label: &str) -> Option<&Effect> {
        self.choices.iter().find(|c| c.label == label).map(|c| &c.effect)
    }

    /// Effect with question-level tags merged in, lowercased and deduplicated.
    ///
    /// Returns `None` for unknown labels. The pool entry itself is untouched.
    pub fn resolve(&self, label: &str) -> Option<Effect> {
        let mut effect = self.effect_for(label)?.clone();
        let mut merged: Vec<String> = Vec::with_capacity(effect.tags.len() + self.tags.len());
        for tag in effect.tags.iter().chain(self.tags.iter()) {
            let tag = tag.to_lowercase();
            if !merged.contains(&tag) {
                merged.push(tag);
            }
        }
        effect.tags = merged;
        Some(effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Question {
        Question {
            id: "q_order".into(),
            text: "Are rules meant to be broken?".into(),
            choices: vec![
                Choice {
                    label: "Always".into(),
                    effect: Effect { delta_law_chaos: 1, tags: vec!["Chaos".into()], ..Effect::default() },
                },
                Choice { label: "Never".into(), effect: Effect::new(-1, 0, -1) },
            ],
            tags: vec!["chaos".into(), "philosophy".into()],
        }
    }

    #[test]
    fn test_labels_keep_order() {
        let q = sample();
        assert_eq!(q.labels().collect::<Vec<_>>(), vec!["Always", "Never"]);
    }

    #[test]
    fn test_resolve_merges_tags() {
        let q = sample();
        let effect = q.resolve("Always").unwrap();
        assert_eq!(effect.delta_law_chaos, 1);
        assert_eq!(effect.tags, vec!["chaos".to_string(), "philosophy".to_string()]);
        // Pool entry unchanged
        assert_eq!(q.choices[0].effect.tags, vec!["Chaos".to_string()]);
    }

    #[test]
    fn test_unknown_label() {
        let q = sample();
        assert!(q.effect_for("Sometimes").is_none());
        assert!(q.resolve("Sometimes").is_none());
    }

    #[test]
    fn test_choice_json_is_flat() {
        let choice: Choice =
            serde_json::from_str(r#"{"label": "Yes", "delta_light_dark": 2, "delta_rapport": 1}"#).unwrap();
        assert_eq!(choice.effect, Effect::new(0, 2, 1));

        let choice: Choice = serde_json::from_str(r#"{"label": "Pay up", "event": "toll"}"#).unwrap();
        assert_eq!(choice.effect, Effect::new(0, 0, 0).with_event("toll"));
    }
}

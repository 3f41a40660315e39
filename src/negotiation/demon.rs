//! Demons: the negotiation counterpart.

use serde::{Deserialize, Serialize};

use crate::alignment::Alignment;
use super::question::Effect;

/// Temperament tag. Drives flavor text only; selection ignores it for now.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Personality {
    Playful,
    Childish,
    Moody,
    Cunning,
    Proud,
}

impl Personality {
    pub const ALL: [Personality; 5] = [
        Personality::Playful,
        Personality::Childish,
        Personality::Moody,
        Personality::Cunning,
        Personality::Proud,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Personality::Playful => "PLAYFUL",
            Personality::Childish => "CHILDISH",
            Personality::Moody => "MOODY",
            Personality::Cunning => "CUNNING",
            Personality::Proud => "PROUD",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_uppercase();
        Self::ALL.into_iter().find(|p| p.name() == upper)
    }
}

/// Rapport and tolerance changes a demon derives from an answer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reaction {
    pub delta_rapport: i32,
    pub delta_tolerance: i32,
}

/// A recruitable demon.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demon {
    pub id: String,
    pub name: String,
    pub alignment: Alignment,
    pub personality: Personality,
    /// Turns the demon will sit through.
    pub patience: u32,
    /// Largest distance it accepts when deciding to join.
    pub tolerance: i32,
    /// Smallest rapport it accepts when deciding to join.
    pub rapport_needed: i32,
    /// False once recruited.
    pub available: bool,
}

impl Demon {
    pub fn new(name: &str, alignment: Alignment, personality: Personality) -> Self {
        Self {
            id: canonical_id(name),
            name: name.to_string(),
            alignment,
            personality,
            patience: 4,
            tolerance: 3,
            rapport_needed: 2,
            available: true,
        }
    }

    pub fn with_thresholds(mut self, patience: u32, tolerance: i32, rapport_needed: i32) -> Self {
        self.patience = patience;
        self.tolerance = tolerance;
        self.rapport_needed = rapport_needed;
        self
    }

    /// React to a chosen answer.
    ///
    /// Currently forwards the answer's rapport change untouched and never
    /// moves tolerance. Personality-weighted reactions plug in here.
    pub fn react(&self, effect: &Effect) -> Reaction {
        Reaction { delta_rapport: effect.delta_rapport, delta_tolerance: 0 }
    }

    /// True when `name` matches this demon's id or display name.
    pub fn matches(&self, name: &str) -> bool {
        self.id == canonical_id(name) || self.name.eq_ignore_ascii_case(name.trim())
    }
}

/// Lowercase slug: runs of non-alphanumerics collapse to one `_`.
pub fn canonical_id(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_react_forwards_rapport_only() {
        let demon = Demon::new("Pixie", Alignment::new(1, 2), Personality::Playful);
        let reaction = demon.react(&Effect::new(3, -2, -1));
        assert_eq!(reaction, Reaction { delta_rapport: -1, delta_tolerance: 0 });
        assert_eq!(demon.react(&Effect::new(0, 0, 2)).delta_rapport, 2);
    }

    #[test]
    fn test_canonical_id() {
        assert_eq!(canonical_id("Jack Frost"), "jack_frost");
        assert_eq!(canonical_id("  King--Frost! "), "king_frost");
        assert_eq!(canonical_id("Pixie"), "pixie");
    }

    #[test]
    fn test_matches_by_id_or_name() {
        let demon = Demon::new("Jack Frost", Alignment::default(), Personality::Childish);
        assert!(demon.matches("jack_frost"));
        assert!(demon.matches("jack frost"));
        assert!(!demon.matches("Pixie"));
    }

    #[test]
    fn test_personality_names() {
        assert_eq!(Personality::from_name("cunning"), Some(Personality::Cunning));
        assert_eq!(Personality::from_name("GLOOMY"), None);
        let parsed: Personality = serde_json::from_str("\"PROUD\"").unwrap();
        assert_eq!(parsed, Personality::Proud);
    }
}

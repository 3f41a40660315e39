//! Flavor lines a demon says after an answer, keyed by personality and tone.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::negotiation::{Personality, Tone};

/// Personality name -> tone key -> candidate lines.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CueTable {
    pub cues: HashMap<String, HashMap<String, Vec<String>>>,
}

impl CueTable {
    /// Pick a line; `variant` rotates through the candidates.
    ///
    /// Falls back to a generic gesture when the table has nothing.
    pub fn cue(&self, personality: Personality, tone: Tone, variant: usize) -> &str {
        self.cues
            .get(personality.name())
            .and_then(|by_tone| by_tone.get(tone.key()))
            .filter(|lines| !lines.is_empty())
            .map(|lines| lines[variant % lines.len()].as_str())
            .unwrap_or_else(|| fallback(tone))
    }

    /// Replace whole personalities from `other`.
    pub fn merge(&mut self, other: CueTable) {
        for (personality, by_tone) in other.cues {
            self.cues.insert(personality.to_uppercase(), by_tone);
        }
    }
}

fn fallback(tone: Tone) -> &'static str {
    match tone {
        Tone::Delighted => "*beams*",
        Tone::Pleased => "*nods*",
        Tone::Neutral => "*waits*",
        Tone::Annoyed => "*frowns*",
        Tone::Enraged => "*glares*",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CueTable {
        serde_json::from_str(r#"{"PLAYFUL": {"pleased": ["*giggles*", "*hums*"], "annoyed": []}}"#).unwrap()
    }

    #[test]
    fn test_cue_rotates_variants() {
        let table = table();
        assert_eq!(table.cue(Personality::Playful, Tone::Pleased, 0), "*giggles*");
        assert_eq!(table.cue(Personality::Playful, Tone::Pleased, 3), "*hums*");
    }

    #[test]
    fn test_cue_fallbacks() {
        let table = table();
        assert_eq!(table.cue(Personality::Playful, Tone::Annoyed, 0), "*frowns*");
        assert_eq!(table.cue(Personality::Proud, Tone::Enraged, 1), "*glares*");
    }

    #[test]
    fn test_merge_overrides_personality() {
        let mut table = table();
        let other: CueTable = serde_json::from_str(r#"{"playful": {"pleased": ["Hee-ho!"]}}"#).unwrap();
        table.merge(other);
        assert_eq!(table.cue(Personality::Playful, Tone::Pleased, 1), "Hee-ho!");
    }
}

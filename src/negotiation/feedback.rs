//! Change summaries emitted to the shell. Values only, no control logic.

use crate::alignment::{Alignment, Axis};
use super::session::SessionState;

/// Coarse mood derived from the rapport change of a single answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tone {
    Delighted,
    Pleased,
    Neutral,
    Annoyed,
    Enraged,
}

impl Tone {
    pub fn from_delta(delta_rapport: i32) -> Self {
        match delta_rapport {
            d if d >= 2 => Tone::Delighted,
            1 => Tone::Pleased,
            0 => Tone::Neutral,
            -1 => Tone::Annoyed,
            _ => Tone::Enraged,
        }
    }

    /// Key used in the cue table.
    pub fn key(&self) -> &'static str {
        match self {
            Tone::Delighted => "delighted",
            Tone::Pleased => "pleased",
            Tone::Neutral => "neutral",
            Tone::Annoyed => "annoyed",
            Tone::Enraged => "enraged",
        }
    }
}

/// What one applied answer changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerReport {
    pub delta_law_chaos: i32,
    pub delta_light_dark: i32,
    /// Rapport change the demon asked for, before clamping.
    pub delta_rapport: i32,
    pub stance_before: Alignment,
    /// Stance after the answer and the relax step.
    pub stance_after: Alignment,
    pub rapport_before: i32,
    pub rapport_after: i32,
    pub distance_before: i32,
    pub distance_after: i32,
    pub turns_left: u32,
    pub tags: Vec<String>,
    pub tone: Tone,
}

impl AnswerReport {
    /// Negative means the stance moved closer to the demon.
    pub fn distance_change(&self) -> i32 {
        self.distance_after - self.distance_before
    }

    /// Compact human-readable lines.
    pub fn notes(&self) -> Vec<String> {
        vec![
            format!("Stance: LC {:+}, LD {:+}", self.delta_law_chaos, self.delta_light_dark),
            format!("Rapport: {} -> {}", self.rapport_before, self.rapport_after),
            format!(
                "Distance: {} -> {} ({:+})",
                self.distance_before,
                self.distance_after,
                self.distance_change()
            ),
        ]
    }
}

/// What one difficulty-pressure step did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PressureReport {
    pub level: u8,
    /// Rapport actually lost after flooring at the minimum.
    pub rapport_lost: i32,
    /// Axis the stance was pushed along, if any.
    pub nudged: Option<Axis>,
}

/// Everything that happened in one answered turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnReport {
    pub round: u32,
    pub question_id: String,
    pub label: String,
    pub answer: AnswerReport,
    /// Absent when the turn ended the session.
    pub pressure: Option<PressureReport>,
    pub state: SessionState,
    /// Whim event linked by the chosen answer.
    pub event: Option<String>,
}

/// Result of the guess-the-number side game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MinigameOutcome {
    pub guess: u8,
    pub secret: u8,
    pub rapport_before: i32,
    pub rapport_after: i32,
}

impl MinigameOutcome {
    pub fn correct(&self) -> bool {
        self.guess == self.secret
    }
}

/// How a whim was settled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WhimOutcome {
    pub whim_id: String,
    /// The demand was met. Always false for traps.
    pub accepted: bool,
    pub gold_paid: u32,
    pub items_given: u32,
    pub rapport_before: i32,
    pub rapport_after: i32,
    pub state: SessionState,
}

/// HUD snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionStatus {
    pub round: u32,
    pub turns_left: u32,
    pub rapport: i32,
    pub rapport_needed: i32,
    pub stance: Alignment,
    pub demon_name: String,
    pub demon_alignment: Alignment,
    pub distance: i32,
    pub tolerance: i32,
    pub gold: u32,
}

/// End-of-session report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    pub demon_name: String,
    pub core: Alignment,
    pub final_stance: Alignment,
    pub final_distance: i32,
    pub state: SessionState,
    pub rounds_played: u32,
    pub roster: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_from_delta() {
        assert_eq!(Tone::from_delta(3), Tone::Delighted);
        assert_eq!(Tone::from_delta(2), Tone::Delighted);
        assert_eq!(Tone::from_delta(1), Tone::Pleased);
        assert_eq!(Tone::from_delta(0), Tone::Neutral);
        assert_eq!(Tone::from_delta(-1), Tone::Annoyed);
        assert_eq!(Tone::from_delta(-4), Tone::Enraged);
    }

    #[test]
    fn test_notes_show_signed_changes() {
        let report = AnswerReport {
            delta_law_chaos: 1,
            delta_light_dark: -2,
            delta_rapport: 1,
            stance_before: Alignment::new(0, 0),
            stance_after: Alignment::new(0, -1),
            rapport_before: 0,
            rapport_after: 1,
            distance_before: 3,
            distance_after: 4,
            turns_left: 3,
            tags: Vec::new(),
            tone: Tone::Pleased,
        };
        let notes = report.notes();
        assert_eq!(notes[0], "Stance: LC +1, LD -2");
        assert_eq!(notes[2], "Distance: 3 -> 4 (+1)");
        assert_eq!(report.distance_change(), 1);
    }
}

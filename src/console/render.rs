//! Text rendering for the console shell.
//!
//! Every function returns plain lines; the shell decides where they go.
//! Colors are ANSI escapes from crossterm and can be switched off.

use crossterm::style::{style, Color, Stylize};

use crate::alignment::Alignment;
use crate::config::RapportBounds;
use crate::negotiation::{
    Demon, FleeReason, MinigameOutcome, PressureReport, SessionState, SessionStatus, SessionSummary, Tone,
    TurnReport, Whim, WhimKind, WhimOutcome,
};

/// Width of a dex card, borders included.
const CARD_WIDTH: usize = 34;

/// Applies colors when enabled.
#[derive(Clone, Copy, Debug)]
pub struct Painter {
    color: bool,
}

impl Painter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            style(text).with(color).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn bold(&self, text: &str) -> String {
        if self.color {
            style(text).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn tone_color(tone: Tone) -> Color {
        match tone {
            Tone::Delighted => Color::Green,
            Tone::Pleased => Color::DarkGreen,
            Tone::Neutral => Color::Grey,
            Tone::Annoyed => Color::DarkYellow,
            Tone::Enraged => Color::Red,
        }
    }

    /// `[###---]` with one cell per rapport step above the minimum.
    pub fn rapport_bar(&self, rapport: i32, bounds: &RapportBounds) -> String {
        let total = (bounds.max - bounds.min).max(0) as usize;
        let filled = (bounds.clamp(rapport) - bounds.min).max(0) as usize;
        let bar = format!("{}{}", "#".repeat(filled), "-".repeat(total - filled));
        let color = if rapport > 0 {
            Color::Green
        } else if rapport < 0 {
            Color::Red
        } else {
            Color::Grey
        };
        format!("[{}] {:+}", self.paint(&bar, color), rapport)
    }

    pub fn status(&self, status: &SessionStatus, bounds: &RapportBounds) -> Vec<String> {
        vec![
            self.bold(&format!("== Round {} ==", status.round)),
            format!("Turns left:  {}", status.turns_left),
            format!(
                "Rapport:     {} (needs {})",
                self.rapport_bar(status.rapport, bounds),
                status.rapport_needed
            ),
            format!("Your stance: {}", alignment_text(&status.stance)),
            format!("{}: {}", status.demon_name, alignment_text(&status.demon_alignment)),
            format!("Distance:    {} (accepts {})", status.distance, status.tolerance),
            format!("Purse:       {} gold", status.gold),
        ]
    }

    /// The demon's whim line and, for demands, what it wants.
    pub fn whim(&self, demon_name: &str, whim: &Whim) -> Vec<String> {
        let mut lines = Vec::new();
        if !whim.message.is_empty() {
            lines.push(format!("{}: {}", demon_name, self.paint(&whim.message, Color::Magenta)));
        }
        match &whim.kind {
            WhimKind::AskGold { amount, .. } => lines.push(format!("  {} wants {} gold.", demon_name, amount)),
            WhimKind::AskItem { item, amount, .. } => {
                lines.push(format!("  {} wants {}x {}.", demon_name, amount, item))
            }
            WhimKind::Trap { .. } => lines.push(self.paint("  It's a trap!", Color::DarkYellow)),
        }
        lines
    }

    pub fn whim_outcome(&self, outcome: &WhimOutcome) -> Vec<String> {
        let mut lines = Vec::new();
        if outcome.gold_paid > 0 {
            lines.push(format!("  You paid {} gold.", outcome.gold_paid));
        }
        if outcome.items_given > 0 {
            lines.push(format!("  You handed over {} item(s).", outcome.items_given));
        }
        lines.push(format!("  Rapport: {} -> {}", outcome.rapport_before, outcome.rapport_after));
        lines
    }

    /// The demon's reply line plus the change notes for one answered turn.
    pub fn turn(&self, demon_name: &str, report: &TurnReport, cue: &str) -> Vec<String> {
        let tone = report.answer.tone;
        let mut lines = vec![format!("{}: {}", demon_name, self.paint(cue, Self::tone_color(tone)))];
        lines.extend(report.answer.notes().into_iter().map(|note| format!("  {}", note)));
        if let Some(pressure) = report.pressure {
            lines.extend(self.pressure(&pressure));
        }
        lines
    }

    fn pressure(&self, pressure: &PressureReport) -> Vec<String> {
        let mut lines = Vec::new();
        if pressure.rapport_lost > 0 {
            lines.push(self.paint(
                &format!("  The demon grows restless (rapport -{}).", pressure.rapport_lost),
                Color::DarkYellow,
            ));
        }
        if let Some(axis) = pressure.nudged {
            lines.push(self.paint(
                &format!("  Doubt pulls your {} stance away.", axis.label()),
                Color::DarkYellow,
            ));
        }
        lines
    }

    pub fn minigame(&self, demon_name: &str, outcome: &MinigameOutcome) -> Vec<String> {
        let verdict = if outcome.correct() {
            self.paint("Correct!", Color::Green)
        } else {
            self.paint("Wrong!", Color::Red)
        };
        vec![
            format!("{} was thinking of {}. {}", demon_name, outcome.secret, verdict),
            format!("  Rapport: {} -> {}", outcome.rapport_before, outcome.rapport_after),
        ]
    }

    pub fn outcome(&self, demon_name: &str, state: SessionState) -> String {
        match state {
            SessionState::Active => format!("{} is still listening.", demon_name),
            SessionState::Recruited => {
                self.paint(&format!("{} agrees to join you!", demon_name), Color::Green)
            }
            SessionState::Fled(FleeReason::Farewell) => {
                self.paint(&format!("You part ways with {}.", demon_name), Color::Grey)
            }
            SessionState::Fled(reason) => {
                self.paint(&format!("{} fled: {}.", demon_name, reason.describe()), Color::Red)
            }
        }
    }

    /// Boxed roster entry for one recruited demon.
    pub fn dex_card(&self, demon: &Demon) -> Vec<String> {
        let inner = CARD_WIDTH - 4;
        let rows = [
            demon.name.to_uppercase(),
            format!("Personality: {}", demon.personality.name()),
            format!("Alignment:   {}", alignment_text(&demon.alignment)),
            format!("Patience {}  Tolerance {}", demon.patience, demon.tolerance),
        ];
        let border = format!("+{}+", "-".repeat(CARD_WIDTH - 2));
        let mut lines = vec![border.clone()];
        for row in rows {
            let row: String = row.chars().take(inner).collect();
            lines.push(format!("| {:<width$} |", row, width = inner));
        }
        lines.push(border);
        lines
    }

    pub fn summary(&self, summary: &SessionSummary, roster: &[Demon]) -> Vec<String> {
        let mut lines = vec![
            self.bold("== Negotiation over =="),
            self.outcome(&summary.demon_name, summary.state),
            format!("Core alignment: {}", alignment_text(&summary.core)),
            format!("Final stance:   {}", alignment_text(&summary.final_stance)),
            format!("Final distance: {}", summary.final_distance),
            format!("Rounds played:  {}", summary.rounds_played),
        ];
        if roster.is_empty() {
            lines.push("Roster: (empty)".to_string());
        } else {
            lines.push(format!("Roster ({}):", roster.len()));
            for demon in roster {
                lines.extend(self.dex_card(demon));
            }
        }
        lines
    }
}

/// `LC +1 / LD -2`
pub fn alignment_text(alignment: &Alignment) -> String {
    format!("LC {:+} / LD {:+}", alignment.law_chaos(), alignment.light_dark())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::negotiation::Personality;

    #[test]
    fn test_rapport_bar_plain() {
        let painter = Painter::new(false);
        let bounds = RapportBounds::default();
        assert_eq!(painter.rapport_bar(0, &bounds), "[###---] +0");
        assert_eq!(painter.rapport_bar(3, &bounds), "[######] +3");
        assert_eq!(painter.rapport_bar(-3, &bounds), "[------] -3");
    }

    #[test]
    fn test_plain_output_has_no_escapes() {
        let painter = Painter::new(false);
        let line = painter.outcome("Pixie", SessionState::Fled(FleeReason::TooFar));
        assert_eq!(line, "Pixie fled: your views drifted too far apart.");
        assert!(!line.contains('\u{1b}'));
    }

    #[test]
    fn test_colored_output_has_escapes() {
        let painter = Painter::new(true);
        assert!(painter.bold("hi").contains('\u{1b}'));
        if std::env::var_os("NO_COLOR").is_none() {
            assert!(painter.paint("hi", Color::Red).contains('\u{1b}'));
        }
    }

    #[test]
    fn test_dex_card_is_boxed() {
        let painter = Painter::new(false);
        let demon = Demon::new("Jack Frost", Alignment::new(-1, 1), Personality::Childish);
        let card = painter.dex_card(&demon);
        assert_eq!(card.len(), 6);
        assert!(card.iter().all(|line| line.chars().count() == CARD_WIDTH));
        assert!(card[1].contains("JACK FROST"));
        assert!(card[3].contains("LC -1 / LD +1"));
    }

    #[test]
    fn test_status_lines() {
        let painter = Painter::new(false);
        let status = SessionStatus {
            round: 2,
            turns_left: 3,
            rapport: 1,
            rapport_needed: 2,
            stance: Alignment::new(0, 0),
            demon_name: "Pixie".into(),
            demon_alignment: Alignment::new(1, 2),
            distance: 3,
            tolerance: 4,
            gold: 7,
        };
        let lines = painter.status(&status, &RapportBounds::default());
        assert_eq!(lines[0], "== Round 2 ==");
        assert!(lines[2].contains("needs 2"));
        assert_eq!(lines[4], "Pixie: LC +1 / LD +2");
        assert_eq!(lines[5], "Distance:    3 (accepts 4)");
        assert_eq!(lines[6], "Purse:       7 gold");
    }

    #[test]
    fn test_whim_lines() {
        let painter = Painter::new(false);
        let whim = Whim {
            id: "tribute".into(),
            message: "Coins, please!".into(),
            join_on_accept: false,
            flee_on_refuse: false,
            kind: WhimKind::AskGold { amount: 3, pay_rapport: 1, refuse_rapport: 1 },
        };
        assert_eq!(painter.whim("Pixie", &whim), vec!["Pixie: Coins, please!", "  Pixie wants 3 gold."]);

        let outcome = WhimOutcome {
            whim_id: "tribute".into(),
            accepted: true,
            gold_paid: 3,
            items_given: 0,
            rapport_before: 0,
            rapport_after: 1,
            state: SessionState::Active,
        };
        assert_eq!(painter.whim_outcome(&outcome), vec!["  You paid 3 gold.", "  Rapport: 0 -> 1"]);
    }
}

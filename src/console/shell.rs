//! Line-oriented console shell.
//!
//! Reads menu input, forwards it to a [`NegotiationSession`], and prints
//! what comes back. It holds no game rules of its own. Generic over the
//! reader and writer so tests can drive it with in-memory buffers.

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Color;
use crossterm::terminal::{Clear, ClearType};
use tracing::debug;

use crate::config::{validate_difficulty, UiConfig, DIFFICULTY_RANGE};
use crate::data::CueTable;
use crate::error::SessionError;
use crate::negotiation::minigame::MAX_GUESS;
use crate::negotiation::{NegotiationSession, Question, SessionSummary, Whim, WhimKind, WhimTable};
use super::menu::MenuAction;
use super::render::Painter;

pub struct Console<R, W> {
    input: R,
    out: W,
    painter: Painter,
    round_delay: Duration,
    clear_screen: bool,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, out: W, ui: &UiConfig) -> Self {
        Self {
            input,
            out,
            painter: Painter::new(ui.color),
            round_delay: Duration::from_millis(ui.round_delay_ms),
            clear_screen: false,
        }
    }

    /// Clear the terminal when a new negotiation starts.
    pub fn with_clear_screen(mut self, clear: bool) -> Self {
        self.clear_screen = clear;
        self
    }

    pub fn painter(&self) -> Painter {
        self.painter
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{}", line)
    }

    fn say_all(&mut self, lines: &[String]) -> io::Result<()> {
        for line in lines {
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }

    /// Print `prompt` and read one trimmed line. `None` at end of input.
    fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask for a difficulty until one in range is given.
    pub fn prompt_difficulty(&mut self) -> io::Result<Option<u8>> {
        let text = format!("Difficulty ({}-{}): ", DIFFICULTY_RANGE.start(), DIFFICULTY_RANGE.end());
        loop {
            let Some(line) = self.prompt(&text)? else {
                return Ok(None);
            };
            match line.parse::<u8>().map_err(|_| ()).and_then(|n| validate_difficulty(n).map_err(|_| ())) {
                Ok(level) => return Ok(Some(level)),
                Err(()) => {
                    let msg = self.painter.paint("Please enter a whole number from 1 to 5.", Color::Red);
                    self.say(&msg)?;
                }
            }
        }
    }

    /// Yes/no question. End of input counts as no.
    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        loop {
            let Some(line) = self.prompt(&format!("{} (y/n): ", question))? else {
                return Ok(false);
            };
            match line.to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say("Please answer y or n.")?,
            }
        }
    }

    /// Drive one negotiation until it ends, then move a recruited demon
    /// into the roster and print the summary.
    pub fn run_session(
        &mut self,
        session: &mut NegotiationSession<'_>,
        cues: &CueTable,
        whims: &WhimTable,
    ) -> io::Result<SessionSummary> {
        if self.clear_screen {
            queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        let greeting = format!("A wild {} appears!", session.demon().name);
        let greeting = self.painter.bold(&greeting);
        self.say(&greeting)?;
        let status = self.painter.status(&session.status(), &session.rapport_bounds());
        self.say_all(&status)?;

        while session.in_progress() {
            self.say("")?;
            for action in MenuAction::ALL {
                self.say(&format!("  {}. {}", action.number(), action.label()))?;
            }
            let Some(line) = self.prompt("> ")? else {
                debug!("input closed mid-session");
                leave(session);
                break;
            };
            match MenuAction::parse(&line) {
                Some(MenuAction::Answer) => self.answer_turn(session, cues, whims)?,
                Some(MenuAction::Minigame) => self.minigame(session)?,
                Some(MenuAction::Status) => {
                    let lines = self.painter.status(&session.status(), &session.rapport_bounds());
                    self.say_all(&lines)?;
                }
                Some(MenuAction::Join) => {
                    if let Ok(false) = session.attempt_join() {
                        let name = session.demon().name.clone();
                        self.say(&format!("{} isn't convinced yet.", name))?;
                    }
                }
                Some(MenuAction::Goodbye) => leave(session),
                None => {
                    let msg = self.painter.paint("That's not on the menu.", Color::Red);
                    self.say(&msg)?;
                }
            }
        }

        session.finalize_join();
        let summary = session.summary();
        let lines = self.painter.summary(&summary, session.player().roster());
        self.say("")?;
        self.say_all(&lines)?;
        Ok(summary)
    }

    fn answer_turn(
        &mut self,
        session: &mut NegotiationSession<'_>,
        cues: &CueTable,
        whims: &WhimTable,
    ) -> io::Result<()> {
        let question = match session.ask() {
            Ok(question) => question,
            Err(SessionError::QuestionsExhausted) => {
                let line = self.painter.outcome(&session.demon().name, session.state());
                return self.say(&line);
            }
            Err(e) => {
                let msg = self.painter.paint(&e.to_string(), Color::Red);
                return self.say(&msg);
            }
        };
        self.show_question(&session.demon().name, question)?;

        let report = loop {
            let Some(line) = self.prompt("Your answer: ")? else {
                leave(session);
                return Ok(());
            };
            let label = match line.parse::<usize>() {
                Ok(n) if (1..=question.choices.len()).contains(&n) => question.choices[n - 1].label.as_str(),
                _ => line.as_str(),
            };
            match session.answer(label) {
                Ok(report) => break report,
                Err(SessionError::InvalidChoice { .. }) => {
                    let msg = self.painter.paint("Pick one of the listed answers.", Color::Red);
                    self.say(&msg)?;
                }
                Err(e) => return self.say(&e.to_string()),
            }
        };

        let demon = session.demon();
        let cue = cues.cue(demon.personality, report.answer.tone, report.round as usize);
        let lines = self.painter.turn(&demon.name, &report, cue);
        self.say_all(&lines)?;
        if report.state.is_terminal() {
            let line = self.painter.outcome(&session.demon().name, report.state);
            self.say(&line)?;
            return Ok(());
        }
        if let Some(whim) = session.whim_after(&report, whims) {
            self.whim(session, &whim)?;
        }
        if session.in_progress() && !self.round_delay.is_zero() {
            self.out.flush()?;
            thread::sleep(self.round_delay);
        }
        Ok(())
    }

    fn whim(&mut self, session: &mut NegotiationSession<'_>, whim: &Whim) -> io::Result<()> {
        let name = session.demon().name.clone();
        let lines = self.painter.whim(&name, whim);
        self.say_all(&lines)?;
        let accept = match &whim.kind {
            WhimKind::AskGold { amount, .. } => {
                let gold = session.player().gold();
                self.confirm(&format!("Pay {} gold? You have {}.", amount, gold))?
            }
            WhimKind::AskItem { item, amount, .. } => {
                let held = session.player().item_count(item);
                self.confirm(&format!("Give {}x {}? You have {}.", amount, item, held))?
            }
            WhimKind::Trap { .. } => false,
        };
        let outcome = match session.resolve_whim(whim, accept) {
            Ok(outcome) => outcome,
            Err(e) => return self.say(&e.to_string()),
        };
        if whim.kind.is_demand() && accept && !outcome.accepted {
            self.say("You can't cover that.")?;
        }
        let lines = self.painter.whim_outcome(&outcome);
        self.say_all(&lines)?;
        if outcome.state.is_terminal() {
            let line = self.painter.outcome(&name, outcome.state);
            self.say(&line)?;
        }
        Ok(())
    }

    fn show_question(&mut self, demon_name: &str, question: &Question) -> io::Result<()> {
        let line = format!("{}: \"{}\"", demon_name, question.text);
        let line = self.painter.bold(&line);
        self.say(&line)?;
        for (i, choice) in question.choices.iter().enumerate() {
            self.say(&format!("  {}) {}", i + 1, choice.label))?;
        }
        Ok(())
    }

    fn minigame(&mut self, session: &mut NegotiationSession<'_>) -> io::Result<()> {
        let name = session.demon().name.clone();
        self.say(&format!("{}: \"I'm thinking of a number from 0 to {}. Guess!\"", name, MAX_GUESS))?;
        let outcome = loop {
            let Some(line) = self.prompt("Your guess: ")? else {
                leave(session);
                return Ok(());
            };
            let guess = match line.parse::<u8>() {
                Ok(guess) => guess,
                Err(_) => {
                    self.say(&format!("Guess a number from 0 to {}.", MAX_GUESS))?;
                    continue;
                }
            };
            match session.play_minigame(guess) {
                Ok(outcome) => break outcome,
                Err(SessionError::InvalidGuess(_)) => {
                    self.say(&format!("Guess a number from 0 to {}.", MAX_GUESS))?;
                }
                Err(e) => return self.say(&e.to_string()),
            }
        };
        let lines = self.painter.minigame(&name, &outcome);
        self.say_all(&lines)
    }
}

fn leave(session: &mut NegotiationSession<'_>) {
    // Only fails when the session already ended.
    let _ = session.say_goodbye();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::alignment::Alignment;
    use crate::negotiation::{
        Choice, Demon, Effect, FleeReason, Personality, Player, SessionSettings, SessionState,
    };

    fn plain() -> UiConfig {
        UiConfig { round_delay_ms: 0, color: false }
    }

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new(), &plain())
    }

    fn pixie() -> Demon {
        Demon::new("Pixie", Alignment::new(1, 2), Personality::Playful).with_thresholds(5, 4, 2)
    }

    fn single_question() -> Vec<Question> {
        vec![Question {
            id: "q_kind".into(),
            text: "Would you help a stranger?".into(),
            choices: vec![
                Choice { label: "Of course".into(), effect: Effect::new(1, 1, 1) },
                Choice { label: "Never".into(), effect: Effect::new(-1, -1, -1) },
            ],
            tags: Vec::new(),
        }]
    }

    fn output(console: Console<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(console.into_output()).unwrap()
    }

    #[test]
    fn test_prompt_difficulty_reprompts() {
        let mut console = console("0\nhard\n9\n3\n");
        assert_eq!(console.prompt_difficulty().unwrap(), Some(3));
        let text = output(console);
        assert_eq!(text.matches("Please enter a whole number").count(), 3);
    }

    #[test]
    fn test_prompt_difficulty_eof() {
        let mut console = console("");
        assert_eq!(console.prompt_difficulty().unwrap(), None);
    }

    #[test]
    fn test_confirm() {
        assert!(console("y\n").confirm("Again?").unwrap());
        assert!(!console("maybe\nno\n").confirm("Again?").unwrap());
        assert!(!console("").confirm("Again?").unwrap());
    }

    #[test]
    fn test_status_then_goodbye() {
        let mut player = Player::new(Alignment::new(0, 0));
        let mut demon = pixie();
        let pool = single_question();
        let mut session = NegotiationSession::new(&mut player, &mut demon, &pool, SessionSettings::new(1, 1)).unwrap();
        let mut console = console("7\n3\n5\n");

        let summary = console.run_session(&mut session, &CueTable::default(), &WhimTable::default()).unwrap();
        assert_eq!(summary.state, SessionState::Fled(FleeReason::Farewell));
        let text = output(console);
        assert!(text.contains("A wild Pixie appears!"));
        assert!(text.contains("That's not on the menu."));
        assert_eq!(text.matches("== Round 1 ==").count(), 2);
        assert!(text.contains("You part ways with Pixie."));
    }

    #[test]
    fn test_two_kind_answers_recruit_pixie() {
        let mut player = Player::new(Alignment::new(0, 0));
        let mut demon = pixie();
        let pool = single_question();
        let mut session = NegotiationSession::new(&mut player, &mut demon, &pool, SessionSettings::new(1, 11)).unwrap();
        // Second answer is typed as a label rather than a number.
        let mut console = console("1\n9\n1\n1\nOf course\n");

        let summary = console.run_session(&mut session, &CueTable::default(), &WhimTable::default()).unwrap();
        assert_eq!(summary.state, SessionState::Recruited);
        assert_eq!(summary.rounds_played, 2);
        assert_eq!(summary.roster, vec!["Pixie".to_string()]);
        drop(session);
        assert!(!demon.available);
        assert_eq!(player.roster().len(), 1);

        let text = output(console);
        assert!(text.contains("Pick one of the listed answers."));
        assert!(text.contains("Pixie agrees to join you!"));
        assert!(text.contains("| PIXIE"));
    }

    #[test]
    fn test_minigame_rejects_bad_guess() {
        let mut player = Player::new(Alignment::new(0, 0));
        let mut demon = pixie();
        let pool = single_question();
        let mut session = NegotiationSession::new(&mut player, &mut demon, &pool, SessionSettings::new(1, 5)).unwrap();
        let mut console = console("2\n3\nx\n1\n5\n");

        console.run_session(&mut session, &CueTable::default(), &WhimTable::default()).unwrap();
        assert_eq!(session.turns_left(), 5);
        let text = output(console);
        assert_eq!(text.matches("Guess a number from 0 to 2.").count(), 2);
        assert!(text.contains("was thinking of"));
    }

    #[test]
    fn test_whim_after_answer_is_offered() {
        let whims: WhimTable = serde_json::from_str(
            r#"{"base_chance": 1.0, "entries": [{"id": "tribute", "kind": "ask_gold", "amount": 2, "message": "Coins!"}]}"#,
        )
        .unwrap();
        let mut player = Player::new(Alignment::new(0, 0)).with_purse(5, &Default::default());
        let mut demon = pixie().with_thresholds(5, 4, 3);
        let pool = single_question();
        let mut session = NegotiationSession::new(&mut player, &mut demon, &pool, SessionSettings::new(1, 5)).unwrap();
        let mut console = console("1\n1\nmaybe\ny\n5\n");

        let summary = console.run_session(&mut session, &CueTable::default(), &whims).unwrap();
        assert_eq!(summary.state, SessionState::Fled(FleeReason::Farewell));
        assert_eq!(session.player().gold(), 3);
        let text = output(console);
        assert!(text.contains("Pixie: Coins!"));
        assert!(text.contains("Pay 2 gold? You have 5."));
        assert!(text.contains("Please answer y or n."));
        assert!(text.contains("You paid 2 gold."));
    }

    #[test]
    fn test_selector_error_is_reported_without_ending() {
        struct Broken;
        impl crate::negotiation::QuestionSelector for Broken {
            fn select(
                &mut self,
                _pool: &[Question],
                _ctx: &crate::negotiation::SelectionContext<'_>,
                _rng: &mut rand_chacha::ChaCha8Rng,
            ) -> crate::negotiation::Selection {
                crate::negotiation::Selection::Fresh(3)
            }
        }

        let mut player = Player::new(Alignment::new(0, 0));
        let mut demon = pixie();
        let pool = single_question();
        let mut session = NegotiationSession::new(&mut player, &mut demon, &pool, SessionSettings::new(1, 5))
            .unwrap()
            .with_selector(Box::new(Broken));
        let mut console = console("1\n5\n");

        let summary = console.run_session(&mut session, &CueTable::default(), &WhimTable::default()).unwrap();
        assert_eq!(summary.state, SessionState::Fled(FleeReason::Farewell));
        let text = output(console);
        assert!(text.contains("selector picked question #3 from a pool of 1"));
    }

    #[test]
    fn test_eof_ends_session_with_farewell() {
        let mut player = Player::new(Alignment::new(0, 0));
        let mut demon = pixie();
        let pool = single_question();
        let mut session = NegotiationSession::new(&mut player, &mut demon, &pool, SessionSettings::new(1, 5)).unwrap();
        let mut console = console("1\n");

        let summary = console.run_session(&mut session, &CueTable::default(), &WhimTable::default()).unwrap();
        assert_eq!(summary.state, SessionState::Fled(FleeReason::Farewell));
        assert_eq!(summary.rounds_played, 0);
    }
}

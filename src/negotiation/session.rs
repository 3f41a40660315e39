//! Negotiation session state machine.
//!
//! A session borrows one player, one demon, and the shared question pool,
//! and owns everything that only lives for the length of the talk:
//! rapport, the turn budget, the RNG, and the terminal state.
//!
//! One answered turn runs, in order:
//! 1. apply the answer (stance, rapport, turn budget, relax)
//! 2. check join
//! 3. check flee (skipped once joined, so recruitment wins ties)
//! 4. apply difficulty pressure (skipped once the session has ended)

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::alignment::Axis;
use crate::config::{validate_difficulty, GameConfig, RapportBounds, ToleranceBounds};
use crate::error::{ConfigError, SessionError};
use super::demon::Demon;
use super::feedback::{
    AnswerReport, MinigameOutcome, PressureReport, SessionStatus, SessionSummary, Tone, TurnReport, WhimOutcome,
};
use super::minigame;
use super::player::Player;
use super::question::{Effect, Question};
use super::selection::{ExhaustionPolicy, QuestionSelector, Selection, SelectionContext, UniformSelector};
use super::whim::{Whim, WhimEntry, WhimKind, WhimTable};

/// Why a demon walked away.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FleeReason {
    /// Stance drifted beyond `tolerance + 2`.
    TooFar,
    /// The turn budget ran out.
    OutOfPatience,
    /// The player ended the talk.
    Farewell,
    /// Every question was asked under [`ExhaustionPolicy::Flee`].
    QuestionsExhausted,
    /// A trap whim went off and the demon vanished.
    Tricked,
    /// The player turned down a demand the demon would not let go.
    Refused,
}

impl FleeReason {
    pub fn describe(&self) -> &'static str {
        match self {
            FleeReason::TooFar => "your views drifted too far apart",
            FleeReason::OutOfPatience => "it ran out of patience",
            FleeReason::Farewell => "you said goodbye",
            FleeReason::QuestionsExhausted => "it ran out of things to ask",
            FleeReason::Tricked => "it played a trick on you and vanished",
            FleeReason::Refused => "you refused its demand",
        }
    }
}

/// Session lifecycle. Terminal states are never left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    Active,
    Recruited,
    Fled(FleeReason),
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionState::Active)
    }
}

/// Per-session settings, validated when the session is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSettings {
    /// Pressure level, 1..=5.
    pub difficulty: u8,
    pub rapport: RapportBounds,
    pub tolerance: ToleranceBounds,
    pub seed: u64,
    pub on_exhausted: ExhaustionPolicy,
}

impl SessionSettings {
    pub fn new(difficulty: u8, seed: u64) -> Self {
        Self {
            difficulty,
            rapport: RapportBounds::default(),
            tolerance: ToleranceBounds::default(),
            seed,
            on_exhausted: ExhaustionPolicy::default(),
        }
    }

    pub fn from_config(config: &GameConfig, difficulty: u8, seed: u64) -> Self {
        Self {
            difficulty,
            rapport: config.rapport,
            tolerance: config.tolerance,
            seed,
            on_exhausted: config.question_exhaustion,
        }
    }
}

/// One negotiation between a player and a demon.
pub struct NegotiationSession<'a> {
    player: &'a mut Player,
    demon: &'a mut Demon,
    pool: &'a [Question],
    rapport: i32,
    turns_left: u32,
    round: u32,
    state: SessionState,
    difficulty: u8,
    bounds: RapportBounds,
    /// Accumulated `delta_tolerance` from demon reactions.
    tolerance_shift: i32,
    rng: ChaCha8Rng,
    selector: Box<dyn QuestionSelector>,
    asked: HashSet<String>,
    pending: Option<usize>,
}

impl<'a> NegotiationSession<'a> {
    /// Start a session, rejecting out-of-range configuration.
    pub fn new(
        player: &'a mut Player,
        demon: &'a mut Demon,
        pool: &'a [Question],
        settings: SessionSettings,
    ) -> Result<Self, ConfigError> {
        let difficulty = validate_difficulty(settings.difficulty)?;
        settings.rapport.validate()?;
        settings.tolerance.validate()?;
        if pool.is_empty() {
            return Err(ConfigError::EmptyQuestionPool);
        }
        if !demon.available {
            return Err(ConfigError::DemonUnavailable(demon.name.clone()));
        }
        if demon.patience == 0 {
            return Err(ConfigError::ZeroPatience { demon: demon.name.clone() });
        }
        if !settings.tolerance.contains(demon.tolerance) {
            return Err(ConfigError::ToleranceOutOfRange {
                demon: demon.name.clone(),
                tolerance: demon.tolerance,
                min: settings.tolerance.min,
                max: settings.tolerance.max,
            });
        }
        if demon.rapport_needed > settings.rapport.max {
            return Err(ConfigError::UnreachableRapport {
                demon: demon.name.clone(),
                needed: demon.rapport_needed,
                ceiling: settings.rapport.max,
            });
        }

        info!(
            "negotiation with {} begins: patience {}, tolerance {}, rapport needed {}, difficulty {}",
            demon.name, demon.patience, demon.tolerance, demon.rapport_needed, difficulty
        );

        Ok(Self {
            turns_left: demon.patience,
            rapport: settings.rapport.clamp(0),
            round: 1,
            state: SessionState::Active,
            difficulty,
            bounds: settings.rapport,
            tolerance_shift: 0,
            rng: ChaCha8Rng::seed_from_u64(settings.seed),
            selector: Box::new(UniformSelector::new(settings.on_exhausted)),
            asked: HashSet::new(),
            pending: None,
            player,
            demon,
            pool,
        })
    }

    /// Swap in a different question selection strategy.
    pub fn with_selector(mut self, selector: Box<dyn QuestionSelector>) -> Self {
        self.selector = selector;
        self
    }

    // ---- accessors ----

    pub fn player(&self) -> &Player {
        &*self.player
    }

    pub fn demon(&self) -> &Demon {
        &*self.demon
    }

    pub fn rapport(&self) -> i32 {
        self.rapport
    }

    pub fn rapport_bounds(&self) -> RapportBounds {
        self.bounds
    }

    pub fn turns_left(&self) -> u32 {
        self.turns_left
    }

    /// Current round, starting at 1.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn rounds_played(&self) -> u32 {
        self.round - 1
    }

    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn in_progress(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn recruited(&self) -> bool {
        self.state == SessionState::Recruited
    }

    pub fn fled(&self) -> bool {
        matches!(self.state, SessionState::Fled(_))
    }

    /// Tolerance including any reaction adjustments.
    pub fn tolerance(&self) -> i32 {
        self.demon.tolerance.saturating_add(self.tolerance_shift)
    }

    /// Current stance-to-demon distance.
    pub fn distance(&self) -> i32 {
        self.player.stance_alignment.distance(&self.demon.alignment)
    }

    /// Question awaiting an answer, if any.
    pub fn pending_question(&self) -> Option<&'a Question> {
        let pool = self.pool;
        self.pending.map(|idx| &pool[idx])
    }

    // ---- turn protocol ----

    /// Let the selector choose the demon's next question and mark it asked.
    ///
    /// Returns `Ok(None)` when the selector reports the pool exhausted, and
    /// `InvalidSelection` when it points outside the pool.
    pub fn pick_question(&mut self) -> Result<Option<&'a Question>, SessionError> {
        let pool = self.pool;
        Ok(self.pick_index()?.map(|idx| &pool[idx]))
    }

    fn pick_index(&mut self) -> Result<Option<usize>, SessionError> {
        let ctx = SelectionContext {
            demon: &*self.demon,
            round: self.round,
            turns_left: self.turns_left,
            rapport: self.rapport,
            asked: &self.asked,
        };
        let idx = match self.selector.select(self.pool, &ctx, &mut self.rng) {
            Selection::Fresh(idx) => idx,
            Selection::Recycled(idx) => {
                debug!("question pool recycled after {} questions", self.asked.len());
                self.asked.clear();
                idx
            }
            Selection::Exhausted => return Ok(None),
        };
        let question = self
            .pool
            .get(idx)
            .ok_or(SessionError::InvalidSelection { index: idx, pool_len: self.pool.len() })?;
        self.asked.insert(question.id.clone());
        Ok(Some(idx))
    }

    /// Pose a question. Repeated calls return the same pending question.
    ///
    /// A selector error is returned as is and leaves the session active.
    pub fn ask(&mut self) -> Result<&'a Question, SessionError> {
        if !self.in_progress() {
            return Err(SessionError::NotInProgress);
        }
        if let Some(question) = self.pending_question() {
            return Ok(question);
        }
        match self.pick_index()? {
            Some(idx) => {
                let pool = self.pool;
                let question = &pool[idx];
                self.pending = Some(idx);
                debug!("round {}: {} asks '{}'", self.round, self.demon.name, question.id);
                Ok(question)
            }
            None => {
                self.end(SessionState::Fled(FleeReason::QuestionsExhausted));
                Err(SessionError::QuestionsExhausted)
            }
        }
    }

    /// Answer the pending question with one of its labels and run the turn.
    ///
    /// An unknown label changes nothing; the caller should re-prompt.
    pub fn answer(&mut self, label: &str) -> Result<TurnReport, SessionError> {
        if !self.in_progress() {
            return Err(SessionError::NotInProgress);
        }
        let question = self.pending_question().ok_or(SessionError::NoPendingQuestion)?;
        let effect = question.resolve(label).ok_or_else(|| SessionError::InvalidChoice {
            question: question.id.clone(),
            label: label.to_string(),
        })?;
        self.pending = None;

        let round = self.round;
        let answer = self.apply_answer(&effect)?;
        self.check_join();
        self.check_flee();
        let pressure = if self.in_progress() {
            Some(self.apply_pressure(self.difficulty))
        } else {
            None
        };
        self.round += 1;

        Ok(TurnReport {
            round,
            question_id: question.id.clone(),
            label: label.to_string(),
            answer,
            pressure,
            state: self.state,
            event: effect.event.clone(),
        })
    }

    /// Apply an answer's effect: stance, rapport, turn budget, relax.
    pub fn apply_answer(&mut self, effect: &Effect) -> Result<AnswerReport, SessionError> {
        if !self.in_progress() {
            return Err(SessionError::NotInProgress);
        }
        let stance_before = self.player.stance_alignment;
        let distance_before = self.distance();
        let rapport_before = self.rapport;

        self.player.stance_alignment.shift(effect.delta_law_chaos, effect.delta_light_dark);

        let reaction = self.demon.react(effect);
        self.rapport = self.bounds.clamp(self.rapport.saturating_add(reaction.delta_rapport));
        self.tolerance_shift = self.tolerance_shift.saturating_add(reaction.delta_tolerance);

        self.turns_left = self.turns_left.saturating_sub(1);
        self.player.relax_stance(1);

        let report = AnswerReport {
            delta_law_chaos: effect.delta_law_chaos,
            delta_light_dark: effect.delta_light_dark,
            delta_rapport: reaction.delta_rapport,
            stance_before,
            stance_after: self.player.stance_alignment,
            rapport_before,
            rapport_after: self.rapport,
            distance_before,
            distance_after: self.distance(),
            turns_left: self.turns_left,
            tags: effect.tags.clone(),
            tone: Tone::from_delta(reaction.delta_rapport),
        };
        debug!(
            "answer applied: stance {} -> {}, rapport {} -> {}, turns left {}",
            report.stance_before, report.stance_after, report.rapport_before, report.rapport_after, self.turns_left
        );
        Ok(report)
    }

    /// Recruit when the stance is close enough AND rapport is high enough.
    ///
    /// Returns whether the demon is (now) recruited.
    pub fn check_join(&mut self) -> bool {
        if self.in_progress()
            && self.distance() <= self.tolerance()
            && self.rapport >= self.demon.rapport_needed
        {
            self.end(SessionState::Recruited);
        }
        self.recruited()
    }

    /// Flee when the stance is far beyond tolerance or patience is spent.
    ///
    /// A session that already ended (including by recruitment) is left alone.
    pub fn check_flee(&mut self) -> bool {
        if self.in_progress() {
            if self.distance() > self.tolerance().saturating_add(2) {
                self.end(SessionState::Fled(FleeReason::TooFar));
            } else if self.turns_left == 0 {
                self.end(SessionState::Fled(FleeReason::OutOfPatience));
            }
        }
        self.fled()
    }

    /// Difficulty pressure: erode rapport, maybe push the stance away.
    pub(crate) fn apply_pressure(&mut self, level: u8) -> PressureReport {
        let mut report = PressureReport { level, ..PressureReport::default() };
        if !self.in_progress() {
            return report;
        }

        let drop = self.rng.gen_range(0..=i32::from(level / 2));
        let before = self.rapport;
        self.rapport = self.rapport.saturating_sub(drop).max(self.bounds.min);
        report.rapport_lost = before - self.rapport;

        if self.rng.gen_bool(f64::from(level) / 10.0) {
            if let Some(&axis) = Axis::ALL.choose(&mut self.rng) {
                let anchor = self.demon.alignment;
                if self.player.stance_alignment.step_away(&anchor, axis) {
                    report.nudged = Some(axis);
                }
            }
        }

        if report.rapport_lost > 0 || report.nudged.is_some() {
            debug!("pressure level {}: rapport -{}, nudged {:?}", level, report.rapport_lost, report.nudged);
        }
        report
    }

    /// Guess-the-number banter. Touches rapport only.
    pub fn play_minigame(&mut self, guess: u8) -> Result<MinigameOutcome, SessionError> {
        if !self.in_progress() {
            return Err(SessionError::NotInProgress);
        }
        if !minigame::is_valid_guess(guess) {
            return Err(SessionError::InvalidGuess(guess));
        }
        let secret = minigame::draw_secret(&mut self.rng);
        let rapport_before = self.rapport;
        self.rapport = minigame::score_guess(self.rapport, guess == secret, &self.bounds);
        Ok(MinigameOutcome { guess, secret, rapport_before, rapport_after: self.rapport })
    }

    /// Whim to raise after an answered turn: the event the answer linked,
    /// otherwise a random draw from `table`.
    pub fn whim_after(&mut self, report: &TurnReport, table: &WhimTable) -> Option<Whim> {
        match report.event.as_deref() {
            Some(id) => match table.event(id) {
                Some(entry) => self.raise_whim(entry),
                None => {
                    debug!("answer linked unknown event '{}'", id);
                    None
                }
            },
            None => self.maybe_whim(table),
        }
    }

    /// Roll for a random whim with this demon's odds.
    pub fn maybe_whim(&mut self, table: &WhimTable) -> Option<Whim> {
        if !self.in_progress() {
            return None;
        }
        let chance = table.chance_for(self.demon.personality);
        if chance <= 0.0 || !self.rng.gen_bool(chance) {
            return None;
        }
        let entry = table.draw(&*self.player, &mut self.rng)?;
        self.raise_whim(entry)
    }

    /// Fire a specific whim, unless the session is over or the player
    /// cannot be asked for it.
    pub fn raise_whim(&mut self, entry: &WhimEntry) -> Option<Whim> {
        if !self.in_progress() || !entry.is_offered_to(&*self.player) {
            return None;
        }
        let whim = entry.instantiate(&mut self.rng);
        debug!("{} raises whim '{}'", self.demon.name, whim.id);
        Some(whim)
    }

    /// Settle a whim. `accept` is ignored for traps.
    ///
    /// Rapport stays clamped; a join can only happen through `check_join`.
    pub fn resolve_whim(&mut self, whim: &Whim, accept: bool) -> Result<WhimOutcome, SessionError> {
        if !self.in_progress() {
            return Err(SessionError::NotInProgress);
        }
        let rapport_before = self.rapport;
        let mut accepted = false;
        let mut gold_paid = 0;
        let mut items_given = 0;

        match &whim.kind {
            WhimKind::AskGold { amount, pay_rapport, refuse_rapport } => {
                if accept && self.player.spend_gold(*amount) {
                    accepted = true;
                    gold_paid = *amount;
                    self.shift_rapport(*pay_rapport);
                } else {
                    self.shift_rapport(refuse_rapport.saturating_neg());
                }
            }
            WhimKind::AskItem { item, amount, consume, give_rapport, decline_rapport } => {
                let held = self.player.has_item(item, *amount);
                if accept && held && (!*consume || self.player.remove_item(item, *amount)) {
                    accepted = true;
                    items_given = if *consume { (*amount).max(1) } else { 0 };
                    self.shift_rapport(*give_rapport);
                } else {
                    self.shift_rapport(decline_rapport.saturating_neg());
                }
            }
            WhimKind::Trap { penalty_rapport, flee_chance } => {
                self.shift_rapport(penalty_rapport.saturating_abs().saturating_neg());
                let chance = if flee_chance.is_nan() { 0.0 } else { flee_chance.clamp(0.0, 1.0) };
                if chance > 0.0 && self.rng.gen_bool(chance) {
                    self.end(SessionState::Fled(FleeReason::Tricked));
                }
            }
        }

        if whim.kind.is_demand() {
            if accepted && whim.join_on_accept {
                self.check_join();
            } else if !accepted && whim.flee_on_refuse {
                self.end(SessionState::Fled(FleeReason::Refused));
            }
        }

        debug!(
            "whim '{}' settled: accepted {}, rapport {} -> {}",
            whim.id, accepted, rapport_before, self.rapport
        );
        Ok(WhimOutcome {
            whim_id: whim.id.clone(),
            accepted,
            gold_paid,
            items_given,
            rapport_before,
            rapport_after: self.rapport,
            state: self.state,
        })
    }

    fn shift_rapport(&mut self, delta: i32) {
        self.rapport = self.bounds.clamp(self.rapport.saturating_add(delta));
    }

    /// Explicit "close the deal" attempt outside the turn cycle.
    pub fn attempt_join(&mut self) -> Result<bool, SessionError> {
        if !self.in_progress() {
            return Err(SessionError::NotInProgress);
        }
        Ok(self.check_join())
    }

    /// End the talk voluntarily.
    pub fn say_goodbye(&mut self) -> Result<(), SessionError> {
        if !self.in_progress() {
            return Err(SessionError::NotInProgress);
        }
        self.end(SessionState::Fled(FleeReason::Farewell));
        Ok(())
    }

    /// Move a recruited demon into the roster and off the market.
    ///
    /// Idempotent. Returns whether the roster changed.
    pub fn finalize_join(&mut self) -> bool {
        if !self.recruited() {
            return false;
        }
        self.demon.available = false;
        let added = self.player.recruit(&*self.demon);
        if added {
            info!("{} joined the roster ({} total)", self.demon.name, self.player.roster().len());
        }
        added
    }

    /// Why the demon left, if it did. Changes nothing.
    pub fn finalize_flee(&self) -> Option<FleeReason> {
        match self.state {
            SessionState::Fled(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            round: self.round,
            turns_left: self.turns_left,
            rapport: self.rapport,
            rapport_needed: self.demon.rapport_needed,
            stance: self.player.stance_alignment,
            demon_name: self.demon.name.clone(),
            demon_alignment: self.demon.alignment,
            distance: self.distance(),
            tolerance: self.tolerance(),
            gold: self.player.gold(),
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            demon_name: self.demon.name.clone(),
            core: *self.player.core_alignment(),
            final_stance: self.player.stance_alignment,
            final_distance: self.distance(),
            state: self.state,
            rounds_played: self.rounds_played(),
            roster: self.player.roster().iter().map(|d| d.name.clone()).collect(),
        }
    }

    fn end(&mut self, state: SessionState) {
        if self.state.is_terminal() {
            return;
        }
        self.state = state;
        self.pending = None;
        match state {
            SessionState::Recruited => info!("{} agreed to join after {} rounds", self.demon.name, self.round),
            SessionState::Fled(reason) => info!("{} left: {:?}", self.demon.name, reason),
            SessionState::Active => {}
        }
    }
}

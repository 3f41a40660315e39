//! Automated balance harness.
//!
//! Runs N scripted negotiations per demon with different seeds and reports
//! how often each demon is recruited, why it flees, and how long talks last.

use std::collections::BTreeMap;

use clap::ValueEnum;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::alignment::Alignment;
use crate::config::GameConfig;
use crate::data::GameData;
use crate::error::{ConfigError, SessionError};
use crate::negotiation::{
    Demon, FleeReason, NegotiationSession, Player, Question, SessionSettings, SessionState, Whim, WhimKind,
    WhimTable,
};

/// How the scripted player picks answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AnswerPolicy {
    /// Answer that leaves the stance closest to the demon; rapport breaks ties.
    Greedy,
    /// Uniformly random answer.
    Random,
}

impl AnswerPolicy {
    /// Label of the chosen answer. `None` only for a question without choices.
    pub fn choose<'q>(
        &self,
        question: &'q Question,
        stance: Alignment,
        target: Alignment,
        rng: &mut ChaCha8Rng,
    ) -> Option<&'q str> {
        let choice = match self {
            AnswerPolicy::Greedy => question.choices.iter().min_by_key(|c| {
                let mut after = stance;
                after.shift(c.effect.delta_law_chaos, c.effect.delta_light_dark);
                (after.distance(&target), -c.effect.delta_rapport)
            }),
            AnswerPolicy::Random => question.choices.choose(rng),
        };
        choice.map(|c| c.label.as_str())
    }

    /// Whether to meet a whim's demand. Greedy pays whenever it can.
    pub fn accept_whim(&self, whim: &Whim, player: &Player, rng: &mut ChaCha8Rng) -> bool {
        let affordable = match &whim.kind {
            WhimKind::AskGold { amount, .. } => player.gold() >= *amount,
            WhimKind::AskItem { item, amount, .. } => player.has_item(item, *amount),
            WhimKind::Trap { .. } => false,
        };
        match self {
            AnswerPolicy::Greedy => affordable,
            AnswerPolicy::Random => affordable && rng.gen_bool(0.5),
        }
    }
}

/// Configuration for a batch of scripted runs.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    pub name: String,
    pub game: GameConfig,
    pub difficulty: u8,
    pub policy: AnswerPolicy,
    pub core: Alignment,
    /// Whims raised between turns; an empty table disables them.
    pub whims: WhimTable,
    pub num_runs: u32,
    pub base_seed: u64,
}

/// Outcome of one scripted session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunRecord {
    pub seed: u64,
    pub state: SessionState,
    pub rounds: u32,
    pub whims: u32,
}

/// All runs against one demon.
#[derive(Clone, Debug)]
pub struct DemonResults {
    pub demon_name: String,
    pub runs: Vec<RunRecord>,
}

impl DemonResults {
    pub fn recruitment_rate(&self) -> f32 {
        if self.runs.is_empty() {
            return 0.0;
        }
        let recruited = self.runs.iter().filter(|r| r.state == SessionState::Recruited).count();
        recruited as f32 / self.runs.len() as f32
    }

    /// Flee counts keyed by reason name, in a stable order.
    pub fn flee_breakdown(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for run in &self.runs {
            if let SessionState::Fled(reason) = run.state {
                *counts.entry(format!("{:?}", reason)).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn mean_whims(&self) -> f32 {
        if self.runs.is_empty() {
            return 0.0;
        }
        self.runs.iter().map(|r| r.whims as f32).sum::<f32>() / self.runs.len() as f32
    }

    pub fn mean_rounds(&self) -> f32 {
        if self.runs.is_empty() {
            return 0.0;
        }
        self.runs.iter().map(|r| r.rounds as f32).sum::<f32>() / self.runs.len() as f32
    }
}

/// Results collected from a batch.
#[derive(Clone, Debug)]
pub struct BatchResults {
    pub name: String,
    pub difficulty: u8,
    pub policy: AnswerPolicy,
    pub per_demon: Vec<DemonResults>,
}

impl BatchResults {
    pub fn total_runs(&self) -> usize {
        self.per_demon.iter().map(|d| d.runs.len()).sum()
    }

    /// Report aggregate results.
    pub fn report(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!(
            "=== Batch: {} (difficulty {}, {:?} answers, {} runs) ===\n",
            self.name,
            self.difficulty,
            self.policy,
            self.total_runs()
        ));
        for demon in &self.per_demon {
            s.push_str(&format!(
                "  {:<12} recruited {:>5.1}%  mean rounds {:.2}  whims {:.2}\n",
                demon.demon_name,
                demon.recruitment_rate() * 100.0,
                demon.mean_rounds(),
                demon.mean_whims()
            ));
            for (reason, count) in demon.flee_breakdown() {
                s.push_str(&format!("      fled {:<20} {}\n", reason, count));
            }
        }
        s
    }
}

/// Play one session to the end with a scripted policy.
pub fn run_session(
    player: &mut Player,
    demon: &mut Demon,
    pool: &[Question],
    whims: &WhimTable,
    settings: SessionSettings,
    policy: AnswerPolicy,
) -> Result<RunRecord, ConfigError> {
    let seed = settings.seed;
    let mut picker = ChaCha8Rng::seed_from_u64(seed.rotate_left(32));
    let mut session = NegotiationSession::new(player, demon, pool, settings)?;
    let mut whim_count = 0;

    while session.in_progress() {
        let question = match session.ask() {
            Ok(question) => question,
            Err(SessionError::QuestionsExhausted) => break,
            Err(e) => {
                debug!("scripted session stopped: {}", e);
                break;
            }
        };
        let stance = session.player().stance();
        let target = session.demon().alignment;
        let Some(label) = policy.choose(question, stance, target, &mut picker) else {
            break;
        };
        let report = match session.answer(label) {
            Ok(report) => report,
            Err(e) => {
                debug!("scripted answer rejected: {}", e);
                break;
            }
        };
        if let Some(whim) = session.whim_after(&report, whims) {
            whim_count += 1;
            let accept = policy.accept_whim(&whim, session.player(), &mut picker);
            if let Err(e) = session.resolve_whim(&whim, accept) {
                debug!("scripted whim rejected: {}", e);
            }
        }
    }

    session.finalize_join();
    Ok(RunRecord { seed, state: session.state(), rounds: session.rounds_played(), whims: whim_count })
}

/// Run `num_runs` sessions against every demon in the catalog.
pub fn run_batch(config: &BatchConfig, data: &GameData) -> Result<BatchResults, ConfigError> {
    let mut per_demon = Vec::with_capacity(data.demons.len());

    for template in &data.demons {
        let mut runs = Vec::with_capacity(config.num_runs as usize);
        for run in 0..config.num_runs {
            let seed = config.base_seed.wrapping_add(u64::from(run));
            let purse = &config.game.player;
            let mut player = Player::new(config.core).with_purse(purse.starting_gold, &purse.starting_items);
            let mut demon = template.clone();
            let settings = SessionSettings::from_config(&config.game, config.difficulty, seed);
            runs.push(run_session(&mut player, &mut demon, &data.questions, &config.whims, settings, config.policy)?);
        }
        let results = DemonResults { demon_name: template.name.clone(), runs };
        info!(
            "{}: {} runs, {:.1}% recruited",
            results.demon_name,
            results.runs.len(),
            results.recruitment_rate() * 100.0
        );
        per_demon.push(results);
    }

    Ok(BatchResults {
        name: config.name.clone(),
        difficulty: config.difficulty,
        policy: config.policy,
        per_demon,
    })
}

/// Share of all runs that ended with `reason`.
pub fn flee_share(results: &BatchResults, reason: FleeReason) -> f32 {
    let total = results.total_runs();
    if total == 0 {
        return 0.0;
    }
    let fled = results
        .per_demon
        .iter()
        .flat_map(|d| d.runs.iter())
        .filter(|r| r.state == SessionState::Fled(reason))
        .count();
    fled as f32 / total as f32
}

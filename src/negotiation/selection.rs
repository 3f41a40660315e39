//! Question selection strategies.
//!
//! The session asks a [`QuestionSelector`] which pool entry the demon
//! raises next. The default [`UniformSelector`] draws uniformly without
//! replacement; personality-aware strategies implement the same trait.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::demon::Demon;
use super::question::Question;

/// What to do once every question in the pool has been asked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExhaustionPolicy {
    /// Forget what was asked and draw from the full pool again.
    #[default]
    Recycle,
    /// Report exhaustion; the session ends with the demon leaving.
    Flee,
}

/// Read-only session state handed to a selector.
#[derive(Clone, Copy, Debug)]
pub struct SelectionContext<'a> {
    pub demon: &'a Demon,
    pub round: u32,
    pub turns_left: u32,
    pub rapport: i32,
    /// Ids asked so far in this session.
    pub asked: &'a HashSet<String>,
}

/// Result of a selection, as an index into the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// A question not asked before in this session.
    Fresh(usize),
    /// The pool ran dry and was recycled; the asked set must be cleared.
    Recycled(usize),
    /// Nothing left to ask.
    Exhausted,
}

/// Chooses the next question for a demon to ask.
pub trait QuestionSelector {
    fn select(&mut self, pool: &[Question], ctx: &SelectionContext<'_>, rng: &mut ChaCha8Rng) -> Selection;
}

/// Uniform draw among unasked questions.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformSelector {
    pub on_exhausted: ExhaustionPolicy,
}

impl UniformSelector {
    pub fn new(on_exhausted: ExhaustionPolicy) -> Self {
        Self { on_exhausted }
    }
}

impl QuestionSelector for UniformSelector {
    fn select(&mut self, pool: &[Question], ctx: &SelectionContext<'_>, rng: &mut ChaCha8Rng) -> Selection {
        let unasked: Vec<usize> = (0..pool.len())
            .filter(|&i| !ctx.asked.contains(&pool[i].id))
            .collect();

        if let Some(&idx) = unasked.choose(rng) {
            return Selection::Fresh(idx);
        }

        match self.on_exhausted {
            ExhaustionPolicy::Recycle => {
                let all: Vec<usize> = (0..pool.len()).collect();
                all.choose(rng).map_or(Selection::Exhausted, |&idx| Selection::Recycled(idx))
            }
            ExhaustionPolicy::Flee => Selection::Exhausted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::Alignment;
    use crate::negotiation::demon::Personality;
    use crate::negotiation::question::{Choice, Effect};
    use rand::SeedableRng;

    fn pool(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| Question {
                id: format!("q{}", i),
                text: format!("Question {}", i),
                choices: vec![Choice { label: "Ok".into(), effect: Effect::default() }],
                tags: Vec::new(),
            })
            .collect()
    }

    fn demon() -> Demon {
        Demon::new("Pixie", Alignment::new(1, 2), Personality::Playful)
    }

    #[test]
    fn test_never_repeats_until_exhausted() {
        let pool = pool(4);
        let demon = demon();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut selector = UniformSelector::new(ExhaustionPolicy::Flee);
        let mut asked = HashSet::new();

        for _ in 0..4 {
            let ctx = SelectionContext { demon: &demon, round: 1, turns_left: 4, rapport: 0, asked: &asked };
            match selector.select(&pool, &ctx, &mut rng) {
                Selection::Fresh(idx) => assert!(asked.insert(pool[idx].id.clone())),
                other => panic!("unexpected selection {:?}", other),
            }
        }

        let ctx = SelectionContext { demon: &demon, round: 5, turns_left: 0, rapport: 0, asked: &asked };
        assert_eq!(selector.select(&pool, &ctx, &mut rng), Selection::Exhausted);
    }

    #[test]
    fn test_recycle_after_exhaustion() {
        let pool = pool(2);
        let demon = demon();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut selector = UniformSelector::default();
        let asked: HashSet<String> = pool.iter().map(|q| q.id.clone()).collect();
        let ctx = SelectionContext { demon: &demon, round: 3, turns_left: 2, rapport: 0, asked: &asked };

        assert!(matches!(selector.select(&pool, &ctx, &mut rng), Selection::Recycled(i) if i < 2));
    }

    #[test]
    fn test_empty_pool_is_exhausted() {
        let demon = demon();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let asked = HashSet::new();
        let ctx = SelectionContext { demon: &demon, round: 1, turns_left: 1, rapport: 0, asked: &asked };
        assert_eq!(UniformSelector::default().select(&[], &ctx, &mut rng), Selection::Exhausted);
    }

    #[test]
    fn test_selection_covers_pool() {
        let pool = pool(3);
        let demon = demon();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut selector = UniformSelector::default();
        let asked = HashSet::new();
        let mut seen = [false; 3];
        for _ in 0..200 {
            let ctx = SelectionContext { demon: &demon, round: 1, turns_left: 1, rapport: 0, asked: &asked };
            if let Selection::Fresh(idx) = selector.select(&pool, &ctx, &mut rng) {
                seen[idx] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }
}

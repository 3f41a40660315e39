//! Whims: demands and tricks a demon springs between turns.
//!
//! A whim is drawn from a weighted table after an answered turn, or raised
//! directly when an answer links an event. It moves rapport, gold, and
//! items only; stance, turns, and rounds are untouched. Resolving one is
//! handled by the session so recruitment still goes through `check_join`.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::demon::Personality;
use super::player::Player;

fn one_i32() -> i32 {
    1
}

fn one_u32() -> u32 {
    1
}

fn yes() -> bool {
    true
}

/// What the demon wants, with concrete amounts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WhimKind {
    /// Pay gold or lose rapport.
    AskGold {
        #[serde(default = "one_u32")]
        amount: u32,
        #[serde(default = "one_i32")]
        pay_rapport: i32,
        #[serde(default = "one_i32")]
        refuse_rapport: i32,
    },
    /// Hand over items or lose rapport.
    AskItem {
        item: String,
        #[serde(default = "one_u32")]
        amount: u32,
        /// Whether giving removes the items from the inventory.
        #[serde(default = "yes")]
        consume: bool,
        #[serde(default = "one_i32")]
        give_rapport: i32,
        #[serde(default = "one_i32")]
        decline_rapport: i32,
    },
    /// A prank: rapport drops and the demon may vanish.
    Trap {
        #[serde(default)]
        penalty_rapport: i32,
        /// Probability in `[0, 1]` that the demon leaves.
        #[serde(default)]
        flee_chance: f64,
    },
}

impl WhimKind {
    /// Demands need a yes/no from the player; traps just happen.
    pub fn is_demand(&self) -> bool {
        !matches!(self, WhimKind::Trap { .. })
    }
}

/// One whim template as written in `whims.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WhimEntry {
    pub id: String,
    /// What the demon says when the whim fires.
    #[serde(default)]
    pub message: String,
    /// Relative draw weight; zero never fires at random.
    #[serde(default = "one_u32")]
    pub weight: u32,
    /// `[low, high]` drawn per firing; replaces `amount` on demands.
    #[serde(default)]
    pub amount_range: Option<[u32; 2]>,
    /// Item demands are only raised when the player could meet them.
    #[serde(default)]
    pub only_if_has_item: bool,
    /// Meeting the demand triggers a join check.
    #[serde(default)]
    pub join_on_accept: bool,
    /// Refusing the demand makes the demon leave.
    #[serde(default)]
    pub flee_on_refuse: bool,
    #[serde(flatten)]
    pub kind: WhimKind,
}

impl WhimEntry {
    /// Whether this whim may be raised against `player` right now.
    pub fn is_offered_to(&self, player: &Player) -> bool {
        match &self.kind {
            WhimKind::AskItem { item, amount, .. } if self.only_if_has_item => player.has_item(item, *amount),
            _ => true,
        }
    }

    /// Fix the amount for one firing.
    pub fn instantiate(&self, rng: &mut ChaCha8Rng) -> Whim {
        let mut kind = self.kind.clone();
        if let Some([a, b]) = self.amount_range {
            let drawn = rng.gen_range(a.min(b)..=a.max(b));
            match &mut kind {
                WhimKind::AskGold { amount, .. } | WhimKind::AskItem { amount, .. } => *amount = drawn,
                WhimKind::Trap { .. } => {}
            }
        }
        Whim {
            id: self.id.clone(),
            message: self.message.clone(),
            join_on_accept: self.join_on_accept,
            flee_on_refuse: self.flee_on_refuse,
            kind,
        }
    }
}

/// A fired whim waiting for the player's decision.
#[derive(Clone, Debug, PartialEq)]
pub struct Whim {
    pub id: String,
    pub message: String,
    pub join_on_accept: bool,
    pub flee_on_refuse: bool,
    pub kind: WhimKind,
}

/// Whim odds, the random pool, and answer-linked events.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhimTable {
    /// Chance per answered turn that a random whim fires.
    pub base_chance: f64,
    /// Personality name -> added chance.
    pub personality_mod: HashMap<String, f64>,
    /// Drawn at random by weight.
    pub entries: Vec<WhimEntry>,
    /// Only raised when an answer links them by id.
    pub events: Vec<WhimEntry>,
}

impl WhimTable {
    /// Firing chance for a personality, clamped to `[0, 1]`.
    pub fn chance_for(&self, personality: Personality) -> f64 {
        let bonus = self
            .personality_mod
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(personality.name()))
            .map_or(0.0, |(_, &bonus)| bonus);
        let chance = self.base_chance + bonus;
        if chance.is_nan() {
            0.0
        } else {
            chance.clamp(0.0, 1.0)
        }
    }

    pub fn event(&self, id: &str) -> Option<&WhimEntry> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Weighted draw among entries offered to `player`.
    pub fn draw(&self, player: &Player, rng: &mut ChaCha8Rng) -> Option<&WhimEntry> {
        let offered: Vec<&WhimEntry> = self.entries.iter().filter(|e| e.is_offered_to(player)).collect();
        offered.choose_weighted(rng, |e| e.weight).ok().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::Alignment;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn table() -> WhimTable {
        serde_json::from_str(
            r#"{
                "base_chance": 0.2,
                "personality_mod": {"cunning": 0.5, "PROUD": -0.9},
                "entries": [
                    {"id": "tribute", "kind": "ask_gold", "amount_range": [2, 4], "weight": 3},
                    {"id": "bead", "kind": "ask_item", "item": "Bead", "only_if_has_item": true},
                    {"id": "never", "kind": "trap", "weight": 0, "flee_chance": 1.0}
                ],
                "events": [{"id": "toll", "kind": "ask_gold", "amount": 3, "join_on_accept": true}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_json_defaults() {
        let table = table();
        let bead = &table.entries[1];
        assert_eq!(bead.weight, 1);
        assert_eq!(
            bead.kind,
            WhimKind::AskItem { item: "Bead".into(), amount: 1, consume: true, give_rapport: 1, decline_rapport: 1 }
        );
        assert!(table.event("toll").unwrap().join_on_accept);
        assert!(table.event("tribute").is_none());
    }

    #[test]
    fn test_chance_uses_personality_and_clamps() {
        let table = table();
        assert!((table.chance_for(Personality::Playful) - 0.2).abs() < 1e-9);
        assert!((table.chance_for(Personality::Cunning) - 0.7).abs() < 1e-9);
        assert_eq!(table.chance_for(Personality::Proud), 0.0);
        let broken = WhimTable { base_chance: f64::NAN, ..WhimTable::default() };
        assert_eq!(broken.chance_for(Personality::Moody), 0.0);
    }

    #[test]
    fn test_amount_range_is_drawn() {
        let table = table();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..30 {
            match table.entries[0].instantiate(&mut rng).kind {
                WhimKind::AskGold { amount, .. } => assert!((2..=4).contains(&amount)),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_draw_skips_unmet_item_demands_and_zero_weights() {
        let table = table();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let empty = Player::new(Alignment::default());
        for _ in 0..40 {
            assert_eq!(table.draw(&empty, &mut rng).unwrap().id, "tribute");
        }

        let rich = Player::new(Alignment::default()).with_purse(0, &BTreeMap::from([("bead".to_string(), 1)]));
        let mut seen_bead = false;
        for _ in 0..200 {
            let id = &table.draw(&rich, &mut rng).unwrap().id;
            assert_ne!(id, "never");
            seen_bead |= id == "bead";
        }
        assert!(seen_bead);
    }

    #[test]
    fn test_empty_pool_draws_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(WhimTable::default().draw(&Player::new(Alignment::default()), &mut rng).is_none());
    }
}

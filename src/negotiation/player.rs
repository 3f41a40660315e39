//! The human side of the negotiation.

use std::collections::BTreeMap;

use crate::alignment::Alignment;
use super::demon::{canonical_id, Demon};

/// The player: a fixed core alignment, a negotiating stance, a roster,
/// and the purse demons make demands on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    core_alignment: Alignment,
    pub(crate) stance_alignment: Alignment,
    roster: Vec<Demon>,
    gold: u32,
    /// Canonical item id -> count. Counts are never zero.
    inventory: BTreeMap<String, u32>,
}

impl Player {
    /// New player whose stance starts at their core, with an empty purse.
    pub fn new(core_alignment: Alignment) -> Self {
        Self {
            core_alignment,
            stance_alignment: core_alignment,
            roster: Vec::new(),
            gold: 0,
            inventory: BTreeMap::new(),
        }
    }

    /// Starting gold and items.
    pub fn with_purse(mut self, gold: u32, items: &BTreeMap<String, u32>) -> Self {
        self.gold = gold;
        for (name, &count) in items {
            self.add_item(name, count);
        }
        self
    }

    pub fn core_alignment(&self) -> &Alignment {
        &self.core_alignment
    }

    /// Current negotiating stance.
    pub fn stance(&self) -> Alignment {
        self.stance_alignment
    }

    pub fn gold(&self) -> u32 {
        self.gold
    }

    /// Pay `amount` if the purse covers it. Returns whether it was paid.
    pub fn spend_gold(&mut self, amount: u32) -> bool {
        match self.gold.checked_sub(amount) {
            Some(left) => {
                self.gold = left;
                true
            }
            None => false,
        }
    }

    pub fn inventory(&self) -> &BTreeMap<String, u32> {
        &self.inventory
    }

    pub fn add_item(&mut self, name: &str, count: u32) {
        let id = canonical_id(name);
        if id.is_empty() || count == 0 {
            return;
        }
        let held = self.inventory.entry(id).or_insert(0);
        *held = held.saturating_add(count);
    }

    pub fn item_count(&self, name: &str) -> u32 {
        self.inventory.get(&canonical_id(name)).copied().unwrap_or(0)
    }

    /// At least `count` (minimum one) of the item.
    pub fn has_item(&self, name: &str, count: u32) -> bool {
        self.item_count(name) >= count.max(1)
    }

    /// Take `count` (minimum one) of the item. Returns whether it was held.
    pub fn remove_item(&mut self, name: &str, count: u32) -> bool {
        let id = canonical_id(name);
        let need = count.max(1);
        let Some(held) = self.inventory.get_mut(&id) else {
            return false;
        };
        if *held < need {
            return false;
        }
        *held -= need;
        if *held == 0 {
            self.inventory.remove(&id);
        }
        true
    }

    /// Recruited demons in recruitment order.
    pub fn roster(&self) -> &[Demon] {
        &self.roster
    }

    pub fn has_recruited(&self, demon_id: &str) -> bool {
        self.roster.iter().any(|d| d.id == demon_id)
    }

    /// Add a demon unless one with the same id is already there.
    /// Returns whether the roster changed.
    pub fn recruit(&mut self, demon: &Demon) -> bool {
        if self.has_recruited(&demon.id) {
            return false;
        }
        self.roster.push(demon.clone());
        true
    }

    /// Drift the stance back toward the core by `step` per axis.
    pub fn relax_stance(&mut self, step: i32) {
        let core = self.core_alignment;
        self.stance_alignment.step_toward(&core, step);
    }

    /// Put the stance back on the core, e.g. between sessions.
    pub fn reset_stance(&mut self) {
        self.stance_alignment = self.core_alignment;
    }
}

//! Two-axis ideological alignment.
//!
//! Both the player and every demon carry an [`Alignment`]. Negotiation
//! outcomes are decided by the Manhattan distance between two of them.

use serde::{Deserialize, Serialize};

/// Lowest value either axis can take.
pub const AXIS_MIN: i32 = -5;
/// Highest value either axis can take.
pub const AXIS_MAX: i32 = 5;

/// One of the two alignment axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    LawChaos,
    LightDark,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::LawChaos, Axis::LightDark];

    /// Short label used in status lines.
    pub fn label(&self) -> &'static str {
        match self {
            Axis::LawChaos => "LC",
            Axis::LightDark => "LD",
        }
    }
}

/// Law/Chaos and Light/Dark position, each axis in `[AXIS_MIN, AXIS_MAX]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Alignment {
    pub(crate) law_chaos: i32,
    pub(crate) light_dark: i32,
}

impl Alignment {
    /// Build an alignment, clamping out-of-range input.
    pub fn new(law_chaos: i32, light_dark: i32) -> Self {
        let mut a = Self { law_chaos, light_dark };
        a.clamp();
        a
    }

    /// Build an alignment only when both axes are already in range.
    pub fn checked(law_chaos: i32, light_dark: i32) -> Option<Self> {
        let a = Self { law_chaos, light_dark };
        a.in_range().then_some(a)
    }

    pub fn law_chaos(&self) -> i32 {
        self.law_chaos
    }

    pub fn light_dark(&self) -> i32 {
        self.light_dark
    }

    pub fn in_range(&self) -> bool {
        (AXIS_MIN..=AXIS_MAX).contains(&self.law_chaos) && (AXIS_MIN..=AXIS_MAX).contains(&self.light_dark)
    }

    /// Force both axes back into range.
    pub fn clamp(&mut self) {
        self.law_chaos = self.law_chaos.clamp(AXIS_MIN, AXIS_MAX);
        self.light_dark = self.light_dark.clamp(AXIS_MIN, AXIS_MAX);
    }

    /// Manhattan distance to `other`.
    pub fn distance(&self, other: &Alignment) -> i32 {
        (self.law_chaos - other.law_chaos).abs() + (self.light_dark - other.light_dark).abs()
    }

    /// Add per-axis deltas, then clamp.
    pub fn shift(&mut self, delta_law_chaos: i32, delta_light_dark: i32) {
        self.law_chaos = self.law_chaos.saturating_add(delta_law_chaos);
        self.light_dark = self.light_dark.saturating_add(delta_light_dark);
        self.clamp();
    }

    pub fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::LawChaos => self.law_chaos,
            Axis::LightDark => self.light_dark,
        }
    }

    /// Set one axis, clamping the result.
    pub fn set(&mut self, axis: Axis, value: i32) {
        match axis {
            Axis::LawChaos => self.law_chaos = value,
            Axis::LightDark => self.light_dark = value,
        }
        self.clamp();
    }

    /// Move each axis up to `step` units toward `target`. Never overshoots.
    pub fn step_toward(&mut self, target: &Alignment, step: i32) {
        let step = step.max(0);
        for axis in Axis::ALL {
            let current = self.get(axis);
            let goal = target.get(axis);
            let gap = goal - current;
            let moved = gap.signum() * gap.abs().min(step);
            self.set(axis, current + moved);
        }
    }

    /// Move one unit along `axis` away from `anchor`.
    ///
    /// Returns false when the axis already matches the anchor (no direction
    /// increases distance uniquely) or when the bound blocks the move.
    pub fn step_away(&mut self, anchor: &Alignment, axis: Axis) -> bool {
        let current = self.get(axis);
        let pivot = anchor.get(axis);
        let direction = (current - pivot).signum();
        if direction == 0 {
            return false;
        }
        self.set(axis, current + direction);
        self.get(axis) != current
    }
}

impl std::fmt::Display for Alignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.law_chaos, self.light_dark)
    }
}

//! Game-over detection
//!
//! `Active` → `Over` is one-way. Any contact with the hazard strip ends the
//! game, including a ball that only passes through it at spawn time.

use serde::{Deserialize, Serialize};

use super::membership::MembershipTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DetectorState {
    #[default]
    Active,
    Over,
}

#[derive(Debug, Clone, Default)]
pub struct GameOverDetector {
    state: DetectorState,
}

impl GameOverDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state == DetectorState::Over
    }

    /// Inspect the tags of one contact pair.
    ///
    /// Returns true exactly once: on the contact that ends the game.
    pub fn observe(&mut self, a: MembershipTag, b: MembershipTag) -> bool {
        if self.is_over() {
            return false;
        }
        if a.is_hazard() || b.is_hazard() {
            self.state = DetectorState::Over;
            return true;
        }
        false
    }
}

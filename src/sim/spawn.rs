//! Spawn controller: which rank the player drops next

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::rank::{Rank, RankLadder};

/// Picks the rank for each manual drop
///
/// Only the first `droppable` ranks are ever offered; larger ranks can only
/// be produced by merging.
#[derive(Debug, Clone)]
pub struct SpawnController {
    ladder: RankLadder,
    droppable: usize,
    current: usize,
    rng: Pcg32,
}

impl SpawnController {
    /// `droppable` is clamped to `1..=ladder.len()`. The first drop is always
    /// rank 0.
    pub fn new(ladder: RankLadder, droppable: usize, seed: u64) -> Self {
        Self {
            ladder,
            droppable: droppable.clamp(1, ladder.len()),
            current: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Rank queued for the next drop
    pub fn current_rank(&self) -> &'static Rank {
        self.ladder.rank_at_clamped(self.current)
    }

    /// Size of the droppable prefix
    pub fn droppable(&self) -> usize {
        self.droppable
    }

    /// Re-roll the queued rank, uniformly over the droppable prefix.
    ///
    /// Called once per drop, after the drop has been issued.
    pub fn advance(&mut self) -> &'static Rank {
        self.current = self.rng.random_range(0..self.droppable);
        log::trace!("next drop rank {}", self.current);
        self.current_rank()
    }
}

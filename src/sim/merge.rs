//! Merge resolution
//!
//! Two balls of the same rank that touch are replaced by a single ball of the
//! next rank at their midpoint. Resolution is read-only: it inspects the body
//! table and the world's positions and returns effects for the session to
//! apply once the whole step has been examined.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bodies::BodyTable;
use super::membership::MembershipCodec;
use super::rank::RankLadder;
use super::world::{BodyId, ContactPair, PhysicsWorld};

/// Contact handling errors
///
/// Never fatal: a pair that fails is skipped for the step and logged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactError {
    /// The physics world and the body table disagree about a body
    #[error("contact references body {0}, which the session or the world does not know")]
    InvalidContact(BodyId),
}

/// Remove both parents, then spawn one ball of `rank` at `position`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergeEffect {
    pub removed: [BodyId; 2],
    /// Shared rank of the two parents
    pub source_rank: usize,
    /// Rank of the ball to spawn
    pub rank: usize,
    pub position: Vec2,
}

/// Effects collected for one step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeBatch {
    pub effects: Vec<MergeEffect>,
    /// Pairs dropped because of a `ContactError`
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct MergeResolver {
    ladder: RankLadder,
    codec: MembershipCodec,
}

impl Default for MergeResolver {
    fn default() -> Self {
        Self::new(RankLadder::standard())
    }
}

impl MergeResolver {
    pub fn new(ladder: RankLadder) -> Self {
        Self {
            ladder,
            codec: MembershipCodec::new(ladder),
        }
    }

    /// Decide a single pair.
    ///
    /// `consumed` holds bodies already removed by an earlier effect this step;
    /// a pair touching one of them never merges again.
    pub fn resolve_pair<W: PhysicsWorld + ?Sized>(
        &self,
        pair: ContactPair,
        bodies: &BodyTable,
        world: &W,
        consumed: &HashSet<BodyId>,
    ) -> Result<Option<MergeEffect>, ContactError> {
        if pair.a == pair.b || consumed.contains(&pair.a) || consumed.contains(&pair.b) {
            return Ok(None);
        }

        let tag_a = bodies
            .tag_of(pair.a, &self.codec)
            .ok_or(ContactError::InvalidContact(pair.a))?;
        let tag_b = bodies
            .tag_of(pair.b, &self.codec)
            .ok_or(ContactError::InvalidContact(pair.b))?;

        // Floor and wall contacts never merge
        if self.codec.is_boundary(tag_a) || self.codec.is_boundary(tag_b) {
            return Ok(None);
        }

        let (Some(rank_a), Some(rank_b)) = (self.codec.rank_of(tag_a), self.codec.rank_of(tag_b))
        else {
            return Ok(None);
        };
        if rank_a != rank_b {
            return Ok(None);
        }

        let pos_a = world
            .position(pair.a)
            .ok_or(ContactError::InvalidContact(pair.a))?;
        let pos_b = world
            .position(pair.b)
            .ok_or(ContactError::InvalidContact(pair.b))?;

        Ok(Some(MergeEffect {
            removed: [pair.a, pair.b],
            source_rank: rank_a,
            rank: self.ladder.next_index(rank_a),
            position: (pos_a + pos_b) * 0.5,
        }))
    }

    /// Decide every pair of one step, in order.
    pub fn resolve_step<W: PhysicsWorld + ?Sized>(
        &self,
        pairs: &[ContactPair],
        bodies: &BodyTable,
        world: &W,
    ) -> MergeBatch {
        let mut batch = MergeBatch::default();
        let mut consumed = HashSet::new();

        for &pair in pairs {
            match self.resolve_pair(pair, bodies, world, &consumed) {
                Ok(Some(effect)) => {
                    consumed.extend(effect.removed);
                    batch.effects.push(effect);
                }
                Ok(None) => {}
                Err(err) => {
                    log::warn!("skipping contact {} <-> {}: {err}", pair.a, pair.b);
                    batch.skipped += 1;
                }
            }
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bodies::BodyClass;
    use crate::sim::rank::{LADDER, LADDER_LEN};
    use crate::sim::sandbox::SandboxWorld;
    use crate::sim::world::BodySpec;
    use proptest::prelude::*;

    struct Fixture {
        world: SandboxWorld,
        bodies: BodyTable,
        codec: MembershipCodec,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                world: SandboxWorld::new(Vec2::ZERO),
                bodies: BodyTable::new(),
                codec: MembershipCodec::default(),
            }
        }

        fn ball(&mut self, rank: usize, position: Vec2) -> BodyId {
            let spec = BodySpec::ball(
                position,
                LADDER[rank].radius,
                self.codec.ball_filter(&LADDER[rank]),
            );
            let id = self.world.spawn(spec);
            self.bodies.insert(id, BodyClass::Ball { rank });
            id
        }

        fn floor(&mut self) -> BodyId {
            let spec = BodySpec::wall(
                Vec2::new(0.0, 500.0),
                Vec2::new(1000.0, 10.0),
                self.codec.boundary_filter(),
            );
            let id = self.world.spawn(spec);
            self.bodies.insert(id, BodyClass::Boundary);
            id
        }

        fn resolve(&self, pairs: &[ContactPair]) -> MergeBatch {
            MergeResolver::default().resolve_step(pairs, &self.bodies, &self.world)
        }
    }

    #[test]
    fn test_same_rank_merges_at_midpoint() {
        let mut fx = Fixture::new();
        let a = fx.ball(1, Vec2::new(100.0, 200.0));
        let b = fx.ball(1, Vec2::new(150.0, 240.0));

        let batch = fx.resolve(&[ContactPair::new(a, b)]);
        assert_eq!(batch.skipped, 0);
        assert_eq!(
            batch.effects,
            vec![MergeEffect {
                removed: [a, b],
                source_rank: 1,
                rank: 2,
                position: Vec2::new(125.0, 220.0),
            }]
        );
    }

    #[test]
    fn test_top_rank_wraps_to_smallest() {
        let mut fx = Fixture::new();
        let a = fx.ball(10, Vec2::new(0.0, 0.0));
        let b = fx.ball(10, Vec2::new(240.0, 0.0));

        let batch = fx.resolve(&[ContactPair::new(a, b)]);
        assert_eq!(batch.effects.len(), 1);
        assert_eq!(batch.effects[0].rank, 0);
        assert_eq!(batch.effects[0].source_rank, 10);
    }

    #[test]
    fn test_different_ranks_do_not_merge() {
        let mut fx = Fixture::new();
        let a = fx.ball(2, Vec2::ZERO);
        let b = fx.ball(3, Vec2::X * 90.0);
        assert!(fx.resolve(&[ContactPair::new(a, b)]).effects.is_empty());
    }

    #[test]
    fn test_boundary_contact_does_not_merge() {
        let mut fx = Fixture::new();
        let floor = fx.floor();
        let ball = fx.ball(0, Vec2::new(0.0, 480.0));
        let batch = fx.resolve(&[ContactPair::new(ball, floor), ContactPair::new(floor, ball)]);
        assert!(batch.effects.is_empty());
        assert_eq!(batch.skipped, 0);
    }

    #[test]
    fn test_duplicate_contacts_merge_once() {
        let mut fx = Fixture::new();
        let a = fx.ball(0, Vec2::new(0.0, 0.0));
        let b = fx.ball(0, Vec2::new(40.0, 0.0));
        let c = fx.ball(0, Vec2::new(80.0, 0.0));

        // Repeated sub-step pair plus a third ball touching an already-merged one
        let batch = fx.resolve(&[
            ContactPair::new(a, b),
            ContactPair::new(b, a),
            ContactPair::new(b, c),
            ContactPair::new(a, b),
        ]);
        assert_eq!(batch.effects.len(), 1);
        assert_eq!(batch.effects[0].removed, [a, b]);
    }

    #[test]
    fn test_disjoint_pairs_merge_in_same_step() {
        let mut fx = Fixture::new();
        let a = fx.ball(0, Vec2::new(0.0, 0.0));
        let b = fx.ball(0, Vec2::new(40.0, 0.0));
        let c = fx.ball(4, Vec2::new(300.0, 0.0));
        let d = fx.ball(4, Vec2::new(420.0, 0.0));

        let batch = fx.resolve(&[ContactPair::new(a, b), ContactPair::new(c, d)]);
        let ranks: Vec<_> = batch.effects.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 5]);
    }

    #[test]
    fn test_self_pair_is_ignored() {
        let mut fx = Fixture::new();
        let a = fx.ball(0, Vec2::ZERO);
        assert!(fx.resolve(&[ContactPair::new(a, a)]).effects.is_empty());
    }

    #[test]
    fn test_unknown_body_is_skipped_not_fatal() {
        let mut fx = Fixture::new();
        let a = fx.ball(0, Vec2::ZERO);
        let b = fx.ball(0, Vec2::X * 40.0);
        let ghost = BodyId(999);

        let batch = fx.resolve(&[ContactPair::new(a, ghost), ContactPair::new(a, b)]);
        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.effects.len(), 1);

        let resolver = MergeResolver::default();
        assert_eq!(
            resolver.resolve_pair(
                ContactPair::new(ghost, a),
                &fx.bodies,
                &fx.world,
                &HashSet::new()
            ),
            Err(ContactError::InvalidContact(ghost))
        );
    }

    #[test]
    fn test_body_missing_from_world_is_invalid() {
        let mut fx = Fixture::new();
        let a = fx.ball(5, Vec2::ZERO);
        let b = fx.ball(5, Vec2::X * 140.0);
        fx.world.remove(b);

        let batch = fx.resolve(&[ContactPair::new(a, b)]);
        assert!(batch.effects.is_empty());
        assert_eq!(batch.skipped, 1);
    }

    proptest! {
        #[test]
        fn prop_equal_ranks_yield_one_effect(
            rank in 0usize..LADDER_LEN,
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
        ) {
            let mut fx = Fixture::new();
            let a = fx.ball(rank, Vec2::new(ax, ay));
            let b = fx.ball(rank, Vec2::new(bx, by));

            let batch = fx.resolve(&[ContactPair::new(a, b)]);
            prop_assert_eq!(batch.effects.len(), 1);
            let effect = batch.effects[0];
            prop_assert_eq!(effect.removed, [a, b]);
            prop_assert_eq!(effect.rank, RankLadder::standard().next_index(rank));
            let expected = Vec2::new((ax + bx) / 2.0, (ay + by) / 2.0);
            prop_assert!((effect.position - expected).length() < 1e-3);
        }

        #[test]
        fn prop_unequal_ranks_or_boundary_yield_nothing(
            rank_a in 0usize..LADDER_LEN,
            rank_b in 0usize..LADDER_LEN,
        ) {
            let mut fx = Fixture::new();
            let a = fx.ball(rank_a, Vec2::ZERO);
            let b = fx.ball(rank_b, Vec2::X * 50.0);
            let floor = fx.floor();

            let batch = fx.resolve(&[ContactPair::new(a, floor), ContactPair::new(floor, b)]);
            prop_assert!(batch.effects.is_empty());

            let batch = fx.resolve(&[ContactPair::new(a, b)]);
            prop_assert_eq!(batch.effects.is_empty(), rank_a != rank_b);
        }
    }
}

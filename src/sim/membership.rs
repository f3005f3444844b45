//! Collision membership tags
//!
//! Every body in the arena carries exactly one membership tag. Tags are
//! disjoint bit flags: one per rank plus two reserved classes, `boundary`
//! (floor and walls) and `hazard` (the sensor strip along the top).
//!
//! Physical collision is deliberately broader than merge eligibility: a ball
//! may touch the walls and balls of every rank, and the merge rule decides
//! which of those contacts matter.

use std::collections::HashMap;
use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use super::rank::{Rank, RankError, RankLadder};

/// A single membership bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MembershipTag(u32);

impl MembershipTag {
    /// Floor and walls: collide with everything, never merge
    pub const BOUNDARY: Self = Self(0x0001);
    /// Sensor strip near the top, used only for game-over detection
    pub const HAZARD: Self = Self(0x1000);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_boundary(self) -> bool {
        self == Self::BOUNDARY
    }

    #[inline]
    pub fn is_hazard(self) -> bool {
        self == Self::HAZARD
    }
}

impl fmt::Display for MembershipTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// Set of membership tags a body is allowed to touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CollisionMask(u32);

impl CollisionMask {
    pub const NONE: Self = Self(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn contains(self, tag: MembershipTag) -> bool {
        self.0 & tag.bits() != 0
    }
}

impl From<MembershipTag> for CollisionMask {
    fn from(tag: MembershipTag) -> Self {
        Self(tag.bits())
    }
}

impl BitOr<MembershipTag> for CollisionMask {
    type Output = Self;

    fn bitor(self, tag: MembershipTag) -> Self {
        Self(self.0 | tag.bits())
    }
}

impl BitOr for CollisionMask {
    type Output = Self;

    fn bitor(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// Collision configuration handed to the physics world with each new body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionFilter {
    pub membership: MembershipTag,
    pub mask: CollisionMask,
}

impl CollisionFilter {
    /// Two bodies may touch only when each mask admits the other's membership.
    pub fn admits(&self, other: &CollisionFilter) -> bool {
        self.mask.contains(other.membership) && other.mask.contains(self.membership)
    }
}

/// Bidirectional mapping between ranks and membership tags
///
/// The tag → rank table is built once so contact handling never scans the
/// ladder.
#[derive(Debug, Clone)]
pub struct MembershipCodec {
    ladder: RankLadder,
    rank_by_tag: HashMap<MembershipTag, usize>,
    rank_mask: CollisionMask,
}

impl Default for MembershipCodec {
    fn default() -> Self {
        Self::new(RankLadder::standard())
    }
}

impl MembershipCodec {
    pub fn new(ladder: RankLadder) -> Self {
        let mut rank_by_tag = HashMap::with_capacity(ladder.len());
        let mut rank_mask = CollisionMask::NONE;
        for rank in ladder.iter() {
            rank_by_tag.insert(rank.tag, rank.index);
            rank_mask = rank_mask | rank.tag;
        }

        Self {
            ladder,
            rank_by_tag,
            rank_mask,
        }
    }

    pub fn tag_for(&self, rank_index: usize) -> Result<MembershipTag, RankError> {
        self.ladder.rank_at(rank_index).map(|rank| rank.tag)
    }

    /// Rank index owning `tag`; `None` for reserved or unknown tags
    pub fn rank_of(&self, tag: MembershipTag) -> Option<usize> {
        self.rank_by_tag.get(&tag).copied()
    }

    /// What a ball of `rank_index` physically collides with: the boundary and
    /// balls of every rank.
    pub fn merge_mask(&self, rank_index: usize) -> Result<CollisionMask, RankError> {
        self.ladder.rank_at(rank_index)?;
        Ok(self.rank_mask | MembershipTag::BOUNDARY)
    }

    /// Union of every rank's tag
    pub fn rank_mask(&self) -> CollisionMask {
        self.rank_mask
    }

    pub fn is_hazard(&self, tag: MembershipTag) -> bool {
        tag.is_hazard()
    }

    pub fn is_boundary(&self, tag: MembershipTag) -> bool {
        tag.is_boundary()
    }

    /// Filter for a ball of `rank`.
    ///
    /// The merge mask plus the hazard bit, so the sensor strip reports the
    /// ball when it enters.
    pub fn ball_filter(&self, rank: &Rank) -> CollisionFilter {
        CollisionFilter {
            membership: rank.tag,
            mask: self.rank_mask | MembershipTag::BOUNDARY | MembershipTag::HAZARD,
        }
    }

    pub fn boundary_filter(&self) -> CollisionFilter {
        CollisionFilter {
            membership: MembershipTag::BOUNDARY,
            mask: self.rank_mask,
        }
    }

    pub fn hazard_filter(&self) -> CollisionFilter {
        CollisionFilter {
            membership: MembershipTag::HAZARD,
            mask: self.rank_mask,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rank::{LADDER, LADDER_LEN};

    #[test]
    fn test_tags_round_trip_through_codec() {
        let codec = MembershipCodec::default();
        for rank in LADDER.iter() {
            let tag = codec.tag_for(rank.index).unwrap();
            assert_eq!(codec.rank_of(tag), Some(rank.index));
        }
        assert_eq!(codec.tag_for(0).unwrap().bits(), 0x0002);
        assert_eq!(codec.tag_for(10).unwrap().bits(), 0x0800);
    }

    #[test]
    fn test_reserved_tags_have_no_rank() {
        let codec = MembershipCodec::default();
        assert_eq!(codec.rank_of(MembershipTag::BOUNDARY), None);
        assert_eq!(codec.rank_of(MembershipTag::HAZARD), None);
        assert!(codec.is_boundary(MembershipTag::BOUNDARY));
        assert!(!codec.is_boundary(MembershipTag::HAZARD));
        assert!(codec.is_hazard(MembershipTag::HAZARD));
        assert!(!codec.is_hazard(LADDER[3].tag));
    }

    #[test]
    fn test_merge_mask_covers_boundary_and_every_rank() {
        let codec = MembershipCodec::default();
        let mask = codec.merge_mask(4).unwrap();
        assert_eq!(mask.bits(), 0x0FFF);
        assert!(mask.contains(MembershipTag::BOUNDARY));
        assert!(!mask.contains(MembershipTag::HAZARD));
        assert!(LADDER.iter().all(|r| mask.contains(r.tag)));
        // Same mask for every rank
        assert_eq!(codec.merge_mask(0), codec.merge_mask(10));
    }

    #[test]
    fn test_merge_mask_out_of_range() {
        let codec = MembershipCodec::default();
        assert!(matches!(
            codec.merge_mask(LADDER_LEN),
            Err(RankError::OutOfRange { .. })
        ));
        assert!(codec.tag_for(42).is_err());
    }

    #[test]
    fn test_filters_admit_expected_pairs() {
        let codec = MembershipCodec::default();
        let small = codec.ball_filter(&LADDER[0]);
        let big = codec.ball_filter(&LADDER[10]);
        let wall = codec.boundary_filter();
        let hazard = codec.hazard_filter();

        assert!(small.admits(&big));
        assert!(small.admits(&small));
        assert!(small.admits(&wall));
        assert!(big.admits(&hazard));
        // Fixtures never touch each other
        assert!(!wall.admits(&hazard));
        assert!(!wall.admits(&wall));
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(MembershipTag::HAZARD.to_string(), "0x1000");
        assert_eq!(MembershipTag::BOUNDARY.to_string(), "0x0001");
    }
}

//! The rank ladder
//!
//! Ranks are defined once and never change at runtime. A rank's position in
//! the ladder is also its cycle key: merging two balls of the top rank wraps
//! back around to rank 0.

use serde::Serialize;

use super::membership::MembershipTag;

/// Number of ranks in the standard ladder
pub const LADDER_LEN: usize = 11;

/// The standard ladder, smallest first
pub static LADDER: [Rank; LADDER_LEN] = [
    Rank::new(0, 20.0, 0xFF0000),  // red
    Rank::new(1, 30.0, 0xFFA500),  // orange
    Rank::new(2, 40.0, 0xFFFF00),  // yellow
    Rank::new(3, 50.0, 0x00FF00),  // green
    Rank::new(4, 60.0, 0x0000FF),  // blue
    Rank::new(5, 70.0, 0x4B0082),  // indigo
    Rank::new(6, 80.0, 0xEE82EE),  // violet
    Rank::new(7, 90.0, 0xFFC0CB),  // pink
    Rank::new(8, 100.0, 0x00FFFF), // cyan
    Rank::new(9, 110.0, 0x000000), // black
    Rank::new(10, 120.0, 0xFFFFFF),
];

/// Errors raised by ladder lookups and ladder validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RankError {
    #[error("rank index {index} is outside the ladder (length {len})")]
    OutOfRange { index: usize, len: usize },

    #[error("rank ladder is empty")]
    EmptyLadder,

    #[error("rank {index} is stored at ladder position {position}")]
    Misplaced { index: usize, position: usize },

    #[error("rank {index} reuses membership bits of another class ({tag})")]
    OverlappingTag { index: usize, tag: MembershipTag },
}

/// One tier of the ladder
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rank {
    /// Position in the ladder
    pub index: usize,
    /// Ball radius in pixels
    pub radius: f32,
    /// Display colour as 0xRRGGBB; opaque to the rules
    pub color: u32,
    /// Collision membership tag, unique to this rank
    pub tag: MembershipTag,
}

impl Rank {
    /// Rank at `index` with the conventional tag `0x0002 << index`.
    pub const fn new(index: usize, radius: f32, color: u32) -> Self {
        Self::with_tag(index, radius, color, MembershipTag::from_bits(0x0002 << index as u32))
    }

    pub const fn with_tag(index: usize, radius: f32, color: u32, tag: MembershipTag) -> Self {
        Self {
            index,
            radius,
            color,
            tag,
        }
    }

    /// Colour as a CSS-style hex string, e.g. `#FFA500`
    pub fn color_hex(&self) -> String {
        format!("#{:06X}", self.color)
    }
}

/// Read-only view over a validated ladder
///
/// Copying is cheap; every component that needs the ladder holds its own copy.
#[derive(Debug, Clone, Copy)]
pub struct RankLadder {
    ranks: &'static [Rank],
}

impl Default for RankLadder {
    fn default() -> Self {
        Self::standard()
    }
}

impl RankLadder {
    /// The built-in eleven-rank ladder
    pub const fn standard() -> Self {
        Self { ranks: &LADDER }
    }

    /// Validate a custom ladder.
    ///
    /// Every rank must sit at its own index and own a non-zero tag that
    /// overlaps neither another rank nor the reserved boundary/hazard tags.
    pub fn new(ranks: &'static [Rank]) -> Result<Self, RankError> {
        if ranks.is_empty() {
            return Err(RankError::EmptyLadder);
        }

        let mut seen = MembershipTag::BOUNDARY.bits() | MembershipTag::HAZARD.bits();
        for (position, rank) in ranks.iter().enumerate() {
            if rank.index != position {
                return Err(RankError::Misplaced {
                    index: rank.index,
                    position,
                });
            }
            let bits = rank.tag.bits();
            if bits == 0 || bits & seen != 0 {
                return Err(RankError::OverlappingTag {
                    index: rank.index,
                    tag: rank.tag,
                });
            }
            seen |= bits;
        }

        Ok(Self { ranks })
    }

    /// Number of ranks
    #[inline]
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Always false for a validated ladder
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn rank_at(&self, index: usize) -> Result<&'static Rank, RankError> {
        let ranks = self.ranks;
        ranks.get(index).ok_or(RankError::OutOfRange {
            index,
            len: ranks.len(),
        })
    }

    /// Like [`rank_at`](Self::rank_at) but never fails.
    ///
    /// An out-of-range index is a programming error: debug builds abort,
    /// release builds clamp to the top rank.
    pub fn rank_at_clamped(&self, index: usize) -> &'static Rank {
        debug_assert!(
            index < self.ranks.len(),
            "rank index {index} out of range (ladder length {})",
            self.ranks.len()
        );
        let ranks = self.ranks;
        &ranks[index.min(ranks.len() - 1)]
    }

    /// Index reached by merging two balls of rank `index` (wraps at the top)
    #[inline]
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.ranks.len()
    }

    /// The highest rank index
    #[inline]
    pub fn top_index(&self) -> usize {
        self.ranks.len() - 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Rank> + use<> {
        let ranks = self.ranks;
        ranks.iter()
    }
}

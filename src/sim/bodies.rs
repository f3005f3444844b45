//! Body → class lookup owned by the arena session

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::membership::{MembershipCodec, MembershipTag};
use super::world::BodyId;

/// What a body is, as far as the rules are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyClass {
    Boundary,
    Hazard,
    Ball { rank: usize },
}

impl BodyClass {
    /// Membership tag for this class, `None` if the rank is not in the ladder
    pub fn tag(self, codec: &MembershipCodec) -> Option<MembershipTag> {
        match self {
            BodyClass::Boundary => Some(MembershipTag::BOUNDARY),
            BodyClass::Hazard => Some(MembershipTag::HAZARD),
            BodyClass::Ball { rank } => codec.tag_for(rank).ok(),
        }
    }
}

/// A ball currently alive in the world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiveBall {
    pub id: BodyId,
    pub rank: usize,
    pub position: Vec2,
}

/// Lookup from live body identity to its class
#[derive(Debug, Clone, Default)]
pub struct BodyTable {
    classes: HashMap<BodyId, BodyClass>,
}

impl BodyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: BodyId, class: BodyClass) {
        if let Some(previous) = self.classes.insert(id, class) {
            log::warn!("body {id} re-registered ({previous:?} -> {class:?})");
        }
    }

    pub fn remove(&mut self, id: BodyId) -> Option<BodyClass> {
        self.classes.remove(&id)
    }

    pub fn class_of(&self, id: BodyId) -> Option<BodyClass> {
        self.classes.get(&id).copied()
    }

    pub fn tag_of(&self, id: BodyId, codec: &MembershipCodec) -> Option<MembershipTag> {
        self.class_of(id).and_then(|class| class.tag(codec))
    }

    pub fn rank_of(&self, id: BodyId) -> Option<usize> {
        match self.class_of(id)? {
            BodyClass::Ball { rank } => Some(rank),
            _ => None,
        }
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.classes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Ball ids and ranks, ordered by id
    pub fn balls(&self) -> Vec<(BodyId, usize)> {
        let mut balls: Vec<_> = self
            .classes
            .iter()
            .filter_map(|(&id, class)| match class {
                BodyClass::Ball { rank } => Some((id, *rank)),
                _ => None,
            })
            .collect();
        balls.sort_by_key(|(id, _)| *id);
        balls
    }

    /// Remove every entry, returning the ids ordered by id
    pub fn drain(&mut self) -> Vec<BodyId> {
        let mut ids: Vec<_> = self.classes.drain().map(|(id, _)| id).collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_tracks_classes() {
        let codec = MembershipCodec::default();
        let mut table = BodyTable::new();
        table.insert(BodyId(1), BodyClass::Boundary);
        table.insert(BodyId(2), BodyClass::Hazard);
        table.insert(BodyId(7), BodyClass::Ball { rank: 3 });
        table.insert(BodyId(4), BodyClass::Ball { rank: 0 });

        assert_eq!(table.len(), 4);
        assert_eq!(table.tag_of(BodyId(1), &codec), Some(MembershipTag::BOUNDARY));
        assert_eq!(table.tag_of(BodyId(2), &codec), Some(MembershipTag::HAZARD));
        assert_eq!(table.tag_of(BodyId(7), &codec).map(|t| t.bits()), Some(0x0010));
        assert_eq!(table.rank_of(BodyId(1)), None);
        assert_eq!(table.balls(), vec![(BodyId(4), 0), (BodyId(7), 3)]);

        assert_eq!(table.remove(BodyId(7)), Some(BodyClass::Ball { rank: 3 }));
        assert!(!table.contains(BodyId(7)));
        assert_eq!(table.tag_of(BodyId(7), &codec), None);
    }

    #[test]
    fn test_unknown_rank_has_no_tag() {
        let codec = MembershipCodec::default();
        assert_eq!(BodyClass::Ball { rank: 99 }.tag(&codec), None);
    }

    #[test]
    fn test_drain_empties_table() {
        let mut table = BodyTable::new();
        table.insert(BodyId(3), BodyClass::Boundary);
        table.insert(BodyId(1), BodyClass::Ball { rank: 1 });
        assert_eq!(table.drain(), vec![BodyId(1), BodyId(3)]);
        assert!(table.is_empty());
    }
}

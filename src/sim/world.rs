//! The seam between the rules and a physics engine
//!
//! The session never integrates motion or detects collisions itself. It asks
//! a `PhysicsWorld` to create and destroy bodies, reads positions back, and
//! consumes the contact pairs a `ContactSource` reports each tick.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::membership::CollisionFilter;

/// Opaque handle to a body inside the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Two bodies touching during one simulation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactPair {
    pub a: BodyId,
    pub b: BodyId,
}

impl ContactPair {
    pub fn new(a: BodyId, b: BodyId) -> Self {
        Self { a, b }
    }

    pub fn involves(&self, id: BodyId) -> bool {
        self.a == id || self.b == id
    }
}

/// Collision geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BodyShape {
    Circle { radius: f32 },
    /// Axis-aligned rectangle; `size` is full width and height
    Rect { size: Vec2 },
}

/// How a body participates in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyMotion {
    /// Falls under gravity and is pushed by contacts
    Dynamic,
    /// Never moves; pushes dynamic bodies
    Static,
    /// Never moves, never pushes; only reports contacts
    Sensor,
}

/// Everything the world needs to create a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    /// Centre of the body
    pub position: Vec2,
    pub shape: BodyShape,
    pub motion: BodyMotion,
    pub filter: CollisionFilter,
}

impl BodySpec {
    pub fn ball(position: Vec2, radius: f32, filter: CollisionFilter) -> Self {
        Self {
            position,
            shape: BodyShape::Circle { radius },
            motion: BodyMotion::Dynamic,
            filter,
        }
    }

    pub fn wall(center: Vec2, size: Vec2, filter: CollisionFilter) -> Self {
        Self {
            position: center,
            shape: BodyShape::Rect { size },
            motion: BodyMotion::Static,
            filter,
        }
    }

    pub fn sensor(center: Vec2, size: Vec2, filter: CollisionFilter) -> Self {
        Self {
            position: center,
            shape: BodyShape::Rect { size },
            motion: BodyMotion::Sensor,
            filter,
        }
    }
}

/// Body creation, destruction and position queries
pub trait PhysicsWorld {
    fn spawn(&mut self, spec: BodySpec) -> BodyId;

    /// Returns false if the body was already gone
    fn remove(&mut self, id: BodyId) -> bool;

    fn position(&self, id: BodyId) -> Option<Vec2>;
}

/// A world that can be advanced by the host's fixed-rate loop
pub trait ContactSource {
    /// Advance one tick and report every pair touching at the end of it.
    fn step(&mut self, dt: f32) -> Vec<ContactPair>;
}

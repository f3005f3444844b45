//! Deterministic sandbox world
//!
//! A small stand-in for a real physics engine, good enough to run a session
//! headless: dynamic circles fall under gravity and are pushed out of static
//! rectangles and each other. Sensors never push; they only report.
//!
//! Bodies are kept sorted by id, so iteration order and therefore the
//! reported contact order is stable across runs.

use glam::Vec2;

use super::membership::CollisionFilter;
use super::world::{BodyId, BodyMotion, BodyShape, BodySpec, ContactPair, ContactSource, PhysicsWorld};

/// Solid bodies closer than this still count as touching
pub const CONTACT_SLOP: f32 = 0.5;

/// Position correction passes per step
const SOLVER_PASSES: u32 = 4;
/// Fraction of approach speed kept after an impact
const RESTITUTION: f32 = 0.2;
/// Per-step velocity decay
const LINEAR_DAMPING: f32 = 0.995;

#[derive(Debug, Clone)]
struct SandboxBody {
    id: BodyId,
    shape: BodyShape,
    motion: BodyMotion,
    filter: CollisionFilter,
    pos: Vec2,
    vel: Vec2,
}

impl SandboxBody {
    fn is_dynamic(&self) -> bool {
        self.motion == BodyMotion::Dynamic
    }

    fn is_sensor(&self) -> bool {
        self.motion == BodyMotion::Sensor
    }
}

/// Overlap between two bodies
#[derive(Debug, Clone, Copy)]
struct Overlap {
    /// Unit vector pointing from the first body toward the second
    normal: Vec2,
    /// Penetration depth; negative when separated by a gap
    depth: f32,
}

impl Overlap {
    fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            depth: self.depth,
        }
    }
}

fn circle_circle(pa: Vec2, ra: f32, pb: Vec2, rb: f32) -> Overlap {
    let delta = pb - pa;
    let dist = delta.length();
    let normal = if dist > f32::EPSILON {
        delta / dist
    } else {
        Vec2::NEG_Y
    };
    Overlap {
        normal,
        depth: ra + rb - dist,
    }
}

/// Normal points from the rectangle toward the circle.
fn rect_circle(rect_center: Vec2, size: Vec2, center: Vec2, radius: f32) -> Overlap {
    let half = size * 0.5;
    let local = center - rect_center;
    let clamped = local.clamp(-half, half);

    if clamped == local {
        // Centre inside the rectangle: leave through the nearest face
        let gap = half - local.abs();
        if gap.x < gap.y {
            Overlap {
                normal: Vec2::new(local.x.signum(), 0.0),
                depth: radius + gap.x,
            }
        } else {
            Overlap {
                normal: Vec2::new(0.0, local.y.signum()),
                depth: radius + gap.y,
            }
        }
    } else {
        let diff = local - clamped;
        let dist = diff.length();
        Overlap {
            normal: diff / dist,
            depth: radius - dist,
        }
    }
}

fn overlap(a: &SandboxBody, b: &SandboxBody) -> Option<Overlap> {
    match (a.shape, b.shape) {
        (BodyShape::Circle { radius: ra }, BodyShape::Circle { radius: rb }) => {
            Some(circle_circle(a.pos, ra, b.pos, rb))
        }
        (BodyShape::Rect { size }, BodyShape::Circle { radius }) => {
            Some(rect_circle(a.pos, size, b.pos, radius))
        }
        (BodyShape::Circle { radius }, BodyShape::Rect { size }) => {
            Some(rect_circle(b.pos, size, a.pos, radius).flipped())
        }
        (BodyShape::Rect { .. }, BodyShape::Rect { .. }) => None,
    }
}

/// Push `a` and `b` apart along `hit.normal` and cancel their approach speed.
fn separate(a: &mut SandboxBody, b: &mut SandboxBody, hit: Overlap) {
    let n = hit.normal;
    match (a.is_dynamic(), b.is_dynamic()) {
        (true, true) => {
            let push = n * (hit.depth * 0.5);
            a.pos -= push;
            b.pos += push;
            let approach = (b.vel - a.vel).dot(n);
            if approach < 0.0 {
                let impulse = -(1.0 + RESTITUTION) * approach * 0.5;
                a.vel -= n * impulse;
                b.vel += n * impulse;
            }
        }
        (true, false) => {
            a.pos -= n * hit.depth;
            let approach = a.vel.dot(n);
            if approach > 0.0 {
                a.vel -= n * (approach * (1.0 + RESTITUTION));
            }
        }
        (false, true) => {
            b.pos += n * hit.depth;
            let approach = b.vel.dot(n);
            if approach < 0.0 {
                b.vel -= n * (approach * (1.0 + RESTITUTION));
            }
        }
        (false, false) => {}
    }
}

fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert!(i < j);
    let (head, tail) = items.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

/// Minimal fixed-step world used by the binary and the session tests
#[derive(Debug, Clone)]
pub struct SandboxWorld {
    gravity: Vec2,
    bodies: Vec<SandboxBody>,
    next_id: u32,
}

impl Default for SandboxWorld {
    fn default() -> Self {
        Self::new(Vec2::new(0.0, crate::consts::GRAVITY))
    }
}

impl SandboxWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            bodies: Vec::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn velocity(&self, id: BodyId) -> Option<Vec2> {
        self.body(id).map(|b| b.vel)
    }

    /// Ids of every body, ascending
    pub fn ids(&self) -> Vec<BodyId> {
        self.bodies.iter().map(|b| b.id).collect()
    }

    fn index_of(&self, id: BodyId) -> Option<usize> {
        self.bodies.binary_search_by_key(&id, |b| b.id).ok()
    }

    fn body(&self, id: BodyId) -> Option<&SandboxBody> {
        self.index_of(id).map(|i| &self.bodies[i])
    }

    fn integrate(&mut self, dt: f32) {
        for body in self.bodies.iter_mut().filter(|b| b.is_dynamic()) {
            body.vel = (body.vel + self.gravity * dt) * LINEAR_DAMPING;
            body.pos += body.vel * dt;
        }
    }

    fn resolve_overlaps(&mut self) {
        let n = self.bodies.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = pair_mut(&mut self.bodies, i, j);
                if a.is_sensor() || b.is_sensor() || !(a.is_dynamic() || b.is_dynamic()) {
                    continue;
                }
                if !a.filter.admits(&b.filter) {
                    continue;
                }
                if let Some(hit) = overlap(a, b).filter(|hit| hit.depth > 0.0) {
                    separate(a, b, hit);
                }
            }
        }
    }

    fn collect_contacts(&self) -> Vec<ContactPair> {
        let mut pairs = Vec::new();
        for (i, a) in self.bodies.iter().enumerate() {
            for b in &self.bodies[i + 1..] {
                if !(a.is_dynamic() || b.is_dynamic()) || !a.filter.admits(&b.filter) {
                    continue;
                }
                let Some(hit) = overlap(a, b) else {
                    continue;
                };
                // Sensors need a real overlap; solid bodies count resting contact
                let touching = if a.is_sensor() || b.is_sensor() {
                    hit.depth > 0.0
                } else {
                    hit.depth > -CONTACT_SLOP
                };
                if touching {
                    pairs.push(ContactPair::new(a.id, b.id));
                }
            }
        }
        pairs
    }
}

impl PhysicsWorld for SandboxWorld {
    fn spawn(&mut self, spec: BodySpec) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        // Ids only grow, so pushing keeps the list sorted
        self.bodies.push(SandboxBody {
            id,
            shape: spec.shape,
            motion: spec.motion,
            filter: spec.filter,
            pos: spec.position,
            vel: Vec2::ZERO,
        });
        id
    }

    fn remove(&mut self, id: BodyId) -> bool {
        match self.index_of(id) {
            Some(i) => {
                self.bodies.remove(i);
                true
            }
            None => false,
        }
    }

    fn position(&self, id: BodyId) -> Option<Vec2> {
        self.body(id).map(|b| b.pos)
    }
}

impl ContactSource for SandboxWorld {
    fn step(&mut self, dt: f32) -> Vec<ContactPair> {
        self.integrate(dt);
        for _ in 0..SOLVER_PASSES {
            self.resolve_overlaps();
        }
        self.collect_contacts()
    }
}

//! Merge simulation module
//!
//! All gameplay rules live here. Nothing in this module blocks or touches a
//! platform API:
//! - Ranks and tags are fixed at startup
//! - Randomness comes from a seeded RNG only
//! - Body iteration is ordered by id wherever order is observable
//! - Physics is reached only through the `PhysicsWorld` / `ContactSource` seam

pub mod bodies;
pub mod game_over;
pub mod membership;
pub mod merge;
pub mod rank;
pub mod sandbox;
pub mod session;
pub mod spawn;
pub mod world;

pub use bodies::{BodyClass, BodyTable, LiveBall};
pub use game_over::{DetectorState, GameOverDetector};
pub use membership::{CollisionFilter, CollisionMask, MembershipCodec, MembershipTag};
pub use merge::{ContactError, MergeBatch, MergeEffect, MergeResolver};
pub use rank::{LADDER, LADDER_LEN, Rank, RankError, RankLadder};
pub use sandbox::SandboxWorld;
pub use session::{ArenaSession, MergeEvent, StepReport};
pub use spawn::SpawnController;
pub use world::{BodyId, BodyMotion, BodyShape, BodySpec, ContactPair, ContactSource, PhysicsWorld};

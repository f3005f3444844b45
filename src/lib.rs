//! Merge Drop - a merge-on-collision falling-ball puzzle
//!
//! The player drops balls into a walled arena. Two touching balls of the same
//! rank are replaced by one ball of the next rank at their midpoint; a ball
//! touching the hazard strip along the top ends the game.
//!
//! Core modules:
//! - `sim`: Rank ladder, membership tags, merge resolution, game-over
//!   detection and the arena session that drives them
//! - `settings`: Arena layout and tuning, loadable from JSON
//! - `logging`: `env_logger` setup for the binary
//!
//! Rigid-body dynamics are not part of this crate. The session talks to a
//! physics engine through [`sim::PhysicsWorld`] and [`sim::ContactSource`];
//! [`sim::SandboxWorld`] is a small deterministic stand-in for headless runs.

pub mod logging;
pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};
pub use sim::{ArenaSession, StepReport};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Default arena dimensions (pixels, y grows downward)
    pub const ARENA_WIDTH: f32 = 640.0;
    pub const ARENA_HEIGHT: f32 = 960.0;
    /// Thickness of the floor and side walls
    pub const WALL_THICKNESS: f32 = 10.0;
    /// Height of the hazard sensor strip along the top edge
    pub const HAZARD_THICKNESS: f32 = 10.0;

    /// Height at which manual drops enter the arena
    pub const DROP_HEIGHT: f32 = 100.0;
    /// Downward acceleration used by the sandbox world (pixels/s²)
    pub const GRAVITY: f32 = 981.0;

    /// Number of ranks (from the bottom of the ladder) the player may drop
    pub const DROPPABLE_RANKS: usize = 8;
}

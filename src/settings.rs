//! Arena settings
//!
//! Persisted as JSON. Every field has a default, so a settings file only
//! needs the values it overrides.

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::RankLadder;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to access settings file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Arena layout and tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Inner width of the arena including walls (pixels)
    pub arena_width: f32,
    /// Height from the top edge to the bottom of the floor (pixels)
    pub arena_height: f32,
    /// Floor and side wall thickness
    pub wall_thickness: f32,
    /// Height of the hazard strip along the top edge
    pub hazard_thickness: f32,
    /// y coordinate of new drops
    pub drop_height: f32,
    /// Downward acceleration for the sandbox world
    pub gravity: f32,
    /// How many ranks, from the bottom of the ladder, the player may drop
    pub droppable_ranks: usize,
    /// Fixed RNG seed; random when absent
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            wall_thickness: WALL_THICKNESS,
            hazard_thickness: HAZARD_THICKNESS,
            drop_height: DROP_HEIGHT,
            gravity: GRAVITY,
            droppable_ranks: DROPPABLE_RANKS,
            seed: None,
        }
    }
}

impl Settings {
    /// Load and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate(&RankLadder::standard())?;
        Ok(settings)
    }

    /// Write settings as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Check the layout against `ladder`.
    ///
    /// The largest droppable ball must start clear of the hazard strip and
    /// above the floor, and fit between the walls.
    pub fn validate(&self, ladder: &RankLadder) -> Result<(), SettingsError> {
        let dims = [
            ("arena_width", self.arena_width),
            ("arena_height", self.arena_height),
            ("wall_thickness", self.wall_thickness),
            ("hazard_thickness", self.hazard_thickness),
        ];
        for (name, value) in dims {
            if !value.is_finite() || value <= 0.0 {
                return Err(SettingsError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !self.gravity.is_finite() || !self.drop_height.is_finite() {
            return Err(SettingsError::Invalid(
                "gravity and drop_height must be finite".into(),
            ));
        }

        if self.droppable_ranks == 0 || self.droppable_ranks > ladder.len() {
            return Err(SettingsError::Invalid(format!(
                "droppable_ranks must be within 1..={}, got {}",
                ladder.len(),
                self.droppable_ranks
            )));
        }

        let largest = ladder
            .iter()
            .take(self.droppable_ranks)
            .map(|rank| rank.radius)
            .fold(0.0_f32, f32::max);

        if self.drop_height - largest < self.hazard_thickness {
            return Err(SettingsError::Invalid(format!(
                "drop_height {} puts a radius {largest} ball inside the hazard strip",
                self.drop_height
            )));
        }
        if self.drop_height + largest > self.arena_height - self.wall_thickness {
            return Err(SettingsError::Invalid(format!(
                "drop_height {} puts a radius {largest} ball below the floor",
                self.drop_height
            )));
        }
        if 2.0 * (self.wall_thickness + largest) > self.arena_width {
            return Err(SettingsError::Invalid(format!(
                "arena_width {} cannot fit a radius {largest} ball between the walls",
                self.arena_width
            )));
        }

        Ok(())
    }

    /// Drop point for a pointer at `x`, kept inside the walls for a ball of
    /// `radius`.
    pub fn drop_point(&self, x: f32, radius: f32) -> Vec2 {
        let min = self.wall_thickness + radius;
        let max = self.arena_width - self.wall_thickness - radius;
        let x = if min <= max {
            x.clamp(min, max)
        } else {
            self.arena_width / 2.0
        };
        Vec2::new(x, self.drop_height)
    }
}

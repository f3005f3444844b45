//! Arena session
//!
//! One session is one game. It owns the physics world handle, the body table
//! and the rule components, builds the arena fixtures on construction and
//! removes everything again on teardown. There is no ambient state: two
//! sessions never share anything.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bodies::{BodyClass, BodyTable, LiveBall};
use super::game_over::GameOverDetector;
use super::membership::MembershipCodec;
use super::merge::MergeResolver;
use super::rank::{Rank, RankLadder};
use super::spawn::SpawnController;
use super::world::{BodyId, BodySpec, ContactPair, ContactSource, PhysicsWorld};
use crate::settings::{Settings, SettingsError};

/// A merge that was applied to the world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergeEvent {
    pub removed: [BodyId; 2],
    pub spawned: BodyId,
    pub rank: usize,
    pub position: Vec2,
}

/// Outcome of one `on_step`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub merges: Vec<MergeEvent>,
    /// True only for the step that ended the game
    pub game_over: bool,
    /// Contacts dropped because the world and the body table disagreed
    pub skipped: usize,
}

pub struct ArenaSession<W: PhysicsWorld> {
    world: W,
    settings: Settings,
    ladder: RankLadder,
    codec: MembershipCodec,
    spawner: SpawnController,
    resolver: MergeResolver,
    detector: GameOverDetector,
    bodies: BodyTable,
}

impl<W: PhysicsWorld> ArenaSession<W> {
    /// Start a game on the standard ladder.
    ///
    /// Floor, walls and the hazard strip are created in `world` immediately.
    pub fn new(world: W, settings: Settings, seed: u64) -> Result<Self, SettingsError> {
        Self::with_ladder(world, settings, RankLadder::standard(), seed)
    }

    pub fn with_ladder(
        world: W,
        settings: Settings,
        ladder: RankLadder,
        seed: u64,
    ) -> Result<Self, SettingsError> {
        settings.validate(&ladder)?;

        let mut session = Self {
            world,
            spawner: SpawnController::new(ladder, settings.droppable_ranks, seed),
            settings,
            ladder,
            codec: MembershipCodec::new(ladder),
            resolver: MergeResolver::new(ladder),
            detector: GameOverDetector::new(),
            bodies: BodyTable::new(),
        };
        session.build_arena();

        log::info!(
            "Session started: {}x{} arena, {} droppable ranks, seed {seed}",
            session.settings.arena_width,
            session.settings.arena_height,
            session.spawner.droppable(),
        );
        Ok(session)
    }

    fn build_arena(&mut self) {
        let Settings {
            arena_width: w,
            arena_height: h,
            wall_thickness: wall,
            hazard_thickness: hazard,
            ..
        } = self.settings;

        let boundary = self.codec.boundary_filter();
        let fixtures = [
            // Floor
            BodySpec::wall(
                Vec2::new(w / 2.0, h - wall / 2.0),
                Vec2::new(w, wall),
                boundary,
            ),
            // Left and right walls
            BodySpec::wall(Vec2::new(wall / 2.0, h / 2.0), Vec2::new(wall, h), boundary),
            BodySpec::wall(
                Vec2::new(w - wall / 2.0, h / 2.0),
                Vec2::new(wall, h),
                boundary,
            ),
        ];
        for spec in fixtures {
            let id = self.world.spawn(spec);
            self.bodies.insert(id, BodyClass::Boundary);
        }

        let strip = BodySpec::sensor(
            Vec2::new(w / 2.0, hazard / 2.0),
            Vec2::new(w, hazard),
            self.codec.hazard_filter(),
        );
        let id = self.world.spawn(strip);
        self.bodies.insert(id, BodyClass::Hazard);
    }

    fn spawn_ball(&mut self, rank: &Rank, position: Vec2) -> BodyId {
        let spec = BodySpec::ball(position, rank.radius, self.codec.ball_filter(rank));
        let id = self.world.spawn(spec);
        self.bodies.insert(id, BodyClass::Ball { rank: rank.index });
        id
    }

    /// Drop the queued rank at `position` and queue the next one.
    ///
    /// Returns `None` once the game is over.
    pub fn on_drop(&mut self, position: Vec2) -> Option<BodyId> {
        if self.is_game_over() {
            log::debug!("drop at {position} ignored: game over");
            return None;
        }

        let rank = self.spawner.current_rank();
        let id = self.spawn_ball(rank, position);
        let next = self.spawner.advance();
        log::debug!(
            "dropped rank {} as {id} at {position}, next rank {}",
            rank.index,
            next.index
        );
        Some(id)
    }

    /// Apply one tick's contact pairs.
    ///
    /// Hazard contacts are checked first; if the game ends this step no merge
    /// from the same step is applied.
    pub fn on_step(&mut self, pairs: &[ContactPair]) -> StepReport {
        let mut report = StepReport::default();
        if self.is_game_over() {
            return report;
        }

        for pair in pairs {
            let (Some(a), Some(b)) = (
                self.bodies.tag_of(pair.a, &self.codec),
                self.bodies.tag_of(pair.b, &self.codec),
            ) else {
                continue;
            };
            if self.detector.observe(a, b) {
                log::info!(
                    "Game over: {} <-> {} touched the hazard strip ({} balls in play)",
                    pair.a,
                    pair.b,
                    self.ball_count()
                );
                report.game_over = true;
                return report;
            }
        }

        let batch = self.resolver.resolve_step(pairs, &self.bodies, &self.world);
        report.skipped = batch.skipped;

        for effect in batch.effects {
            for id in effect.removed {
                self.world.remove(id);
                self.bodies.remove(id);
            }
            let rank = self.ladder.rank_at_clamped(effect.rank);
            let spawned = self.spawn_ball(rank, effect.position);
            log::debug!(
                "merged {} + {} (rank {}) into {spawned} (rank {}) at {}",
                effect.removed[0],
                effect.removed[1],
                effect.source_rank,
                effect.rank,
                effect.position
            );
            report.merges.push(MergeEvent {
                removed: effect.removed,
                spawned,
                rank: effect.rank,
                position: effect.position,
            });
        }

        report
    }

    pub fn is_game_over(&self) -> bool {
        self.detector.is_over()
    }

    /// Rank queued for the next drop, for the UI preview
    pub fn next_rank(&self) -> &'static Rank {
        self.spawner.current_rank()
    }

    pub fn rank_of(&self, id: BodyId) -> Option<usize> {
        self.bodies.rank_of(id)
    }

    pub fn ball_count(&self) -> usize {
        self.bodies.balls().len()
    }

    /// Every live ball with its current position, ordered by id
    pub fn balls(&self) -> Vec<LiveBall> {
        self.bodies
            .balls()
            .into_iter()
            .filter_map(|(id, rank)| {
                let position = self.world.position(id)?;
                Some(LiveBall { id, rank, position })
            })
            .collect()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Remove every body this session created and hand the world back.
    pub fn teardown(mut self) -> W {
        let ids = self.bodies.drain();
        for id in &ids {
            self.world.remove(*id);
        }
        log::info!("Session torn down ({} bodies removed)", ids.len());
        self.world
    }
}

impl<W: PhysicsWorld + ContactSource> ArenaSession<W> {
    /// Step the world one tick and apply its contacts.
    pub fn advance(&mut self, dt: f32) -> StepReport {
        let pairs = self.world.step(dt);
        self.on_step(&pairs)
    }
}

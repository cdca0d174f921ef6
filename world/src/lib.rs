#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Delve.
//!
//! The [`World`] owns the installed level, the agent's pose and in-flight
//! motion, the bot's path bookkeeping, the discovery map, and the overlay
//! toggle. It changes only through [`apply`], which reports every observable
//! change as an [`Event`]. Systems read it through the [`query`] module.

mod discovery;
mod motion;

use std::time::Duration;

use delve_core::{
    normalize_degrees, shortest_angle_delta, BotMotion, BotRejection, BotState, CellCoord,
    CellKind, Command, Event, GenerationError, InputOrigin, Level, MotionConfig, MoveDirection,
    MoveRejection, MovementPolicy, PlayerMovement, Pose, SearchStrategy, TurnDirection,
};

use discovery::DiscoveryMap;
use motion::{scaled, Motion};

const QUARTER_TURN_DEGREES: f32 = 90.0;
const SPAWN_HEADING_DEGREES: f32 = 0.0;

/// Bot bookkeeping owned by the world.
#[derive(Clone, Debug)]
struct BotRecord {
    enabled: bool,
    strategy: SearchStrategy,
    state: BotState,
    path: Vec<CellCoord>,
    cursor: usize,
}

impl BotRecord {
    fn new() -> Self {
        Self {
            enabled: false,
            strategy: SearchStrategy::Exploration,
            state: BotState::Off,
            path: Vec::new(),
            cursor: 0,
        }
    }

    fn switch_off(&mut self) {
        self.enabled = false;
        self.state = BotState::Off;
        self.path.clear();
        self.cursor = 0;
    }
}

/// Represents the authoritative Delve world state.
#[derive(Debug)]
pub struct World {
    level: Level,
    discovery: DiscoveryMap,
    pose: Pose,
    motion: Motion,
    motion_config: MotionConfig,
    policy: MovementPolicy,
    bot: BotRecord,
    map_visible: bool,
    exit_latched: bool,
    clock: Duration,
}

impl World {
    /// Creates an empty world that waits for its first level.
    #[must_use]
    pub fn new() -> Self {
        Self {
            level: Level::empty(),
            discovery: DiscoveryMap::default(),
            pose: Pose::default(),
            motion: Motion::default(),
            motion_config: MotionConfig::default(),
            policy: MovementPolicy::default(),
            bot: BotRecord::new(),
            map_visible: false,
            exit_latched: false,
            clock: Duration::ZERO,
        }
    }

    fn install_level(&mut self, level: Level, out_events: &mut Vec<Event>) {
        if let Err(reason) = level.validate() {
            log::warn!("refusing unplayable level: {reason}");
            out_events.push(Event::LevelRejected { reason });
            return;
        }
        let Some(spawn) = level.spawn() else {
            out_events.push(Event::LevelRejected {
                reason: GenerationError::NoRoomsPlaced,
            });
            return;
        };

        let (columns, rows) = level.grid().dimensions();
        let seed = level.seed();
        let rooms = level.rooms().len();

        self.level = level;
        self.discovery = DiscoveryMap::new(columns, rows);
        self.pose = Pose::at_cell_center(spawn, SPAWN_HEADING_DEGREES);
        self.motion.clear();
        self.bot.switch_off();
        self.map_visible = false;
        self.exit_latched = false;

        log::info!("installed level with {rooms} rooms, spawn at {spawn:?}");
        out_events.push(Event::LevelInstalled { seed, spawn, rooms });
        out_events.push(Event::PoseSettled { pose: self.pose });
    }

    /// Publishes the settled pose and latches the exit if it was reached.
    fn settle(&mut self, out_events: &mut Vec<Event>) {
        out_events.push(Event::PoseSettled { pose: self.pose });

        if self.exit_latched || self.motion.is_animating() {
            return;
        }
        let Some(cell) = self.pose.cell() else {
            return;
        };
        if self.level.grid().kind(cell) == Some(CellKind::Exit) {
            self.exit_latched = true;
            log::info!("exit reached at {cell:?}");
            out_events.push(Event::ExitReached { cell });
        }
    }

    fn advance_clock(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.clock = self.clock.saturating_add(dt);
        out_events.push(Event::TimeAdvanced {
            dt,
            now: self.clock,
        });

        if !self.motion.is_animating() {
            return;
        }
        let (pose, finished) = self.motion.sample(self.clock, self.pose);
        self.pose = pose;
        if finished {
            self.settle(out_events);
        }
    }

    fn move_player(&mut self, direction: MoveDirection, out_events: &mut Vec<Event>) {
        out_events.push(Event::ManualInputObserved);
        if self.motion.is_animating() {
            out_events.push(Event::MoveRejected {
                reason: MoveRejection::Animating,
            });
            return;
        }

        let heading = self.pose.heading_degrees() + direction.heading_offset();
        let destination = match self.policy.player {
            PlayerMovement::Discrete => self
                .pose
                .cell()
                .and_then(|cell| step_towards(cell, heading))
                .map(CellCoord::center),
            PlayerMovement::Continuous => {
                let (dx, dz) = self.pose.with_heading(heading).forward();
                let step = self.motion_config.continuous_step;
                Some((self.pose.x() + dx * step, self.pose.z() + dz * step))
            }
        };

        let view = self.level.view();
        let buffer = self.motion_config.collision_buffer;
        let Some((x, z)) = destination.filter(|(x, z)| view.is_walkable_point(*x, *z, buffer))
        else {
            out_events.push(Event::MoveRejected {
                reason: MoveRejection::Blocked,
            });
            return;
        };

        match self.policy.player {
            PlayerMovement::Discrete => {
                let duration = self.motion_config.step_duration;
                self.motion.translate(self.clock, duration, self.pose, x, z);
                if duration.is_zero() {
                    self.finish_now(out_events);
                }
            }
            PlayerMovement::Continuous => {
                self.pose = self.pose.with_position(x, z);
                self.settle(out_events);
            }
        }
    }

    fn turn_player(&mut self, direction: TurnDirection, out_events: &mut Vec<Event>) {
        out_events.push(Event::ManualInputObserved);
        if self.motion.is_animating() {
            out_events.push(Event::MoveRejected {
                reason: MoveRejection::Animating,
            });
            return;
        }

        let delta = match direction {
            TurnDirection::Left => -QUARTER_TURN_DEGREES,
            TurnDirection::Right => QUARTER_TURN_DEGREES,
        };
        match self.policy.player {
            PlayerMovement::Discrete => {
                let duration = self.motion_config.rotation_duration;
                self.motion.rotate(self.clock, duration, self.pose, delta);
                if duration.is_zero() {
                    self.finish_now(out_events);
                }
            }
            PlayerMovement::Continuous => {
                self.pose = self.pose.with_heading(self.pose.heading_degrees() + delta);
                self.settle(out_events);
            }
        }
    }

    fn rotate_bot(&mut self, heading_degrees: f32, out_events: &mut Vec<Event>) {
        if !self.bot.enabled || self.motion.is_animating() {
            return;
        }
        self.bot.state = BotState::Rotating;

        let delta = shortest_angle_delta(self.pose.heading_degrees(), heading_degrees);
        let duration = match self.policy.bot {
            BotMotion::Instant => Duration::ZERO,
            BotMotion::Interpolated => scaled(
                self.motion_config.rotation_duration,
                delta.abs() / QUARTER_TURN_DEGREES,
            ),
        };
        self.motion.rotate(self.clock, duration, self.pose, delta);
        if duration.is_zero() {
            self.finish_now(out_events);
        }
    }

    fn advance_bot(&mut self, target: CellCoord, out_events: &mut Vec<Event>) {
        if !self.bot.enabled || self.motion.is_animating() {
            return;
        }
        let (x, z) = target.center();
        let view = self.level.view();
        if !view.is_walkable(target)
            || !view.is_walkable_point(x, z, self.motion_config.collision_buffer)
        {
            log::debug!("ignoring bot advance into blocked cell {target:?}");
            return;
        }
        self.bot.state = BotState::Advancing;

        let distance = (x - self.pose.x()).hypot(z - self.pose.z());
        let duration = match self.policy.bot {
            BotMotion::Instant => Duration::ZERO,
            BotMotion::Interpolated => scaled(self.motion_config.step_duration, distance),
        };
        self.motion.translate(self.clock, duration, self.pose, x, z);
        if duration.is_zero() {
            self.finish_now(out_events);
        }
    }

    /// Completes zero-length motion without waiting for the next tick.
    fn finish_now(&mut self, out_events: &mut Vec<Event>) {
        let (pose, finished) = self.motion.sample(self.clock, self.pose);
        self.pose = pose;
        if finished {
            self.settle(out_events);
        }
    }

    fn set_bot_mode(
        &mut self,
        enabled: bool,
        strategy: SearchStrategy,
        origin: InputOrigin,
        out_events: &mut Vec<Event>,
    ) {
        if origin == InputOrigin::Manual {
            out_events.push(Event::ManualInputObserved);
        }
        if self.bot.enabled == enabled && self.bot.strategy == strategy {
            return;
        }

        if enabled {
            self.bot.enabled = true;
            self.bot.strategy = strategy;
            self.bot.state = BotState::Rotating;
            self.bot.path.clear();
            self.bot.cursor = 0;
        } else {
            self.bot.strategy = strategy;
            self.bot.switch_off();
        }
        log::info!(
            "bot {} with {} strategy",
            if enabled { "enabled" } else { "disabled" },
            strategy.label()
        );
        out_events.push(Event::BotModeChanged {
            enabled,
            strategy,
            origin,
        });
    }

    fn abort_bot(&mut self, reason: BotRejection, out_events: &mut Vec<Event>) {
        if !self.bot.enabled {
            return;
        }
        self.bot.switch_off();
        out_events.push(Event::BotAborted { reason });
        out_events.push(Event::BotModeChanged {
            enabled: false,
            strategy: self.bot.strategy,
            origin: InputOrigin::Automatic,
        });
    }

    fn set_map_visible(&mut self, visible: bool, origin: InputOrigin, out_events: &mut Vec<Event>) {
        if origin == InputOrigin::Manual && !self.bot.enabled {
            out_events.push(Event::ManualInputObserved);
        }
        if origin == InputOrigin::Automatic && self.map_visible == visible {
            return;
        }
        self.map_visible = visible;
        out_events.push(Event::MapVisibilityChanged { visible, origin });
    }

    fn reveal_cells(&mut self, cells: Vec<CellCoord>, out_events: &mut Vec<Event>) {
        let newly = cells
            .into_iter()
            .filter(|cell| self.discovery.reveal(*cell))
            .count();
        if newly > 0 {
            out_events.push(Event::CellsDiscovered { newly });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Neighbouring cell along the cardinal direction nearest to `heading`.
fn step_towards(cell: CellCoord, heading: f32) -> Option<CellCoord> {
    let quadrant = (normalize_degrees(heading) / QUARTER_TURN_DEGREES).round() as u32 % 4;
    let [north, east, south, west] = cell.orthogonal();
    match quadrant {
        0 => south,
        1 => east,
        2 => north,
        _ => west,
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::InstallLevel { level } => world.install_level(level, out_events),
        Command::RequestRegeneration => out_events.push(Event::RegenerationRequested),
        Command::ConfigureMotion { config } => world.motion_config = config,
        Command::SetMovementPolicy { policy } => world.policy = policy,
        Command::Tick { dt } => world.advance_clock(dt, out_events),
        Command::MovePlayer { direction } => world.move_player(direction, out_events),
        Command::TurnPlayer { direction } => world.turn_player(direction, out_events),
        Command::SetBotMode {
            enabled,
            strategy,
            origin,
        } => world.set_bot_mode(enabled, strategy, origin, out_events),
        Command::AbortBot { reason } => world.abort_bot(reason, out_events),
        Command::SetBotPath { path } => {
            if world.bot.enabled {
                let length = path.len();
                world.bot.path = path;
                world.bot.cursor = 0;
                out_events.push(Event::BotPathAssigned { length });
            }
        }
        Command::AdvancePathCursor => {
            if world.bot.enabled {
                world.bot.cursor = world.bot.cursor.saturating_add(1);
            }
        }
        Command::RotateBot { heading_degrees } => world.rotate_bot(heading_degrees, out_events),
        Command::AdvanceBot { target } => world.advance_bot(target, out_events),
        Command::SetMapVisible { visible, origin } => {
            world.set_map_visible(visible, origin, out_events)
        }
        Command::RevealCells { cells } => world.reveal_cells(cells, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use delve_core::{
        BotSnapshot, DiscoveryView, GridView, Level, MotionConfig, MovementPolicy, Pose,
    };

    /// Provides read-only access to the installed level.
    #[must_use]
    pub fn level(world: &World) -> &Level {
        &world.level
    }

    /// Captures a walkable-neighbour view over the installed level.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        world.level.view()
    }

    /// Current pose of the agent, mid-animation values included.
    #[must_use]
    pub fn pose(world: &World) -> Pose {
        world.pose
    }

    /// Exposes the per-cell discovery flags.
    #[must_use]
    pub fn discovery_view(world: &World) -> DiscoveryView<'_> {
        world.discovery.view()
    }

    /// Captures the bot's navigation state together with the agent's pose.
    #[must_use]
    pub fn bot_snapshot(world: &World) -> BotSnapshot {
        BotSnapshot {
            enabled: world.bot.enabled,
            strategy: world.bot.strategy,
            state: world.bot.state,
            path: world.bot.path.clone(),
            cursor: world.bot.cursor,
            pose: world.pose,
            animating: world.motion.is_animating(),
        }
    }

    /// Reports whether the full-map overlay is shown.
    #[must_use]
    pub fn map_visible(world: &World) -> bool {
        world.map_visible
    }

    /// Reports whether a translation or rotation is in flight.
    #[must_use]
    pub fn is_animating(world: &World) -> bool {
        world.motion.is_animating()
    }

    /// Total simulated time since the world was created.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Timings and tolerances currently used by the motion layer.
    #[must_use]
    pub fn motion_config(world: &World) -> MotionConfig {
        world.motion_config
    }

    /// Movement policy currently applied to manual and bot motion.
    #[must_use]
    pub fn movement_policy(world: &World) -> MovementPolicy {
        world.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_core::{Grid, Room};

    fn corridor_level() -> Level {
        let grid = Grid::from_ascii(&["#######", "#....E#", "#######"]);
        let room = Room::from_origin_and_size(CellCoord::new(1, 1), 1, 1);
        Level::from_grid(grid, vec![room])
    }

    fn installed_world() -> (World, Vec<Event>) {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::InstallLevel {
                level: corridor_level(),
            },
            &mut events,
        );
        (world, events)
    }

    #[test]
    fn install_level_places_agent_at_first_room_center() {
        let (world, events) = installed_world();

        assert_eq!(
            events,
            vec![
                Event::LevelInstalled {
                    seed: None,
                    spawn: CellCoord::new(1, 1),
                    rooms: 1,
                },
                Event::PoseSettled {
                    pose: Pose::new(1.5, 1.5, 0.0),
                },
            ]
        );
        assert_eq!(query::pose(&world).cell(), Some(CellCoord::new(1, 1)));
        assert_eq!(query::discovery_view(&world).count(), 0);
    }

    #[test]
    fn unplayable_level_is_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::InstallLevel {
                level: Level::empty(),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::LevelRejected {
                reason: GenerationError::NoRoomsPlaced,
            }]
        );
    }

    #[test]
    fn step_towards_maps_headings_to_cardinals() {
        let cell = CellCoord::new(5, 5);
        assert_eq!(step_towards(cell, 0.0), Some(CellCoord::new(5, 6)));
        assert_eq!(step_towards(cell, 88.0), Some(CellCoord::new(6, 5)));
        assert_eq!(step_towards(cell, 180.0), Some(CellCoord::new(5, 4)));
        assert_eq!(step_towards(cell, 271.0), Some(CellCoord::new(4, 5)));
        assert_eq!(step_towards(cell, 359.0), Some(CellCoord::new(5, 6)));
    }

    #[test]
    fn bot_commands_are_ignored_while_disabled() {
        let (mut world, _) = installed_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetBotPath {
                path: vec![CellCoord::new(1, 1)],
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::AdvanceBot {
                target: CellCoord::new(2, 1),
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert!(query::bot_snapshot(&world).path.is_empty());
        assert!(!query::is_animating(&world));
    }
}

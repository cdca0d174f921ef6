#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bootstrap wiring that runs the Delve world together with its systems.
//!
//! [`Simulation`] owns the authoritative [`World`] and every pure system. Each
//! submitted command is applied, the resulting events are fanned out to the
//! systems in a fixed order, and their commands are applied in turn until the
//! world goes quiet. Adapters drive it one frame at a time with
//! [`Simulation::step`].

use std::time::Duration;

use delve_core::{Command, Event, GenerationError, MotionConfig, MovementPolicy};
use delve_system_bot::{AutoMap, BotConfig, IdleAutoStart, Navigator};
use delve_system_discovery::{self as discovery, Discovery};
use delve_system_level_generation::{self as level_generation, LevelGeneration};
use delve_world::{self as world, query, World};
use serde::Serialize;

/// Upper bound on system rounds per submitted command.
const MAX_PUMP_ROUNDS: usize = 64;

/// Everything needed to assemble a [`Simulation`].
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Level generation parameters and seeding.
    pub generation: level_generation::Config,
    /// Sight radius and cone used for discovery.
    pub discovery: discovery::Config,
    /// Bot tolerances and timers.
    pub bot: BotConfig,
    /// Motion timings applied to the world.
    pub motion: MotionConfig,
    /// Motion styles for manual and bot control.
    pub policy: MovementPolicy,
    /// Whether the bot takes over after the idle timeout.
    pub idle_auto_start: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            generation: level_generation::Config::new(
                level_generation::LevelConfig::default(),
                None,
            ),
            discovery: discovery::Config::default(),
            bot: BotConfig::default(),
            motion: MotionConfig::default(),
            policy: MovementPolicy::default(),
            idle_auto_start: true,
        }
    }
}

/// Counters accumulated over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Frames stepped so far.
    pub frames: u64,
    /// Levels whose exit was reached.
    pub levels_completed: u32,
    /// Cells discovered across all levels.
    pub cells_discovered: u64,
    /// Length of the most recently assigned bot path.
    pub last_path_length: usize,
    /// Times the bot switched itself off.
    pub bot_aborts: u32,
}

impl RunStats {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::ExitReached { .. } => self.levels_completed += 1,
                Event::CellsDiscovered { newly } => {
                    self.cells_discovered = self.cells_discovered.saturating_add(*newly as u64);
                }
                Event::BotPathAssigned { length } => self.last_path_length = *length,
                Event::BotAborted { .. } => self.bot_aborts += 1,
                _ => {}
            }
        }
    }
}

/// World plus systems driven through a deterministic command/event pump.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    generation: LevelGeneration,
    discovery: Discovery,
    navigator: Navigator,
    auto_map: AutoMap,
    auto_start: Option<IdleAutoStart>,
    stats: RunStats,
}

impl Simulation {
    /// Builds the world, installs the first level, and settles all systems.
    pub fn new(config: SimulationConfig) -> Result<Self, GenerationError> {
        let mut generation = LevelGeneration::new(config.generation);
        let level = generation.next_level()?;

        let mut simulation = Self {
            world: World::new(),
            generation,
            discovery: Discovery::new(config.discovery),
            navigator: Navigator::new(&config.bot),
            auto_map: AutoMap::new(config.bot.auto_map),
            auto_start: config
                .idle_auto_start
                .then(|| IdleAutoStart::new(config.bot.idle_timeout)),
            stats: RunStats::default(),
        };

        let _ = simulation.submit(Command::ConfigureMotion {
            config: config.motion,
        });
        let _ = simulation.submit(Command::SetMovementPolicy {
            policy: config.policy,
        });
        let _ = simulation.submit(Command::InstallLevel { level });
        Ok(simulation)
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Counters accumulated so far.
    #[must_use]
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Advances the clock by one frame and returns every event it produced.
    pub fn step(&mut self, dt: Duration) -> Vec<Event> {
        self.stats.frames += 1;
        self.submit(Command::Tick { dt })
    }

    /// Applies an adapter command and lets the systems react until quiet.
    pub fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut emitted = Vec::new();
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);

        for _ in 0..MAX_PUMP_ROUNDS {
            if events.is_empty() {
                break;
            }
            self.stats.record(&events);
            let commands = self.react(&events);
            emitted.append(&mut events);
            if commands.is_empty() {
                break;
            }
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }
        if !events.is_empty() {
            log::warn!("systems still busy after {MAX_PUMP_ROUNDS} rounds");
            self.stats.record(&events);
            emitted.append(&mut events);
        }

        emitted
    }

    fn react(&mut self, events: &[Event]) -> Vec<Command> {
        let mut commands = Vec::new();
        self.generation.handle(events, &mut commands);
        // The rest of the batch describes the level being replaced.
        if !commands.is_empty() {
            return commands;
        }
        self.discovery
            .handle(events, query::grid_view(&self.world), &mut commands);

        let bot = query::bot_snapshot(&self.world);
        if let Some(auto_start) = self.auto_start.as_mut() {
            auto_start.handle(events, bot.enabled, &mut commands);
        }
        self.navigator.handle(
            events,
            &bot,
            query::level(&self.world),
            &query::motion_config(&self.world),
            &mut commands,
        );
        self.auto_map.handle(events, &mut commands);
        commands
    }
}

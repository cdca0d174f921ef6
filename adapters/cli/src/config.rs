//! Run settings assembled from the TOML config file and command-line flags.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use clap::ValueEnum;
use delve_core::{BotMotion, PlayerMovement, SearchStrategy};
use delve_system_bootstrap::SimulationConfig;
use delve_system_discovery as discovery;
use delve_system_level_generation::{self as level_generation, LevelConfig};
use serde::Deserialize;
use thiserror::Error;

use crate::Args;

/// Strategy names accepted on the command line and in config files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum StrategyName {
    /// Breadth-first search.
    Bfs,
    /// Depth-first search.
    Dfs,
    /// A* with a Manhattan heuristic.
    Astar,
    /// Room-by-room exploration tour.
    Explore,
}

impl From<StrategyName> for SearchStrategy {
    fn from(name: StrategyName) -> Self {
        match name {
            StrategyName::Bfs => SearchStrategy::BreadthFirst,
            StrategyName::Dfs => SearchStrategy::DepthFirst,
            StrategyName::Astar => SearchStrategy::AStar,
            StrategyName::Explore => SearchStrategy::Exploration,
        }
    }
}

/// Errors raised while loading or validating settings.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {}", path.display())]
    Read {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The config file is not valid TOML for the expected sections.
    #[error("failed to parse config file {}", path.display())]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying TOML failure.
        #[source]
        source: toml::de::Error,
    },
    /// The grid cannot hold a room plus its border.
    #[error("grid {width}x{height} is too small; both sides must be at least 5")]
    GridTooSmall {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// Room sizes are zero or inverted.
    #[error("room sizes must satisfy 0 < min <= max (got {min}..={max})")]
    InvalidRoomSizes {
        /// Requested minimum edge.
        min: u32,
        /// Requested maximum edge.
        max: u32,
    },
}

/// Contents of a config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    level: LevelSection,
    bot: BotSection,
    motion: MotionSection,
    discovery: DiscoverySection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LevelSection {
    width: Option<u32>,
    height: Option<u32>,
    max_rooms: Option<u32>,
    room_min_size: Option<u32>,
    room_max_size: Option<u32>,
    seed: Option<u32>,
    max_attempts: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BotSection {
    strategy: Option<StrategyName>,
    instant: Option<bool>,
    idle_auto_start: Option<bool>,
    idle_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MotionSection {
    step_ms: Option<u64>,
    rotation_ms: Option<u64>,
    continuous_player: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DiscoverySection {
    radius: Option<u32>,
    cone_degrees: Option<f32>,
}

impl FileConfig {
    /// Reads and parses a config file.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved settings for one run.
#[derive(Clone, Debug)]
pub(crate) struct RunSettings {
    pub(crate) simulation: SimulationConfig,
    pub(crate) strategy: SearchStrategy,
    pub(crate) seed: Option<u32>,
    pub(crate) frames: u64,
    pub(crate) frame: Duration,
    pub(crate) levels: u32,
    pub(crate) wait_for_idle: bool,
}

impl RunSettings {
    /// Merges file settings with flags; flags win.
    pub(crate) fn resolve(file: FileConfig, args: &Args) -> Result<Self, ConfigError> {
        let defaults = LevelConfig::default();
        let level = LevelConfig {
            width: args.width.or(file.level.width).unwrap_or(defaults.width),
            height: args.height.or(file.level.height).unwrap_or(defaults.height),
            max_rooms: args
                .max_rooms
                .or(file.level.max_rooms)
                .unwrap_or(defaults.max_rooms),
            room_min_size: file.level.room_min_size.unwrap_or(defaults.room_min_size),
            room_max_size: file.level.room_max_size.unwrap_or(defaults.room_max_size),
        };
        if level.width < 5 || level.height < 5 {
            return Err(ConfigError::GridTooSmall {
                width: level.width,
                height: level.height,
            });
        }
        if level.room_min_size == 0 || level.room_min_size > level.room_max_size {
            return Err(ConfigError::InvalidRoomSizes {
                min: level.room_min_size,
                max: level.room_max_size,
            });
        }

        let seed = args.seed.or(file.level.seed);
        let mut generation = level_generation::Config::new(level, seed);
        if let Some(attempts) = file.level.max_attempts {
            generation = generation.with_max_attempts(attempts);
        }

        let mut simulation = SimulationConfig {
            generation,
            ..SimulationConfig::default()
        };

        let defaults = discovery::Config::default();
        simulation.discovery = discovery::Config::new(
            file.discovery.radius.unwrap_or(defaults.radius()),
            file.discovery
                .cone_degrees
                .unwrap_or(defaults.cone_degrees()),
        );

        if let Some(step) = file.motion.step_ms {
            simulation.motion.step_duration = Duration::from_millis(step);
        }
        if let Some(rotation) = file.motion.rotation_ms {
            simulation.motion.rotation_duration = Duration::from_millis(rotation);
        }
        if file.motion.continuous_player == Some(true) {
            simulation.policy.player = PlayerMovement::Continuous;
        }
        if args.instant_bot || file.bot.instant == Some(true) {
            simulation.policy.bot = BotMotion::Instant;
        }
        if let Some(timeout) = file.bot.idle_timeout_ms {
            simulation.bot.idle_timeout = Duration::from_millis(timeout);
        }
        simulation.idle_auto_start =
            args.wait_for_idle || file.bot.idle_auto_start.unwrap_or(simulation.idle_auto_start);

        let strategy = args
            .strategy
            .or(file.bot.strategy)
            .map_or(SearchStrategy::Exploration, SearchStrategy::from);

        Ok(Self {
            simulation,
            strategy,
            seed,
            frames: args.frames,
            frame: Duration::from_millis(args.frame_ms),
            levels: args.levels,
            wait_for_idle: args.wait_for_idle,
        })
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Delve headlessly.
//!
//! The bot explores generated levels while an ASCII backend records the final
//! overlay map. Settings come from an optional TOML file and are overridden by
//! command-line flags.

mod ascii;
mod config;
mod run;

use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use self::{
    ascii::AsciiBackend,
    config::{FileConfig, RunSettings, StrategyName},
};
use delve_system_bootstrap::RunStats;

/// Headless Delve runner.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(version, long_about = None)]
#[command(about = "Generate dungeon levels and watch the bot find the exit")]
struct Args {
    /// TOML file with [level], [bot], [motion] and [discovery] sections
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base seed; level n uses seed + n
    #[arg(long)]
    seed: Option<u32>,

    /// Grid width in cells
    #[arg(long)]
    width: Option<u32>,

    /// Grid height in cells
    #[arg(long)]
    height: Option<u32>,

    /// Room placement attempts per level
    #[arg(long = "max-rooms")]
    max_rooms: Option<u32>,

    /// Search strategy used by the bot
    #[arg(long, value_enum)]
    strategy: Option<StrategyName>,

    /// Stop after this many frames
    #[arg(long, default_value_t = 50_000, value_parser = clap::value_parser!(u64).range(1..))]
    frames: u64,

    /// Simulated frame length in milliseconds
    #[arg(
        long = "frame-ms",
        default_value_t = 16,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    frame_ms: u64,

    /// Stop after this many completed levels
    #[arg(long, default_value_t = 1)]
    levels: u32,

    /// Move the bot without animation
    #[arg(long = "instant-bot")]
    instant_bot: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Log filter level (error, warn, info, debug, trace)
    #[arg(long = "log-level")]
    log_level: Option<log::LevelFilter>,

    /// Leave the bot off until the idle timeout starts it
    #[arg(long = "wait-for-idle")]
    wait_for_idle: bool,
}

/// Machine-readable outcome of a run.
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    seed: Option<u32>,
    width: u32,
    height: u32,
    strategy: &'static str,
    levels_completed: u32,
    frames: u64,
    cells_discovered: u64,
    path_length: usize,
    bot_aborts: u32,
    overlay: Vec<&'a str>,
}

impl<'a> RunReport<'a> {
    fn new(settings: &RunSettings, stats: RunStats, overlay: &'a str) -> Self {
        let level = settings.simulation.generation.level();
        Self {
            seed: settings.seed,
            width: level.width,
            height: level.height,
            strategy: settings.strategy.label(),
            levels_completed: stats.levels_completed,
            frames: stats.frames,
            cells_discovered: stats.cells_discovered,
            path_length: stats.last_path_length,
            bot_aborts: stats.bot_aborts,
            overlay: overlay.lines().collect(),
        }
    }
}

/// Entry point for the Delve command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = args.log_level {
        let _ = logger.filter_level(level);
    }
    logger.init();

    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = RunSettings::resolve(file, &args)?;
    log::info!(
        "running {} with seed {:?} for up to {} frames",
        settings.strategy.label(),
        settings.seed,
        settings.frames
    );

    let mut overlay = Vec::new();
    let stats = run::run(&settings, AsciiBackend::new(&mut overlay, settings.frame))?;
    let overlay = String::from_utf8(overlay).context("overlay output was not UTF-8")?;

    let mut stdout = std::io::stdout().lock();
    if args.json {
        let report = RunReport::new(&settings, stats, &overlay);
        serde_json::to_writer_pretty(&mut stdout, &report)
            .context("failed to serialise run summary")?;
        writeln!(stdout)?;
    } else {
        write!(stdout, "{overlay}")?;
        writeln!(stdout, "Levels completed: {}", stats.levels_completed)?;
        writeln!(stdout, "Frames: {}", stats.frames)?;
        writeln!(stdout, "Cells discovered: {}", stats.cells_discovered)?;
        writeln!(stdout, "Path length: {}", stats.last_path_length)?;
    }
    Ok(())
}

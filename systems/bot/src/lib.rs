#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bot navigation systems.
//!
//! [`Navigator`] drives the agent along a planned path one decision per tick:
//! turn towards the next waypoint, then advance onto it, recomputing the plan
//! whenever it goes stale. [`AutoMap`] flashes the full-map overlay on a
//! fixed cycle while the bot drives, and [`IdleAutoStart`] hands control to
//! the bot after a stretch without human input.

mod auto_map;
mod auto_start;

use std::time::Duration;

use delve_core::{
    heading_towards, shortest_angle_delta, BotRejection, BotSnapshot, CellCoord, CellKind,
    Command, Event, Level, MotionConfig,
};
use delve_system_pathfinding::find_path;

pub use auto_map::{AutoMap, AutoMapPhase, AutoMapTimings};
pub use auto_start::IdleAutoStart;

const DEFAULT_ARRIVAL_EPSILON_SQ: f32 = 0.01;
const DEFAULT_ANGLE_TOLERANCE_DEGREES: f32 = 1.0;
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_millis(7_000);

/// Tolerances and timings shared by the bot systems.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BotConfig {
    /// Squared distance to a waypoint centre that counts as arrival.
    pub arrival_epsilon_sq: f32,
    /// Heading error below which the bot advances instead of turning.
    pub angle_tolerance_degrees: f32,
    /// Time without manual input after which the bot takes over.
    pub idle_timeout: Duration,
    /// Phase lengths of the auto-map cycle.
    pub auto_map: AutoMapTimings,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            arrival_epsilon_sq: DEFAULT_ARRIVAL_EPSILON_SQ,
            angle_tolerance_degrees: DEFAULT_ANGLE_TOLERANCE_DEGREES,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            auto_map: AutoMapTimings::default(),
        }
    }
}

/// Pure system that steers the agent along its path to the exit.
#[derive(Debug)]
pub struct Navigator {
    arrival_epsilon_sq: f32,
    angle_tolerance_degrees: f32,
}

impl Navigator {
    /// Creates a navigator using the tolerances from `config`.
    #[must_use]
    pub fn new(config: &BotConfig) -> Self {
        Self {
            arrival_epsilon_sq: config.arrival_epsilon_sq,
            angle_tolerance_degrees: config.angle_tolerance_degrees,
        }
    }

    /// Makes at most one navigation decision for the current tick.
    ///
    /// The navigator acts on clock advances and when the bot is switched on.
    /// Nothing happens while the bot is off or while the agent is still
    /// animating; the next tick re-evaluates from the settled pose.
    pub fn handle(
        &mut self,
        events: &[Event],
        bot: &BotSnapshot,
        level: &Level,
        motion: &MotionConfig,
        out: &mut Vec<Command>,
    ) {
        let triggered = events.iter().any(|event| {
            matches!(
                event,
                Event::TimeAdvanced { .. } | Event::BotModeChanged { enabled: true, .. }
            )
        });
        if !triggered || !bot.enabled || bot.animating {
            return;
        }

        let Some(mut target) = bot.current_waypoint() else {
            if !standing_on_exit(bot, level) {
                plan(bot, level, out);
            }
            return;
        };

        let pose = bot.pose;
        let (mut x, mut z) = target.center();
        if distance_sq(pose.x(), pose.z(), x, z) <= self.arrival_epsilon_sq {
            out.push(Command::AdvancePathCursor);
            let Some(next) = bot.path.get(bot.cursor + 1).copied() else {
                log::trace!("path complete at {target:?}");
                return;
            };
            target = next;
            (x, z) = target.center();
        }

        let desired = heading_towards(x - pose.x(), z - pose.z());
        if shortest_angle_delta(pose.heading_degrees(), desired).abs()
            > self.angle_tolerance_degrees
        {
            log::trace!("rotating towards {target:?}");
            out.push(Command::RotateBot {
                heading_degrees: desired,
            });
            return;
        }

        let view = level.view();
        if !view.is_walkable(target) || !view.is_walkable_point(x, z, motion.collision_buffer) {
            log::debug!("waypoint {target:?} is blocked, recomputing path");
            plan(bot, level, out);
            return;
        }

        log::trace!("advancing to {target:?}");
        out.push(Command::AdvanceBot { target });
    }
}

fn standing_on_exit(bot: &BotSnapshot, level: &Level) -> bool {
    bot.pose
        .cell()
        .and_then(|cell| level.grid().kind(cell))
        .is_some_and(|kind| kind == CellKind::Exit)
}

fn distance_sq(ax: f32, az: f32, bx: f32, bz: f32) -> f32 {
    let dx = bx - ax;
    let dz = bz - az;
    dx * dx + dz * dz
}

/// Picks the cell a search should start from.
///
/// An agent that drifted onto an impassable cell starts from the first
/// walkable neighbour instead.
fn start_cell(bot: &BotSnapshot, level: &Level) -> Option<CellCoord> {
    let cell = bot.pose.cell()?;
    let view = level.view();
    if view.is_walkable(cell) {
        return Some(cell);
    }
    view.neighbors(cell).next()
}

/// Computes a fresh path to the exit or switches the bot off.
fn plan(bot: &BotSnapshot, level: &Level, out: &mut Vec<Command>) {
    let outcome = level
        .exit()
        .ok_or(BotRejection::NoExit)
        .and_then(|exit| {
            let start = start_cell(bot, level).ok_or(BotRejection::NoWalkableStart)?;
            let path = find_path(bot.strategy, level.view(), start, exit, level.rooms());
            if path.is_empty() {
                Err(BotRejection::PathNotFound)
            } else {
                Ok(path)
            }
        });

    match outcome {
        Ok(path) => {
            log::debug!(
                "planned {} step {} path",
                path.len(),
                bot.strategy.label()
            );
            out.push(Command::SetBotPath { path });
        }
        Err(reason) => {
            log::warn!("bot navigation stopped: {reason}");
            out.push(Command::AbortBot { reason });
        }
    }
}

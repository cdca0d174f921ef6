#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Discovery system that reveals the cells the agent can see.
//!
//! Whenever the agent's pose settles, the system collects every cell in a
//! forward-facing cone plus the block immediately around the agent, filters
//! them by line of sight, and asks the world to mark them as discovered.

use delve_core::{heading_towards, shortest_angle_delta, CellCoord, Command, Event, GridView, Pose};

const DEFAULT_RADIUS: u32 = 8;
const DEFAULT_CONE_DEGREES: f32 = 120.0;

/// Largest sight radius a [`Config`] accepts, in cells.
pub const MAX_RADIUS: u32 = 1_024;

/// Configuration parameters for the discovery system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    radius: u32,
    cone_degrees: f32,
}

impl Config {
    /// Creates a configuration with the given sight radius and cone width.
    ///
    /// The radius is capped at [`MAX_RADIUS`] cells.
    #[must_use]
    pub const fn new(radius: u32, cone_degrees: f32) -> Self {
        Self {
            radius: if radius > MAX_RADIUS {
                MAX_RADIUS
            } else {
                radius
            },
            cone_degrees,
        }
    }

    /// Maximum distance in cells at which anything is seen.
    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    /// Full opening angle of the view cone, in degrees.
    #[must_use]
    pub const fn cone_degrees(&self) -> f32 {
        self.cone_degrees
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS, DEFAULT_CONE_DEGREES)
    }
}

/// Pure system that turns settled poses into reveal requests.
#[derive(Debug, Default)]
pub struct Discovery {
    config: Config,
}

impl Discovery {
    /// Creates a discovery system with the provided configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Emits [`Command::RevealCells`] for every pose that settled.
    pub fn handle(&mut self, events: &[Event], view: GridView<'_>, out: &mut Vec<Command>) {
        for event in events {
            let Event::PoseSettled { pose } = event else {
                continue;
            };
            let cells = visible_cells(view, *pose, &self.config);
            if !cells.is_empty() {
                out.push(Command::RevealCells { cells });
            }
        }
    }
}

/// Cells visible from `pose`, in row-major order.
#[must_use]
pub fn visible_cells(view: GridView<'_>, pose: Pose, config: &Config) -> Vec<CellCoord> {
    let Some(origin) = pose.cell() else {
        return Vec::new();
    };
    let (columns, rows) = view.dimensions();
    if origin.column() >= columns || origin.row() >= rows {
        return Vec::new();
    }

    // No cell lies further away than the grid's width plus height.
    let radius = i64::from(config.radius.min(columns.saturating_add(rows)));
    let half_cone = config.cone_degrees / 2.0;
    let mut cells = Vec::new();

    for dz in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dz * dz > radius * radius {
                continue;
            }
            let column = i64::from(origin.column()) + dx;
            let row = i64::from(origin.row()) + dz;
            if column < 0 || row < 0 || column >= i64::from(columns) || row >= i64::from(rows) {
                continue;
            }

            let adjacent = dx.abs() <= 1 && dz.abs() <= 1;
            if !adjacent {
                let bearing = heading_towards(dx as f32, dz as f32);
                if shortest_angle_delta(pose.heading_degrees(), bearing).abs() > half_cone {
                    continue;
                }
            }

            let target = CellCoord::new(column as u32, row as u32);
            if has_line_of_sight(view, origin, target) {
                cells.push(target);
            }
        }
    }

    cells
}

/// Walks a Bresenham line from `from` to `to`.
///
/// The first impassable cell on the way ends the walk; it is itself visible
/// but nothing behind it is.
#[must_use]
pub fn has_line_of_sight(view: GridView<'_>, from: CellCoord, to: CellCoord) -> bool {
    let (x0, y0) = (i64::from(from.column()), i64::from(from.row()));
    let (x1, y1) = (i64::from(to.column()), i64::from(to.row()));
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        if (x, y) != (x0, y0) {
            let (Ok(column), Ok(row)) = (u32::try_from(x), u32::try_from(y)) else {
                return false;
            };
            if !view.is_walkable(CellCoord::new(column, row)) {
                return (x, y) == (x1, y1);
            }
        }
        if (x, y) == (x1, y1) {
            return true;
        }

        let doubled = 2 * err;
        if doubled >= dy {
            err += dy;
            x += sx;
        }
        if doubled <= dx {
            err += dx;
            y += sy;
        }
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural level generation: rooms, corridors, and a single exit.
//!
//! [`generate`] turns a seeded random stream into a [`Level`]. Rooms are
//! rectangles placed at random odd-aligned positions; each accepted room is
//! joined to the one placed immediately before it by an L-shaped, three-wide
//! corridor. The last accepted room receives the exit. Walls that touch no
//! open cell, diagonals included, are reclassified as interior walls.
//!
//! [`LevelGeneration`] wraps the generator as a system that answers
//! regeneration requests with [`Command::InstallLevel`].

mod rng;

use std::time::{SystemTime, UNIX_EPOCH};

use delve_core::{
    CellCoord, CellKind, Command, Event, GenerationError, Grid, GridView, Level, Room,
};

pub use rng::{LevelRng, MultiplyWithCarry};

/// Rooms must keep at least this many wall cells between one another.
const ROOM_MARGIN: u32 = 1;
/// Probability of carving the horizontal leg of a corridor first.
const HORIZONTAL_FIRST_PROBABILITY: f64 = 0.5;
/// Number of seeds tried before a regeneration request gives up.
const DEFAULT_MAX_ATTEMPTS: u32 = 8;

/// Dimensions and room parameters for a generation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelConfig {
    /// Number of columns in the grid.
    pub width: u32,
    /// Number of rows in the grid.
    pub height: u32,
    /// Number of room placement attempts.
    pub max_rooms: u32,
    /// Smallest room edge length, in cells.
    pub room_min_size: u32,
    /// Largest room edge length, in cells.
    pub room_max_size: u32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            max_rooms: 30,
            room_min_size: 5,
            room_max_size: 12,
        }
    }
}

/// Generates a level from the provided configuration and seed.
///
/// Room placement attempts that collide with an earlier room are skipped
/// rather than retried, so fewer than `max_rooms` rooms is normal. When no
/// room fits at all the returned level has an empty room list and no exit;
/// [`Level::validate`] reports this as [`GenerationError::NoRoomsPlaced`].
#[must_use]
pub fn generate(config: &LevelConfig, seed: Option<u32>) -> Level {
    let mut rng = LevelRng::from_seed(seed);
    let mut grid = Grid::new(config.width, config.height, CellKind::Wall);
    let mut rooms: Vec<Room> = Vec::new();

    let min_size = config.room_min_size.max(1);
    let max_size = config.room_max_size.max(min_size);

    for _ in 0..config.max_rooms {
        let width = rng.range_inclusive(min_size, max_size);
        let height = rng.range_inclusive(min_size, max_size);
        let Some(column) = sample_odd_origin(&mut rng, config.width, width) else {
            continue;
        };
        let Some(row) = sample_odd_origin(&mut rng, config.height, height) else {
            continue;
        };

        let room = Room::from_origin_and_size(CellCoord::new(column, row), width, height);
        if rooms.iter().any(|placed| room.intersects(placed, ROOM_MARGIN)) {
            continue;
        }

        carve_room(&mut grid, &room);
        if let Some(previous) = rooms.last() {
            connect(&mut grid, &mut rng, previous.center(), room.center());
        }
        rooms.push(room);
    }

    let exit = rooms.last().and_then(|room| place_exit(&mut grid, room));
    classify_interior_walls(&mut grid);

    Level::new(grid, rooms, exit, seed)
}

/// Picks an odd coordinate that keeps a span of `size` cells clear of the
/// outer wall along an axis of `extent` cells.
fn sample_odd_origin(rng: &mut LevelRng, extent: u32, size: u32) -> Option<u32> {
    let max_origin = extent.checked_sub(size)?.checked_sub(1)?;
    if max_origin < 1 {
        return None;
    }
    let slots = (max_origin - 1) / 2 + 1;
    let slot = rng.range_inclusive(0, slots - 1);
    Some(1 + slot * 2)
}

fn carve_room(grid: &mut Grid, room: &Room) {
    for cell in room.cells() {
        carve(grid, cell);
    }
}

/// Joins two room centres with an L-shaped corridor.
fn connect(grid: &mut Grid, rng: &mut LevelRng, from: CellCoord, to: CellCoord) {
    if rng.chance(HORIZONTAL_FIRST_PROBABILITY) {
        carve_horizontal(grid, from.column(), to.column(), from.row());
        carve_vertical(grid, from.row(), to.row(), to.column());
    } else {
        carve_vertical(grid, from.row(), to.row(), from.column());
        carve_horizontal(grid, from.column(), to.column(), to.row());
    }
}

fn carve_horizontal(grid: &mut Grid, from_column: u32, to_column: u32, row: u32) {
    let (start, end) = ordered(from_column, to_column);
    for column in start..=end {
        carve(grid, CellCoord::new(column, row));
        if let Some(above) = row.checked_sub(1) {
            carve(grid, CellCoord::new(column, above));
        }
        carve(grid, CellCoord::new(column, row.saturating_add(1)));
    }
}

fn carve_vertical(grid: &mut Grid, from_row: u32, to_row: u32, column: u32) {
    let (start, end) = ordered(from_row, to_row);
    for row in start..=end {
        carve(grid, CellCoord::new(column, row));
        if let Some(left) = column.checked_sub(1) {
            carve(grid, CellCoord::new(left, row));
        }
        carve(grid, CellCoord::new(column.saturating_add(1), row));
    }
}

/// Turns a cell into floor unless it lies on the outer wall.
fn carve(grid: &mut Grid, cell: CellCoord) {
    let (columns, rows) = grid.dimensions();
    let inside = cell.column() >= 1
        && cell.row() >= 1
        && cell.column().saturating_add(1) < columns
        && cell.row().saturating_add(1) < rows;
    if inside && grid.kind(cell) == Some(CellKind::Wall) {
        grid.set(cell, CellKind::Floor);
    }
}

fn ordered(first: u32, second: u32) -> (u32, u32) {
    if first <= second {
        (first, second)
    } else {
        (second, first)
    }
}

/// Marks the exit inside `room` and returns its cell.
///
/// Corners come first, then the midpoints of the horizontal edges, then the
/// midpoints of the vertical edges. A candidate qualifies when it is floor
/// and has at least one open orthogonal neighbour. Without a qualifying
/// candidate the room centre is used, or the nearest floor cell to it found
/// by growing square rings inside the room.
fn place_exit(grid: &mut Grid, room: &Room) -> Option<CellCoord> {
    let center = room.center();
    let candidates = [
        CellCoord::new(room.x1(), room.y1()),
        CellCoord::new(room.x2(), room.y1()),
        CellCoord::new(room.x1(), room.y2()),
        CellCoord::new(room.x2(), room.y2()),
        CellCoord::new(center.column(), room.y1()),
        CellCoord::new(center.column(), room.y2()),
        CellCoord::new(room.x1(), center.row()),
        CellCoord::new(room.x2(), center.row()),
    ];

    let chosen = candidates
        .into_iter()
        .find(|candidate| {
            grid.kind(*candidate) == Some(CellKind::Floor)
                && GridView::new(grid).neighbors(*candidate).next().is_some()
        })
        .or_else(|| nearest_floor_in_room(grid, room, center))?;

    grid.set(chosen, CellKind::Exit);
    Some(chosen)
}

fn nearest_floor_in_room(grid: &Grid, room: &Room, center: CellCoord) -> Option<CellCoord> {
    if grid.kind(center) == Some(CellKind::Floor) {
        return Some(center);
    }

    let max_radius = room.width().max(room.height());
    for radius in 1..=max_radius {
        let low_column = center.column().saturating_sub(radius).max(room.x1());
        let high_column = center.column().saturating_add(radius).min(room.x2());
        let low_row = center.row().saturating_sub(radius).max(room.y1());
        let high_row = center.row().saturating_add(radius).min(room.y2());

        for row in low_row..=high_row {
            for column in low_column..=high_column {
                let on_ring = column.abs_diff(center.column()) == radius
                    || row.abs_diff(center.row()) == radius;
                let cell = CellCoord::new(column, row);
                if on_ring && grid.kind(cell) == Some(CellKind::Floor) {
                    return Some(cell);
                }
            }
        }
    }

    None
}

/// Reclassifies walls with no open cell among their eight neighbours.
///
/// Cells outside the grid count as walls.
fn classify_interior_walls(grid: &mut Grid) {
    let (columns, rows) = grid.dimensions();
    for row in 0..rows {
        for column in 0..columns {
            let cell = CellCoord::new(column, row);
            if grid.kind(cell) != Some(CellKind::Wall) {
                continue;
            }
            if surrounded_by_walls(grid, cell) {
                grid.set(cell, CellKind::InteriorWall);
            }
        }
    }
}

fn surrounded_by_walls(grid: &Grid, cell: CellCoord) -> bool {
    for dz in -1_i64..=1 {
        for dx in -1_i64..=1 {
            if dx == 0 && dz == 0 {
                continue;
            }
            let column = i64::from(cell.column()) + dx;
            let row = i64::from(cell.row()) + dz;
            let (Ok(column), Ok(row)) = (u32::try_from(column), u32::try_from(row)) else {
                continue;
            };
            if grid
                .kind(CellCoord::new(column, row))
                .is_some_and(|kind| !kind.is_wall())
            {
                return false;
            }
        }
    }
    true
}

/// Configuration parameters required to construct the generation system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    level: LevelConfig,
    base_seed: Option<u32>,
    max_attempts: u32,
}

impl Config {
    /// Creates a configuration; without a base seed every level is seeded
    /// from the wall clock.
    #[must_use]
    pub const fn new(level: LevelConfig, base_seed: Option<u32>) -> Self {
        Self {
            level,
            base_seed,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Overrides how many seeds are tried before giving up on a level.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Level parameters applied to every generation run.
    #[must_use]
    pub const fn level(&self) -> &LevelConfig {
        &self.level
    }
}

/// System that produces levels on start-up and whenever one is completed.
#[derive(Debug)]
pub struct LevelGeneration {
    config: Config,
    levels_generated: u32,
}

impl LevelGeneration {
    /// Creates a new generation system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            levels_generated: 0,
        }
    }

    /// Number of seeds consumed so far, failed attempts included.
    #[must_use]
    pub const fn levels_generated(&self) -> u32 {
        self.levels_generated
    }

    /// Generates the next playable level, trying successive seeds.
    ///
    /// Returns the last validation failure once every attempt is spent.
    pub fn next_level(&mut self) -> Result<Level, GenerationError> {
        let mut last_error = GenerationError::NoRoomsPlaced;
        for attempt in 0..self.config.max_attempts.max(1) {
            let seed = self.next_seed();
            let level = generate(&self.config.level, Some(seed));
            match level.validate() {
                Ok(()) => {
                    log::debug!(
                        "generated level from seed {seed} with {} rooms",
                        level.rooms().len()
                    );
                    return Ok(level);
                }
                Err(error) => {
                    log::warn!("generation attempt {attempt} with seed {seed} failed: {error}");
                    last_error = error;
                }
            }
        }
        Err(last_error)
    }

    /// Consumes world events and emits a replacement level when one is due.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let regenerate = events.iter().any(|event| {
            matches!(
                event,
                Event::ExitReached { .. } | Event::RegenerationRequested
            )
        });
        if !regenerate {
            return;
        }

        match self.next_level() {
            Ok(level) => out.push(Command::InstallLevel { level }),
            Err(error) => log::error!("giving up on regeneration: {error}"),
        }
    }

    fn next_seed(&mut self) -> u32 {
        let index = self.levels_generated;
        self.levels_generated = self.levels_generated.wrapping_add(1);
        match self.config.base_seed {
            Some(base) => base.wrapping_add(index),
            None => clock_seed().wrapping_add(index),
        }
    }
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u32)
        .unwrap_or(0)
}

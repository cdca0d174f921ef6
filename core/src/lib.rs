#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Delve engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views such as [`GridView`], and respond exclusively with new command
//! batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Distance from the centre of a cell to its edge, in grid units.
const HALF_CELL: f32 = 0.5;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the current level with a freshly generated one.
    InstallLevel {
        /// Level produced by the generator.
        level: Level,
    },
    /// Asks the level generator for a new level regardless of progress.
    RequestRegeneration,
    /// Updates the timings and tolerances used by the motion layer.
    ConfigureMotion {
        /// Replacement motion configuration.
        config: MotionConfig,
    },
    /// Selects how human and bot driven motion is carried out.
    SetMovementPolicy {
        /// Policy that should govern subsequent moves.
        policy: MovementPolicy,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Wall-clock time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Manual request to translate the agent relative to its heading.
    MovePlayer {
        /// Direction of travel relative to the current heading.
        direction: MoveDirection,
    },
    /// Manual request to rotate the agent by a quarter turn.
    TurnPlayer {
        /// Side the agent should turn towards.
        direction: TurnDirection,
    },
    /// Turns bot mode on or off.
    SetBotMode {
        /// Whether the bot should drive the agent.
        enabled: bool,
        /// Search strategy used for every path the bot computes.
        strategy: SearchStrategy,
        /// Whether the request came from a human or from automation.
        origin: InputOrigin,
    },
    /// Switches bot mode off because navigation cannot proceed.
    AbortBot {
        /// Reason navigation was abandoned.
        reason: BotRejection,
    },
    /// Replaces the bot's path and rewinds the path cursor.
    SetBotPath {
        /// Ordered cells from the agent's cell to the goal.
        path: Vec<CellCoord>,
    },
    /// Marks the waypoint under the path cursor as reached.
    AdvancePathCursor,
    /// Starts rotating the agent towards the provided heading.
    RotateBot {
        /// Heading in degrees where zero faces +Z.
        heading_degrees: f32,
    },
    /// Starts translating the agent towards the centre of a cell.
    AdvanceBot {
        /// Cell whose centre the agent should travel to.
        target: CellCoord,
    },
    /// Shows or hides the full-map overlay.
    SetMapVisible {
        /// Requested visibility.
        visible: bool,
        /// Whether the request came from a human or from automation.
        origin: InputOrigin,
    },
    /// Marks the provided cells as seen by the agent.
    RevealCells {
        /// Cells that entered the agent's view.
        cells: Vec<CellCoord>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of time that elapsed in the tick.
        dt: Duration,
        /// Clock reading after the tick was applied.
        now: Duration,
    },
    /// Announces that a new level replaced the previous one.
    LevelInstalled {
        /// Seed the level was generated from, if it was seeded.
        seed: Option<u32>,
        /// Cell the agent was placed on.
        spawn: CellCoord,
        /// Number of rooms carved into the level.
        rooms: usize,
    },
    /// Reports that a level was refused because it cannot be played.
    LevelRejected {
        /// Reason the level is unusable.
        reason: GenerationError,
    },
    /// Asks the level generator to produce a replacement level.
    RegenerationRequested,
    /// Reports that the agent's pose stopped changing.
    PoseSettled {
        /// Pose after the last motion completed.
        pose: Pose,
    },
    /// Reports that the agent came to rest on the exit cell.
    ExitReached {
        /// Exit cell occupied by the agent.
        cell: CellCoord,
    },
    /// Reports that a manual movement request was refused.
    MoveRejected {
        /// Reason the request was refused.
        reason: MoveRejection,
    },
    /// Reports that a human interacted with the agent or its overlays.
    ManualInputObserved,
    /// Announces that bot mode was switched on or off.
    BotModeChanged {
        /// Whether bot mode is active after the change.
        enabled: bool,
        /// Search strategy selected for the bot.
        strategy: SearchStrategy,
        /// Whether the change came from a human or from automation.
        origin: InputOrigin,
    },
    /// Reports that the bot turned itself off.
    BotAborted {
        /// Reason navigation was abandoned.
        reason: BotRejection,
    },
    /// Confirms that the bot received a new path.
    BotPathAssigned {
        /// Number of cells in the assigned path.
        length: usize,
    },
    /// Announces that the full-map overlay was shown or hidden.
    MapVisibilityChanged {
        /// Visibility after the change.
        visible: bool,
        /// Whether the change came from a human or from automation.
        origin: InputOrigin,
    },
    /// Reports that previously unseen cells were discovered.
    CellsDiscovered {
        /// Number of cells whose discovery flag flipped.
        newly: usize,
    },
}

/// Distinguishes human input from automated requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputOrigin {
    /// Request triggered by a human through an adapter.
    Manual,
    /// Request triggered by a system.
    Automatic,
}

/// Kind of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Solid wall adjacent to at least one open cell.
    Wall,
    /// Solid wall enclosed on all eight sides by other walls.
    InteriorWall,
    /// Open floor.
    Floor,
    /// Open floor that completes the level when reached.
    Exit,
}

impl CellKind {
    /// Reports whether an agent may stand on a cell of this kind.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Floor | Self::Exit)
    }

    /// Reports whether the kind is one of the two wall variants.
    #[must_use]
    pub const fn is_wall(self) -> bool {
        matches!(self, Self::Wall | Self::InteriorWall)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Columns run along the continuous X axis and rows along the continuous Z
/// axis, so the cell `(c, r)` covers `[c, c + 1) × [r, r + 1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Continuous `(x, z)` position of the cell's centre.
    #[must_use]
    pub fn center(self) -> (f32, f32) {
        (
            self.column as f32 + HALF_CELL,
            self.row as f32 + HALF_CELL,
        )
    }

    /// Cell that contains the continuous position, flooring both axes.
    ///
    /// Returns `None` for negative or non-finite coordinates.
    #[must_use]
    pub fn containing(x: f32, z: f32) -> Option<Self> {
        if !x.is_finite() || !z.is_finite() || x < 0.0 || z < 0.0 {
            return None;
        }
        let column = x.floor();
        let row = z.floor();
        if column > u32::MAX as f32 || row > u32::MAX as f32 {
            return None;
        }
        Some(Self::new(column as u32, row as u32))
    }

    /// Orthogonal neighbours in north, east, south, west order.
    ///
    /// Neighbours that would underflow are omitted; upper bounds are left to
    /// the caller.
    #[must_use]
    pub fn orthogonal(self) -> [Option<CellCoord>; 4] {
        [
            self.row
                .checked_sub(1)
                .map(|row| CellCoord::new(self.column, row)),
            self.column
                .checked_add(1)
                .map(|column| CellCoord::new(column, self.row)),
            self.row
                .checked_add(1)
                .map(|row| CellCoord::new(self.column, row)),
            self.column
                .checked_sub(1)
                .map(|column| CellCoord::new(column, self.row)),
        ]
    }
}

/// Axis-aligned rectangular room with inclusive corner coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Room {
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
}

impl Room {
    /// Creates a room from its upper-left corner and size in cells.
    ///
    /// Zero sizes are widened to a single cell.
    #[must_use]
    pub fn from_origin_and_size(origin: CellCoord, width: u32, height: u32) -> Self {
        let x1 = origin.column();
        let y1 = origin.row();
        Self {
            x1,
            y1,
            x2: x1.saturating_add(width.max(1) - 1),
            y2: y1.saturating_add(height.max(1) - 1),
        }
    }

    /// Leftmost column covered by the room.
    #[must_use]
    pub const fn x1(&self) -> u32 {
        self.x1
    }

    /// Topmost row covered by the room.
    #[must_use]
    pub const fn y1(&self) -> u32 {
        self.y1
    }

    /// Rightmost column covered by the room.
    #[must_use]
    pub const fn x2(&self) -> u32 {
        self.x2
    }

    /// Bottom row covered by the room.
    #[must_use]
    pub const fn y2(&self) -> u32 {
        self.y2
    }

    /// Width of the room in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.x2 - self.x1 + 1
    }

    /// Height of the room in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.y2 - self.y1 + 1
    }

    /// Integer centre of the room, rounding towards the upper-left corner.
    #[must_use]
    pub const fn center(&self) -> CellCoord {
        CellCoord::new((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }

    /// Reports whether the cell lies inside the room.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() >= self.x1
            && cell.column() <= self.x2
            && cell.row() >= self.y1
            && cell.row() <= self.y2
    }

    /// Reports whether the rooms overlap once `other` is grown by `margin`
    /// cells on every side.
    #[must_use]
    pub const fn intersects(&self, other: &Room, margin: u32) -> bool {
        self.x1 <= other.x2.saturating_add(margin)
            && self.x2.saturating_add(margin) >= other.x1
            && self.y1 <= other.y2.saturating_add(margin)
            && self.y2.saturating_add(margin) >= other.y1
    }

    /// Iterates over every cell covered by the room in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let (x1, x2) = (self.x1, self.x2);
        (self.y1..=self.y2)
            .flat_map(move |row| (x1..=x2).map(move |column| CellCoord::new(column, row)))
    }
}

/// Dense row-major grid of cell kinds.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<CellKind>,
}

impl Grid {
    /// Creates a grid where every cell holds `fill`.
    #[must_use]
    pub fn new(columns: u32, rows: u32, fill: CellKind) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![fill; capacity],
        }
    }

    /// Parses a grid from rows of `#` (wall), `.` (floor) and `E` (exit).
    ///
    /// Any other character is treated as a wall. Rows shorter than the
    /// longest row are padded with walls.
    #[must_use]
    pub fn from_ascii(rows: &[&str]) -> Self {
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        let columns = u32::try_from(width).unwrap_or(0);
        let height = u32::try_from(rows.len()).unwrap_or(0);
        let mut grid = Self::new(columns, height, CellKind::Wall);
        for (row_index, row) in rows.iter().enumerate() {
            for (column_index, symbol) in row.chars().enumerate() {
                let kind = match symbol {
                    '.' => CellKind::Floor,
                    'E' => CellKind::Exit,
                    _ => CellKind::Wall,
                };
                grid.set(
                    CellCoord::new(column_index as u32, row_index as u32),
                    kind,
                );
            }
        }
        grid
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Provides the dimensions of the grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Reports whether the cell lies within the grid bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Kind of the cell, or `None` when it lies outside the grid.
    #[must_use]
    pub fn kind(&self, cell: CellCoord) -> Option<CellKind> {
        self.index(cell).and_then(|index| self.cells.get(index).copied())
    }

    /// Overwrites the kind of an in-bounds cell; out-of-bounds writes are ignored.
    pub fn set(&mut self, cell: CellCoord, kind: CellKind) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = kind;
            }
        }
    }

    /// Dense cell kinds stored in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[CellKind] {
        &self.cells
    }

    /// Iterates over every cell and its kind in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, CellKind)> + '_ {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, kind)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *kind)
        })
    }

    /// Counts the cells of the provided kind.
    #[must_use]
    pub fn count(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|candidate| **candidate == kind).count()
    }

    /// Row-major index of the cell, if it lies within the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Renders the grid as rows of `#`, `.`, `E` and blank interior walls.
    #[must_use]
    pub fn to_ascii(&self) -> Vec<String> {
        (0..self.rows)
            .map(|row| {
                (0..self.columns)
                    .map(|column| match self.kind(CellCoord::new(column, row)) {
                        Some(CellKind::Floor) => '.',
                        Some(CellKind::Exit) => 'E',
                        Some(CellKind::InteriorWall) => ' ',
                        Some(CellKind::Wall) | None => '#',
                    })
                    .collect()
            })
            .collect()
    }
}

/// Reasons a generated level cannot be played.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenerationError {
    /// Every room placement attempt was rejected.
    #[error("no rooms could be placed")]
    NoRoomsPlaced,
    /// Rooms exist but no exit cell was marked.
    #[error("no exit cell could be placed")]
    NoExitPlaced,
}

/// Generated level: the cell grid, rooms in placement order, and the exit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Level {
    grid: Grid,
    rooms: Vec<Room>,
    exit: Option<CellCoord>,
    seed: Option<u32>,
}

impl Level {
    /// Bundles the generator's outputs into a level.
    #[must_use]
    pub fn new(grid: Grid, rooms: Vec<Room>, exit: Option<CellCoord>, seed: Option<u32>) -> Self {
        Self {
            grid,
            rooms,
            exit,
            seed,
        }
    }

    /// Builds a level from a hand-authored grid, locating the exit by scanning.
    #[must_use]
    pub fn from_grid(grid: Grid, rooms: Vec<Room>) -> Self {
        let exit = grid
            .iter()
            .find(|(_, kind)| *kind == CellKind::Exit)
            .map(|(cell, _)| cell);
        Self::new(grid, rooms, exit, None)
    }

    /// Placeholder level with no rooms used before the first generation.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Grid::new(0, 0, CellKind::Wall), Vec::new(), None, None)
    }

    /// Cell grid of the level.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Rooms in the order they were placed.
    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// The unique exit cell, if one was placed.
    #[must_use]
    pub const fn exit(&self) -> Option<CellCoord> {
        self.exit
    }

    /// Seed the level was generated from.
    #[must_use]
    pub const fn seed(&self) -> Option<u32> {
        self.seed
    }

    /// Cell the agent starts on: the centre of the first room.
    #[must_use]
    pub fn spawn(&self) -> Option<CellCoord> {
        self.rooms.first().map(Room::center)
    }

    /// Read-only graph view over the level's grid.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView::new(&self.grid)
    }

    /// Confirms the level has rooms and an exit.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.rooms.is_empty() {
            return Err(GenerationError::NoRoomsPlaced);
        }
        if self.exit.is_none() {
            return Err(GenerationError::NoExitPlaced);
        }
        Ok(())
    }
}

/// Read-only walkable-neighbour query surface over a [`Grid`].
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    grid: &'a Grid,
}

impl<'a> GridView<'a> {
    /// Captures a view backed by the provided grid.
    #[must_use]
    pub const fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        self.grid.dimensions()
    }

    /// Kind of the cell, or `None` outside the grid.
    #[must_use]
    pub fn kind(&self, cell: CellCoord) -> Option<CellKind> {
        self.grid.kind(cell)
    }

    /// Reports whether the cell is in bounds and either floor or exit.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.kind(cell).is_some_and(CellKind::is_walkable)
    }

    /// Walkable orthogonal neighbours in north, east, south, west order.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + 'a {
        let view = *self;
        cell.orthogonal()
            .into_iter()
            .flatten()
            .filter(move |candidate| view.is_walkable(*candidate))
    }

    /// Buffered multi-point walkability check around a continuous position.
    ///
    /// The centre and the four corners of a square of half-size `buffer`
    /// must all lie on walkable cells.
    #[must_use]
    pub fn is_walkable_point(&self, x: f32, z: f32, buffer: f32) -> bool {
        let buffer = buffer.abs();
        [
            (x, z),
            (x - buffer, z - buffer),
            (x + buffer, z - buffer),
            (x - buffer, z + buffer),
            (x + buffer, z + buffer),
        ]
        .into_iter()
        .all(|(px, pz)| CellCoord::containing(px, pz).is_some_and(|cell| self.is_walkable(cell)))
    }

    /// Locates the first exit cell in row-major order.
    #[must_use]
    pub fn find_exit(&self) -> Option<CellCoord> {
        self.grid
            .iter()
            .find(|(_, kind)| *kind == CellKind::Exit)
            .map(|(cell, _)| cell)
    }
}

/// Continuous position and heading of the agent.
///
/// A heading of zero degrees faces +Z and angles grow towards +X.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    x: f32,
    z: f32,
    heading_degrees: f32,
}

impl Pose {
    /// Creates a pose, normalising the heading into `[0, 360)`.
    #[must_use]
    pub fn new(x: f32, z: f32, heading_degrees: f32) -> Self {
        Self {
            x,
            z,
            heading_degrees: normalize_degrees(heading_degrees),
        }
    }

    /// Pose standing on the centre of a cell.
    #[must_use]
    pub fn at_cell_center(cell: CellCoord, heading_degrees: f32) -> Self {
        let (x, z) = cell.center();
        Self::new(x, z, heading_degrees)
    }

    /// Position along the X axis in grid units.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Position along the Z axis in grid units.
    #[must_use]
    pub const fn z(&self) -> f32 {
        self.z
    }

    /// Heading in degrees within `[0, 360)`.
    #[must_use]
    pub const fn heading_degrees(&self) -> f32 {
        self.heading_degrees
    }

    /// Cell containing the pose's position.
    #[must_use]
    pub fn cell(&self) -> Option<CellCoord> {
        CellCoord::containing(self.x, self.z)
    }

    /// Returns a copy moved to a new position with the same heading.
    #[must_use]
    pub fn with_position(self, x: f32, z: f32) -> Self {
        Self { x, z, ..self }
    }

    /// Returns a copy with a new heading at the same position.
    #[must_use]
    pub fn with_heading(self, heading_degrees: f32) -> Self {
        Self::new(self.x, self.z, heading_degrees)
    }

    /// Unit direction vector `(dx, dz)` of the heading.
    #[must_use]
    pub fn forward(&self) -> (f32, f32) {
        let radians = self.heading_degrees.to_radians();
        (radians.sin(), radians.cos())
    }
}

/// Wraps an angle into `[0, 360)` degrees.
#[must_use]
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Signed shortest rotation from `from` to `to`, within `(-180, 180]` degrees.
#[must_use]
pub fn shortest_angle_delta(from: f32, to: f32) -> f32 {
    let delta = normalize_degrees(to - from);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// Heading in degrees that faces along the `(dx, dz)` vector.
#[must_use]
pub fn heading_towards(dx: f32, dz: f32) -> f32 {
    normalize_degrees(dx.atan2(dz).to_degrees())
}

/// Search strategies the pathfinding engine offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchStrategy {
    /// Unweighted shortest path via a FIFO frontier.
    BreadthFirst,
    /// First path found via a LIFO frontier; not necessarily shortest.
    DepthFirst,
    /// Cost plus Manhattan heuristic; optimal on the unit-cost grid.
    AStar,
    /// Visit every room centre greedily, then head for the goal.
    Exploration,
}

impl SearchStrategy {
    /// Every strategy in declaration order.
    pub const ALL: [SearchStrategy; 4] = [
        Self::BreadthFirst,
        Self::DepthFirst,
        Self::AStar,
        Self::Exploration,
    ];

    /// Short lowercase label used by adapters.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BreadthFirst => "bfs",
            Self::DepthFirst => "dfs",
            Self::AStar => "astar",
            Self::Exploration => "explore",
        }
    }
}

/// Explicit state of the bot navigation controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BotState {
    /// Bot mode is disabled.
    Off,
    /// The bot is turning towards its next waypoint.
    Rotating,
    /// The bot is travelling towards its next waypoint.
    Advancing,
}

/// Reasons the bot refused to start or stopped navigating.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BotRejection {
    /// The level has no exit cell to head for.
    #[error("level has no exit")]
    NoExit,
    /// The agent stands on an impassable cell with no walkable neighbour.
    #[error("agent has no walkable start cell")]
    NoWalkableStart,
    /// The search exhausted its frontier without reaching the exit.
    #[error("no path to the exit")]
    PathNotFound,
}

/// Reasons a manual movement request may be refused.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveRejection {
    /// A previous motion is still being animated.
    #[error("agent is still moving")]
    Animating,
    /// The destination fails the buffered walkability check.
    #[error("destination is blocked")]
    Blocked,
}

/// Manual translation directions relative to the agent's heading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveDirection {
    /// Along the heading.
    Forward,
    /// Against the heading.
    Backward,
    /// Perpendicular to the heading, towards the left.
    StrafeLeft,
    /// Perpendicular to the heading, towards the right.
    StrafeRight,
}

impl MoveDirection {
    /// Heading offset in degrees relative to the agent's facing.
    #[must_use]
    pub const fn heading_offset(self) -> f32 {
        match self {
            Self::Forward => 0.0,
            Self::StrafeRight => 90.0,
            Self::Backward => 180.0,
            Self::StrafeLeft => 270.0,
        }
    }
}

/// Manual rotation directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnDirection {
    /// Counter-clockwise quarter turn.
    Left,
    /// Clockwise quarter turn.
    Right,
}

/// Motion style applied to human-driven moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerMovement {
    /// Small immediate displacements in any direction.
    Continuous,
    /// Whole-cell steps along cardinal directions, interpolated over time.
    Discrete,
}

/// Motion style applied to bot-driven moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BotMotion {
    /// Moves and turns are animated over the configured durations.
    Interpolated,
    /// Moves and turns complete within the tick they are issued.
    Instant,
}

/// Combined movement policy for human and bot control.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovementPolicy {
    /// Style applied to manual moves.
    pub player: PlayerMovement,
    /// Style applied to bot moves.
    pub bot: BotMotion,
}

impl Default for MovementPolicy {
    fn default() -> Self {
        Self {
            player: PlayerMovement::Discrete,
            bot: BotMotion::Interpolated,
        }
    }
}

/// Timings and tolerances used by the motion layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionConfig {
    /// Time taken to travel one cell.
    pub step_duration: Duration,
    /// Time taken to rotate by a quarter turn.
    pub rotation_duration: Duration,
    /// Distance covered by one continuous manual move, in cells.
    pub continuous_step: f32,
    /// Half-size of the square used by buffered walkability checks.
    pub collision_buffer: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            step_duration: Duration::from_millis(200),
            rotation_duration: Duration::from_millis(150),
            continuous_step: 0.25,
            collision_buffer: 0.2,
        }
    }
}

/// Immutable representation of the bot's navigation state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct BotSnapshot {
    /// Whether bot mode is active.
    pub enabled: bool,
    /// Strategy selected for path computation.
    pub strategy: SearchStrategy,
    /// Explicit controller state.
    pub state: BotState,
    /// Current path, including the cell it was computed from.
    pub path: Vec<CellCoord>,
    /// Index of the next unreached waypoint.
    pub cursor: usize,
    /// Current pose of the agent.
    pub pose: Pose,
    /// Whether a translation or rotation animation is in flight.
    pub animating: bool,
}

impl BotSnapshot {
    /// Reports whether the cursor has moved past the last waypoint.
    #[must_use]
    pub fn path_exhausted(&self) -> bool {
        self.cursor >= self.path.len()
    }

    /// Waypoint under the cursor, if the path is not exhausted.
    #[must_use]
    pub fn current_waypoint(&self) -> Option<CellCoord> {
        self.path.get(self.cursor).copied()
    }

    /// Waypoints that remain ahead of the agent.
    #[must_use]
    pub fn remaining(&self) -> &[CellCoord] {
        self.path.get(self.cursor..).unwrap_or(&[])
    }
}

/// Read-only view into the per-cell discovery flags.
#[derive(Clone, Copy, Debug)]
pub struct DiscoveryView<'a> {
    flags: &'a [bool],
    columns: u32,
    rows: u32,
}

impl<'a> DiscoveryView<'a> {
    /// Captures a view backed by the provided row-major flag slice.
    #[must_use]
    pub const fn new(flags: &'a [bool], columns: u32, rows: u32) -> Self {
        Self {
            flags,
            columns,
            rows,
        }
    }

    /// Reports whether the agent has ever seen the cell.
    #[must_use]
    pub fn is_discovered(&self, cell: CellCoord) -> bool {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return false;
        }
        let index = cell.row() as usize * self.columns as usize + cell.column() as usize;
        self.flags.get(index).copied().unwrap_or(false)
    }

    /// Number of discovered cells.
    #[must_use]
    pub fn count(&self) -> usize {
        self.flags.iter().filter(|flag| **flag).count()
    }

    /// Provides the dimensions of the underlying flag grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn containing_floors_positions_and_rejects_negatives() {
        assert_eq!(CellCoord::containing(2.9, 0.1), Some(CellCoord::new(2, 0)));
        assert_eq!(CellCoord::containing(-0.1, 3.0), None);
        assert_eq!(CellCoord::containing(f32::NAN, 3.0), None);
    }

    #[test]
    fn rooms_separated_by_one_wall_do_not_intersect() {
        let left = Room::from_origin_and_size(CellCoord::new(1, 1), 3, 3);
        let gap = Room::from_origin_and_size(CellCoord::new(5, 1), 3, 3);
        let touching = Room::from_origin_and_size(CellCoord::new(4, 1), 3, 3);

        assert!(!gap.intersects(&left, 1));
        assert!(touching.intersects(&left, 1));
        assert!(!touching.intersects(&left, 0));
    }

    #[test]
    fn room_center_rounds_towards_origin() {
        let room = Room::from_origin_and_size(CellCoord::new(2, 4), 4, 5);
        assert_eq!(room.center(), CellCoord::new(3, 6));
        assert_eq!(room.cells().count(), 20);
    }

    #[test]
    fn neighbors_are_orthogonal_walkable_and_ordered() {
        let grid = Grid::from_ascii(&["#####", "#...#", "#.#.#", "#...#", "#####"]);
        let view = GridView::new(&grid);

        let around_corner: Vec<_> = view.neighbors(CellCoord::new(1, 1)).collect();
        assert_eq!(around_corner, vec![CellCoord::new(2, 1), CellCoord::new(1, 2)]);

        let around_pillar: Vec<_> = view.neighbors(CellCoord::new(2, 2)).collect();
        assert_eq!(
            around_pillar,
            vec![
                CellCoord::new(2, 1),
                CellCoord::new(3, 2),
                CellCoord::new(2, 3),
                CellCoord::new(1, 2),
            ]
        );
    }

    #[test]
    fn buffered_walkability_rejects_positions_hugging_walls() {
        let grid = Grid::from_ascii(&["###", "#.#", "###"]);
        let view = GridView::new(&grid);

        assert!(view.is_walkable_point(1.5, 1.5, 0.2));
        assert!(!view.is_walkable_point(1.1, 1.5, 0.2));
        assert!(view.is_walkable_point(1.1, 1.5, 0.0));
    }

    #[test]
    fn shortest_angle_delta_wraps_through_north() {
        assert!((shortest_angle_delta(350.0, 10.0) - 20.0).abs() < 1e-4);
        assert!((shortest_angle_delta(10.0, 350.0) + 20.0).abs() < 1e-4);
        assert!((shortest_angle_delta(0.0, 180.0) - 180.0).abs() < 1e-4);
    }

    #[test]
    fn heading_zero_faces_positive_z() {
        assert!(heading_towards(0.0, 1.0).abs() < 1e-4);
        assert!((heading_towards(1.0, 0.0) - 90.0).abs() < 1e-4);
        assert!((heading_towards(0.0, -1.0) - 180.0).abs() < 1e-4);
        assert!((heading_towards(-1.0, 0.0) - 270.0).abs() < 1e-4);
    }

    #[test]
    fn level_validation_reports_missing_rooms_and_exit() {
        assert_eq!(Level::empty().validate(), Err(GenerationError::NoRoomsPlaced));

        let grid = Grid::from_ascii(&["###", "#.#", "###"]);
        let room = Room::from_origin_and_size(CellCoord::new(1, 1), 1, 1);
        let without_exit = Level::from_grid(grid, vec![room]);
        assert_eq!(without_exit.validate(), Err(GenerationError::NoExitPlaced));

        let grid = Grid::from_ascii(&["###", "#E#", "###"]);
        let with_exit = Level::from_grid(grid, vec![room]);
        assert_eq!(with_exit.validate(), Ok(()));
        assert_eq!(with_exit.exit(), Some(CellCoord::new(1, 1)));
    }

    #[test]
    fn discovery_view_ignores_out_of_bounds_cells() {
        let flags = [true, false, false, true];
        let view = DiscoveryView::new(&flags, 2, 2);
        assert!(view.is_discovered(CellCoord::new(0, 0)));
        assert!(view.is_discovered(CellCoord::new(1, 1)));
        assert!(!view.is_discovered(CellCoord::new(2, 0)));
        assert_eq!(view.count(), 2);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn level_round_trips_through_bincode() {
        let grid = Grid::from_ascii(&["#####", "#..E#", "#####"]);
        let room = Room::from_origin_and_size(CellCoord::new(1, 1), 3, 1);
        assert_round_trip(&Level::from_grid(grid, vec![room]));
    }

    #[test]
    fn bot_rejection_round_trips_through_bincode() {
        assert_round_trip(&BotRejection::PathNotFound);
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Delve adapters.
//!
//! The core never emits geometry. Adapters turn the level, discovery flags and
//! bot snapshot into an [`OverlayScene`] that groups cells by
//! [`CellCategory`], then hand it to a [`RenderingBackend`].

use std::time::Duration;

use anyhow::Result as AnyResult;
use delve_core::{BotSnapshot, CellCoord, CellKind, DiscoveryView, Level, Pose};
use glam::Vec2;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Render category assigned to each cell of the overlay map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellCategory {
    /// The agent has never seen the cell.
    Undiscovered,
    /// A seen wall, enclosed or not.
    DiscoveredWall,
    /// A seen floor cell.
    DiscoveredFloor,
    /// The seen exit.
    DiscoveredExit,
}

impl CellCategory {
    /// Every category in draw order.
    pub const ALL: [CellCategory; 4] = [
        CellCategory::Undiscovered,
        CellCategory::DiscoveredWall,
        CellCategory::DiscoveredFloor,
        CellCategory::DiscoveredExit,
    ];

    /// Classifies a cell from its kind and discovery flag.
    #[must_use]
    pub const fn classify(kind: CellKind, discovered: bool) -> Self {
        if !discovered {
            return Self::Undiscovered;
        }
        match kind {
            CellKind::Wall | CellKind::InteriorWall => Self::DiscoveredWall,
            CellKind::Floor => Self::DiscoveredFloor,
            CellKind::Exit => Self::DiscoveredExit,
        }
    }

    /// Fill color used by graphical backends.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Undiscovered => Color::from_rgb_u8(12, 12, 16),
            Self::DiscoveredWall => Color::from_rgb_u8(96, 88, 80),
            Self::DiscoveredFloor => Color::from_rgb_u8(196, 190, 170),
            Self::DiscoveredExit => Color::from_rgb_u8(64, 200, 96),
        }
    }
}

/// Cells sharing one render category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellBucket {
    /// Category shared by every cell in the bucket.
    pub category: CellCategory,
    /// Cells in row-major order.
    pub cells: Vec<CellCoord>,
}

/// Marker drawn where the agent stands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentMarker {
    /// Position in cell units.
    pub position: Vec2,
    /// Heading in degrees, zero facing +Z.
    pub heading_degrees: f32,
}

impl AgentMarker {
    /// Builds a marker from the agent's pose.
    #[must_use]
    pub fn from_pose(pose: Pose) -> Self {
        Self {
            position: Vec2::new(pose.x(), pose.z()),
            heading_degrees: pose.heading_degrees(),
        }
    }
}

/// Overlay map description combining categorised cells, the route and the agent.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayScene {
    /// Number of columns in the level grid.
    pub columns: u32,
    /// Number of rows in the level grid.
    pub rows: u32,
    /// Non-empty cell buckets in [`CellCategory::ALL`] order.
    pub buckets: Vec<CellBucket>,
    /// Remaining bot route as cell centres, starting at the current waypoint.
    pub route: Vec<Vec2>,
    /// Current agent marker.
    pub agent: AgentMarker,
    /// Whether the full-level overlay is currently shown.
    pub map_visible: bool,
}

impl OverlayScene {
    /// Captures the overlay for the provided world state.
    #[must_use]
    pub fn capture(
        level: &Level,
        discovery: DiscoveryView<'_>,
        bot: &BotSnapshot,
        map_visible: bool,
    ) -> Self {
        let grid = level.grid();
        let mut grouped: [Vec<CellCoord>; 4] = Default::default();
        for (cell, kind) in grid.iter() {
            let category = CellCategory::classify(kind, discovery.is_discovered(cell));
            grouped[category as usize].push(cell);
        }

        let buckets = CellCategory::ALL
            .into_iter()
            .zip(grouped)
            .filter(|(_, cells)| !cells.is_empty())
            .map(|(category, cells)| CellBucket { category, cells })
            .collect();

        let route = bot
            .remaining()
            .iter()
            .map(|cell| {
                let (x, z) = cell.center();
                Vec2::new(x, z)
            })
            .collect();

        Self {
            columns: grid.columns(),
            rows: grid.rows(),
            buckets,
            route,
            agent: AgentMarker::from_pose(bot.pose),
            map_visible,
        }
    }

    /// Bucket holding the given category, if any cell falls into it.
    #[must_use]
    pub fn bucket(&self, category: CellCategory) -> Option<&CellBucket> {
        self.buckets
            .iter()
            .find(|bucket| bucket.category == category)
    }

    /// Per-cell categories in row-major order.
    #[must_use]
    pub fn category_grid(&self) -> Vec<CellCategory> {
        let mut categories =
            vec![CellCategory::Undiscovered; self.columns as usize * self.rows as usize];
        for bucket in &self.buckets {
            for cell in &bucket.cells {
                let index = cell.row() as usize * self.columns as usize + cell.column() as usize;
                if let Some(slot) = categories.get_mut(index) {
                    *slot = bucket.category;
                }
            }
        }
        categories
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title shown by the backend.
    pub title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: OverlayScene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(title: T, clear_color: Color, scene: OverlayScene) -> Self
    where
        T: Into<String>,
    {
        Self {
            title: title.into(),
            clear_color,
            scene,
        }
    }
}

/// Decision returned by the per-frame update closure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Keep presenting frames.
    Continue,
    /// Present the current scene one last time and return.
    Stop,
}

/// Rendering backend capable of presenting Delve overlays.
pub trait RenderingBackend {
    /// Runs the backend until the update closure asks it to stop.
    ///
    /// `update_scene` receives the frame delta and refreshes the scene from
    /// the simulation before it is presented.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut OverlayScene) -> FrameControl;
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_core::{BotState, Grid, SearchStrategy};

    fn snapshot(path: Vec<CellCoord>, cursor: usize) -> BotSnapshot {
        BotSnapshot {
            enabled: true,
            strategy: SearchStrategy::BreadthFirst,
            state: BotState::Advancing,
            path,
            cursor,
            pose: Pose::at_cell_center(CellCoord::new(1, 1), 90.0),
            animating: false,
        }
    }

    fn corridor() -> Level {
        Level::from_grid(
            Grid::from_ascii(&["#####", "#..E#", "#####"]),
            Vec::new(),
        )
    }

    #[test]
    fn undiscovered_cells_ignore_kind() {
        assert_eq!(
            CellCategory::classify(CellKind::Exit, false),
            CellCategory::Undiscovered
        );
        assert_eq!(
            CellCategory::classify(CellKind::InteriorWall, true),
            CellCategory::DiscoveredWall
        );
    }

    #[test]
    fn empty_buckets_are_omitted() {
        let level = corridor();
        let flags = vec![true; 15];
        let discovery = DiscoveryView::new(&flags, 5, 3);

        let scene = OverlayScene::capture(&level, discovery, &snapshot(Vec::new(), 0), false);

        assert!(scene.bucket(CellCategory::Undiscovered).is_none());
        assert_eq!(
            scene
                .bucket(CellCategory::DiscoveredExit)
                .map(|bucket| bucket.cells.clone()),
            Some(vec![CellCoord::new(3, 1)])
        );
        assert_eq!(
            scene
                .bucket(CellCategory::DiscoveredWall)
                .map(|bucket| bucket.cells.len()),
            Some(12)
        );
    }

    #[test]
    fn route_starts_at_cursor() {
        let level = corridor();
        let flags = vec![false; 15];
        let discovery = DiscoveryView::new(&flags, 5, 3);
        let path = vec![
            CellCoord::new(1, 1),
            CellCoord::new(2, 1),
            CellCoord::new(3, 1),
        ];

        let scene = OverlayScene::capture(&level, discovery, &snapshot(path, 1), true);

        assert_eq!(scene.route, vec![Vec2::new(2.5, 1.5), Vec2::new(3.5, 1.5)]);
        assert_eq!(scene.agent.position, Vec2::new(1.5, 1.5));
        assert_eq!(scene.buckets.len(), 1);
        assert!(scene
            .category_grid()
            .iter()
            .all(|category| *category == CellCategory::Undiscovered));
    }
}

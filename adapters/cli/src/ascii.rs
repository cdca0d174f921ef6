//! Text backend that prints the overlay map once the run stops.

use std::{io::Write, time::Duration};

use anyhow::{Context, Result as AnyResult};
use delve_rendering::{CellCategory, FrameControl, OverlayScene, Presentation, RenderingBackend};
use glam::Vec2;

const ROUTE_GLYPH: char = '*';

/// Headless backend that steps frames as fast as possible and writes the
/// final scene as ASCII rows.
#[derive(Debug)]
pub(crate) struct AsciiBackend<W> {
    out: W,
    frame: Duration,
}

impl<W: Write> AsciiBackend<W> {
    pub(crate) fn new(out: W, frame: Duration) -> Self {
        Self { out, frame }
    }
}

impl<W: Write> RenderingBackend for AsciiBackend<W> {
    fn run<F>(mut self, mut presentation: Presentation, mut update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut OverlayScene) -> FrameControl,
    {
        while update_scene(self.frame, &mut presentation.scene) == FrameControl::Continue {}

        writeln!(self.out, "{}", presentation.title)?;
        for row in render(&presentation.scene) {
            writeln!(self.out, "{row}")?;
        }
        self.out.flush().context("failed to flush overlay output")
    }
}

/// Draws the scene one string per grid row.
pub(crate) fn render(scene: &OverlayScene) -> Vec<String> {
    let columns = scene.columns as usize;
    let mut glyphs: Vec<char> = scene.category_grid().into_iter().map(glyph).collect();

    for point in &scene.route {
        if let Some(slot) = cell_index(scene, *point).and_then(|index| glyphs.get_mut(index)) {
            *slot = ROUTE_GLYPH;
        }
    }
    if let Some(slot) =
        cell_index(scene, scene.agent.position).and_then(|index| glyphs.get_mut(index))
    {
        *slot = agent_glyph(scene.agent.heading_degrees);
    }

    if columns == 0 {
        return Vec::new();
    }
    glyphs
        .chunks(columns)
        .map(|row| row.iter().collect())
        .collect()
}

const fn glyph(category: CellCategory) -> char {
    match category {
        CellCategory::Undiscovered => ' ',
        CellCategory::DiscoveredWall => '#',
        CellCategory::DiscoveredFloor => '.',
        CellCategory::DiscoveredExit => 'E',
    }
}

// Heading zero faces +Z, which is down the printed rows.
fn agent_glyph(heading_degrees: f32) -> char {
    let quadrant = ((heading_degrees.rem_euclid(360.0) + 45.0) / 90.0) as u32 % 4;
    match quadrant {
        0 => 'v',
        1 => '>',
        2 => '^',
        _ => '<',
    }
}

fn cell_index(scene: &OverlayScene, point: Vec2) -> Option<usize> {
    if !point.is_finite() || point.x < 0.0 || point.y < 0.0 {
        return None;
    }
    let cell = point.floor();
    let (column, row) = (cell.x as u32, cell.y as u32);
    (column < scene.columns && row < scene.rows)
        .then(|| row as usize * scene.columns as usize + column as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_core::{
        BotSnapshot, BotState, CellCoord, DiscoveryView, Grid, Level, Pose, SearchStrategy,
    };
    use delve_rendering::Color;

    fn scene(path: Vec<CellCoord>, heading: f32) -> OverlayScene {
        let level = Level::from_grid(
            Grid::from_ascii(&["#####", "#...#", "#..E#", "#####"]),
            Vec::new(),
        );
        let flags = vec![true; 20];
        let bot = BotSnapshot {
            enabled: true,
            strategy: SearchStrategy::AStar,
            state: BotState::Advancing,
            path,
            cursor: 1,
            pose: Pose::at_cell_center(CellCoord::new(1, 1), heading),
            animating: false,
        };
        OverlayScene::capture(&level, DiscoveryView::new(&flags, 5, 4), &bot, true)
    }

    #[test]
    fn route_and_agent_are_drawn_over_cells() {
        let path = vec![
            CellCoord::new(1, 1),
            CellCoord::new(2, 1),
            CellCoord::new(2, 2),
            CellCoord::new(3, 2),
        ];
        let rows = render(&scene(path, 90.0));

        assert_eq!(rows, vec!["#####", "#>*.#", "#.**#", "#####"]);
    }

    #[test]
    fn agent_glyph_follows_heading() {
        assert_eq!(agent_glyph(0.0), 'v');
        assert_eq!(agent_glyph(90.0), '>');
        assert_eq!(agent_glyph(180.0), '^');
        assert_eq!(agent_glyph(270.0), '<');
        assert_eq!(agent_glyph(350.0), 'v');
    }

    #[test]
    fn backend_writes_title_and_rows_after_stop() {
        let mut out = Vec::new();
        let presentation = Presentation::new(
            "Delve",
            Color::new(0.0, 0.0, 0.0, 1.0),
            scene(Vec::new(), 0.0),
        );
        let mut frames = 0;

        AsciiBackend::new(&mut out, Duration::from_millis(16))
            .run(presentation, |dt, _| {
                assert_eq!(dt, Duration::from_millis(16));
                frames += 1;
                if frames == 3 {
                    FrameControl::Stop
                } else {
                    FrameControl::Continue
                }
            })
            .expect("write to memory");

        assert_eq!(frames, 3);
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text, "Delve\n#####\n#v..#\n#..E#\n#####\n");
    }
}

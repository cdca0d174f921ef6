//! Frame loop that drives the simulation through a rendering backend.

use anyhow::{Context, Result};
use delve_core::{Command, Event, InputOrigin, SearchStrategy};
use delve_rendering::{CellCategory, FrameControl, OverlayScene, Presentation, RenderingBackend};
use delve_system_bootstrap::{RunStats, Simulation};
use delve_world::{query, World};

use crate::config::RunSettings;

/// Runs one session until the level or frame limit is hit.
pub(crate) fn run<B: RenderingBackend>(settings: &RunSettings, backend: B) -> Result<RunStats> {
    let mut simulation = Simulation::new(settings.simulation.clone())
        .context("failed to generate the first level")?;
    if !settings.wait_for_idle {
        let _ = simulation.submit(enable_bot(settings.strategy));
    }

    let title = match settings.seed {
        Some(seed) => format!("Delve (seed {seed}, {})", settings.strategy.label()),
        None => format!("Delve ({})", settings.strategy.label()),
    };
    let presentation = Presentation::new(
        title,
        CellCategory::Undiscovered.color(),
        capture(simulation.world()),
    );

    backend.run(presentation, |dt, scene| {
        let events = simulation.step(dt);
        for event in &events {
            match event {
                Event::ExitReached { cell } => {
                    log::info!(
                        "exit {cell:?} reached after {} frames",
                        simulation.stats().frames
                    );
                }
                Event::BotAborted { reason } => log::warn!("bot gave up: {reason:?}"),
                _ => {}
            }
        }
        let reinstalled = events
            .iter()
            .any(|event| matches!(event, Event::LevelInstalled { .. }));
        if reinstalled && !settings.wait_for_idle {
            let _ = simulation.submit(enable_bot(settings.strategy));
        }

        *scene = capture(simulation.world());
        let stats = simulation.stats();
        if stats.levels_completed >= settings.levels || stats.frames >= settings.frames {
            FrameControl::Stop
        } else {
            FrameControl::Continue
        }
    })?;

    Ok(simulation.stats())
}

fn enable_bot(strategy: SearchStrategy) -> Command {
    Command::SetBotMode {
        enabled: true,
        strategy,
        origin: InputOrigin::Manual,
    }
}

fn capture(world: &World) -> OverlayScene {
    OverlayScene::capture(
        query::level(world),
        query::discovery_view(world),
        &query::bot_snapshot(world),
        query::map_visible(world),
    )
}

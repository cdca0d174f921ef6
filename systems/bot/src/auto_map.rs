//! Timed full-map overlay cycle that runs while the bot drives.

use std::time::Duration;

use delve_core::{Command, Event, InputOrigin};

const SHORTEST_PHASE: Duration = Duration::from_millis(1);

/// Phase lengths of the auto-map cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoMapTimings {
    /// Delay between enabling the bot and first showing the map.
    pub initial_wait: Duration,
    /// How long the map stays open each time.
    pub map_open: Duration,
    /// How long the map stays closed between openings.
    pub map_closed_wait: Duration,
}

impl Default for AutoMapTimings {
    fn default() -> Self {
        Self {
            initial_wait: Duration::from_millis(3_000),
            map_open: Duration::from_millis(5_000),
            map_closed_wait: Duration::from_millis(6_000),
        }
    }
}

/// Phase of the auto-map cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutoMapPhase {
    /// Not cycling.
    Idle,
    /// Waiting for the first opening after the bot was enabled.
    InitialWait,
    /// The map is shown.
    MapOpen,
    /// The map is hidden until the next opening.
    MapClosedWait,
}

/// System that opens and closes the map overlay on a fixed schedule.
///
/// The cycle starts whenever the bot is switched on and stops when it is
/// switched off or a new level is installed. A manual visibility change
/// stops it for the rest of the session.
#[derive(Debug)]
pub struct AutoMap {
    timings: AutoMapTimings,
    phase: AutoMapPhase,
    elapsed: Duration,
    overridden: bool,
}

impl AutoMap {
    /// Creates an idle cycle with the provided timings.
    #[must_use]
    pub fn new(timings: AutoMapTimings) -> Self {
        Self {
            timings,
            phase: AutoMapPhase::Idle,
            elapsed: Duration::ZERO,
            overridden: false,
        }
    }

    /// Current phase of the cycle.
    #[must_use]
    pub const fn phase(&self) -> AutoMapPhase {
        self.phase
    }

    /// Reports whether a manual toggle has disabled the cycle.
    #[must_use]
    pub const fn is_overridden(&self) -> bool {
        self.overridden
    }

    /// Consumes world events and emits overlay visibility changes.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::MapVisibilityChanged {
                    origin: InputOrigin::Manual,
                    ..
                } => {
                    if !self.overridden {
                        log::debug!("manual map toggle, auto-map disabled for this session");
                    }
                    self.overridden = true;
                    self.enter(AutoMapPhase::Idle);
                }
                Event::BotModeChanged { enabled: true, .. } => {
                    if !self.overridden {
                        self.enter(AutoMapPhase::InitialWait);
                    }
                }
                Event::BotModeChanged { enabled: false, .. } | Event::LevelInstalled { .. } => {
                    if self.phase == AutoMapPhase::MapOpen {
                        out.push(set_visible(false));
                    }
                    self.enter(AutoMapPhase::Idle);
                }
                Event::TimeAdvanced { dt, .. } => self.advance(*dt, out),
                _ => {}
            }
        }
    }

    fn enter(&mut self, phase: AutoMapPhase) {
        self.phase = phase;
        self.elapsed = Duration::ZERO;
    }

    fn advance(&mut self, dt: Duration, out: &mut Vec<Command>) {
        if self.phase == AutoMapPhase::Idle {
            return;
        }
        self.elapsed = self.elapsed.saturating_add(dt);

        while let Some(length) = self.phase_length() {
            if self.elapsed < length {
                break;
            }
            self.elapsed -= length;
            let (next, visible) = match self.phase {
                AutoMapPhase::InitialWait | AutoMapPhase::MapClosedWait => {
                    (AutoMapPhase::MapOpen, true)
                }
                AutoMapPhase::MapOpen => (AutoMapPhase::MapClosedWait, false),
                AutoMapPhase::Idle => break,
            };
            self.phase = next;
            out.push(set_visible(visible));
        }
    }

    fn phase_length(&self) -> Option<Duration> {
        let length = match self.phase {
            AutoMapPhase::Idle => return None,
            AutoMapPhase::InitialWait => self.timings.initial_wait,
            AutoMapPhase::MapOpen => self.timings.map_open,
            AutoMapPhase::MapClosedWait => self.timings.map_closed_wait,
        };
        Some(length.max(SHORTEST_PHASE))
    }
}

fn set_visible(visible: bool) -> Command {
    Command::SetMapVisible {
        visible,
        origin: InputOrigin::Automatic,
    }
}

//! Hands control to the bot after a stretch without human input.

use std::time::Duration;

use delve_core::{Command, Event, InputOrigin, SearchStrategy};

/// System that enables the exploring bot once the human has been idle.
///
/// Idle time accumulates from the last manual input or level start. Once it
/// exceeds the timeout while the bot is off, the bot is enabled with the
/// exploration strategy. This happens at most once until the next manual
/// input or level.
#[derive(Debug)]
pub struct IdleAutoStart {
    timeout: Duration,
    idle: Duration,
    auto_started: bool,
}

impl IdleAutoStart {
    /// Creates a countdown that fires after `timeout` of inactivity.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            idle: Duration::ZERO,
            auto_started: false,
        }
    }

    /// Time since the countdown was last re-armed.
    #[must_use]
    pub const fn idle(&self) -> Duration {
        self.idle
    }

    /// Reports whether the bot was already started for the current level.
    #[must_use]
    pub const fn has_auto_started(&self) -> bool {
        self.auto_started
    }

    /// Consumes world events and enables the bot when the countdown expires.
    pub fn handle(&mut self, events: &[Event], bot_enabled: bool, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::ManualInputObserved | Event::LevelInstalled { .. } => self.rearm(),
                Event::TimeAdvanced { dt, .. } => {
                    self.idle = self.idle.saturating_add(*dt);
                    if !bot_enabled && !self.auto_started && self.idle > self.timeout {
                        log::info!("no input for {:?}, starting the bot", self.idle);
                        self.auto_started = true;
                        out.push(Command::SetBotMode {
                            enabled: true,
                            strategy: SearchStrategy::Exploration,
                            origin: InputOrigin::Automatic,
                        });
                    }
                }
                _ => {}
            }
        }
    }

    fn rearm(&mut self) {
        self.idle = Duration::ZERO;
        self.auto_started = false;
    }
}

//! JoystickActor - hosts a [`Joystick`] and its emission loop on one task
//!
//! Input events, resizes, option updates, queries and emission ticks all
//! arrive through one `select!` loop, so none of them ever run concurrently.
//! The loop re-emits the snapshot at the configured refresh rate while a
//! session is active and idles cheaply otherwise.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                 JoystickActor                 │
//! │   ┌──────────────┐        ┌───────────────┐   │
//! │   │ command_rx   │        │ emission tick │   │
//! │   └──────┬───────┘        └───────┬───────┘   │
//! │          └──────── select! ───────┘           │
//! │                      │                        │
//! │                 ┌────▼─────┐                  │
//! │                 │ Joystick │                  │
//! │                 └──────────┘                  │
//! └───────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info, trace};

use super::commands::EngineCommand;
use super::handle::JoystickHandle;
use super::Joystick;

/// Tick period for a refresh rate in Hz
pub fn refresh_period(refresh_hz: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(refresh_hz.max(1)))
}

fn emission_interval(refresh_hz: u32) -> Interval {
    let mut ticker = interval(refresh_period(refresh_hz));
    // A stalled host should not get a burst of catch-up frames
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

pub struct JoystickActor {
    joystick: Joystick,
    command_rx: mpsc::UnboundedReceiver<EngineCommand>,
}

impl JoystickActor {
    /// Spawn the actor on the current runtime and return a handle to it
    pub fn spawn(joystick: Joystick) -> JoystickHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

        let actor = JoystickActor {
            joystick,
            command_rx: cmd_rx,
        };

        tokio::spawn(actor.run());

        info!("Stick engine spawned");

        JoystickHandle::new(cmd_tx)
    }

    async fn run(mut self) {
        let mut refresh_hz = self.joystick.config().refresh_hz;
        let mut ticker = emission_interval(refresh_hz);

        debug!(refresh_hz, "Emission loop started");

        loop {
            tokio::select! {
                // Commands first: an input that arrived before a tick is
                // applied before that tick re-emits.
                biased;

                cmd = self.command_rx.recv() => {
                    let Some(cmd) = cmd else {
                        debug!("All stick handles dropped");
                        break;
                    };
                    if !self.handle_command(cmd) {
                        break;
                    }

                    let configured = self.joystick.config().refresh_hz;
                    if configured != refresh_hz {
                        debug!(from = refresh_hz, to = configured, "Emission rate changed");
                        refresh_hz = configured;
                        ticker = emission_interval(refresh_hz);
                    }
                }
                _ = ticker.tick() => {
                    self.joystick.tick();
                }
            }
        }

        // Handles see the channel close only after this returns and the
        // receiver is dropped, so no callback can outlive `destroy`.
        self.joystick.destroy();
        debug!("Emission loop stopped");
    }

    /// Returns false when the actor should stop
    fn handle_command(&mut self, cmd: EngineCommand) -> bool {
        trace!(?cmd, "Processing command");

        match cmd {
            EngineCommand::Input(input) => {
                self.joystick.handle_input(&input);
            }
            EngineCommand::Rescale => {
                self.joystick.rescale();
            }
            EngineCommand::ResetPosition => {
                self.joystick.reset_position();
            }
            EngineCommand::SetOption {
                name,
                value,
                response,
            } => {
                let _ = response.send(self.joystick.set_option(&name, value));
            }
            EngineCommand::UpdateConfig { patch, response } => {
                let _ = response.send(self.joystick.update_config(patch));
            }
            EngineCommand::GetState { response } => {
                let _ = response.send(self.joystick.state());
            }
            EngineCommand::Shutdown => {
                info!("Stick engine shutting down");
                return false;
            }
        }

        true
    }
}

//! JoystickHandle - async API for a running [`JoystickActor`](super::JoystickActor)
//!
//! Fire-and-forget methods for the input hot path, oneshot round trips for
//! option updates and state queries.

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use super::commands::EngineCommand;
use super::{Joystick, JoystickActor};
use crate::config::ConfigPatch;
use crate::error::StickError;
use crate::pointer::PointerInput;
use crate::snapshot::Snapshot;

/// Handle for a spawned stick engine
///
/// Cheap to clone; every clone talks to the same actor.
///
/// # Hot Path Methods (fire-and-forget)
/// - `send_input` - Host pointer event
/// - `rescale` - Container resized or rotated
/// - `reset_position` - Force neutral
///
/// # Request Methods (async with response)
/// - `set_option` - Update one named option
/// - `update_config` - Update several options at once
/// - `get_state` - Current snapshot
#[derive(Clone)]
pub struct JoystickHandle {
    cmd_tx: mpsc::UnboundedSender<EngineCommand>,
}

impl JoystickHandle {
    pub fn new(cmd_tx: mpsc::UnboundedSender<EngineCommand>) -> Self {
        Self { cmd_tx }
    }

    /// Spawn `joystick` on its own task. Shorthand for [`JoystickActor::spawn`].
    pub fn spawn(joystick: Joystick) -> Self {
        JoystickActor::spawn(joystick)
    }

    // =========================================================================
    // Hot path methods (fire-and-forget, no await)
    // =========================================================================

    /// Forward one host pointer event. Dropped silently once the engine is gone.
    pub fn send_input(&self, input: PointerInput) {
        let _ = self.cmd_tx.send(EngineCommand::Input(input));
    }

    /// Recompute geometry after a container resize or orientation change
    pub fn rescale(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Rescale);
    }

    pub fn reset_position(&self) {
        let _ = self.cmd_tx.send(EngineCommand::ResetPosition);
    }

    // =========================================================================
    // Request methods (async with response)
    // =========================================================================

    /// Update one named option; `Ok(false)` when the name is unknown
    pub async fn set_option(&self, name: impl Into<String>, value: Value) -> Result<bool, StickError> {
        let (response_tx, response_rx) = oneshot::channel();
        let cmd = EngineCommand::SetOption {
            name: name.into(),
            value,
            response: response_tx,
        };

        if self.cmd_tx.send(cmd).is_err() {
            return Err(StickError::ActorClosed);
        }

        response_rx.await.map_err(|_| StickError::ActorClosed)?
    }

    pub async fn update_config(&self, patch: ConfigPatch) -> Result<(), StickError> {
        let (response_tx, response_rx) = oneshot::channel();
        let cmd = EngineCommand::UpdateConfig {
            patch,
            response: response_tx,
        };

        if self.cmd_tx.send(cmd).is_err() {
            return Err(StickError::ActorClosed);
        }

        response_rx.await.map_err(|_| StickError::ActorClosed)?
    }

    /// Copy of the current snapshot
    pub async fn get_state(&self) -> Result<Snapshot, StickError> {
        let (response_tx, response_rx) = oneshot::channel();
        let cmd = EngineCommand::GetState {
            response: response_tx,
        };

        if self.cmd_tx.send(cmd).is_err() {
            return Err(StickError::ActorClosed);
        }

        response_rx.await.map_err(|_| StickError::ActorClosed)
    }

    // =========================================================================
    // Lifecycle methods
    // =========================================================================

    /// Returns false once the actor has stopped
    pub fn is_alive(&self) -> bool {
        !self.cmd_tx.is_closed()
    }

    /// Signal the actor to stop without waiting for it
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }

    /// Stop the emission loop, detach the surface and wait until the engine
    /// is gone. No callback fires after this returns. Idempotent.
    pub async fn destroy(&self) {
        self.shutdown();
        self.cmd_tx.closed().await;
    }
}

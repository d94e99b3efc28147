//! Commands for the stick engine actor
//!
//! Input and resize notifications are fire-and-forget; option updates and
//! state queries carry a oneshot channel for the reply.

use serde_json::Value;
use tokio::sync::oneshot;

use crate::config::ConfigPatch;
use crate::error::StickError;
use crate::pointer::PointerInput;
use crate::snapshot::Snapshot;

#[derive(Debug)]
pub enum EngineCommand {
    // -------------------------------------------------------------------------
    // Hot path (no response)
    // -------------------------------------------------------------------------
    /// Host pointer input
    Input(PointerInput),

    /// Container resized, orientation changed or rescale requested
    Rescale,

    /// Force the neutral snapshot and broadcast it
    ResetPosition,

    // -------------------------------------------------------------------------
    // Request-response
    // -------------------------------------------------------------------------
    /// Apply one named option; replies `Ok(false)` for unknown names
    SetOption {
        name: String,
        value: Value,
        response: oneshot::Sender<Result<bool, StickError>>,
    },

    /// Apply a partial config update
    UpdateConfig {
        patch: ConfigPatch,
        response: oneshot::Sender<Result<(), StickError>>,
    },

    /// Current snapshot
    GetState {
        response: oneshot::Sender<Snapshot>,
    },

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------
    /// Stop the emission loop and destroy the engine
    Shutdown,
}

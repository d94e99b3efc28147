//! Stick engine
//!
//! [`Joystick`] is the synchronous core: pointer input in, snapshots out
//! through the registered callbacks. [`JoystickActor`] runs it on a tokio
//! task together with the fixed-rate emission loop, and [`JoystickHandle`]
//! is the cloneable async API to that task.

mod actor;
mod commands;
mod handle;
mod joystick;
mod rescale;

#[cfg(test)]
mod tests;

pub use actor::{refresh_period, JoystickActor};
pub use commands::EngineCommand;
pub use handle::JoystickHandle;
pub use joystick::{Callbacks, Joystick, SnapshotFn};

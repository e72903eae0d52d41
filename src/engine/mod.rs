// src/engine/mod.rs

//! Supervisor engine for warden.
//!
//! This module ties together:
//! - the restart policy (pure decision function)
//! - the stderr window attached to crash alerts
//! - the supervisor state machine reacting to:
//!   - child spawn / spawn failure
//!   - child stdout / stderr lines
//!   - child exit
//!   - manual stop (Ctrl-C / SIGTERM)
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::types::OutputStream;

/// Events flowing into the supervisor from the child backend and signal
/// handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorEvent {
    /// Issued once by the shell when it starts.
    Start,
    /// The backend spawned the child.
    ChildStarted { pid: Option<u32> },
    /// The backend could not spawn the child.
    SpawnFailed { reason: String },
    /// One line of child output.
    ChildOutput { stream: OutputStream, text: String },
    /// The child terminated. Every termination counts as a crash.
    ChildExited {
        code: Option<i32>,
        signal: Option<i32>,
    },
    /// Manual stop.
    KillRequested,
}

pub mod core;
pub mod policy;
pub mod runtime;
pub mod stderr_window;

pub use core::{CoreCommand, CoreSettings, CoreStep, SupervisorCore, SupervisorPhase};
pub use policy::{RestartDecision, RestartPolicy};
pub use runtime::{Supervisor, SupervisorExit};
pub use stderr_window::StderrWindow;

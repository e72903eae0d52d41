// src/exec/backend.rs

//! Pluggable child backend abstraction.
//!
//! The supervisor talks to a `ChildBackend` instead of spawning processes
//! itself. This makes it easy to swap in a scripted fake in tests while
//! keeping the production implementation in [`child_runner`].
//!
//! - `RealChildBackend` spawns the managed application with tokio and
//!   reports its output and exit as `SupervisorEvent`s.
//! - Tests can provide their own `ChildBackend` that records spawns and
//!   emits exits on demand.
//!
//! [`child_runner`]: super::child_runner

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::AppSection;
use crate::engine::SupervisorEvent;
use crate::errors::{Result, WardenError};
use crate::types::BoxFuture;

use super::child_runner::{ActiveChild, launch};

/// Everything needed to start the managed application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl LaunchSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Command line as a single string, for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<&AppSection> for LaunchSpec {
    fn from(app: &AppSection) -> Self {
        Self {
            program: app.entry.clone(),
            args: app.args.clone(),
            cwd: app.cwd.clone(),
            env: app.env.clone(),
        }
    }
}

/// Trait abstracting how the managed application is started and stopped.
///
/// Implementations report `ChildOutput` and `ChildExited` through the event
/// channel they were built with. At most one child may be live at a time.
pub trait ChildBackend: Send {
    /// Start the child and return its pid when known.
    fn spawn_child<'a>(&'a mut self, spec: &'a LaunchSpec) -> BoxFuture<'a, Result<Option<u32>>>;

    /// Terminate the live child, if any, and wait until it has been reaped.
    /// No `ChildExited` event is reported for a child stopped this way.
    fn terminate_child(&mut self) -> BoxFuture<'_, Result<()>>;
}

/// How long a respawn waits for the previous watcher task to wind down.
const PREVIOUS_CHILD_WAIT: Duration = Duration::from_secs(2);

/// Upper bound on how long a manual stop waits for the child to be reaped.
const TERMINATE_WAIT: Duration = Duration::from_secs(5);

/// Real backend used in production.
pub struct RealChildBackend {
    event_tx: mpsc::Sender<SupervisorEvent>,
    active: Option<ActiveChild>,
}

impl RealChildBackend {
    pub fn new(event_tx: mpsc::Sender<SupervisorEvent>) -> Self {
        Self {
            event_tx,
            active: None,
        }
    }
}

impl ChildBackend for RealChildBackend {
    fn spawn_child<'a>(&'a mut self, spec: &'a LaunchSpec) -> BoxFuture<'a, Result<Option<u32>>> {
        Box::pin(async move {
            // The watcher sends `ChildExited` right before it returns.
            if let Some(previous) = self.active.take() {
                if timeout(PREVIOUS_CHILD_WAIT, previous.handle).await.is_err() {
                    return Err(WardenError::SpawnError(
                        "a managed child is already running".to_string(),
                    ));
                }
            }

            let child = launch(spec, self.event_tx.clone())?;
            let pid = child.pid;
            self.active = Some(child);
            Ok(pid)
        })
    }

    fn terminate_child(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let Some(mut child) = self.active.take() else {
                debug!("terminate requested with no child");
                return Ok(());
            };

            match child.cancel.take() {
                Some(cancel) => {
                    info!(pid = ?child.pid, "terminating managed application");
                    if cancel.send(()).is_err() {
                        debug!(pid = ?child.pid, "child already exited while terminating");
                    }
                }
                None => debug!(pid = ?child.pid, "child already being terminated"),
            }

            // The watcher signals and reaps the child before it returns.
            match timeout(TERMINATE_WAIT, child.handle).await {
                Ok(Ok(())) => {
                    debug!(pid = ?child.pid, "managed application stopped");
                    Ok(())
                }
                Ok(Err(e)) => Err(WardenError::SpawnError(format!(
                    "child watcher failed while terminating: {e}"
                ))),
                Err(_) => Err(WardenError::SpawnError(format!(
                    "managed application (pid {:?}) still running after {:?}",
                    child.pid, TERMINATE_WAIT
                ))),
            }
        })
    }
}

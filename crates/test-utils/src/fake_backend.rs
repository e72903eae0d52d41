use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use warden::engine::SupervisorEvent;
use warden::errors::{Result, WardenError};
use warden::exec::{ChildBackend, LaunchSpec};
use warden::types::{BoxFuture, OutputStream};

/// What one spawned "child" does.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRun {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    /// `Some(code)` exits after printing; `None` keeps running.
    pub exit_code: Option<i32>,
    /// Fail the spawn itself with this reason.
    pub spawn_error: Option<String>,
}

impl ScriptedRun {
    pub fn crash(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            ..Self::default()
        }
    }

    pub fn running() -> Self {
        Self::default()
    }

    pub fn spawn_failure(reason: &str) -> Self {
        Self {
            spawn_error: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn stdout(mut self, line: &str) -> Self {
        self.stdout.push(line.to_string());
        self
    }

    pub fn stderr(mut self, line: &str) -> Self {
        self.stderr.push(line.to_string());
        self
    }
}

/// What the supervisor asked of the backend.
#[derive(Debug, Default)]
pub struct BackendState {
    pub spawns: Vec<LaunchSpec>,
    pub failed_spawns: usize,
    pub terminations: usize,
}

/// A fake backend that:
/// - records every spawn / terminate request
/// - plays the next `ScriptedRun` for each spawn, emitting its output and
///   exit as `SupervisorEvent`s
///
/// Once the script is exhausted, further spawns play the fallback run,
/// `ScriptedRun::running()` unless set with [`ScriptedBackend::with_fallback`].
pub struct ScriptedBackend {
    event_tx: mpsc::Sender<SupervisorEvent>,
    script: VecDeque<ScriptedRun>,
    fallback: ScriptedRun,
    state: Arc<Mutex<BackendState>>,
}

impl ScriptedBackend {
    pub fn new(event_tx: mpsc::Sender<SupervisorEvent>, script: Vec<ScriptedRun>) -> Self {
        Self {
            event_tx,
            script: script.into(),
            fallback: ScriptedRun::running(),
            state: Arc::new(Mutex::new(BackendState::default())),
        }
    }

    /// Run played once the script is exhausted.
    pub fn with_fallback(mut self, run: ScriptedRun) -> Self {
        self.fallback = run;
        self
    }

    pub fn state(&self) -> Arc<Mutex<BackendState>> {
        Arc::clone(&self.state)
    }
}

impl ChildBackend for ScriptedBackend {
    fn spawn_child<'a>(&'a mut self, spec: &'a LaunchSpec) -> BoxFuture<'a, Result<Option<u32>>> {
        Box::pin(async move {
            let run = self
                .script
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone());

            if let Some(reason) = run.spawn_error {
                self.state.lock().unwrap().failed_spawns += 1;
                return Err(WardenError::SpawnError(reason));
            }

            let pid = {
                let mut state = self.state.lock().unwrap();
                state.spawns.push(spec.clone());
                1000 + state.spawns.len() as u32
            };

            let tx = self.event_tx.clone();
            tokio::spawn(async move {
                for text in run.stdout {
                    let _ = tx
                        .send(SupervisorEvent::ChildOutput {
                            stream: OutputStream::Stdout,
                            text,
                        })
                        .await;
                }
                for text in run.stderr {
                    let _ = tx
                        .send(SupervisorEvent::ChildOutput {
                            stream: OutputStream::Stderr,
                            text,
                        })
                        .await;
                }
                if let Some(code) = run.exit_code {
                    let _ = tx
                        .send(SupervisorEvent::ChildExited {
                            code: Some(code),
                            signal: None,
                        })
                        .await;
                }
            });

            Ok(Some(pid))
        })
    }

    fn terminate_child(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.state.lock().unwrap().terminations += 1;
            Ok(())
        })
    }
}

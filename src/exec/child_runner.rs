// src/exec/child_runner.rs

//! Managed application process runner.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::engine::SupervisorEvent;
use crate::errors::{Result, WardenError};
use crate::types::OutputStream;

use super::LaunchSpec;

/// Grace period between SIGTERM and a hard kill on manual stop.
pub const KILL_AFTER: Duration = Duration::from_secs(3);

/// Handle for the currently running child process.
///
/// - `cancel` asks the runner to terminate the process (manual stop).
/// - `handle` is the Tokio task watching the process.
pub struct ActiveChild {
    pub pid: Option<u32>,
    pub cancel: Option<oneshot::Sender<()>>,
    pub handle: JoinHandle<()>,
}

/// Spawn the managed application with stdout/stderr piped.
///
/// Each output line is forwarded as `ChildOutput`. When the process exits on
/// its own, both pipes are drained first and then a single `ChildExited` is
/// sent, so every line of a run reaches the supervisor before its exit.
///
/// The child is not killed when its handle is dropped and, on unix, runs in
/// its own process group: a Ctrl-C aimed at the supervisor does not reach it
/// directly.
pub fn launch(spec: &LaunchSpec, event_tx: mpsc::Sender<SupervisorEvent>) -> Result<ActiveChild> {
    info!(cmd = %spec.display(), "starting managed application");

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .envs(&spec.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(false);

    if let Some(cwd) = &spec.cwd {
        cmd.current_dir(cwd);
    }

    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd
        .spawn()
        .map_err(|e| WardenError::SpawnError(format!("{}: {}", spec.display(), e)))?;

    let pid = child.id();

    let mut readers = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        readers.push(forward_lines(stdout, OutputStream::Stdout, event_tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(forward_lines(stderr, OutputStream::Stderr, event_tx.clone()));
    }

    let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(watch_child(child, pid, readers, cancel_rx, event_tx));

    Ok(ActiveChild {
        pid,
        cancel: Some(cancel_tx),
        handle,
    })
}

fn forward_lines<R>(
    pipe: R,
    stream: OutputStream,
    event_tx: mpsc::Sender<SupervisorEvent>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(pipe).lines();

        loop {
            match lines.next_line().await {
                Ok(Some(text)) => {
                    if event_tx
                        .send(SupervisorEvent::ChildOutput { stream, text })
                        .await
                        .is_err()
                    {
                        debug!(?stream, "supervisor gone; dropping child output");
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(?stream, error = %e, "error reading child output");
                    break;
                }
            }
        }
    })
}

async fn watch_child(
    mut child: Child,
    pid: Option<u32>,
    readers: Vec<JoinHandle<()>>,
    mut cancel_rx: oneshot::Receiver<()>,
    event_tx: mpsc::Sender<SupervisorEvent>,
) {
    tokio::select! {
        status = child.wait() => {
            let (code, signal) = match status {
                Ok(status) => exit_details(status),
                Err(e) => {
                    warn!(?pid, error = %e, "failed to wait for managed application");
                    (None, None)
                }
            };

            for reader in readers {
                let _ = reader.await;
            }

            info!(?pid, exit_code = ?code, ?signal, "managed application exited");

            if event_tx
                .send(SupervisorEvent::ChildExited { code, signal })
                .await
                .is_err()
            {
                debug!(?pid, "supervisor gone; exit not reported");
            }
        }

        cancel = &mut cancel_rx => {
            match cancel {
                Ok(()) => {
                    terminate(&mut child, pid);
                    let status = match timeout(KILL_AFTER, child.wait()).await {
                        Ok(status) => status,
                        Err(_) => {
                            warn!(?pid, "managed application ignored SIGTERM; killing it");
                            if let Err(e) = child.start_kill() {
                                warn!(?pid, error = %e, "failed to kill managed application");
                            }
                            child.wait().await
                        }
                    };
                    match status {
                        Ok(status) => debug!(?pid, ?status, "terminated child reaped"),
                        Err(e) => warn!(?pid, error = %e, "failed to reap terminated child"),
                    }
                    // No ChildExited for a manual stop.
                }
                Err(e) => {
                    debug!(?pid, error = %e, "cancel channel closed without explicit termination");
                }
            }
        }
    }
}

#[cfg(unix)]
fn terminate(child: &mut Child, pid: Option<u32>) {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let sent = pid
        .and_then(|p| i32::try_from(p).ok())
        .map(|p| kill(Pid::from_raw(p), Signal::SIGTERM));

    match sent {
        Some(Ok(())) => info!(?pid, "sent SIGTERM to managed application"),
        Some(Err(e)) => {
            warn!(?pid, error = %e, "SIGTERM failed; killing managed application");
            if let Err(e) = child.start_kill() {
                warn!(?pid, error = %e, "failed to kill managed application");
            }
        }
        None => {
            if let Err(e) = child.start_kill() {
                warn!(?pid, error = %e, "failed to kill managed application");
            }
        }
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child, pid: Option<u32>) {
    if let Err(e) = child.start_kill() {
        warn!(?pid, error = %e, "failed to kill managed application");
    }
}

#[cfg(unix)]
fn exit_details(status: ExitStatus) -> (Option<i32>, Option<i32>) {
    use std::os::unix::process::ExitStatusExt;
    (status.code(), status.signal())
}

#[cfg(not(unix))]
fn exit_details(status: ExitStatus) -> (Option<i32>, Option<i32>) {
    (status.code(), None)
}

// src/engine/runtime.rs

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep, sleep_until};
use tracing::{debug, info, trace, warn};

use crate::errors::Result;
use crate::event_log::EventLog;
use crate::exec::{ChildBackend, LaunchSpec};
use crate::notify::Notifier;

use super::core::{CoreCommand, EXIT_CODE_GAVE_UP, SupervisorCore};
use super::SupervisorEvent;

/// How the supervisor wants its own process to exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorExit {
    pub code: i32,
}

impl SupervisorExit {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Drives [`SupervisorCore`] in response to [`SupervisorEvent`]s and
/// performs the resulting IO: event log writes, notification dispatch and
/// child process management through a [`ChildBackend`].
///
/// Commands from one core step are executed one at a time, each awaited to
/// completion. Any failure aborts the remaining commands and is returned to
/// the caller; log sinks and notification channels failing mid-crash are
/// fatal to the supervisor.
///
/// A failed spawn is not stepped inline. It is queued as a deferred event
/// and goes through the main loop like any other, so a manual stop that is
/// already waiting in the channel is handled before the next attempt.
pub struct Supervisor<B: ChildBackend> {
    core: SupervisorCore,
    event_rx: mpsc::Receiver<SupervisorEvent>,
    deferred: VecDeque<SupervisorEvent>,
    backend: B,
    launch: LaunchSpec,
    event_log: EventLog,
    notifier: Notifier,
}

impl<B: ChildBackend> fmt::Debug for Supervisor<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("core", &self.core)
            .field("launch", &self.launch)
            .finish_non_exhaustive()
    }
}

impl<B: ChildBackend> Supervisor<B> {
    pub fn new(
        core: SupervisorCore,
        event_rx: mpsc::Receiver<SupervisorEvent>,
        backend: B,
        launch: LaunchSpec,
        event_log: EventLog,
        notifier: Notifier,
    ) -> Self {
        Self {
            core,
            event_rx,
            deferred: VecDeque::new(),
            backend,
            launch,
            event_log,
            notifier,
        }
    }

    /// Main event loop.
    ///
    /// - Issues `Start` to the core.
    /// - Consumes `SupervisorEvent`s from `event_rx`.
    /// - Executes the commands returned by the core until one of them asks
    ///   the supervisor to exit.
    pub async fn run(mut self) -> Result<SupervisorExit> {
        info!(
            app = %self.core.settings().app.name,
            program = %self.launch.program,
            "warden supervisor started"
        );

        if let Some(exit) = self.handle_event(SupervisorEvent::Start).await? {
            return Ok(exit);
        }

        loop {
            let event = match self.next_event().await {
                Some(e) => e,
                None => {
                    warn!("supervisor event channel closed; exiting");
                    self.event_log.flush().await?;
                    return Ok(SupervisorExit {
                        code: EXIT_CODE_GAVE_UP,
                    });
                }
            };

            if let Some(exit) = self.handle_event(event).await? {
                info!(exit_code = exit.code, "supervisor exiting");
                return Ok(exit);
            }
        }
    }

    async fn handle_event(&mut self, event: SupervisorEvent) -> Result<Option<SupervisorExit>> {
        trace!(?event, "supervisor received event");

        let step = self.core.step(event, Utc::now());
        let mut queue: VecDeque<CoreCommand> = step.commands.into();

        while let Some(command) = queue.pop_front() {
            match command {
                CoreCommand::Log(entry) => {
                    self.event_log.record(entry).await?;
                }
                CoreCommand::Notify(alert) => {
                    self.notifier.dispatch(&alert).await?;
                }
                CoreCommand::SpawnChild { delay } => {
                    if !delay.is_zero() && self.restart_delay_interrupted(delay).await {
                        debug!("manual stop during restart delay; skipping respawn");
                        continue;
                    }

                    match self.backend.spawn_child(&self.launch).await {
                        Ok(pid) => {
                            // Spawn outcome is handled before any event from the new child.
                            let started = SupervisorEvent::ChildStarted { pid };
                            queue.extend(self.core.step(started, Utc::now()).commands);
                        }
                        Err(err) => {
                            warn!(error = %err, "failed to spawn managed application");
                            self.deferred.push_back(SupervisorEvent::SpawnFailed {
                                reason: err.to_string(),
                            });
                        }
                    }
                }
                CoreCommand::TerminateChild => {
                    if let Err(err) = self.backend.terminate_child().await {
                        warn!(error = %err, "failed to terminate managed application");
                    }
                }
                CoreCommand::Exit { code, grace } => {
                    self.event_log.flush().await?;
                    if !grace.is_zero() {
                        sleep(grace).await;
                    }
                    return Ok(Some(SupervisorExit { code }));
                }
            }
        }

        Ok(None)
    }

    /// Next event to step. Deferred events yield first so that anything
    /// already sent on the channel (a manual stop, say) runs ahead of them.
    async fn next_event(&mut self) -> Option<SupervisorEvent> {
        let Some(deferred) = self.deferred.pop_front() else {
            return self.event_rx.recv().await;
        };

        tokio::task::yield_now().await;
        match self.event_rx.try_recv() {
            Ok(event) => {
                self.deferred.push_front(deferred);
                Some(event)
            }
            Err(_) => Some(deferred),
        }
    }

    /// Wait out the restart delay while still listening for events.
    ///
    /// Returns `true` when a manual stop arrived; it is queued so the main
    /// loop handles it next. Other events are queued behind it in arrival
    /// order.
    async fn restart_delay_interrupted(&mut self, delay: Duration) -> bool {
        debug!(?delay, "waiting before respawn");
        let deadline = Instant::now() + delay;

        loop {
            tokio::select! {
                _ = sleep_until(deadline) => return false,
                event = self.event_rx.recv() => match event {
                    Some(SupervisorEvent::KillRequested) => {
                        self.deferred.push_front(SupervisorEvent::KillRequested);
                        return true;
                    }
                    Some(other) => self.deferred.push_back(other),
                    None => {
                        sleep_until(deadline).await;
                        return false;
                    }
                },
            }
        }
    }
}

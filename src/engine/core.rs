// src/engine/core.rs

//! Pure supervisor state machine.
//!
//! This module contains a synchronous, deterministic "core" that consumes
//! [`SupervisorEvent`]s and produces:
//! - an updated [`SupervisorCore`] state
//! - a list of commands describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Supervisor`) is responsible for:
//! - reading events from the channel
//! - writing log records and dispatching notifications
//! - spawning / terminating the child through a `ChildBackend`
//!
//! Commands are executed by the shell strictly in the order they are
//! returned, each awaited to completion before the next one starts.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::debug;

use crate::config::ConfigFile;
use crate::engine::policy::{RestartDecision, RestartPolicy};
use crate::engine::stderr_window::StderrWindow;
use crate::engine::SupervisorEvent;
use crate::event_log::LogEntry;
use crate::notify::{AlertContext, AppIdentity};
use crate::types::{ConsoleLevel, OutputStream};

/// Exit status used when restarts are disabled or exhausted.
pub const EXIT_CODE_GAVE_UP: i32 = 1;

/// Lifecycle phase of the managed child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorPhase {
    Idle,
    Starting,
    Running,
    Crashed,
    Restarting,
    Terminating,
}

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreCommand {
    /// Write one event log record.
    Log(LogEntry),
    /// Send the alert to every notification channel, one at a time.
    Notify(AlertContext),
    /// (Re)spawn the child after `delay`.
    SpawnChild { delay: Duration },
    /// Ask the live child to terminate.
    TerminateChild,
    /// Flush, wait `grace`, then stop with `code`.
    Exit { code: i32, grace: Duration },
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
}

impl CoreStep {
    /// Exit code requested by this step, if any.
    pub fn exit_code(&self) -> Option<i32> {
        self.commands.iter().find_map(|c| match c {
            CoreCommand::Exit { code, .. } => Some(*code),
            _ => None,
        })
    }

    pub fn alerts(&self) -> impl Iterator<Item = &AlertContext> {
        self.commands.iter().filter_map(|c| match c {
            CoreCommand::Notify(alert) => Some(alert),
            _ => None,
        })
    }

    pub fn log_entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.commands.iter().filter_map(|c| match c {
            CoreCommand::Log(entry) => Some(entry),
            _ => None,
        })
    }

    pub fn spawns(&self) -> bool {
        self.commands
            .iter()
            .any(|c| matches!(c, CoreCommand::SpawnChild { .. }))
    }
}

/// Immutable inputs of the state machine.
#[derive(Debug, Clone)]
pub struct CoreSettings {
    pub app: AppIdentity,
    pub hostname: String,
    pub policy: RestartPolicy,
    pub stderr_window: Duration,
    pub restart_delay: Duration,
    pub exit_grace: Duration,
}

impl CoreSettings {
    pub fn from_config(cfg: &ConfigFile, hostname: impl Into<String>) -> Self {
        let sup = &cfg.supervisor;
        Self {
            app: AppIdentity::from(&cfg.app),
            hostname: hostname.into(),
            policy: RestartPolicy::new(sup.restart_on_crash, sup.max_restarts),
            stderr_window: sup.stderr_window(),
            restart_delay: sup.restart_delay(),
            exit_grace: sup.exit_grace(),
        }
    }
}

/// Handle to the live child as far as the core is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildHandle {
    pub pid: Option<u32>,
}

/// Supervisor state. Single owner, no channels, no IO.
#[derive(Debug)]
pub struct SupervisorCore {
    settings: CoreSettings,
    phase: SupervisorPhase,
    restart_count: u32,
    child: Option<ChildHandle>,
    child_started_at: Option<DateTime<Utc>>,
    stderr: StderrWindow,
}

impl SupervisorCore {
    pub fn new(settings: CoreSettings) -> Self {
        let stderr = StderrWindow::new(settings.stderr_window);
        Self {
            settings,
            phase: SupervisorPhase::Idle,
            restart_count: 0,
            child: None,
            child_started_at: None,
            stderr,
        }
    }

    pub fn settings(&self) -> &CoreSettings {
        &self.settings
    }

    pub fn phase(&self) -> SupervisorPhase {
        self.phase
    }

    pub fn restart_count(&self) -> u32 {
        self.restart_count
    }

    pub fn child(&self) -> Option<ChildHandle> {
        self.child
    }

    pub fn child_started_at(&self) -> Option<DateTime<Utc>> {
        self.child_started_at
    }

    pub fn stderr_snapshot(&self) -> String {
        self.stderr.snapshot()
    }

    /// Handle a single event, updating state and returning the commands for
    /// the IO shell.
    pub fn step(&mut self, event: SupervisorEvent, now: DateTime<Utc>) -> CoreStep {
        let commands = match event {
            SupervisorEvent::Start => self.on_start(),
            SupervisorEvent::ChildStarted { pid } => self.on_child_started(pid, now),
            SupervisorEvent::SpawnFailed { reason } => self.on_spawn_failed(reason, now),
            SupervisorEvent::ChildOutput { stream, text } => self.on_output(stream, text, now),
            SupervisorEvent::ChildExited { code, signal } => self.on_exit(code, signal, now),
            SupervisorEvent::KillRequested => self.on_kill(),
        };
        CoreStep { commands }
    }

    fn on_start(&mut self) -> Vec<CoreCommand> {
        if self.phase != SupervisorPhase::Idle {
            debug!(phase = ?self.phase, "start requested twice; ignoring");
            return Vec::new();
        }

        self.phase = SupervisorPhase::Starting;
        vec![
            CoreCommand::Log(self.supervisor_entry(
                ConsoleLevel::Message,
                format!("starting {}", self.settings.app.name),
            )),
            CoreCommand::SpawnChild {
                delay: Duration::ZERO,
            },
        ]
    }

    fn on_child_started(&mut self, pid: Option<u32>, now: DateTime<Utc>) -> Vec<CoreCommand> {
        if !self.awaiting_spawn() {
            debug!(phase = ?self.phase, ?pid, "child started outside of a spawn; ignoring");
            return Vec::new();
        }

        self.phase = SupervisorPhase::Running;
        self.child = Some(ChildHandle { pid });
        self.child_started_at = Some(now);

        let pid_text = pid.map_or_else(|| "unknown".to_string(), |p| p.to_string());
        vec![CoreCommand::Log(
            self.supervisor_entry(
                ConsoleLevel::Success,
                format!("{} started with pid {}", self.settings.app.name, pid_text),
            )
            .with_data(json!({ "pid": pid, "restartCount": self.restart_count })),
        )]
    }

    fn on_spawn_failed(&mut self, reason: String, now: DateTime<Utc>) -> Vec<CoreCommand> {
        if !self.awaiting_spawn() {
            debug!(phase = ?self.phase, "spawn failure outside of a spawn; ignoring");
            return Vec::new();
        }

        self.child = None;
        self.stderr.record(reason.clone(), now);

        let mut commands = vec![CoreCommand::Log(
            LogEntry::app_error(reason.clone())
                .with_error_context(reason)
                .with_app_started_at(self.child_started_at),
        )];
        commands.extend(self.crash_pipeline(json!({ "spawnFailed": true }), now));
        commands
    }

    fn on_output(
        &mut self,
        stream: OutputStream,
        text: String,
        now: DateTime<Utc>,
    ) -> Vec<CoreCommand> {
        if matches!(self.phase, SupervisorPhase::Idle | SupervisorPhase::Terminating) {
            debug!(phase = ?self.phase, "child output outside of a run; dropping");
            return Vec::new();
        }

        let entry = match stream {
            OutputStream::Stdout => LogEntry::app_output(text),
            OutputStream::Stderr => {
                self.stderr.record(text.clone(), now);
                LogEntry::app_error(text)
            }
        };
        vec![CoreCommand::Log(entry.with_app_started_at(self.child_started_at))]
    }

    fn on_exit(
        &mut self,
        code: Option<i32>,
        signal: Option<i32>,
        now: DateTime<Utc>,
    ) -> Vec<CoreCommand> {
        if self.phase != SupervisorPhase::Running {
            debug!(phase = ?self.phase, ?code, ?signal, "child exit outside of a run; ignoring");
            return Vec::new();
        }

        self.child = None;
        self.crash_pipeline(json!({ "exitCode": code, "signal": signal }), now)
    }

    /// Crash handling: log, decide, notify, act. The shell runs these in
    /// order and aborts on the first failure.
    fn crash_pipeline(
        &mut self,
        exit_data: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Vec<CoreCommand> {
        self.phase = SupervisorPhase::Crashed;

        let app = self.settings.app.name.clone();
        let policy = self.settings.policy;
        let crash_count = self.restart_count.saturating_add(1);
        let formatted_count = policy.format_count(crash_count);

        let mut commands = vec![CoreCommand::Log(
            self.supervisor_entry(
                ConsoleLevel::Error,
                format!("{app} crashed {crash_count} time(s)"),
            )
            .with_data(exit_data),
        )];

        let decision = policy.decide(crash_count);
        let message = match decision {
            RestartDecision::Restart => {
                format!("{app} crashed; restarting (restart {formatted_count})")
            }
            RestartDecision::QuitLimit => format!(
                "{app} crashed and reached the restart limit of {}; supervisor is exiting",
                policy.max_restarts
            ),
            RestartDecision::QuitDisabled => {
                format!("{app} crashed and restarts are disabled; supervisor is exiting")
            }
        };

        commands.push(CoreCommand::Notify(AlertContext {
            notification_type: decision.notification_type(),
            timestamp: now,
            app: self.settings.app.clone(),
            hostname: self.settings.hostname.clone(),
            restart_count: formatted_count.clone(),
            message: message.clone(),
            stderr: self.stderr.snapshot(),
            app_started_at: self.child_started_at,
        }));

        if decision.is_restart() {
            self.restart_count = crash_count;
            self.phase = SupervisorPhase::Restarting;
            commands.push(CoreCommand::Log(self.supervisor_entry(
                ConsoleLevel::Warning,
                format!("restarting {app} (restart {formatted_count})"),
            )));
            commands.push(CoreCommand::SpawnChild {
                delay: self.settings.restart_delay,
            });
        } else {
            self.phase = SupervisorPhase::Terminating;
            self.child = None;
            commands.push(CoreCommand::Log(
                self.supervisor_entry(ConsoleLevel::Error, message),
            ));
            commands.push(CoreCommand::Exit {
                code: EXIT_CODE_GAVE_UP,
                grace: self.settings.exit_grace,
            });
        }

        commands
    }

    /// Manual stop. Never consults the restart policy and never notifies.
    fn on_kill(&mut self) -> Vec<CoreCommand> {
        if self.phase == SupervisorPhase::Terminating {
            debug!("kill requested while already terminating; ignoring");
            return Vec::new();
        }

        let mut commands = Vec::new();
        if self.child.take().is_some() {
            commands.push(CoreCommand::TerminateChild);
        }

        self.phase = SupervisorPhase::Terminating;
        self.child_started_at = None;
        self.stderr.clear();

        commands.push(CoreCommand::Log(self.supervisor_entry(
            ConsoleLevel::Important,
            format!("{} stopped by supervisor, goodbye", self.settings.app.name),
        )));
        commands.push(CoreCommand::Exit {
            code: 0,
            grace: self.settings.exit_grace,
        });
        commands
    }

    fn awaiting_spawn(&self) -> bool {
        matches!(
            self.phase,
            SupervisorPhase::Starting | SupervisorPhase::Restarting
        )
    }

    fn supervisor_entry(&self, level: ConsoleLevel, message: String) -> LogEntry {
        LogEntry::supervisor(level, message).with_app_started_at(self.child_started_at)
    }
}

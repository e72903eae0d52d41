use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use warden::config::ConfigFile;
use warden::engine::{CoreSettings, Supervisor, SupervisorCore, SupervisorEvent};
use warden::event_log::{EventLog, EventStream};
use warden::exec::LaunchSpec;
use warden::notify::{NotificationChannel, Notifier};
use warden::sinks::LogSink;

use crate::fake_backend::{BackendState, ScriptedBackend, ScriptedRun};
use crate::recording::{Journal, MemorySink, journal};

/// A supervisor wired to a scripted backend and an in-memory log sink.
pub struct Harness {
    pub supervisor: Supervisor<ScriptedBackend>,
    /// Extra sender for injecting events (e.g. `KillRequested`).
    pub events: mpsc::Sender<SupervisorEvent>,
    pub backend: Arc<Mutex<BackendState>>,
    /// NDJSON lines written to the event stream.
    pub log_lines: Journal,
}

impl Harness {
    pub fn new(
        cfg: &ConfigFile,
        script: Vec<ScriptedRun>,
        channels: Vec<Box<dyn NotificationChannel>>,
    ) -> Self {
        let log_lines = journal();
        let sink: Box<dyn LogSink> = Box::new(MemorySink::new(Arc::clone(&log_lines)));
        Self::with_sinks(cfg, script, channels, vec![sink], log_lines)
    }

    /// Every spawn plays `run`, e.g. `ScriptedRun::spawn_failure(..)` for a
    /// program that can never start.
    pub fn repeating(
        cfg: &ConfigFile,
        run: ScriptedRun,
        channels: Vec<Box<dyn NotificationChannel>>,
    ) -> Self {
        let log_lines = journal();
        let sink: Box<dyn LogSink> = Box::new(MemorySink::new(Arc::clone(&log_lines)));
        Self::build(cfg, Vec::new(), run, channels, vec![sink], log_lines)
    }

    pub fn with_sinks(
        cfg: &ConfigFile,
        script: Vec<ScriptedRun>,
        channels: Vec<Box<dyn NotificationChannel>>,
        sinks: Vec<Box<dyn LogSink>>,
        log_lines: Journal,
    ) -> Self {
        Self::build(cfg, script, ScriptedRun::running(), channels, sinks, log_lines)
    }

    fn build(
        cfg: &ConfigFile,
        script: Vec<ScriptedRun>,
        fallback: ScriptedRun,
        channels: Vec<Box<dyn NotificationChannel>>,
        sinks: Vec<Box<dyn LogSink>>,
        log_lines: Journal,
    ) -> Self {
        let (events, event_rx) = mpsc::channel::<SupervisorEvent>(64);
        let backend = ScriptedBackend::new(events.clone(), script).with_fallback(fallback);
        let backend_state = backend.state();

        let core = SupervisorCore::new(CoreSettings::from_config(cfg, "test-host"));
        let event_log = EventLog::new(&cfg.app.name, "test-host", EventStream::new(sinks));

        let supervisor = Supervisor::new(
            core,
            event_rx,
            backend,
            LaunchSpec::from(&cfg.app),
            event_log,
            Notifier::new(channels),
        );

        Self {
            supervisor,
            events,
            backend: backend_state,
            log_lines,
        }
    }
}

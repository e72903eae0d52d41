// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod event_log;
pub mod exec;
pub mod logging;
pub mod notify;
pub mod sinks;
pub mod types;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::config::loader::load_and_validate;
use crate::engine::{CoreSettings, Supervisor, SupervisorCore, SupervisorEvent};
use crate::event_log::{EventLog, EventStream, local_hostname};
use crate::exec::{LaunchSpec, RealChildBackend};
use crate::notify::Notifier;

/// High-level entry point used by `main.rs`. Returns the process exit
/// status.
///
/// This wires together:
/// - config loading + logging
/// - log sinks and notification channels (initialised in order; any
///   failure aborts startup)
/// - the supervisor core / runtime
/// - the real child backend
/// - Ctrl-C / SIGTERM handling
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_and_validate(&args.config)?;

    let debug = args.debug || cfg.supervisor.debug;
    logging::init_logging(args.log_level, debug)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(0);
    }

    let sinks = sinks::registry::build_all(&cfg.streams).await?;
    let channels = notify::registry::build_all(&cfg.notifications).await?;
    info!(
        sinks = sinks.len(),
        channels = channels.len(),
        "plugins initialised"
    );

    let hostname = local_hostname();
    let event_log = EventLog::new(&cfg.app.name, hostname.clone(), EventStream::new(sinks));
    let notifier = Notifier::new(channels);

    // Supervisor event channel.
    let (event_tx, event_rx) = mpsc::channel::<SupervisorEvent>(256);

    let backend = RealChildBackend::new(event_tx.clone());

    spawn_signal_listener(event_tx);

    let core = SupervisorCore::new(CoreSettings::from_config(&cfg, hostname));
    let supervisor = Supervisor::new(
        core,
        event_rx,
        backend,
        LaunchSpec::from(&cfg.app),
        event_log,
        notifier,
    );

    let exit = supervisor.run().await?;
    Ok(exit.code)
}

/// Ctrl-C (and SIGTERM on unix) → manual stop.
fn spawn_signal_listener(tx: mpsc::Sender<SupervisorEvent>) {
    tokio::spawn(async move {
        if !wait_for_stop_signal().await {
            return;
        }
        debug!("stop signal received");
        let _ = tx.send(SupervisorEvent::KillRequested).await;
    });
}

#[cfg(unix)]
async fn wait_for_stop_signal() -> bool {
    use tokio::signal::unix::{SignalKind, signal};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            warn!(error = %e, "failed to listen for SIGTERM; only Ctrl+C will stop the supervisor");
            return ctrl_c().await;
        }
    };

    tokio::select! {
        stopped = ctrl_c() => stopped,
        _ = term.recv() => true,
    }
}

#[cfg(not(unix))]
async fn wait_for_stop_signal() -> bool {
    ctrl_c().await
}

async fn ctrl_c() -> bool {
    match tokio::signal::ctrl_c().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "failed to listen for Ctrl+C");
            false
        }
    }
}

/// Simple dry-run output: print the effective configuration.
fn print_dry_run(cfg: &ConfigFile) {
    println!("warden dry-run");
    println!("  app.name = {}", cfg.app.name);
    println!("  app.version = {}", cfg.app.version);
    println!("  app.environment = {}", cfg.app.environment);
    println!("  app.command = {}", LaunchSpec::from(&cfg.app).display());
    if let Some(ref cwd) = cfg.app.cwd {
        println!("  app.cwd = {}", cwd.display());
    }
    if !cfg.app.env.is_empty() {
        println!("  app.env = {:?}", cfg.app.env.keys().collect::<Vec<_>>());
    }
    println!();

    let sup = &cfg.supervisor;
    println!("supervisor:");
    println!("  restart_on_crash = {}", sup.restart_on_crash);
    if sup.max_restarts == 0 {
        println!("  max_restarts = unlimited");
    } else {
        println!("  max_restarts = {}", sup.max_restarts);
    }
    println!("  stderr_window_ms = {}", sup.stderr_window_ms);
    println!("  restart_delay_ms = {}", sup.restart_delay_ms);
    println!("  exit_grace_ms = {}", sup.exit_grace_ms);
    println!("  debug = {}", sup.debug);
    println!();

    println!("streams ({}):", cfg.streams.len());
    for stream in cfg.streams.iter() {
        println!("  - {} {:?}", stream.kind, stream.options);
    }

    println!("notifications ({}):", cfg.notifications.len());
    for channel in cfg.notifications.iter() {
        println!("  - {}", channel.kind);
    }

    debug!("dry-run complete (no execution)");
}

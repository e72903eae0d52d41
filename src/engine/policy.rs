// src/engine/policy.rs

//! Restart decision after a child crash.

use crate::types::NotificationType;

/// What the supervisor should do once the child has terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartDecision {
    /// Respawn the child.
    Restart,
    /// Restarts are disabled; terminate the supervisor.
    QuitDisabled,
    /// The restart limit has been reached; terminate the supervisor.
    QuitLimit,
}

impl RestartDecision {
    pub fn is_restart(&self) -> bool {
        matches!(self, RestartDecision::Restart)
    }

    /// Alert classification that goes with this decision.
    pub fn notification_type(&self) -> NotificationType {
        match self {
            RestartDecision::Restart => NotificationType::Crash,
            RestartDecision::QuitDisabled => NotificationType::NoRestartAllowed,
            RestartDecision::QuitLimit => NotificationType::RestartLimitReached,
        }
    }
}

/// Restart policy taken from `[supervisor]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartPolicy {
    pub restart_on_crash: bool,
    /// `0` means unlimited.
    pub max_restarts: u32,
}

impl RestartPolicy {
    pub fn new(restart_on_crash: bool, max_restarts: u32) -> Self {
        Self {
            restart_on_crash,
            max_restarts,
        }
    }

    /// Decide using the restart count the supervisor would have *after*
    /// handling this crash.
    pub fn decide(&self, restart_count_after_crash: u32) -> RestartDecision {
        decide(
            self.restart_on_crash,
            self.max_restarts,
            restart_count_after_crash,
        )
    }

    /// `"N"` when unlimited, `"N/max"` otherwise.
    pub fn format_count(&self, count: u32) -> String {
        if self.max_restarts > 0 {
            format!("{}/{}", count, self.max_restarts)
        } else {
            count.to_string()
        }
    }
}

/// Pure restart decision. Rules are applied in order:
///
/// 1. restarts disabled → `QuitDisabled`
/// 2. finite limit reached → `QuitLimit`
/// 3. otherwise → `Restart`
pub fn decide(
    restart_on_crash: bool,
    max_restarts: u32,
    restart_count_after_crash: u32,
) -> RestartDecision {
    if !restart_on_crash {
        return RestartDecision::QuitDisabled;
    }
    if max_restarts > 0 && restart_count_after_crash >= max_restarts {
        return RestartDecision::QuitLimit;
    }
    RestartDecision::Restart
}

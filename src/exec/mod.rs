// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the managed application,
//! using `tokio::process::Command`, and reporting back to the supervisor via
//! `SupervisorEvent`s.
//!
//! - [`backend`] provides the `ChildBackend` trait and the concrete
//!   `RealChildBackend` the supervisor uses in production, and which tests
//!   replace with a scripted fake.
//! - [`child_runner`] spawns the process and forwards its output and exit.

pub mod backend;
pub mod child_runner;

pub use backend::{ChildBackend, LaunchSpec, RealChildBackend};

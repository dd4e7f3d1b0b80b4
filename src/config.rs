// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line and environment configuration for the controller binary.
//!
//! Every flag can also be set through the environment variable named in its
//! help text; flags win over the environment.

use crate::constants::{
    ERROR_REQUEUE_DURATION_SECS, METRICS_SERVER_BIND_ADDRESS, RESYNC_INTERVAL_SECS,
    TOKIO_WORKER_THREADS,
};
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::time::Duration;

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Controller settings
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ControllerArgs {
    /// Address the metrics and health endpoints listen on
    #[arg(long, env = "METRICS_BIND_ADDRESS", default_value = METRICS_SERVER_BIND_ADDRESS)]
    pub metrics_bind_address: SocketAddr,

    /// Log output format
    #[arg(long, env = "RUST_LOG_FORMAT", value_enum, ignore_case = true, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Seconds between periodic resyncs after a successful run
    #[arg(long, env = "RESYNC_INTERVAL_SECS", default_value_t = RESYNC_INTERVAL_SECS)]
    pub resync_interval_secs: u64,

    /// Seconds before retrying after a failed run
    #[arg(long, env = "ERROR_REQUEUE_SECS", default_value_t = ERROR_REQUEUE_DURATION_SECS)]
    pub error_requeue_secs: u64,

    /// Tokio worker threads
    #[arg(long, env = "WORKER_THREADS", default_value_t = TOKIO_WORKER_THREADS)]
    pub worker_threads: usize,
}

impl ControllerArgs {
    #[must_use]
    pub fn resync_interval(&self) -> Duration {
        Duration::from_secs(self.resync_interval_secs)
    }

    #[must_use]
    pub fn error_requeue(&self) -> Duration {
        Duration::from_secs(self.error_requeue_secs)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;

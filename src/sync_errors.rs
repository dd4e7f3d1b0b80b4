// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for OAuth client reconciliation.
//!
//! Every failure the reconciler can produce is one of the [`SyncError`]
//! variants. Errors are returned to the caller verbatim; the controller
//! wrapper in `main.rs` logs them and decides when to requeue.
//!
//! Transport failures from the `OAuthClient` API are first reported as
//! [`ApiError`] (the outcome vocabulary of the create/get/update calls) and
//! then translated into a [`SyncError`] by the ensure protocol.

use thiserror::Error;

/// Reason string for [`SyncError::Configuration`]
pub const REASON_CONFIGURATION_ERROR: &str = "ConfigurationError";

/// Reason string for [`SyncError::DependencyNotFound`]
pub const REASON_DEPENDENCY_NOT_FOUND: &str = "DependencyNotFound";

/// Reason string for [`SyncError::HostMismatch`]
pub const REASON_HOST_MISMATCH: &str = "HostMismatch";

/// Reason string for [`SyncError::Validation`]
pub const REASON_VALIDATION_ERROR: &str = "ValidationError";

/// Reason string for [`SyncError::Conflict`]
pub const REASON_CONFLICT: &str = "Conflict";

/// Reason string for [`SyncError::Transient`]
pub const REASON_TRANSIENT_ERROR: &str = "TransientError";

/// Errors returned by a reconciliation run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Required cluster-level configuration is missing or incomplete.
    ///
    /// Not retryable by the reconciler itself; the controller requeues and an
    /// administrator is expected to fix the configuration.
    #[error("Cluster ingress configuration '{name}' is unusable: {reason}")]
    Configuration {
        /// Name of the configuration object
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// A referenced singleton object does not exist in the cache.
    #[error("{kind} '{namespace}/{name}' not found")]
    DependencyNotFound {
        /// Kind of the missing object
        kind: String,
        /// Namespace of the missing object
        namespace: String,
        /// Name of the missing object
        name: String,
    },

    /// The candidate hostname is not among the hosts admitted by the route.
    #[error("Host '{host}' is not admitted by route '{namespace}/{name}' (admitted: [{}])", .admitted.join(", "))]
    HostMismatch {
        /// The hostname that failed validation
        host: String,
        /// Route namespace
        namespace: String,
        /// Route name
        name: String,
        /// Hosts the route does admit
        admitted: Vec<String>,
    },

    /// The API server rejected the desired `OAuthClient`.
    #[error("OAuthClient '{name}' failed validation: {reason}")]
    Validation {
        /// Client name (may be empty when the name itself is missing)
        name: String,
        /// Validation message from the API server
        reason: String,
    },

    /// Optimistic-concurrency conflict persisted through every retry.
    #[error("OAuthClient '{name}' update conflicted on {attempts} attempt(s), giving up")]
    Conflict {
        /// Client name
        name: String,
        /// Number of attempts made
        attempts: u32,
    },

    /// I/O or transport failure talking to the API server.
    #[error("Failed to {operation} OAuthClient '{name}': {reason}")]
    Transient {
        /// The failing operation (`create`, `get`, `update`)
        operation: String,
        /// Client name
        name: String,
        /// Underlying error message
        reason: String,
    },
}

impl SyncError {
    /// Stable `CamelCase` reason for logs and metric labels.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            SyncError::Configuration { .. } => REASON_CONFIGURATION_ERROR,
            SyncError::DependencyNotFound { .. } => REASON_DEPENDENCY_NOT_FOUND,
            SyncError::HostMismatch { .. } => REASON_HOST_MISMATCH,
            SyncError::Validation { .. } => REASON_VALIDATION_ERROR,
            SyncError::Conflict { .. } => REASON_CONFLICT,
            SyncError::Transient { .. } => REASON_TRANSIENT_ERROR,
        }
    }

    /// Whether this is a write conflict that may succeed on a fresh read.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, SyncError::Conflict { .. })
    }
}

/// Outcome of a failed `OAuthClient` API call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Create rejected because an object with that name exists (HTTP 409)
    #[error("already exists")]
    AlreadyExists,

    /// No object with that name (HTTP 404)
    #[error("not found")]
    NotFound,

    /// Update rejected because the resource version is stale (HTTP 409)
    #[error("the object has been modified; please apply your changes to the latest version")]
    Conflict,

    /// Server-side validation failure (HTTP 400/422)
    #[error("invalid: {0}")]
    Invalid(String),

    /// Any other failure, including network errors and 5xx responses
    #[error("{0}")]
    Transient(String),
}

#[cfg(test)]
#[path = "sync_errors_tests.rs"]
mod sync_errors_tests;

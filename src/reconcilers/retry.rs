// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Bounded retry for optimistic-concurrency conflicts.
//!
//! Writes carry the resource version read just before them. When another
//! writer got there first the API server rejects the write with a conflict,
//! and the whole read-compare-write sequence has to be repeated against the
//! fresh object. This module provides that loop.
//!
//! Only [`SyncError::Conflict`] is retried. Every other error is returned
//! immediately. No delay is inserted between attempts; pacing is left to the
//! transport.

use crate::sync_errors::SyncError;
use std::future::Future;
use std::time::Instant;
use tracing::{debug, error, warn};

pub use crate::constants::DEFAULT_CONFLICT_RETRY_ATTEMPTS;

/// Run `operation` until it stops reporting a conflict, at most `max_attempts` times.
///
/// The closure receives the 1-based attempt number. When the final attempt
/// still conflicts, the returned [`SyncError::Conflict`] carries the number of
/// attempts made.
///
/// # Arguments
///
/// * `max_attempts` - Upper bound on attempts (values below 1 are treated as 1)
/// * `operation_name` - Human-readable name for logging (e.g., "update OAuthClient foo")
/// * `operation` - The read-compare-write sequence to run
///
/// # Errors
///
/// Returns the first non-conflict error, or a conflict once attempts are exhausted.
///
/// # Example
///
/// ```rust
/// use oauth_clients_controller::reconcilers::retry::retry_on_conflict;
/// use oauth_clients_controller::sync_errors::SyncError;
///
/// # async fn example() -> Result<(), SyncError> {
/// let value = retry_on_conflict(5, "example", |attempt| async move {
///     if attempt < 3 {
///         Err(SyncError::Conflict { name: "example".to_string(), attempts: attempt })
///     } else {
///         Ok(attempt)
///     }
/// })
/// .await?;
/// assert_eq!(value, 3);
/// # Ok(())
/// # }
/// ```
pub async fn retry_on_conflict<T, F, Fut>(
    max_attempts: u32,
    operation_name: &str,
    mut operation: F,
) -> Result<T, SyncError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, SyncError>>,
{
    let max_attempts = max_attempts.max(1);
    let start_time = Instant::now();
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(
                        operation = operation_name,
                        attempt = attempt,
                        elapsed = ?start_time.elapsed(),
                        "Operation succeeded after conflict retries"
                    );
                }
                return Ok(value);
            }
            Err(SyncError::Conflict { name, .. }) if attempt < max_attempts => {
                warn!(
                    operation = operation_name,
                    name = %name,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    "Write conflict, retrying against the latest version"
                );
            }
            Err(SyncError::Conflict { name, .. }) => {
                error!(
                    operation = operation_name,
                    name = %name,
                    attempt = attempt,
                    elapsed = ?start_time.elapsed(),
                    "Write conflict persisted through all attempts, giving up"
                );
                return Err(SyncError::Conflict {
                    name,
                    attempts: attempt,
                });
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod retry_tests;

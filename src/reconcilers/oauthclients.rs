// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Bootstrap OAuth client reconciliation.
//!
//! Keeps the three platform OAuth clients (browser, challenging and CLI)
//! registered with redirect URIs that point at the authentication route's
//! admitted hostname.
//!
//! A sync run:
//!
//! 1. Resolves the hostname from the cached ingress configuration and route
//!    ([`hostname::resolve_hostname`])
//! 2. Builds the desired clients ([`bootstrap::build_desired_clients`])
//! 3. Ensures each client in order ([`ensure::ensure_oauth_client`]),
//!    stopping at the first failure
//!
//! # Example
//!
//! ```rust,no_run
//! use oauth_clients_controller::context::InMemoryLookup;
//! use oauth_clients_controller::reconcilers::oauthclients::OAuthClientsReconciler;
//! use oauth_clients_controller::reconcilers::resources::InMemoryOAuthClients;
//!
//! async fn run(lookup: InMemoryLookup) -> anyhow::Result<()> {
//!     let reconciler = OAuthClientsReconciler::new(lookup, InMemoryOAuthClients::new());
//!     reconciler.sync().await?;
//!     Ok(())
//! }
//! ```

pub mod bootstrap;
pub mod ensure;
pub mod hostname;

use super::resources::OAuthClientApi;
use crate::constants::DEFAULT_CONFLICT_RETRY_ATTEMPTS;
use crate::context::ClusterLookup;
use crate::sync_errors::SyncError;
use tracing::{debug, info, warn};

pub use bootstrap::{build_desired_clients, BootstrapClientSpec, SecretPolicy};
pub use ensure::{ensure_oauth_client, merge_desired, EnsureOutcome};
pub use hostname::resolve_hostname;

/// Reconciler for the bootstrap OAuth clients.
///
/// Holds no state between runs besides its collaborators, so concurrent
/// calls to [`sync`](Self::sync) are safe; they are serialized only by the
/// API server's optimistic concurrency.
pub struct OAuthClientsReconciler<L, A> {
    lookup: L,
    api: A,
    max_conflict_attempts: u32,
}

impl<L: ClusterLookup, A: OAuthClientApi> OAuthClientsReconciler<L, A> {
    /// Create a reconciler reading from `lookup` and writing through `api`.
    #[must_use]
    pub fn new(lookup: L, api: A) -> Self {
        Self {
            lookup,
            api,
            max_conflict_attempts: DEFAULT_CONFLICT_RETRY_ATTEMPTS,
        }
    }

    /// Override how many times an update is attempted on conflict.
    #[must_use]
    pub fn with_max_conflict_attempts(mut self, attempts: u32) -> Self {
        self.max_conflict_attempts = attempts;
        self
    }

    /// Run one reconciliation pass.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered. Clients after the failing one are
    /// not touched in this run.
    pub async fn sync(&self) -> Result<(), SyncError> {
        let hostname = resolve_hostname(&self.lookup).inspect_err(|e| {
            warn!(reason = e.reason(), error = %e, "Unable to resolve OAuth server hostname");
        })?;
        debug!(hostname = %hostname, "Resolved OAuth server hostname");

        let mut changed = 0usize;
        for spec in build_desired_clients(&hostname) {
            let desired = spec.to_oauth_client();
            let outcome = ensure_oauth_client(&self.api, &desired, self.max_conflict_attempts)
                .await
                .inspect_err(|e| {
                    warn!(
                        name = %spec.name,
                        reason = e.reason(),
                        error = %e,
                        "Failed to ensure OAuthClient"
                    );
                })?;
            if outcome != EnsureOutcome::Unchanged {
                changed += 1;
            }
        }

        if changed > 0 {
            info!(hostname = %hostname, changed = changed, "Bootstrap OAuth clients reconciled");
        } else {
            debug!(hostname = %hostname, "Bootstrap OAuth clients up to date");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "oauthclients_tests.rs"]
mod oauthclients_tests;

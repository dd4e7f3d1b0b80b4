// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation logic for the bootstrap OAuth clients.
//!
//! # Reconciliation Architecture
//!
//! The controller follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - The ingress configuration, authentication route and
//!    managed `OAuthClient` objects are watched and cached
//! 2. **Resolve** - The authentication hostname is derived from the caches
//! 3. **Ensure** - Each bootstrap client is created or brought up to date
//!
//! # Modules
//!
//! - [`oauthclients`] - Hostname resolution, desired state and the ensure protocol
//! - [`resources`] - Create/get/update transport for `OAuthClient` objects
//! - [`retry`] - Bounded retry on optimistic-concurrency conflicts

pub mod oauthclients;
pub mod resources;
pub mod retry;

pub use oauthclients::{EnsureOutcome, OAuthClientsReconciler};
pub use resources::{InMemoryOAuthClients, OAuthClientApi};
pub use retry::retry_on_conflict;

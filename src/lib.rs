// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # OAuth Clients Controller
//!
//! A Kubernetes controller that keeps the platform's bootstrap OAuth clients
//! registered against the authentication server's public hostname.
//!
//! ## Overview
//!
//! The controller watches the cluster ingress configuration and the
//! `openshift-authentication/oauth-openshift` route. Whenever either changes
//! it resolves the hostname the route actually serves and makes sure three
//! `OAuthClient` objects exist with redirect URIs pointing at it:
//!
//! - `openshift-browser-client` - confidential client used by the token display page
//! - `openshift-challenging-client` - public client answering with auth challenges
//! - `openshift-cli-client` - public client for loopback CLI logins
//!
//! ## Modules
//!
//! - [`crd`] - Resource types for ingress configuration, routes and OAuth clients
//! - [`context`] - Read-only cache lookups used during reconciliation
//! - [`reconcilers`] - Hostname resolution, desired state and the ensure protocol
//! - [`sync_errors`] - Error taxonomy for reconciliation runs
//! - [`metrics`] - Prometheus metrics
//! - [`config`] - Command-line and environment configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use oauth_clients_controller::reconcilers::oauthclients::build_desired_clients;
//!
//! let clients = build_desired_clients("oauth-openshift.apps.example.com");
//! assert_eq!(clients.len(), 3);
//! ```

pub mod config;
pub mod constants;
pub mod context;
pub mod crd;
pub mod metrics;
pub mod reconcilers;
pub mod sync_errors;

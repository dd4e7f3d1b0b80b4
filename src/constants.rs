// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the OAuth clients controller.
//!
//! The fixed identifiers in this module are part of the controller's behavior:
//! changing any of them changes which objects the controller reads or writes.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group of the cluster-wide ingress configuration
pub const CONFIG_API_GROUP: &str = "config.openshift.io";

/// API group of routes
pub const ROUTE_API_GROUP: &str = "route.openshift.io";

/// API group of OAuth clients
pub const OAUTH_API_GROUP: &str = "oauth.openshift.io";

/// API version shared by all consumed groups
pub const API_VERSION: &str = "v1";

/// Fully qualified API version for `OAuthClient`
pub const OAUTH_API_GROUP_VERSION: &str = "oauth.openshift.io/v1";

/// Kind name for `OAuthClient` resource
pub const KIND_OAUTH_CLIENT: &str = "OAuthClient";

/// Plural resource name for `OAuthClient`
pub const PLURAL_OAUTH_CLIENTS: &str = "oauthclients";

/// Kind name for the cluster ingress configuration
pub const KIND_INGRESS_CONFIG: &str = "Ingress";

/// Kind name for `Route` resource
pub const KIND_ROUTE: &str = "Route";

// ============================================================================
// Watched Object Identifiers
// ============================================================================

/// Name of the singleton cluster ingress configuration
pub const INGRESS_CONFIG_NAME: &str = "cluster";

/// Namespace of the authentication route
pub const AUTH_ROUTE_NAMESPACE: &str = "openshift-authentication";

/// Name of the authentication route
pub const AUTH_ROUTE_NAME: &str = "oauth-openshift";

/// Route ingress condition type marking a host as admitted
pub const ROUTE_CONDITION_ADMITTED: &str = "Admitted";

/// Condition status value for a satisfied condition
pub const CONDITION_STATUS_TRUE: &str = "True";

// ============================================================================
// Bootstrap OAuth Clients
// ============================================================================

/// Client used by the web console login flow
pub const BROWSER_CLIENT_NAME: &str = "openshift-browser-client";

/// Client used by challenge-based (basic auth / negotiate) logins
pub const CHALLENGING_CLIENT_NAME: &str = "openshift-challenging-client";

/// Client used by command line tools via loopback redirects
pub const CLI_CLIENT_NAME: &str = "openshift-cli-client";

/// All bootstrap client names, in reconciliation order
pub const BOOTSTRAP_CLIENT_NAMES: [&str; 3] =
    [BROWSER_CLIENT_NAME, CHALLENGING_CLIENT_NAME, CLI_CLIENT_NAME];

/// Secret strength for the browser client
pub const BROWSER_CLIENT_SECRET_BITS: usize = 256;

/// Path of the token display endpoint on the OAuth server
pub const OAUTH_TOKEN_DISPLAY_PATH: &str = "/oauth/token/display";

/// Path of the implicit-flow token endpoint on the OAuth server
pub const OAUTH_TOKEN_IMPLICIT_PATH: &str = "/oauth/token/implicit";

/// Loopback redirect URIs accepted for the CLI client
pub const CLI_CLIENT_REDIRECT_URIS: [&str; 2] =
    ["http://127.0.0.1/callback", "http://[::1]/callback"];

// ============================================================================
// Controller Error Handling Constants
// ============================================================================

/// Maximum update attempts when an `OAuthClient` write conflicts
pub const DEFAULT_CONFLICT_RETRY_ATTEMPTS: u32 = 5;

/// Requeue duration for controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Periodic resync after a successful reconciliation (5 minutes)
pub const RESYNC_INTERVAL_SECS: u64 = 300;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 2;

/// Field manager / controller name reported in logs and metrics
pub const CONTROLLER_NAME: &str = "oauth-clients-controller";

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Default bind address for the Prometheus metrics HTTP server
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Path for the liveness endpoint served next to metrics
pub const HEALTHZ_PATH: &str = "/healthz";

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resolution of the authentication server's public hostname.
//!
//! Two independent objects describe where the OAuth server is reachable:
//! the cluster ingress configuration (which may pin a hostname for the
//! authentication route) and the route itself (whose status lists the hosts
//! routers actually admitted). Resolution picks one candidate and refuses to
//! continue unless a router admitted it.

use crate::constants::{
    AUTH_ROUTE_NAME, AUTH_ROUTE_NAMESPACE, INGRESS_CONFIG_NAME, KIND_ROUTE,
};
use crate::context::ClusterLookup;
use crate::crd::IngressConfig;
use crate::sync_errors::SyncError;
use std::sync::Arc;
use tracing::debug;

/// Resolve the canonical hostname of the authentication route.
///
/// Reads current cache contents on every call; nothing is memoized.
///
/// # Errors
///
/// - [`SyncError::Configuration`] if the ingress configuration is missing or has no domain
/// - [`SyncError::DependencyNotFound`] if the authentication route is missing
/// - [`SyncError::HostMismatch`] if the chosen host is not admitted by the route
pub fn resolve_hostname<L: ClusterLookup + ?Sized>(lookup: &L) -> Result<String, SyncError> {
    let ingress = get_ingress_config(lookup)?;
    let candidate = ingress
        .spec
        .component_route_hostname(AUTH_ROUTE_NAMESPACE, AUTH_ROUTE_NAME);

    canonical_route_host(lookup, candidate)
}

/// Fetch the `cluster` ingress configuration and check it has a domain.
///
/// # Errors
///
/// Returns [`SyncError::Configuration`] if the object is absent or `spec.domain` is empty.
pub fn get_ingress_config<L: ClusterLookup + ?Sized>(
    lookup: &L,
) -> Result<Arc<IngressConfig>, SyncError> {
    let ingress = lookup
        .ingress_config(INGRESS_CONFIG_NAME)
        .ok_or_else(|| SyncError::Configuration {
            name: INGRESS_CONFIG_NAME.to_string(),
            reason: "object not found".to_string(),
        })?;

    if ingress.spec.domain.is_empty() {
        return Err(SyncError::Configuration {
            name: INGRESS_CONFIG_NAME.to_string(),
            reason: "spec.domain is empty".to_string(),
        });
    }

    Ok(ingress)
}

/// Pick the route host to use and validate it against the admitted hosts.
///
/// With a `candidate` override the candidate must be admitted; without one,
/// the route's own `spec.host` must be.
///
/// # Errors
///
/// Returns [`SyncError::DependencyNotFound`] if the route is absent and
/// [`SyncError::HostMismatch`] if the selected host was not admitted.
pub fn canonical_route_host<L: ClusterLookup + ?Sized>(
    lookup: &L,
    candidate: Option<&str>,
) -> Result<String, SyncError> {
    let route = lookup
        .route(AUTH_ROUTE_NAMESPACE, AUTH_ROUTE_NAME)
        .ok_or_else(|| SyncError::DependencyNotFound {
            kind: KIND_ROUTE.to_string(),
            namespace: AUTH_ROUTE_NAMESPACE.to_string(),
            name: AUTH_ROUTE_NAME.to_string(),
        })?;

    let host = candidate.unwrap_or(route.spec.host.as_str());
    let admitted = route.admitted_hosts();

    if !admitted.contains(host) {
        return Err(SyncError::HostMismatch {
            host: host.to_string(),
            namespace: AUTH_ROUTE_NAMESPACE.to_string(),
            name: AUTH_ROUTE_NAME.to_string(),
            admitted: admitted.into_iter().collect(),
        });
    }

    debug!(
        host = %host,
        from_override = candidate.is_some(),
        "Resolved canonical authentication route host"
    );
    Ok(host.to_string())
}

#[cfg(test)]
#[path = "hostname_tests.rs"]
mod hostname_tests;

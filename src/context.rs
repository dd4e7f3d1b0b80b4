// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Read-only lookups against cached cluster state.
//!
//! The reconciler never queries the API server for its inputs. It reads the
//! cluster ingress configuration and the authentication route through the
//! [`ClusterLookup`] capability, which has two implementations:
//!
//! - [`Stores`] - backed by kube reflector stores kept current by watches
//! - [`InMemoryLookup`] - a fixed set of objects, for tests and local runs
//!
//! Lookups return `None` for absent objects; deciding whether absence is an
//! error belongs to the caller.

use crate::crd::{IngressConfig, Route};
use kube::runtime::reflector::{ObjectRef, Store};
use kube::ResourceExt;
use std::sync::Arc;

/// Keyed point lookups for the objects the reconciler reads.
pub trait ClusterLookup: Send + Sync {
    /// Get the cluster-scoped ingress configuration by name.
    fn ingress_config(&self, name: &str) -> Option<Arc<IngressConfig>>;

    /// Get a route by namespace and name.
    fn route(&self, namespace: &str, name: &str) -> Option<Arc<Route>>;
}

/// Reflector stores for the watched input kinds.
///
/// Each store is populated by a dedicated reflector task and provides
/// in-memory access to resources without API calls.
#[derive(Clone)]
pub struct Stores {
    /// Cluster ingress configuration (only `cluster` is watched)
    pub ingress_configs: Store<IngressConfig>,

    /// Routes in the authentication namespace
    pub routes: Store<Route>,
}

impl ClusterLookup for Stores {
    fn ingress_config(&self, name: &str) -> Option<Arc<IngressConfig>> {
        self.ingress_configs.get(&ObjectRef::new(name))
    }

    fn route(&self, namespace: &str, name: &str) -> Option<Arc<Route>> {
        self.routes.get(&ObjectRef::new(name).within(namespace))
    }
}

/// Fixed in-memory objects served through [`ClusterLookup`].
///
/// # Examples
///
/// ```rust
/// use oauth_clients_controller::context::{ClusterLookup, InMemoryLookup};
/// use oauth_clients_controller::crd::{IngressConfig, IngressConfigSpec};
///
/// let lookup = InMemoryLookup::default().with_ingress_config(IngressConfig::new(
///     "cluster",
///     IngressConfigSpec {
///         domain: "example.com".to_string(),
///         component_routes: vec![],
///     },
/// ));
/// assert!(lookup.ingress_config("cluster").is_some());
/// assert!(lookup.route("openshift-authentication", "oauth-openshift").is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryLookup {
    ingress_configs: Vec<Arc<IngressConfig>>,
    routes: Vec<Arc<Route>>,
}

impl InMemoryLookup {
    /// Add an ingress configuration object.
    #[must_use]
    pub fn with_ingress_config(mut self, ingress: IngressConfig) -> Self {
        self.ingress_configs.push(Arc::new(ingress));
        self
    }

    /// Add a route object.
    #[must_use]
    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.push(Arc::new(route));
        self
    }
}

impl ClusterLookup for InMemoryLookup {
    fn ingress_config(&self, name: &str) -> Option<Arc<IngressConfig>> {
        self.ingress_configs
            .iter()
            .find(|ingress| ingress.name_any() == name)
            .cloned()
    }

    fn route(&self, namespace: &str, name: &str) -> Option<Arc<Route>> {
        self.routes
            .iter()
            .find(|route| route.name_any() == name && route.namespace().as_deref() == Some(namespace))
            .cloned()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;

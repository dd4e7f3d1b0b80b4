// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resource types consumed and managed by the OAuth clients controller.
//!
//! None of these kinds are owned by this crate: they are served by the
//! platform's own API groups. The types below model only the fields the
//! controller reads or writes.
//!
//! # Resource Types
//!
//! ## Read-only inputs
//!
//! - [`IngressConfig`] - Cluster-wide ingress declaration (`config.openshift.io/v1`, `Ingress`)
//! - [`Route`] - Routed endpoint with its admission status (`route.openshift.io/v1`)
//!
//! ## Managed
//!
//! - [`OAuthClient`] - OAuth client registration (`oauth.openshift.io/v1`)
//!
//! # Example: Declaring a component route override
//!
//! ```rust,no_run
//! use oauth_clients_controller::crd::{ComponentRouteSpec, IngressConfig, IngressConfigSpec};
//!
//! let ingress = IngressConfig::new(
//!     "cluster",
//!     IngressConfigSpec {
//!         domain: "apps.example.com".to_string(),
//!         component_routes: vec![ComponentRouteSpec {
//!             namespace: "openshift-authentication".to_string(),
//!             name: "oauth-openshift".to_string(),
//!             hostname: "login.example.com".to_string(),
//!         }],
//!     },
//! );
//! assert_eq!(
//!     ingress.spec.component_route_hostname("openshift-authentication", "oauth-openshift"),
//!     Some("login.example.com")
//! );
//! ```

use crate::constants::{
    API_VERSION, CONDITION_STATUS_TRUE, KIND_OAUTH_CLIENT, OAUTH_API_GROUP,
    OAUTH_API_GROUP_VERSION, PLURAL_OAUTH_CLIENTS, ROUTE_CONDITION_ADMITTED,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::core::{ClusterResourceScope, TypeMeta};
use kube::{CustomResource, Resource};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// Cluster ingress configuration
// ============================================================================

/// Cluster-wide ingress declaration.
///
/// Only the singleton named `cluster` is meaningful. `domain` is the base
/// domain for default routes; `component_routes` lets an administrator pin a
/// custom hostname for a specific platform route.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "config.openshift.io",
    version = "v1",
    kind = "Ingress",
    root = "IngressConfig",
    plural = "ingresses",
    doc = "Cluster-wide ingress configuration"
)]
#[serde(rename_all = "camelCase")]
pub struct IngressConfigSpec {
    /// Base domain used for default route hostnames.
    #[serde(default)]
    pub domain: String,

    /// Hostname overrides for individual platform routes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub component_routes: Vec<ComponentRouteSpec>,
}

/// Hostname override for one platform route, keyed by (namespace, name).
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRouteSpec {
    /// Namespace of the route being customized
    pub namespace: String,
    /// Name of the route being customized
    pub name: String,
    /// Hostname the route should be served on
    #[serde(default)]
    pub hostname: String,
}

impl IngressConfigSpec {
    /// Hostname override declared for the route `namespace/name`.
    ///
    /// Returns `None` when no entry matches or the matching entry carries an
    /// empty hostname.
    #[must_use]
    pub fn component_route_hostname(&self, namespace: &str, name: &str) -> Option<&str> {
        self.component_routes
            .iter()
            .find(|route| route.namespace == namespace && route.name == name)
            .map(|route| route.hostname.as_str())
            .filter(|hostname| !hostname.is_empty())
    }
}

// ============================================================================
// Routes
// ============================================================================

/// Externally managed route exposing the authentication server.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "route.openshift.io",
    version = "v1",
    kind = "Route",
    namespaced,
    plural = "routes",
    status = "RouteStatus",
    doc = "Routed endpoint for a service"
)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    /// Requested hostname for the route.
    #[serde(default)]
    pub host: String,
}

/// Observed state of a route across the routers serving it.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteStatus {
    /// One entry per router that has processed the route.
    #[serde(default)]
    pub ingress: Vec<RouteIngress>,
}

/// A router's view of the route.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteIngress {
    /// Host the router serves the route on
    #[serde(default)]
    pub host: String,

    /// Name of the router
    #[serde(skip_serializing_if = "Option::is_none")]
    pub router_name: Option<String>,

    /// Conditions reported by the router, `Admitted` among them
    #[serde(default)]
    pub conditions: Vec<RouteIngressCondition>,
}

/// Condition reported by a router for a route.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteIngressCondition {
    /// Condition type, e.g. `Admitted`
    pub r#type: String,
    /// `True`, `False` or `Unknown`
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RouteIngress {
    /// Whether the router recorded `Admitted=True` for this host.
    #[must_use]
    pub fn is_admitted(&self) -> bool {
        self.conditions.iter().any(|condition| {
            condition.r#type == ROUTE_CONDITION_ADMITTED
                && condition.status == CONDITION_STATUS_TRUE
        })
    }
}

impl Route {
    /// Hosts for which at least one router has admitted this route.
    #[must_use]
    pub fn admitted_hosts(&self) -> BTreeSet<String> {
        self.status
            .iter()
            .flat_map(|status| status.ingress.iter())
            .filter(|ingress| !ingress.host.is_empty() && ingress.is_admitted())
            .map(|ingress| ingress.host.clone())
            .collect()
    }
}

// ============================================================================
// OAuth clients
// ============================================================================

/// How consent is obtained when a user authorizes this client.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GrantMethod {
    /// Grant is given automatically
    Auto,
    /// User is prompted to approve the grant
    Prompt,
}

impl fmt::Display for GrantMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrantMethod::Auto => write!(f, "auto"),
            GrantMethod::Prompt => write!(f, "prompt"),
        }
    }
}

/// Restriction on the scopes a client may request.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScopeRestriction {
    /// Scopes that may be requested verbatim
    #[serde(rename = "literals", default, skip_serializing_if = "Vec::is_empty")]
    pub exact_values: Vec<String>,

    /// Cluster role scopes the client may request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_role: Option<ClusterRoleScopeRestriction>,
}

/// Restriction on cluster role scopes.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRoleScopeRestriction {
    /// Cluster roles that may be referenced; `*` means any
    #[serde(default)]
    pub role_names: Vec<String>,
    /// Namespaces that may be referenced; `*` means any
    #[serde(default)]
    pub namespaces: Vec<String>,
    /// Whether escalating roles may be requested
    #[serde(default)]
    pub allow_escalation: bool,
}

/// OAuth client registration.
///
/// Unlike most Kubernetes kinds, the client's fields sit at the top level of
/// the object rather than under `spec`, so [`Resource`] is implemented by hand.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthClient {
    /// `apiVersion` and `kind`
    #[serde(flatten, default)]
    pub types: Option<TypeMeta>,

    /// Standard object metadata; `name` is the client id
    #[serde(default)]
    pub metadata: ObjectMeta,

    /// Client secret; empty for public clients
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secret: String,

    /// Secrets also accepted during secret rotation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_secrets: Vec<String>,

    /// Respond with WWW-Authenticate challenges instead of redirecting to a login page
    #[serde(default)]
    pub respond_with_challenges: bool,

    /// Valid redirection URIs for the client
    #[serde(rename = "redirectURIs", default, skip_serializing_if = "Vec::is_empty")]
    pub redirect_uris: Vec<String>,

    /// Grant handling; required by the API server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant_method: Option<GrantMethod>,

    /// Scopes the client may request; empty means unrestricted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scope_restrictions: Vec<ScopeRestriction>,

    /// Override for the default access token lifetime
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_max_age_seconds: Option<i32>,

    /// Override for the default access token inactivity timeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_inactivity_timeout_seconds: Option<i32>,
}

impl OAuthClient {
    /// Create an empty client with the given name and type metadata set.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            types: Some(TypeMeta {
                api_version: OAUTH_API_GROUP_VERSION.to_string(),
                kind: KIND_OAUTH_CLIENT.to_string(),
            }),
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..ObjectMeta::default()
            },
            ..Self::default()
        }
    }
}

impl Resource for OAuthClient {
    type DynamicType = ();
    type Scope = ClusterResourceScope;

    fn kind(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(KIND_OAUTH_CLIENT)
    }

    fn group(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(OAUTH_API_GROUP)
    }

    fn version(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(API_VERSION)
    }

    fn plural(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(PLURAL_OAUTH_CLIENTS)
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;

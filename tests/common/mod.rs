// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use kube::client::Client;
use oauth_clients_controller::context::InMemoryLookup;
use oauth_clients_controller::crd::{IngressConfig, Route};
use serde_json::json;

/// Get a Kubernetes client or skip the test if not in a cluster
pub async fn get_kube_client_or_skip() -> Option<Client> {
    match Client::try_default().await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test: not running in Kubernetes cluster: {}", e);
            None
        }
    }
}

/// The `cluster` ingress configuration, optionally overriding the auth route hostname
pub fn ingress_config(domain: &str, auth_hostname: Option<&str>) -> IngressConfig {
    let component_routes = match auth_hostname {
        Some(hostname) => json!([{
            "namespace": "openshift-authentication",
            "name": "oauth-openshift",
            "hostname": hostname
        }]),
        None => json!([]),
    };

    serde_json::from_value(json!({
        "apiVersion": "config.openshift.io/v1",
        "kind": "Ingress",
        "metadata": { "name": "cluster" },
        "spec": {
            "domain": domain,
            "componentRoutes": component_routes
        }
    }))
    .expect("valid ingress config fixture")
}

/// The authentication route with `admitted` hosts accepted by the default router
pub fn auth_route(spec_host: &str, admitted: &[&str]) -> Route {
    let ingress: Vec<_> = admitted
        .iter()
        .map(|host| {
            json!({
                "host": host,
                "routerName": "default",
                "conditions": [{ "type": "Admitted", "status": "True" }]
            })
        })
        .collect();

    serde_json::from_value(json!({
        "apiVersion": "route.openshift.io/v1",
        "kind": "Route",
        "metadata": {
            "name": "oauth-openshift",
            "namespace": "openshift-authentication"
        },
        "spec": { "host": spec_host },
        "status": { "ingress": ingress }
    }))
    .expect("valid route fixture")
}

/// Lookup holding both objects, with the route admitting `admitted`
pub fn cluster(auth_hostname: Option<&str>, spec_host: &str, admitted: &[&str]) -> InMemoryLookup {
    InMemoryLookup::default()
        .with_ingress_config(ingress_config("apps.example.com", auth_hostname))
        .with_route(auth_route(spec_host, admitted))
}

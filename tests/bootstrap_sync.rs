// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! End-to-end sync scenarios for the bootstrap OAuth clients.
//!
//! Most tests run against the in-memory lookup and transport. The live
//! cluster test is ignored by default.
//!
//! Run the live test with: cargo test --test bootstrap_sync -- --ignored

mod common;

use common::{auth_route, cluster, get_kube_client_or_skip, ingress_config};
use kube::{Api, ResourceExt};
use oauth_clients_controller::constants::BOOTSTRAP_CLIENT_NAMES;
use oauth_clients_controller::context::InMemoryLookup;
use oauth_clients_controller::crd::{GrantMethod, OAuthClient};
use oauth_clients_controller::reconcilers::oauthclients::OAuthClientsReconciler;
use oauth_clients_controller::reconcilers::resources::{
    ApiVerb, InMemoryOAuthClients, OAuthClientApi,
};
use oauth_clients_controller::sync_errors::{ApiError, SyncError};
use std::sync::Arc;

const HOST: &str = "oauth-openshift.apps.example.com";
const CUSTOM_HOST: &str = "login.example.com";

fn browser_redirect(host: &str) -> Vec<String> {
    vec![format!("https://{host}/oauth/token/display")]
}

#[tokio::test]
async fn fresh_cluster_gets_all_three_clients() {
    let api = Arc::new(InMemoryOAuthClients::new());
    let reconciler = OAuthClientsReconciler::new(cluster(None, HOST, &[HOST]), Arc::clone(&api));

    reconciler.sync().await.unwrap();

    assert_eq!(api.count(ApiVerb::Create), 3);
    let browser = api.object("openshift-browser-client").unwrap();
    assert_eq!(browser.redirect_uris, browser_redirect(HOST));
    assert!(!browser.secret.is_empty());
    assert_eq!(
        api.object("openshift-challenging-client")
            .unwrap()
            .redirect_uris,
        vec![format!("https://{HOST}/oauth/token/implicit")]
    );
    assert_eq!(
        api.object("openshift-cli-client").unwrap().grant_method,
        Some(GrantMethod::Auto)
    );
}

#[tokio::test]
async fn steady_state_performs_no_writes() {
    let api = Arc::new(InMemoryOAuthClients::new());
    let reconciler = OAuthClientsReconciler::new(cluster(None, HOST, &[HOST]), Arc::clone(&api));

    reconciler.sync().await.unwrap();
    let stored: Vec<_> = BOOTSTRAP_CLIENT_NAMES
        .iter()
        .map(|name| api.object(name).unwrap())
        .collect();

    for _ in 0..3 {
        reconciler.sync().await.unwrap();
    }

    // Every run still attempts a create and gets AlreadyExists back.
    assert_eq!(api.count(ApiVerb::Create), 12);
    assert_eq!(api.count(ApiVerb::Update), 0);
    for before in stored {
        let after = api.object(&before.name_any()).unwrap();
        assert_eq!(after.metadata.resource_version, before.metadata.resource_version);
        assert_eq!(after, before);
    }
}

#[tokio::test]
async fn custom_hostname_rollout() {
    let api = Arc::new(InMemoryOAuthClients::new());
    OAuthClientsReconciler::new(cluster(None, HOST, &[HOST]), Arc::clone(&api))
        .sync()
        .await
        .unwrap();
    let secret = api.object("openshift-browser-client").unwrap().secret;

    // Administrator sets the override before the router admits it.
    let pending = OAuthClientsReconciler::new(
        cluster(Some(CUSTOM_HOST), HOST, &[HOST]),
        Arc::clone(&api),
    );
    let err = pending.sync().await.unwrap_err();
    assert!(matches!(err, SyncError::HostMismatch { ref host, .. } if host == CUSTOM_HOST));
    assert_eq!(
        api.object("openshift-browser-client").unwrap().redirect_uris,
        browser_redirect(HOST)
    );

    // Router admits the new host.
    OAuthClientsReconciler::new(
        cluster(Some(CUSTOM_HOST), HOST, &[HOST, CUSTOM_HOST]),
        Arc::clone(&api),
    )
    .sync()
    .await
    .unwrap();

    let browser = api.object("openshift-browser-client").unwrap();
    assert_eq!(browser.redirect_uris, browser_redirect(CUSTOM_HOST));
    assert_eq!(browser.secret, secret);
}

#[tokio::test]
async fn transient_failure_recovers_on_next_run() {
    let api = Arc::new(InMemoryOAuthClients::new());
    api.fail_times(
        ApiVerb::Create,
        2,
        ApiError::Transient("etcdserver: request timed out".to_string()),
    );
    let reconciler = OAuthClientsReconciler::new(cluster(None, HOST, &[HOST]), Arc::clone(&api));

    assert!(matches!(
        reconciler.sync().await,
        Err(SyncError::Transient { .. })
    ));
    assert!(matches!(
        reconciler.sync().await,
        Err(SyncError::Transient { .. })
    ));
    reconciler.sync().await.unwrap();
    assert_eq!(api.len(), 3);
}

#[tokio::test]
async fn conflicting_writer_is_retried() {
    let api = Arc::new(InMemoryOAuthClients::new());
    api.insert(OAuthClient {
        grant_method: Some(GrantMethod::Prompt),
        ..OAuthClient::new("openshift-cli-client")
    });
    api.fail_times(ApiVerb::Update, 2, ApiError::Conflict);

    OAuthClientsReconciler::new(cluster(None, HOST, &[HOST]), Arc::clone(&api))
        .sync()
        .await
        .unwrap();

    assert_eq!(api.count(ApiVerb::Update), 3);
    assert_eq!(
        api.object("openshift-cli-client").unwrap().grant_method,
        Some(GrantMethod::Auto)
    );
}

#[tokio::test]
async fn route_without_admitted_hosts_blocks_sync() {
    let api = Arc::new(InMemoryOAuthClients::new());
    let err = OAuthClientsReconciler::new(cluster(None, HOST, &[]), Arc::clone(&api))
        .sync()
        .await
        .unwrap_err();

    assert_eq!(err.reason(), "HostMismatch");
    assert!(api.actions().is_empty());
}

#[tokio::test]
async fn misidentified_route_is_not_found() {
    let mut route = auth_route(HOST, &[HOST]);
    route.metadata.namespace = Some("not-openshift-authentication".to_string());
    route.metadata.name = Some("not-oauth-openshift".to_string());
    let lookup = InMemoryLookup::default()
        .with_ingress_config(ingress_config("apps.example.com", None))
        .with_route(route);
    let api = Arc::new(InMemoryOAuthClients::new());

    let err = OAuthClientsReconciler::new(lookup, Arc::clone(&api))
        .sync()
        .await
        .unwrap_err();

    assert_eq!(
        err,
        SyncError::DependencyNotFound {
            kind: "Route".to_string(),
            namespace: "openshift-authentication".to_string(),
            name: "oauth-openshift".to_string(),
        }
    );
    assert!(api.actions().is_empty());
}

#[tokio::test]
#[ignore = "requires a cluster with the OAuth API"]
async fn live_bootstrap_clients_exist() {
    let Some(client) = get_kube_client_or_skip().await else {
        return;
    };
    let api: Api<OAuthClient> = Api::all(client);

    for name in BOOTSTRAP_CLIENT_NAMES {
        let current = OAuthClientApi::get(&api, name)
            .await
            .unwrap_or_else(|e| panic!("OAuthClient {name} should exist: {e}"));
        assert!(!current.redirect_uris.is_empty());
        assert!(current.grant_method.is_some());
    }
}

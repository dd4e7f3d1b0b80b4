// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use clap::Parser;
use futures::StreamExt;
use kube::{
    runtime::{
        controller::Action,
        reflector::{self, ObjectRef, Store},
        watcher,
        watcher::Config as WatcherConfig,
        Controller, WatchStreamExt,
    },
    Api, Client, ResourceExt,
};
use oauth_clients_controller::{
    config::{ControllerArgs, LogFormat},
    constants::{
        AUTH_ROUTE_NAME, AUTH_ROUTE_NAMESPACE, BOOTSTRAP_CLIENT_NAMES, CONTROLLER_NAME,
        HEALTHZ_PATH, INGRESS_CONFIG_NAME, METRICS_SERVER_PATH,
    },
    context::Stores,
    crd::{IngressConfig, OAuthClient, Route},
    metrics,
    reconcilers::OAuthClientsReconciler,
    sync_errors::SyncError,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Metric label for reconciliation runs
const RECONCILER_RESOURCE_TYPE: &str = "OAuthClients";

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] SyncError);

/// Shared state handed to every reconcile call
struct ControllerContext {
    reconciler: OAuthClientsReconciler<Stores, Api<OAuthClient>>,
    /// Filled by the controller's route stream
    routes: Store<Route>,
    resync_interval: Duration,
    error_requeue: Duration,
}

fn main() -> Result<()> {
    let args = ControllerArgs::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(args.worker_threads.max(1))
        .thread_name(CONTROLLER_NAME)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

async fn async_main(args: ControllerArgs) -> Result<()> {
    init_tracing(args.log_format);

    info!("Starting OAuth clients controller");
    debug!(?args, "Loaded controller configuration");

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    // One route watch feeds both the hostname cache and the reconcile trigger
    let routes_api: Api<Route> = Api::namespaced(client.clone(), AUTH_ROUTE_NAMESPACE);
    let route_config =
        WatcherConfig::default().fields(&format!("metadata.name={AUTH_ROUTE_NAME}"));
    let (route_store, route_writer) = reflector::store();
    let route_stream = reflector::reflector(route_writer, watcher(routes_api, route_config))
        .default_backoff()
        .touched_objects();

    let ingress_api: Api<IngressConfig> = Api::all(client.clone());
    let ingress_config =
        WatcherConfig::default().fields(&format!("metadata.name={INGRESS_CONFIG_NAME}"));
    let oauth_api: Api<OAuthClient> = Api::all(client.clone());

    let controller = Controller::new(ingress_api, ingress_config);
    let stores = Stores {
        ingress_configs: controller.store(),
        routes: route_store.clone(),
    };
    let ctx = Arc::new(ControllerContext {
        reconciler: OAuthClientsReconciler::new(stores, oauth_api.clone()),
        routes: route_store,
        resync_interval: args.resync_interval(),
        error_requeue: args.error_requeue(),
    });

    info!("Starting OAuthClients controller");
    let controller = controller
        .watches_stream(route_stream, |_route| Some(singleton_ref()))
        .watches(oauth_api, WatcherConfig::default(), |client| {
            trigger_for_oauth_client(&client)
        })
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|result| {
            if let Err(e) = result {
                debug!(error = %e, "Controller event");
            }
            futures::future::ready(())
        });

    tokio::select! {
        () = controller => {
            info!("Controller shut down");
            Ok(())
        }
        result = run_metrics_server(args.metrics_bind_address) => {
            error!("CRITICAL: Metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Metrics server exited unexpectedly without error")
        }
    }
}

/// Initialize logging
///
/// Respects `RUST_LOG` if set, otherwise defaults to INFO level.
fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

/// Every trigger reconciles the single `cluster` ingress configuration.
fn singleton_ref() -> ObjectRef<IngressConfig> {
    ObjectRef::new(INGRESS_CONFIG_NAME)
}

/// Map a changed `OAuthClient` to a reconcile, ignoring clients we do not manage.
fn trigger_for_oauth_client(client: &OAuthClient) -> Option<ObjectRef<IngressConfig>> {
    let name = client.name_any();
    BOOTSTRAP_CLIENT_NAMES
        .contains(&name.as_str())
        .then(singleton_ref)
}

async fn reconcile(
    _ingress: Arc<IngressConfig>,
    ctx: Arc<ControllerContext>,
) -> Result<Action, ReconcileError> {
    // The route cache only fills once the controller polls its stream.
    if let Err(e) = ctx.routes.wait_until_ready().await {
        warn!(error = %e, "Route cache unavailable");
        return Ok(Action::requeue(ctx.error_requeue));
    }

    let start = Instant::now();

    match ctx.reconciler.sync().await {
        Ok(()) => {
            metrics::record_reconciliation_success(RECONCILER_RESOURCE_TYPE, start.elapsed());
            Ok(Action::requeue(ctx.resync_interval))
        }
        Err(e) => {
            error!(reason = e.reason(), "Failed to reconcile OAuth clients: {}", e);
            metrics::record_reconciliation_error(
                RECONCILER_RESOURCE_TYPE,
                e.reason(),
                start.elapsed(),
            );
            Err(e.into())
        }
    }
}

/// Error policy for controller
fn error_policy(
    _resource: Arc<IngressConfig>,
    err: &ReconcileError,
    ctx: Arc<ControllerContext>,
) -> Action {
    warn!(
        requeue_secs = ctx.error_requeue.as_secs(),
        "Requeueing after error: {}", err
    );
    Action::requeue(ctx.error_requeue)
}

fn metrics_router() -> Router {
    Router::new()
        .route(METRICS_SERVER_PATH, get(metrics_handler))
        .route(HEALTHZ_PATH, get(|| async { "ok" }))
}

async fn metrics_handler() -> Response {
    match metrics::gather_metrics() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to gather metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Serve `/metrics` and `/healthz`
async fn run_metrics_server(addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "Metrics server listening");
    axum::serve(listener, metrics_router()).await?;
    Ok(())
}

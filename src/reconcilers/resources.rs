// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Create/get/update transport for `OAuthClient` resources.
//!
//! The ensure protocol talks to the API server only through the
//! [`OAuthClientApi`] trait, which reports failures as typed [`ApiError`]
//! outcomes rather than raw HTTP errors. Two implementations exist:
//!
//! - `kube::Api<OAuthClient>` - the live API server
//! - [`InMemoryOAuthClients`] - an in-memory store with resource versions,
//!   server-side validation and injectable failures
//!
//! # Example
//!
//! ```rust,no_run
//! use oauth_clients_controller::crd::OAuthClient;
//! use oauth_clients_controller::reconcilers::resources::OAuthClientApi;
//! use kube::{Api, Client};
//!
//! async fn example(client: Client) -> anyhow::Result<()> {
//!     let api: Api<OAuthClient> = Api::all(client);
//!     let current = OAuthClientApi::get(&api, "openshift-cli-client").await?;
//!     println!("{:?}", current.redirect_uris);
//!     Ok(())
//! }
//! ```

use crate::crd::{GrantMethod, OAuthClient};
use crate::sync_errors::ApiError;
use async_trait::async_trait;
use kube::api::PostParams;
use kube::{Api, ResourceExt};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Transport for the managed `OAuthClient` kind.
#[async_trait]
pub trait OAuthClientApi: Send + Sync {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// [`ApiError::AlreadyExists`] when the name is taken, [`ApiError::Invalid`]
    /// when validation fails, [`ApiError::Transient`] otherwise.
    async fn create(&self, client: &OAuthClient) -> Result<OAuthClient, ApiError>;

    /// Fetch the current client, including its resource version.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] or [`ApiError::Transient`].
    async fn get(&self, name: &str) -> Result<OAuthClient, ApiError>;

    /// Replace a client. `metadata.resourceVersion` must match the stored one.
    ///
    /// # Errors
    ///
    /// [`ApiError::Conflict`] on a stale resource version, [`ApiError::Invalid`]
    /// or [`ApiError::Transient`] otherwise.
    async fn update(&self, client: &OAuthClient) -> Result<OAuthClient, ApiError>;
}

#[async_trait]
impl<T: OAuthClientApi + ?Sized> OAuthClientApi for Arc<T> {
    async fn create(&self, client: &OAuthClient) -> Result<OAuthClient, ApiError> {
        (**self).create(client).await
    }

    async fn get(&self, name: &str) -> Result<OAuthClient, ApiError> {
        (**self).get(name).await
    }

    async fn update(&self, client: &OAuthClient) -> Result<OAuthClient, ApiError> {
        (**self).update(client).await
    }
}

#[async_trait]
impl OAuthClientApi for Api<OAuthClient> {
    async fn create(&self, client: &OAuthClient) -> Result<OAuthClient, ApiError> {
        Api::create(self, &PostParams::default(), client)
            .await
            .map_err(|e| classify_kube_error(&e))
    }

    async fn get(&self, name: &str) -> Result<OAuthClient, ApiError> {
        Api::get(self, name)
            .await
            .map_err(|e| classify_kube_error(&e))
    }

    async fn update(&self, client: &OAuthClient) -> Result<OAuthClient, ApiError> {
        let name = client.name_any();
        Api::replace(self, &name, &PostParams::default(), client)
            .await
            .map_err(|e| classify_kube_error(&e))
    }
}

/// Map a Kubernetes client error onto the transport outcome vocabulary.
///
/// | HTTP code | Reason | Outcome |
/// |-----------|--------|---------|
/// | 409 | `AlreadyExists` | [`ApiError::AlreadyExists`] |
/// | 409 | anything else | [`ApiError::Conflict`] |
/// | 404 | any | [`ApiError::NotFound`] |
/// | 400, 422 | any | [`ApiError::Invalid`] |
/// | other / non-HTTP | - | [`ApiError::Transient`] |
#[must_use]
pub fn classify_kube_error(err: &kube::Error) -> ApiError {
    match err {
        kube::Error::Api(response) => match response.code {
            409 if response.reason == "AlreadyExists" => ApiError::AlreadyExists,
            409 => ApiError::Conflict,
            404 => ApiError::NotFound,
            400 | 422 => ApiError::Invalid(response.message.clone()),
            _ => ApiError::Transient(err.to_string()),
        },
        _ => ApiError::Transient(err.to_string()),
    }
}

/// API verbs issued against `OAuthClient` objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiVerb {
    Create,
    Get,
    Update,
}

impl ApiVerb {
    /// Lowercase verb as used in errors and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ApiVerb::Create => "create",
            ApiVerb::Get => "get",
            ApiVerb::Update => "update",
        }
    }
}

struct Reactor {
    verb: ApiVerb,
    error: ApiError,
    remaining: Option<usize>,
}

#[derive(Default)]
struct InMemoryState {
    objects: BTreeMap<String, OAuthClient>,
    resource_version: u64,
    reactors: Vec<Reactor>,
    actions: Vec<(ApiVerb, String)>,
}

impl InMemoryState {
    fn next_resource_version(&mut self) -> String {
        self.resource_version += 1;
        self.resource_version.to_string()
    }

    /// Record the call, then return the first injected failure still armed for `verb`.
    fn react(&mut self, verb: ApiVerb, name: &str) -> Result<(), ApiError> {
        self.actions.push((verb, name.to_string()));

        let reactor = self
            .reactors
            .iter_mut()
            .find(|reactor| reactor.verb == verb && reactor.remaining != Some(0));

        match reactor {
            Some(reactor) => {
                if let Some(remaining) = reactor.remaining.as_mut() {
                    *remaining -= 1;
                }
                Err(reactor.error.clone())
            }
            None => Ok(()),
        }
    }
}

/// In-memory `OAuthClient` store.
///
/// Behaves like the API server for the subset the ensure protocol relies on:
/// names are unique, every write bumps the resource version, updates carrying
/// a stale resource version are rejected with [`ApiError::Conflict`], and
/// writes without a name or grant method fail validation. Failures can be
/// injected per verb, and every call is recorded.
///
/// # Examples
///
/// ```rust
/// use oauth_clients_controller::reconcilers::resources::{ApiVerb, InMemoryOAuthClients};
/// use oauth_clients_controller::sync_errors::ApiError;
///
/// let store = InMemoryOAuthClients::new();
/// store.fail_times(ApiVerb::Update, 2, ApiError::Conflict);
/// assert_eq!(store.count(ApiVerb::Update), 0);
/// ```
#[derive(Default)]
pub struct InMemoryOAuthClients {
    state: Mutex<InMemoryState>,
}

impl InMemoryOAuthClients {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store an object directly, bypassing validation and recorded actions.
    ///
    /// Used to seed pre-existing state and to simulate writes by other actors.
    pub fn insert(&self, mut client: OAuthClient) {
        let mut state = self.state();
        client.metadata.resource_version = Some(state.next_resource_version());
        state.objects.insert(client.name_any(), client);
    }

    /// Fail every call of `verb` with `error`.
    pub fn fail_always(&self, verb: ApiVerb, error: ApiError) {
        self.state().reactors.push(Reactor {
            verb,
            error,
            remaining: None,
        });
    }

    /// Fail the next `times` calls of `verb` with `error`.
    pub fn fail_times(&self, verb: ApiVerb, times: usize, error: ApiError) {
        self.state().reactors.push(Reactor {
            verb,
            error,
            remaining: Some(times),
        });
    }

    /// Current stored copy of a client.
    #[must_use]
    pub fn object(&self, name: &str) -> Option<OAuthClient> {
        self.state().objects.get(name).cloned()
    }

    /// Number of stored clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state().objects.len()
    }

    /// Whether the store holds no clients.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state().objects.is_empty()
    }

    /// Every call made so far, in order, as `(verb, name)`.
    #[must_use]
    pub fn actions(&self) -> Vec<(ApiVerb, String)> {
        self.state().actions.clone()
    }

    /// Number of calls made with `verb`.
    #[must_use]
    pub fn count(&self, verb: ApiVerb) -> usize {
        self.state()
            .actions
            .iter()
            .filter(|(recorded, _)| *recorded == verb)
            .count()
    }
}

fn validate(client: &OAuthClient) -> Result<(), ApiError> {
    if client.metadata.name.as_deref().unwrap_or_default().is_empty() {
        return Err(ApiError::Invalid(
            "metadata.name: Required value: name or generateName is required".to_string(),
        ));
    }
    if client.grant_method.is_none() {
        return Err(ApiError::Invalid(format!(
            "grantMethod: Required value: must be {} or {}",
            GrantMethod::Auto,
            GrantMethod::Prompt
        )));
    }
    Ok(())
}

#[async_trait]
impl OAuthClientApi for InMemoryOAuthClients {
    async fn create(&self, client: &OAuthClient) -> Result<OAuthClient, ApiError> {
        let name = client.name_any();
        let mut state = self.state();
        state.react(ApiVerb::Create, &name)?;
        validate(client)?;

        if state.objects.contains_key(&name) {
            return Err(ApiError::AlreadyExists);
        }

        let mut stored = client.clone();
        stored.metadata.resource_version = Some(state.next_resource_version());
        state.objects.insert(name.clone(), stored.clone());
        debug!(name = %name, "In-memory OAuthClient created");
        Ok(stored)
    }

    async fn get(&self, name: &str) -> Result<OAuthClient, ApiError> {
        let mut state = self.state();
        state.react(ApiVerb::Get, name)?;
        state.objects.get(name).cloned().ok_or(ApiError::NotFound)
    }

    async fn update(&self, client: &OAuthClient) -> Result<OAuthClient, ApiError> {
        let name = client.name_any();
        let mut state = self.state();
        state.react(ApiVerb::Update, &name)?;
        validate(client)?;

        let current_version = state
            .objects
            .get(&name)
            .ok_or(ApiError::NotFound)?
            .metadata
            .resource_version
            .clone();

        // A missing resource version is an unconditional update.
        if client.metadata.resource_version.is_some()
            && client.metadata.resource_version != current_version
        {
            return Err(ApiError::Conflict);
        }

        let mut stored = client.clone();
        stored.metadata.resource_version = Some(state.next_resource_version());
        state.objects.insert(name.clone(), stored.clone());
        debug!(name = %name, "In-memory OAuthClient updated");
        Ok(stored)
    }
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod resources_tests;

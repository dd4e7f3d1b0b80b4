// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Create-or-update for a single `OAuthClient`.
//!
//! The protocol is:
//!
//! 1. Try to create the desired object.
//! 2. If it already exists, read the current object, merge the desired
//!    fields onto it and write it back only when something changed.
//! 3. A write conflict restarts step 2 against a fresh read, up to a bounded
//!    number of attempts.

use super::super::resources::{ApiVerb, OAuthClientApi};
use super::super::retry::retry_on_conflict;
use crate::constants::KIND_OAUTH_CLIENT;
use crate::crd::OAuthClient;
use crate::metrics::{record_conflict_retry, record_resource_ensured};
use crate::sync_errors::{ApiError, SyncError};
use kube::ResourceExt;
use std::fmt;
use tracing::{debug, info};

/// What ensuring one client did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnsureOutcome {
    Created,
    Updated,
    Unchanged,
}

impl EnsureOutcome {
    /// Lowercase label used in logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EnsureOutcome::Created => "created",
            EnsureOutcome::Updated => "updated",
            EnsureOutcome::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for EnsureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merge the managed fields of `desired` onto a copy of `existing`.
///
/// The secret is never replaced by a shorter one: an empty desired secret
/// clears it, otherwise the desired secret is only taken when the stored one
/// is strictly shorter. Metadata and unmanaged fields are kept as stored.
#[must_use]
pub fn merge_desired(existing: &OAuthClient, desired: &OAuthClient) -> OAuthClient {
    let mut merged = existing.clone();

    if desired.secret.is_empty() {
        merged.secret = String::new();
    } else if existing.secret.len() < desired.secret.len() {
        merged.secret.clone_from(&desired.secret);
    }

    merged.respond_with_challenges = desired.respond_with_challenges;
    merged.redirect_uris.clone_from(&desired.redirect_uris);
    merged.grant_method = desired.grant_method;
    merged.scope_restrictions.clone_from(&desired.scope_restrictions);

    merged
}

/// Ensure `desired` exists in the cluster with its managed fields applied.
///
/// # Errors
///
/// - [`SyncError::Validation`] if the API server rejects the object
/// - [`SyncError::Conflict`] if every update attempt conflicted
/// - [`SyncError::Transient`] for other transport failures, including the
///   object disappearing between create and get
pub async fn ensure_oauth_client<A: OAuthClientApi + ?Sized>(
    api: &A,
    desired: &OAuthClient,
    max_conflict_attempts: u32,
) -> Result<EnsureOutcome, SyncError> {
    let name = desired.name_any();

    let outcome = match api.create(desired).await {
        Ok(_) => {
            info!(name = %name, "Created OAuthClient");
            EnsureOutcome::Created
        }
        Err(ApiError::AlreadyExists) => {
            debug!(name = %name, "OAuthClient already exists, reconciling fields");
            let operation_name = format!("update OAuthClient {name}");
            retry_on_conflict(max_conflict_attempts, &operation_name, |attempt| {
                if attempt > 1 {
                    record_conflict_retry(KIND_OAUTH_CLIENT);
                }
                update_if_changed(api, desired, &name)
            })
            .await?
        }
        Err(e) => return Err(to_sync_error(ApiVerb::Create, &name, e)),
    };

    record_resource_ensured(KIND_OAUTH_CLIENT, outcome.as_str());
    Ok(outcome)
}

async fn update_if_changed<A: OAuthClientApi + ?Sized>(
    api: &A,
    desired: &OAuthClient,
    name: &str,
) -> Result<EnsureOutcome, SyncError> {
    let existing = api
        .get(name)
        .await
        .map_err(|e| to_sync_error(ApiVerb::Get, name, e))?;

    let merged = merge_desired(&existing, desired);
    if merged == existing {
        debug!(name = %name, "OAuthClient up to date");
        return Ok(EnsureOutcome::Unchanged);
    }

    api.update(&merged)
        .await
        .map_err(|e| to_sync_error(ApiVerb::Update, name, e))?;
    info!(name = %name, "Updated OAuthClient");
    Ok(EnsureOutcome::Updated)
}

fn to_sync_error(verb: ApiVerb, name: &str, err: ApiError) -> SyncError {
    match (verb, err) {
        (ApiVerb::Update, ApiError::Conflict) => SyncError::Conflict {
            name: name.to_string(),
            attempts: 1,
        },
        (_, ApiError::Invalid(reason)) => SyncError::Validation {
            name: name.to_string(),
            reason,
        },
        (_, other) => SyncError::Transient {
            operation: verb.as_str().to_string(),
            name: name.to_string(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
#[path = "ensure_tests.rs"]
mod ensure_tests;

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Desired state of the bootstrap OAuth clients.
//!
//! [`build_desired_clients`] is a pure function of the resolved hostname.
//! Secret material is only drawn when a [`BootstrapClientSpec`] is turned
//! into an [`OAuthClient`], so building the same hostname twice yields equal
//! specs.

use crate::constants::{
    BROWSER_CLIENT_NAME, BROWSER_CLIENT_SECRET_BITS, CHALLENGING_CLIENT_NAME, CLI_CLIENT_NAME,
    CLI_CLIENT_REDIRECT_URIS, OAUTH_TOKEN_DISPLAY_PATH, OAUTH_TOKEN_IMPLICIT_PATH,
};
use crate::crd::{GrantMethod, OAuthClient, ScopeRestriction};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

/// How the `secret` field of a desired client is filled in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecretPolicy {
    /// Public client; any stored secret is cleared
    None,
    /// Confidential client with a random secret of the given strength
    GenerateRandom {
        /// Entropy in bits
        bits: usize,
    },
}

/// Desired state of one bootstrap client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootstrapClientSpec {
    pub name: String,
    pub secret_policy: SecretPolicy,
    pub respond_with_challenges: bool,
    pub redirect_uris: Vec<String>,
    pub grant_method: GrantMethod,
    pub scope_restrictions: Vec<ScopeRestriction>,
}

impl BootstrapClientSpec {
    /// Materialize into an `OAuthClient` ready to be written.
    ///
    /// A fresh secret is generated on every call for
    /// [`SecretPolicy::GenerateRandom`].
    #[must_use]
    pub fn to_oauth_client(&self) -> OAuthClient {
        let secret = match self.secret_policy {
            SecretPolicy::None => String::new(),
            SecretPolicy::GenerateRandom { bits } => generate_secret(bits),
        };

        OAuthClient {
            secret,
            respond_with_challenges: self.respond_with_challenges,
            redirect_uris: self.redirect_uris.clone(),
            grant_method: Some(self.grant_method),
            scope_restrictions: self.scope_restrictions.clone(),
            ..OAuthClient::new(&self.name)
        }
    }
}

/// Build the three bootstrap clients for `hostname`, in write order.
#[must_use]
pub fn build_desired_clients(hostname: &str) -> Vec<BootstrapClientSpec> {
    vec![
        BootstrapClientSpec {
            name: BROWSER_CLIENT_NAME.to_string(),
            secret_policy: SecretPolicy::GenerateRandom {
                bits: BROWSER_CLIENT_SECRET_BITS,
            },
            respond_with_challenges: false,
            redirect_uris: vec![format!("https://{hostname}{OAUTH_TOKEN_DISPLAY_PATH}")],
            grant_method: GrantMethod::Auto,
            scope_restrictions: Vec::new(),
        },
        BootstrapClientSpec {
            name: CHALLENGING_CLIENT_NAME.to_string(),
            secret_policy: SecretPolicy::None,
            respond_with_challenges: true,
            redirect_uris: vec![format!("https://{hostname}{OAUTH_TOKEN_IMPLICIT_PATH}")],
            grant_method: GrantMethod::Auto,
            scope_restrictions: Vec::new(),
        },
        BootstrapClientSpec {
            name: CLI_CLIENT_NAME.to_string(),
            secret_policy: SecretPolicy::None,
            respond_with_challenges: false,
            redirect_uris: CLI_CLIENT_REDIRECT_URIS
                .iter()
                .map(ToString::to_string)
                .collect(),
            grant_method: GrantMethod::Auto,
            scope_restrictions: Vec::new(),
        },
    ]
}

/// `ceil(bits / 8)` bytes from the thread-local CSPRNG.
#[must_use]
pub fn random_bits(bits: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; bits.div_ceil(8)];
    rand::rng().fill_bytes(&mut bytes);
    bytes
}

/// Random secret with `bits` of entropy, base64url encoded without padding.
#[must_use]
pub fn generate_secret(bits: usize) -> String {
    URL_SAFE_NO_PAD.encode(random_bits(bits))
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod bootstrap_tests;

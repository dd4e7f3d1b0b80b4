// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `resources.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::crd::{GrantMethod, OAuthClient};
    use crate::sync_errors::ApiError;

    fn api_error(code: u16, reason: &str, message: &str) -> kube::Error {
        kube::Error::Api(kube::core::Status::failure(message, reason).with_code(code).boxed())
    }

    fn client(name: &str, grant_method: Option<GrantMethod>) -> OAuthClient {
        let mut client = OAuthClient::new(name);
        client.grant_method = grant_method;
        client
    }

    #[test]
    fn test_classify_already_exists() {
        let err = api_error(409, "AlreadyExists", "oauthclients \"x\" already exists");
        assert_eq!(classify_kube_error(&err), ApiError::AlreadyExists);
    }

    #[test]
    fn test_classify_conflict() {
        let err = api_error(409, "Conflict", "the object has been modified");
        assert_eq!(classify_kube_error(&err), ApiError::Conflict);
    }

    #[test]
    fn test_classify_not_found() {
        let err = api_error(404, "NotFound", "oauthclients \"x\" not found");
        assert_eq!(classify_kube_error(&err), ApiError::NotFound);
    }

    #[test]
    fn test_classify_invalid() {
        let err = api_error(422, "Invalid", "grantMethod: Required value");
        assert_eq!(
            classify_kube_error(&err),
            ApiError::Invalid("grantMethod: Required value".to_string())
        );

        let err = api_error(400, "BadRequest", "malformed");
        assert_eq!(
            classify_kube_error(&err),
            ApiError::Invalid("malformed".to_string())
        );
    }

    #[test]
    fn test_classify_server_errors_are_transient() {
        for code in [429, 500, 502, 503, 504] {
            let err = api_error(code, "InternalError", "boom");
            assert!(
                matches!(classify_kube_error(&err), ApiError::Transient(_)),
                "HTTP {code} should be transient"
            );
        }
    }

    #[test]
    fn test_classify_forbidden_is_transient() {
        let err = api_error(403, "Forbidden", "forbidden");
        assert!(matches!(classify_kube_error(&err), ApiError::Transient(_)));
    }

    #[tokio::test]
    async fn test_in_memory_create_and_get() {
        let store = InMemoryOAuthClients::new();
        let created = store
            .create(&client("a", Some(GrantMethod::Auto)))
            .await
            .unwrap();

        assert_eq!(created.metadata.resource_version.as_deref(), Some("1"));
        let fetched = store.get("a").await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_create_already_exists() {
        let store = InMemoryOAuthClients::new();
        store
            .create(&client("a", Some(GrantMethod::Auto)))
            .await
            .unwrap();

        let err = store
            .create(&client("a", Some(GrantMethod::Prompt)))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::AlreadyExists);
        assert_eq!(store.object("a").unwrap().grant_method, Some(GrantMethod::Auto));
    }

    #[tokio::test]
    async fn test_in_memory_create_validation() {
        let store = InMemoryOAuthClients::new();

        let missing_name = store
            .create(&client("", Some(GrantMethod::Auto)))
            .await
            .unwrap_err();
        assert!(matches!(missing_name, ApiError::Invalid(ref msg) if msg.contains("metadata.name")));

        let missing_grant = store.create(&client("a", None)).await.unwrap_err();
        assert!(matches!(missing_grant, ApiError::Invalid(ref msg) if msg.contains("grantMethod")));

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_get_not_found() {
        let store = InMemoryOAuthClients::new();
        assert_eq!(store.get("missing").await.unwrap_err(), ApiError::NotFound);
    }

    #[tokio::test]
    async fn test_in_memory_update_bumps_resource_version() {
        let store = InMemoryOAuthClients::new();
        let mut current = store
            .create(&client("a", Some(GrantMethod::Auto)))
            .await
            .unwrap();

        current.grant_method = Some(GrantMethod::Prompt);
        let updated = store.update(&current).await.unwrap();

        assert_eq!(updated.metadata.resource_version.as_deref(), Some("2"));
        assert_eq!(store.object("a").unwrap().grant_method, Some(GrantMethod::Prompt));
    }

    #[tokio::test]
    async fn test_in_memory_update_stale_version_conflicts() {
        let store = InMemoryOAuthClients::new();
        let stale = store
            .create(&client("a", Some(GrantMethod::Auto)))
            .await
            .unwrap();

        // Another writer replaces the object in the meantime.
        store.insert(client("a", Some(GrantMethod::Prompt)));

        let err = store.update(&stale).await.unwrap_err();
        assert_eq!(err, ApiError::Conflict);
        assert_eq!(store.object("a").unwrap().grant_method, Some(GrantMethod::Prompt));
    }

    #[tokio::test]
    async fn test_in_memory_update_missing_object() {
        let store = InMemoryOAuthClients::new();
        let err = store
            .update(&client("a", Some(GrantMethod::Auto)))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::NotFound);
    }

    #[tokio::test]
    async fn test_in_memory_fail_times() {
        let store = InMemoryOAuthClients::new();
        store.fail_times(ApiVerb::Get, 2, ApiError::Transient("timeout".to_string()));
        store.insert(client("a", Some(GrantMethod::Auto)));

        assert!(store.get("a").await.is_err());
        assert!(store.get("a").await.is_err());
        assert!(store.get("a").await.is_ok());
        assert_eq!(store.count(ApiVerb::Get), 3);
    }

    #[tokio::test]
    async fn test_in_memory_fail_always() {
        let store = InMemoryOAuthClients::new();
        store.fail_always(ApiVerb::Create, ApiError::Transient("create fake error".to_string()));

        for _ in 0..3 {
            let err = store
                .create(&client("a", Some(GrantMethod::Auto)))
                .await
                .unwrap_err();
            assert_eq!(err, ApiError::Transient("create fake error".to_string()));
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_records_actions() {
        let store = InMemoryOAuthClients::new();
        let created = store
            .create(&client("a", Some(GrantMethod::Auto)))
            .await
            .unwrap();
        store.get("a").await.unwrap();
        store.update(&created).await.unwrap();

        assert_eq!(
            store.actions(),
            vec![
                (ApiVerb::Create, "a".to_string()),
                (ApiVerb::Get, "a".to_string()),
                (ApiVerb::Update, "a".to_string()),
            ]
        );
        assert_eq!(store.count(ApiVerb::Update), 1);
    }

    #[tokio::test]
    async fn test_insert_is_not_recorded() {
        let store = InMemoryOAuthClients::new();
        store.insert(client("a", Some(GrantMethod::Auto)));
        assert!(store.actions().is_empty());
        assert_eq!(
            store.object("a").unwrap().metadata.resource_version.as_deref(),
            Some("1")
        );
    }

    #[tokio::test]
    async fn test_arc_delegates() {
        let store = std::sync::Arc::new(InMemoryOAuthClients::new());
        let api: &dyn OAuthClientApi = &store;
        api.create(&client("a", Some(GrantMethod::Auto)))
            .await
            .unwrap();
        assert_eq!(store.count(ApiVerb::Create), 1);
    }

    #[test]
    fn test_api_verb_labels() {
        assert_eq!(ApiVerb::Create.as_str(), "create");
        assert_eq!(ApiVerb::Get.as_str(), "get");
        assert_eq!(ApiVerb::Update.as_str(), "update");
    }
}

//! Authentication and salt-cache flow tests.
//!
//! Builds the production cache tierings over fake transports and drives
//! the facades the way the request layer would.

use std::collections::HashMap;
use std::sync::Arc;

use beacon_core::{Authenticatable, FacadeError};
use beacon_facade::tiers::{
    authenticatable_cache, publisher_salt_cache, AUTHENTICATABLE_KEY_PREFIX,
    PUBLISHER_SALT_KEY_PREFIX,
};
use beacon_facade::{AuthenticationFacade, PublisherFacade};
use beacon_test_utils::{
    sample_publisher, FakeRemoteStore, MockAuthenticationStore, MockPublisherStore,
};

fn auth_fixture() -> (AuthenticationFacade, Arc<MockAuthenticationStore>, Arc<FakeRemoteStore>) {
    let origin = Arc::new(MockAuthenticationStore::new(HashMap::from([(
        "s3cret".to_string(),
        Authenticatable::Publisher { id: 42 },
    )])));
    let remote = Arc::new(FakeRemoteStore::new());
    let facade = AuthenticationFacade::new(authenticatable_cache(remote.clone(), origin.clone()));
    (facade, origin, remote)
}

#[tokio::test]
async fn token_header_authenticates_through_the_cache() {
    let (facade, origin, remote) = auth_fixture();

    let token = facade.parse_authorization_header("Token s3cret").unwrap();
    let principal = facade.authenticate(&token).await.unwrap();
    assert_eq!(principal, Authenticatable::Publisher { id: 42 });
    assert_eq!(origin.calls(), 1);

    // Warm path: no second origin hit.
    facade.authenticate(&token).await.unwrap();
    assert_eq!(origin.calls(), 1);

    // The shared tier now holds the pinned wire shape under its namespace.
    tokio::task::yield_now().await;
    let bytes = remote
        .bytes(&format!("{AUTHENTICATABLE_KEY_PREFIX}s3cret"))
        .expect("shared tier backfilled");
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json, serde_json::json!({"type": "PUBLISHER", "id": 42}));
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let (facade, _origin, _remote) = auth_fixture();

    let token = facade.parse_authorization_header("Token wrong").unwrap();
    let err = facade.authenticate(&token).await.unwrap_err();
    assert!(matches!(err, FacadeError::Unauthorized { .. }));
}

#[tokio::test]
async fn bearer_tokens_do_not_use_this_path() {
    let (facade, origin, _remote) = auth_fixture();

    let token = facade.parse_authorization_header("Bearer something").unwrap();
    let err = facade.authenticate(&token).await.unwrap_err();
    assert!(matches!(err, FacadeError::Unauthorized { .. }));
    assert_eq!(origin.calls(), 0);
}

#[tokio::test]
async fn malformed_header_is_a_bad_request() {
    let (facade, _origin, _remote) = auth_fixture();

    for header in ["Basic abc", "Token", "", "s3cret"] {
        let err = facade.parse_authorization_header(header).unwrap_err();
        assert!(matches!(err, FacadeError::BadRequest { .. }), "{header:?}");
    }
}

#[tokio::test]
async fn publisher_salt_is_cached_across_lookups() {
    let origin = Arc::new(MockPublisherStore::new(vec![sample_publisher(20, "acme")]));
    let remote = Arc::new(FakeRemoteStore::new());
    let facade = PublisherFacade::new(
        origin.clone(),
        publisher_salt_cache(remote.clone(), origin.clone()),
    );

    assert_eq!(facade.publisher_salt(20).await.unwrap(), "salt-20");
    assert_eq!(origin.read_count(), 1);

    assert_eq!(facade.publisher_salt(20).await.unwrap(), "salt-20");
    assert_eq!(origin.read_count(), 1);

    // Salt strings travel as plain UTF-8 bytes in the shared tier.
    tokio::task::yield_now().await;
    assert_eq!(
        remote.bytes(&format!("{PUBLISHER_SALT_KEY_PREFIX}20")),
        Some(b"salt-20".to_vec())
    );
}

#[tokio::test]
async fn missing_salt_is_an_internal_fault() {
    let origin = Arc::new(MockPublisherStore::new(vec![]));
    let remote = Arc::new(FakeRemoteStore::new());
    let facade = PublisherFacade::new(
        origin.clone(),
        publisher_salt_cache(remote, origin.clone()),
    );

    let err = facade.publisher_salt(99).await.unwrap_err();
    assert!(matches!(err, FacadeError::Internal { .. }));
}

#[tokio::test]
async fn lookup_code_resolves_and_rejects() {
    let origin = Arc::new(MockPublisherStore::new(vec![sample_publisher(20, "acme")]));
    let remote = Arc::new(FakeRemoteStore::new());
    let facade = PublisherFacade::new(
        origin.clone(),
        publisher_salt_cache(remote, origin.clone()),
    );

    let publisher = facade.lookup_code("acme").await.unwrap();
    assert_eq!(publisher.id, 20);

    let err = facade.lookup_code("nope").await.unwrap_err();
    assert!(matches!(err, FacadeError::BadRequest { .. }));
}

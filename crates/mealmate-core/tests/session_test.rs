//! Integration tests for the session lifecycle.

use std::sync::Arc;

use mealmate_api::token::TOKEN_FILE_NAME;
use mealmate_api::{GatewayError, HttpGateway, RemoteService, TokenStore};
use mealmate_core::{SessionManager, SessionState};
use mealmate_test_utils::{MockBackend, TEST_EMAIL, TEST_PASSWORD, routes};

fn manager(backend: &MockBackend, tokens: &TokenStore) -> SessionManager {
    let gateway: Arc<dyn RemoteService> =
        Arc::new(HttpGateway::new(backend.gateway_config(), tokens.clone()).unwrap());
    SessionManager::new(gateway, tokens.clone())
}

#[tokio::test]
async fn starts_unknown_and_restores_anonymous_without_token() {
    let backend = MockBackend::with_user().await;
    let tokens = TokenStore::in_memory();
    let session = manager(&backend, &tokens);

    assert_eq!(session.state(), SessionState::Unknown);
    assert_eq!(session.restore().await, SessionState::Anonymous);
    assert_eq!(backend.total_requests(), 0);
}

#[tokio::test]
async fn restore_with_valid_token_authenticates() {
    let backend = MockBackend::with_user().await;
    let tokens = TokenStore::in_memory();
    tokens.set(backend.issue_token(TEST_EMAIL));
    let session = manager(&backend, &tokens);

    let state = session.restore().await;
    assert_eq!(state.user().unwrap().email, TEST_EMAIL);
    assert_eq!(backend.request_count(routes::PROFILE), 1);
}

#[tokio::test]
async fn restore_with_rejected_token_discards_it() {
    let backend = MockBackend::with_user().await;
    let tokens = TokenStore::in_memory();
    tokens.set("stale-token");
    let session = manager(&backend, &tokens);

    assert_eq!(session.restore().await, SessionState::Anonymous);
    assert!(!tokens.is_present());
}

#[tokio::test]
async fn restore_failure_of_any_kind_discards_token() {
    let backend = MockBackend::with_user().await;
    backend.fail_next(
        routes::PROFILE,
        500,
        serde_json::json!({ "error": "boom" }),
    );
    let tokens = TokenStore::in_memory();
    tokens.set(backend.issue_token(TEST_EMAIL));
    let session = manager(&backend, &tokens);

    assert_eq!(session.restore().await, SessionState::Anonymous);
    assert!(!tokens.is_present());
}

#[tokio::test]
async fn login_success_and_failure() {
    let backend = MockBackend::with_user().await;
    let tokens = TokenStore::in_memory();
    let session = manager(&backend, &tokens);
    session.restore().await;

    let err = session.login(TEST_EMAIL, "nope-nope").await.unwrap_err();
    assert_eq!(err, GatewayError::Remote("Invalid email or password".into()));
    assert_eq!(session.state(), SessionState::Anonymous);
    assert!(!tokens.is_present());

    let user = session.login(TEST_EMAIL, TEST_PASSWORD).await.unwrap();
    assert_eq!(session.current_user(), Some(user));
    assert!(tokens.is_present());
}

#[tokio::test]
async fn register_signs_in() {
    let backend = MockBackend::start().await;
    let tokens = TokenStore::in_memory();
    let session = manager(&backend, &tokens);
    session.restore().await;

    let user = session
        .register("new@example.com", "long-enough")
        .await
        .unwrap();
    assert_eq!(user.email, "new@example.com");
    assert!(session.state().is_authenticated());
    assert_eq!(backend.request_count(routes::REGISTER), 1);
    assert_eq!(backend.request_count(routes::LOGIN), 1);
}

#[tokio::test]
async fn register_rejection_stays_anonymous() {
    let backend = MockBackend::start().await;
    let tokens = TokenStore::in_memory();
    let session = manager(&backend, &tokens);
    session.restore().await;

    let err = session.register("new@example.com", "short").await.unwrap_err();
    assert_eq!(
        err,
        GatewayError::Remote("Password must be at least 8 characters long".into())
    );
    assert_eq!(session.state(), SessionState::Anonymous);
    assert_eq!(backend.request_count(routes::LOGIN), 0);
}

#[tokio::test]
async fn login_failure_after_register_propagates() {
    let backend = MockBackend::start().await;
    backend.fail_next(
        routes::LOGIN,
        503,
        serde_json::json!({ "error": "Login temporarily disabled" }),
    );
    let tokens = TokenStore::in_memory();
    let session = manager(&backend, &tokens);
    session.restore().await;

    let err = session
        .register("new@example.com", "long-enough")
        .await
        .unwrap_err();
    assert_eq!(err, GatewayError::Remote("Login temporarily disabled".into()));
    assert_eq!(session.state(), SessionState::Anonymous);
    assert!(!tokens.is_present());
}

#[tokio::test]
async fn logout_forgets_persisted_token() {
    let backend = MockBackend::with_user().await;
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join(TOKEN_FILE_NAME);

    let tokens = TokenStore::persistent(&path);
    let session = manager(&backend, &tokens);
    session.login(TEST_EMAIL, TEST_PASSWORD).await.unwrap();
    assert!(path.exists());

    // A second process picks the session back up from the file.
    let reopened = TokenStore::persistent(&path);
    let second = manager(&backend, &reopened);
    assert!(second.restore().await.is_authenticated());

    session.logout();
    assert_eq!(session.state(), SessionState::Anonymous);
    assert!(!tokens.is_present());
    assert!(!path.exists());
    assert!(!TokenStore::persistent(&path).is_present());
}

#[tokio::test]
async fn vanished_token_reads_as_anonymous() {
    let backend = MockBackend::with_user().await;
    let tokens = TokenStore::in_memory();
    let session = manager(&backend, &tokens);
    session.login(TEST_EMAIL, TEST_PASSWORD).await.unwrap();

    tokens.clear();
    assert_eq!(session.state(), SessionState::Anonymous);
    assert_eq!(session.current_user(), None);
}

#[tokio::test]
async fn expiry_demotes_and_clears() {
    let backend = MockBackend::with_user().await;
    let tokens = TokenStore::in_memory();
    let session = manager(&backend, &tokens);
    session.login(TEST_EMAIL, TEST_PASSWORD).await.unwrap();

    session.observe(&GatewayError::Remote("unrelated".into()));
    assert!(session.state().is_authenticated());

    session.observe(&GatewayError::SessionExpired);
    assert_eq!(session.state(), SessionState::Anonymous);
    assert!(!tokens.is_present());

    // Repeated expiry is harmless.
    session.handle_session_expired();
    assert_eq!(session.state(), SessionState::Anonymous);
}

#[tokio::test]
async fn subscribers_see_transitions() {
    let backend = MockBackend::with_user().await;
    let tokens = TokenStore::in_memory();
    let session = manager(&backend, &tokens);
    let mut rx = session.subscribe();
    assert_eq!(*rx.borrow_and_update(), SessionState::Unknown);

    session.restore().await;
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), SessionState::Anonymous);

    session.login(TEST_EMAIL, TEST_PASSWORD).await.unwrap();
    assert!(rx.borrow_and_update().is_authenticated());

    session.logout();
    assert_eq!(*rx.borrow_and_update(), SessionState::Anonymous);

    // Logging out again is not a transition.
    session.logout();
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test]
async fn sign_ins_count_each_authentication() {
    let backend = MockBackend::with_user().await;
    let tokens = TokenStore::in_memory();
    let session = manager(&backend, &tokens);
    session.restore().await;
    assert_eq!(session.sign_ins(), 0);

    session.login(TEST_EMAIL, TEST_PASSWORD).await.unwrap();
    assert_eq!(session.sign_ins(), 1);

    // Logging in again as the same user without a logout changes nothing.
    session.login(TEST_EMAIL, TEST_PASSWORD).await.unwrap();
    assert_eq!(session.sign_ins(), 1);

    session.logout();
    assert_eq!(session.sign_ins(), 1);
    session.login(TEST_EMAIL, TEST_PASSWORD).await.unwrap();
    assert_eq!(session.sign_ins(), 2);
}

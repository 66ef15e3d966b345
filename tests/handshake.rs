mod common;

use std::time::Duration;

use common::{BlackHoleJar, SITE, config_for, harness, harness_with, user_json};
use kreditscore_auth::{
    AuthState, ClientConfig, Destination, Error, ExchangeFailure, LoanApplicationForm,
    MemoryCookieJar, Navigator, SessionToken,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SESSION_TOKEN: &str = "0123456789abcdefghijABCDEFGHIJ0123456789";

fn verify_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "access_token": SESSION_TOKEN,
        "token_type": "bearer",
        "user": user_json()
    }))
}

#[tokio::test]
async fn test_callback_exchange_persists_session_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/verify"))
        .and(body_json(serde_json::json!({ "auth_token": "ABC" })))
        .respond_with(verify_ok())
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, "http://localhost:3000/?auth_token=ABC");
    let mut states = h.controller.subscribe();

    assert_eq!(h.controller.initialize().await, AuthState::Authenticated);
    assert_eq!(SESSION_TOKEN.len(), 40);
    assert_eq!(h.session().read(), Some(SessionToken::new(SESSION_TOKEN)));
    assert_eq!(h.navigator.visited(), vec![Destination::Profile]);
    assert!(!h.navigator.current_url().as_str().contains("auth_token"));
    assert!(states.has_changed().unwrap());
    assert_eq!(*states.borrow_and_update(), AuthState::Authenticated);
}

#[tokio::test]
async fn test_rejected_callback_token_fails_without_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/verify"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({ "detail": "expired" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, "http://localhost:3000/?auth_token=OLD");

    assert_eq!(
        h.controller.initialize().await,
        AuthState::ExchangeFailed(ExchangeFailure::Rejected)
    );
    assert!(!h.session().has_session());
    assert!(h.navigator.visited().is_empty());
    assert_eq!(h.navigator.current_url().as_str(), SITE);
}

#[tokio::test]
async fn test_token_that_does_not_persist_is_a_storage_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/verify"))
        .respond_with(verify_ok())
        .expect(1)
        .mount(&server)
        .await;

    let h = harness_with(
        config_for(&server),
        "http://localhost:3000/?auth_token=ABC",
        BlackHoleJar,
    );

    let state = h.controller.initialize().await;
    assert_eq!(state, AuthState::ExchangeFailed(ExchangeFailure::StoragePersistence));
    assert!(ExchangeFailure::StoragePersistence.user_message().contains("cookies"));
    assert!(h.navigator.visited().is_empty());
}

#[tokio::test]
async fn test_unreachable_backend_is_a_network_failure() {
    let config = ClientConfig::new("http://127.0.0.1:9/".parse().unwrap());
    let h = harness_with(config, "http://localhost:3000/?auth_token=ABC", MemoryCookieJar::new());

    assert_eq!(
        h.controller.initialize().await,
        AuthState::ExchangeFailed(ExchangeFailure::Network)
    );
    assert!(!h.navigator.current_url().as_str().contains("auth_token"));
}

#[tokio::test]
async fn test_malformed_exchange_response_is_not_a_network_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, "http://localhost:3000/?auth_token=ABC");

    let state = h.controller.initialize().await;

    assert_eq!(state, AuthState::ExchangeFailed(ExchangeFailure::Unexpected));
    assert!(!h.session().has_session());
}

#[tokio::test]
async fn test_hung_exchange_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/verify"))
        .respond_with(verify_ok().set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = config_for(&server).with_timeout(Duration::from_millis(200));
    let h = harness_with(config, "http://localhost:3000/?auth_token=ABC", MemoryCookieJar::new());

    assert_eq!(
        h.controller.initialize().await,
        AuthState::ExchangeFailed(ExchangeFailure::Network)
    );
}

#[tokio::test]
async fn test_existing_session_never_exchanges() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/verify"))
        .respond_with(verify_ok())
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server, "http://localhost:3000/?auth_token=ABC");
    h.session().save(&SessionToken::new("already-here"));

    assert_eq!(h.controller.initialize().await, AuthState::Authenticated);
    assert_eq!(h.session().read().unwrap().as_str(), "already-here");
    assert_eq!(h.navigator.visited(), vec![Destination::Profile]);
}

#[tokio::test]
async fn test_fresh_visit_shows_form_without_network() {
    let server = MockServer::start().await;
    let h = harness(&server, SITE);

    assert_eq!(h.controller.initialize().await, AuthState::Unauthenticated);
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(h.navigator.visited().is_empty());
}

#[tokio::test]
async fn test_reload_after_exchange_does_not_replay_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/verify"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let first = harness(&server, "http://localhost:3000/?auth_token=ABC");
    first.controller.initialize().await;

    // A reload starts from whatever address is now visible.
    let reloaded = harness(&server, first.navigator.current_url().as_str());
    assert_eq!(reloaded.controller.initialize().await, AuthState::Unauthenticated);
}

#[tokio::test]
async fn test_submit_redirects_to_telegram() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/telegram"))
        .and(body_json(serde_json::json!({
            "loan_amount": 100000,
            "loan_term": 12,
            "loan_purpose": "Образование",
            "monthly_income": 50000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "auth_token": "cb-token",
            "telegram_url": "https://t.me/kreditscore_bot?start=cb-token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, SITE);
    h.controller.initialize().await;

    let form = LoanApplicationForm::new("100 000", "12", "Education", "50 000");
    let url = h.controller.submit_application(&form).await.unwrap();

    assert_eq!(url.as_str(), "https://t.me/kreditscore_bot?start=cb-token");
    assert_eq!(h.navigator.last_destination(), Some(Destination::External(url)));
}

#[tokio::test]
async fn test_invalid_form_sends_nothing() {
    let server = MockServer::start().await;
    let h = harness(&server, SITE);
    h.controller.initialize().await;

    let form = LoanApplicationForm::new("500", "12", "Education", "50000");
    let err = h.controller.submit_application(&form).await.unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_retry_after_failed_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/verify"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/telegram"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "auth_token": "new",
            "telegram_url": "https://t.me/kreditscore_bot?start=new"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, "http://localhost:3000/?auth_token=OLD");
    assert!(matches!(
        h.controller.initialize().await,
        AuthState::ExchangeFailed(_)
    ));

    let form = LoanApplicationForm::new("50000", "6", "Travel", "40000");
    assert!(h.controller.submit_application(&form).await.is_ok());
}

#[tokio::test]
async fn test_logout_clears_even_when_backend_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, "http://localhost:3000/dashboard");
    h.session().save(&SessionToken::new("live"));
    h.controller.initialize().await;

    h.controller.logout().await;

    assert!(!h.session().has_session());
    assert_eq!(h.controller.state(), AuthState::Unauthenticated);
    assert_eq!(h.navigator.last_destination(), Some(Destination::Entry));
    assert_eq!(h.navigator.current_url().path(), "/");
}

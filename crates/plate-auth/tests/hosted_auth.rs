//! Hosted auth client against a mock auth service.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use plate_auth::refresh::spawn_auto_refresh;
use plate_auth::{AuthBackend, AuthError, HostedAuth, SessionStore, Subscription};
use plate_core::{AuthChangeEvent, AuthEvent, Identity, Session};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn auth(server: &MockServer) -> HostedAuth {
    HostedAuth::new(format!("{}/auth/v1", server.uri()), "anon-key")
}

fn token_body(user_id: &str, access_token: &str) -> serde_json::Value {
    json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": 1_900_000_000,
        "refresh_token": format!("refresh-{access_token}"),
        "user": {
            "id": user_id,
            "email": format!("{user_id}@plate.test"),
            "app_metadata": {"provider": "email"}
        }
    })
}

fn stored_session(expires_in: TimeDelta) -> Session {
    Session {
        access_token: "stored-token".into(),
        refresh_token: Some("stored-refresh".into()),
        token_type: "bearer".into(),
        expires_at: Utc::now() + expires_in,
        user: Identity::new("u1", Some("u1@plate.test".into())),
    }
}

/// Auth client whose persisted store already holds `session`.
fn auth_with_stored(
    server: &MockServer,
    session: &Session,
) -> (HostedAuth, tempfile::TempDir) {
    let tmp = tempfile::TempDir::new().expect("tmp dir");
    let store = SessionStore::file_only(tmp.path().join("session.json"));
    store.store(session).expect("seed session");
    (auth(server).with_session_store(store), tmp)
}

async fn next_event(subscription: &mut Subscription) -> AuthEvent {
    tokio::time::timeout(Duration::from_secs(5), subscription.recv())
        .await
        .expect("event within 5s")
        .expect("subscription open")
}

// ---------------------------------------------------------------------------
// Sign-in
// ---------------------------------------------------------------------------

#[tokio::test]
async fn password_sign_in_emits_signed_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(header("apikey", "anon-key"))
        .and(body_json(json!({"email": "u1@plate.test", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("u1", "at-1")))
        .expect(1)
        .mount(&server)
        .await;

    let auth = auth(&server);
    let mut events = auth.subscribe();
    let initial = next_event(&mut events).await;
    assert_eq!(initial.kind, AuthChangeEvent::InitialSession);
    assert!(initial.session.is_none());

    let session = auth
        .sign_in_with_password("u1@plate.test", "secret")
        .await
        .expect("sign-in");
    assert_eq!(session.access_token, "at-1");
    assert_eq!(session.expires_at.timestamp(), 1_900_000_000);
    assert_eq!(session.user.provider.as_deref(), Some("email"));

    let signed_in = next_event(&mut events).await;
    assert_eq!(signed_in.kind, AuthChangeEvent::SignedIn);
    assert_eq!(signed_in.session, Some(session.clone()));
    assert_eq!(auth.current_session(), Some(session));
}

#[tokio::test]
async fn bad_credentials_are_rejected_with_service_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let auth = auth(&server);
    let mut events = auth.subscribe();
    next_event(&mut events).await;

    let err = auth
        .sign_in_with_password("bad@x.com", "wrong")
        .await
        .unwrap_err();
    assert!(err.is_rejection());
    assert_eq!(err.to_string(), "Invalid login credentials");
    assert!(events.try_recv().is_none());
    assert!(auth.current_session().is_none());
}

#[tokio::test]
async fn server_error_is_network_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = auth(&server)
        .sign_in_with_password("a@b.c", "pw")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Network(_)));
    assert!(err.to_string().contains("upstream down"));
}

#[tokio::test]
async fn configured_only_with_url_and_key() {
    let server = MockServer::start().await;
    assert!(auth(&server).is_configured());
    assert!(!HostedAuth::new("/auth/v1", "anon").is_configured());
    assert!(!HostedAuth::new("https://x.supabase.co/auth/v1", " ").is_configured());
}

// ---------------------------------------------------------------------------
// Sign-up
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sign_up_awaiting_confirmation_has_no_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(body_json(json!({
            "email": "new@plate.test",
            "password": "pw",
            "data": {"display_name": "Nova"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u9",
            "email": "new@plate.test",
            "app_metadata": {"provider": "email"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = auth(&server);
    let mut events = auth.subscribe();
    next_event(&mut events).await;

    let outcome = auth
        .sign_up("new@plate.test", "pw", json!({"display_name": "Nova"}))
        .await
        .expect("sign-up");
    assert_eq!(outcome.identity.id, "u9");
    assert!(outcome.session.is_none());
    assert!(events.try_recv().is_none());
}

#[tokio::test]
async fn auto_confirmed_sign_up_signs_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("u9", "at-9")))
        .mount(&server)
        .await;

    let auth = auth(&server);
    let mut events = auth.subscribe();
    next_event(&mut events).await;

    let outcome = auth
        .sign_up("u9@plate.test", "pw", json!({}))
        .await
        .expect("sign-up");
    assert_eq!(outcome.session.as_ref().map(|s| s.access_token.as_str()), Some("at-9"));
    assert_eq!(next_event(&mut events).await.kind, AuthChangeEvent::SignedIn);
}

#[tokio::test]
async fn duplicate_sign_up_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"code": 422, "msg": "User already registered"})),
        )
        .mount(&server)
        .await;

    let err = auth(&server)
        .sign_up("dup@plate.test", "pw", json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "User already registered");
}

// ---------------------------------------------------------------------------
// Refresh and sign-out
// ---------------------------------------------------------------------------

#[tokio::test]
async fn refresh_without_session_fails() {
    let server = MockServer::start().await;
    let err = auth(&server).refresh_session().await.unwrap_err();
    assert!(matches!(err, AuthError::NoSession));
}

#[tokio::test]
async fn refresh_exchanges_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_json(json!({"refresh_token": "stored-refresh"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("u1", "at-2")))
        .expect(1)
        .mount(&server)
        .await;

    let (auth, _tmp) = auth_with_stored(&server, &stored_session(TimeDelta::hours(1)));
    let mut events = auth.subscribe();
    assert_eq!(
        next_event(&mut events)
            .await
            .session
            .map(|s| s.access_token),
        Some("stored-token".to_string())
    );

    let session = auth.refresh_session().await.expect("refresh");
    assert_eq!(session.access_token, "at-2");
    let refreshed = next_event(&mut events).await;
    assert_eq!(refreshed.kind, AuthChangeEvent::TokenRefreshed);

    let persisted = auth.session_store().and_then(SessionStore::load);
    assert_eq!(persisted.map(|s| s.access_token), Some("at-2".to_string()));
}

#[tokio::test]
async fn sign_out_clears_locally_even_if_remote_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("Authorization", "Bearer stored-token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let (auth, _tmp) = auth_with_stored(&server, &stored_session(TimeDelta::hours(1)));
    let mut events = auth.subscribe();
    next_event(&mut events).await;

    let result = auth.sign_out().await;
    assert!(matches!(result, Err(AuthError::Network(_))));
    assert_eq!(next_event(&mut events).await.kind, AuthChangeEvent::SignedOut);
    assert!(auth.current_session().is_none());
    assert!(auth.session_store().and_then(SessionStore::load).is_none());
}

#[tokio::test]
async fn sign_out_without_session_skips_remote_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    auth(&server).sign_out().await.expect("local sign-out");
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn persisted_session_is_announced_as_initial_session() {
    let server = MockServer::start().await;
    let stored = stored_session(TimeDelta::hours(1));
    let (auth, _tmp) = auth_with_stored(&server, &stored);

    let mut events = auth.subscribe();
    let initial = next_event(&mut events).await;
    assert_eq!(initial.kind, AuthChangeEvent::InitialSession);
    assert_eq!(initial.identity().map(|i| i.id.as_str()), Some("u1"));
}

#[tokio::test]
async fn expired_persisted_session_is_discarded() {
    let server = MockServer::start().await;
    let (auth, _tmp) = auth_with_stored(&server, &stored_session(-TimeDelta::minutes(5)));

    assert!(auth.current_session().is_none());
    let store = auth.session_store().expect("store");
    assert!(!store.path().exists());
}

// ---------------------------------------------------------------------------
// Auto refresh
// ---------------------------------------------------------------------------

#[tokio::test]
async fn auto_refresh_renews_session_inside_margin() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("u1", "at-2")))
        .expect(1)
        .mount(&server)
        .await;

    let (auth, _tmp) = auth_with_stored(&server, &stored_session(TimeDelta::seconds(30)));
    let auth = Arc::new(auth);
    let mut events = auth.subscribe();
    next_event(&mut events).await;

    let refresher = spawn_auto_refresh(auth.clone(), 60);
    let refreshed = next_event(&mut events).await;
    refresher.abort();

    assert_eq!(refreshed.kind, AuthChangeEvent::TokenRefreshed);
    assert_eq!(
        auth.current_session().map(|s| s.access_token),
        Some("at-2".to_string())
    );
}

#[tokio::test]
async fn auto_refresh_rejection_signs_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid Refresh Token: Already Used"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let (auth, _tmp) = auth_with_stored(&server, &stored_session(TimeDelta::seconds(10)));
    let auth = Arc::new(auth);
    let mut events = auth.subscribe();
    next_event(&mut events).await;

    let refresher = spawn_auto_refresh(auth.clone(), 60);
    let signed_out = next_event(&mut events).await;
    refresher.abort();

    assert_eq!(signed_out.kind, AuthChangeEvent::SignedOut);
    assert!(auth.current_session().is_none());
}

//! Lookup-boundary validation of data-store rows as delivered by the REST API.

use plate_core::{AppKind, AuthChangeEvent, AuthEvent, BusinessRole, Profile, Session};
use pretty_assertions::assert_eq;

const BUSINESS_USERS_RESPONSE: &str = r#"[
  {
    "id": "6f1c1f0e-2f4b-4d7c-9a55-0d4f2b8e1a01",
    "user_id": "a7d0a5c4-0c57-4f0e-9b5b-6c0f5f2e9c11",
    "email": "owner@bistro.test",
    "role": "owner",
    "business_id": "1b6f7f6e-9d2a-4c3e-8c1d-2a3b4c5d6e7f",
    "created_at": "2024-03-01T12:00:00+00:00",
    "updated_at": "2024-03-01T12:00:00+00:00"
  }
]"#;

const PROFILES_RESPONSE: &str = r#"[
  {
    "user_id": "a7d0a5c4-0c57-4f0e-9b5b-6c0f5f2e9c11",
    "display_name": "Sam Diner",
    "username": "sam",
    "avatar_url": "https://cdn.test/avatars/sam.png",
    "bio": null,
    "followers_count": 12
  }
]"#;

fn first_row(body: &str) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = serde_json::from_str(body).expect("array body");
    rows.into_iter().next().expect("one row")
}

#[test]
fn business_users_response_becomes_business_profile() {
    let profile = Profile::from_row(AppKind::Console, first_row(BUSINESS_USERS_RESPONSE))
        .expect("valid row");
    let user = profile.as_business().expect("business");
    assert_eq!(user.role, BusinessRole::Owner);
    assert_eq!(user.email.as_deref(), Some("owner@bistro.test"));
    assert_eq!(profile.user_id(), "a7d0a5c4-0c57-4f0e-9b5b-6c0f5f2e9c11");
}

#[test]
fn profiles_response_becomes_customer_profile() {
    let profile =
        Profile::from_row(AppKind::Webapp, first_row(PROFILES_RESPONSE)).expect("valid row");
    let customer = profile.as_customer().expect("customer");
    assert_eq!(customer.display_name.as_deref(), Some("Sam Diner"));
    assert_eq!(customer.username.as_deref(), Some("sam"));
    assert!(customer.bio.is_none());
}

#[test]
fn profile_row_for_wrong_app_is_rejected() {
    let err = Profile::from_row(AppKind::Console, first_row(PROFILES_RESPONSE)).unwrap_err();
    assert!(err.to_string().contains("business_users row"));
}

#[test]
fn lifecycle_event_parses_from_wire_json() {
    let event: AuthEvent = serde_json::from_str(
        r#"{
            "kind": "TOKEN_REFRESHED",
            "session": {
                "access_token": "a.b.c",
                "refresh_token": "r",
                "token_type": "bearer",
                "expires_at": "2030-01-01T00:00:00Z",
                "user": {"id": "u1", "email": "u1@test", "provider": "email"}
            }
        }"#,
    )
    .expect("event");
    assert_eq!(event.kind, AuthChangeEvent::TokenRefreshed);
    assert_eq!(event.identity().map(|i| i.id.as_str()), Some("u1"));
    let session: &Session = event.session.as_ref().expect("session");
    assert_eq!(session.user.provider.as_deref(), Some("email"));
}

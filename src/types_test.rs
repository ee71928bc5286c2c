use super::*;

#[test]
fn auth_response_deserializes_backend_payload() {
    let json = serde_json::json!({
        "token": "tok_123",
        "user": {
            "id": "u1",
            "avatar_url": "https://avatars.githubusercontent.com/u/1",
            "name": "Alice",
            "login": "alice"
        }
    });
    let resp: AuthResponse = serde_json::from_value(json).unwrap();
    assert_eq!(resp.token, "tok_123");
    assert_eq!(resp.user.login, "alice");
    assert_eq!(resp.user.avatar_url, "https://avatars.githubusercontent.com/u/1");
}

#[test]
fn authenticate_request_serializes_code_field() {
    let body = serde_json::to_value(AuthenticateRequest { code: "ABC123".into() }).unwrap();
    assert_eq!(body, serde_json::json!({ "code": "ABC123" }));
}

#[test]
fn user_missing_field_is_rejected() {
    let json = serde_json::json!({ "id": "u1", "name": "Alice", "login": "alice" });
    assert!(serde_json::from_value::<User>(json).is_err());
}

#[test]
fn status_serializes_snake_case() {
    assert_eq!(serde_json::to_value(AuthStatus::Authenticating).unwrap(), "authenticating");
}

#[test]
fn default_snapshot_is_anonymous() {
    let snap = AuthSnapshot::default();
    assert_eq!(snap.status, AuthStatus::Anonymous);
    assert!(snap.user.is_none());
    assert!(!snap.is_authenticated());
}

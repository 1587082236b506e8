//! Resolve-user and link-user endpoints over HTTP

use async_trait::async_trait;
use axum::http::{
    header::AUTHORIZATION,
    HeaderName, HeaderValue, StatusCode,
};
use axum_test::TestServer;
use mockall::mock;
use serde_json::{json, Value};
use std::sync::Arc;

use fwc_identity::handlers::INTERNAL_SECRET_HEADER;
use fwc_identity::{
    routes, DisabledRoleSync, IdentityError, IdentityResult, IdentityState, NewUser,
    UserProvisioner, UserRecord, UserStore,
};
use fwc_rbac::{RecordId, Role};

mock! {
    pub Users {}

    #[async_trait]
    impl UserStore for Users {
        async fn find_by_auth0_id(&self, auth0_id: &str) -> IdentityResult<Option<UserRecord>>;
        async fn find_by_id(&self, id: &RecordId) -> IdentityResult<Option<UserRecord>>;
        async fn create(&self, user: NewUser) -> IdentityResult<UserRecord>;
        async fn update_roles(
            &self,
            id: &RecordId,
            roles: &[Role],
        ) -> IdentityResult<Option<UserRecord>>;
    }
}

const SECRET: &str = "bridge-secret";

fn stored(id: i32, email: &str, roles: &[&str]) -> UserRecord {
    UserRecord {
        id: RecordId::from(id),
        email: email.to_string(),
        auth0_id: Some("auth0|known".to_string()),
        neon_user_id: None,
        roles: roles.iter().map(|role| role.to_string()).collect(),
        profile: Some(RecordId::from(70)),
    }
}

fn created_from(user: NewUser) -> UserRecord {
    UserRecord {
        id: RecordId::from(101),
        email: user.email,
        auth0_id: user.auth0_id,
        neon_user_id: user.neon_user_id,
        roles: user.roles.iter().map(|role| role.as_str().to_string()).collect(),
        profile: None,
    }
}

fn server(store: MockUsers, secret: Option<&str>) -> TestServer {
    let provisioner = UserProvisioner::new(Arc::new(store), Arc::new(DisabledRoleSync), Role::Viewer);
    let state = IdentityState::new(provisioner, secret.map(str::to_string));
    TestServer::new(routes(state)).unwrap()
}

fn secret_header(value: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(INTERNAL_SECRET_HEADER),
        HeaderValue::from_str(value).unwrap(),
    )
}

#[tokio::test]
async fn test_resolve_returns_existing_user() {
    let mut store = MockUsers::new();
    store
        .expect_find_by_auth0_id()
        .withf(|auth0_id| auth0_id.to_string() == "auth0|known")
        .times(1)
        .returning(|_| Ok(Some(stored(5, "anna@example.org", &["member"]))));
    store.expect_create().never();

    let (name, value) = secret_header(SECRET);
    let response = server(store, Some(SECRET))
        .post("/api/internal/resolve-user")
        .add_header(name, value)
        .json(&json!({ "auth0Id": "auth0|known" }))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({ "id": "5", "email": "anna@example.org", "roles": ["member"], "profile": "70" })
    );
}

#[tokio::test]
async fn test_resolve_provisions_new_user() {
    let mut store = MockUsers::new();
    store.expect_find_by_auth0_id().returning(|_| Ok(None));
    store
        .expect_create()
        .withf(|user| {
            user.email == "simeon@example.org"
                && user.auth0_id.as_deref() == Some("auth0|new")
                && user.roles == vec![Role::Viewer]
        })
        .times(1)
        .returning(|user| Ok(created_from(user)));

    let (name, value) = secret_header(SECRET);
    let response = server(store, Some(SECRET))
        .post("/api/internal/resolve-user")
        .add_header(name, value)
        .json(&json!({ "auth0Id": "auth0|new", "email": "  Simeon@Example.org" }))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["roles"], json!(["viewer"]));
    assert_eq!(body["profile"], Value::Null);
}

#[tokio::test]
async fn test_resolve_rejects_wrong_secret() {
    let mut store = MockUsers::new();
    store.expect_find_by_auth0_id().never();

    let (name, value) = secret_header("guess");
    let response = server(store, Some(SECRET))
        .post("/api/internal/resolve-user")
        .add_header(name, value)
        .json(&json!({ "auth0Id": "auth0|known" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>(), json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn test_resolve_without_configured_secret_rejects_everything() {
    let mut store = MockUsers::new();
    store.expect_find_by_auth0_id().never();

    let response = server(store, None)
        .post("/api/internal/resolve-user")
        .json(&json!({ "auth0Id": "auth0|known" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_resolve_field_errors() {
    let mut store = MockUsers::new();
    store.expect_find_by_auth0_id().returning(|_| Ok(None));
    store.expect_create().never();
    let server = server(store, Some(SECRET));

    let (name, value) = secret_header(SECRET);
    let response = server
        .post("/api/internal/resolve-user")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "email": "x@example.org" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>(), json!({ "error": "Missing auth0Id" }));

    let response = server
        .post("/api/internal/resolve-user")
        .add_header(name, value)
        .json(&json!({ "auth0Id": "auth0|new" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>(), json!({ "error": "Missing email" }));
}

#[tokio::test]
async fn test_resolve_store_failure_is_generic() {
    let mut store = MockUsers::new();
    store
        .expect_find_by_auth0_id()
        .returning(|_| Err(IdentityError::store("database is locked")));

    let (name, value) = secret_header(SECRET);
    let response = server(store, Some(SECRET))
        .post("/api/internal/resolve-user")
        .add_header(name, value)
        .json(&json!({ "auth0Id": "auth0|known" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Internal resolve-user failure" })
    );
}

#[tokio::test]
async fn test_link_creates_viewer() {
    let mut store = MockUsers::new();
    store
        .expect_create()
        .withf(|user| user.neon_user_id.as_deref() == Some("neon-9") && user.auth0_id.is_none())
        .times(1)
        .returning(|user| Ok(created_from(user)));

    let response = server(store, Some(SECRET))
        .post("/api/link-neon-user")
        .add_header(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {SECRET}")).unwrap())
        .json(&json!({ "neonUserId": "neon-9", "email": "lydia@example.org" }))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["user"]["email"], json!("lydia@example.org"));
    assert_eq!(body["user"]["roles"], json!(["viewer"]));
}

#[tokio::test]
async fn test_link_requires_bearer_and_fields() {
    let mut store = MockUsers::new();
    store.expect_create().never();
    let server = server(store, Some(SECRET));

    let response = server
        .post("/api/link-neon-user")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer nope"))
        .json(&json!({ "neonUserId": "neon-9", "email": "lydia@example.org" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .post("/api/link-neon-user")
        .add_header(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {SECRET}")).unwrap())
        .json(&json!({ "neonUserId": "neon-9" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>(), json!({ "error": "Missing email" }));
}

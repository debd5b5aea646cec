use super::*;
use crate::testing::{
    commit_ok, document, jwks, sign_id_token, test_app, AUTH_PATH, DOCUMENTS_PATH, JWKS_PATH,
};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use httpmock::prelude::*;
use serde_json::json;
use tower::ServiceExt;

const TRIGGER_SECRET: &str = "hook-secret";

fn router(server: &MockServer) -> Router {
    create_router(AppState::new(
        test_app(server),
        FunctionsSettings::new(Some("let-me-in"), None).with_trigger_secret(Some(TRIGGER_SECRET)),
    ))
}

fn trigger(secret: Option<&str>, body: Value) -> Request<Body> {
    let mut request = call("/sendWelcomeEmail", None, body);
    if let Some(secret) = secret {
        request.headers_mut().insert(
            callable::TRIGGER_SECRET_HEADER,
            secret.parse().unwrap(),
        );
    }
    request
}

fn call(path: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn mock_jwks(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET).path(JWKS_PATH);
            then.status(200)
                .header("Cache-Control", "public, max-age=3600")
                .json_body(jwks());
        })
        .await;
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start_async().await;
    let response = router(&server)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_create_test_data_without_token_is_unauthenticated() {
    let server = MockServer::start_async().await;
    let response = router(&server)
        .oneshot(call("/createTestData", None, json!({ "data": {} })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["error"]["status"], "UNAUTHENTICATED");
    assert_eq!(
        body["error"]["message"],
        "The function must be called while authenticated"
    );
}

#[tokio::test]
async fn test_invalid_id_token_is_rejected() {
    let server = MockServer::start_async().await;
    mock_jwks(&server).await;

    let response = router(&server)
        .oneshot(call("/createTestData", Some("not-a-jwt"), json!({ "data": {} })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["error"]["message"], "Invalid ID token");
}

#[tokio::test]
async fn test_malformed_authorization_header_is_rejected() {
    let server = MockServer::start_async().await;
    let request = Request::builder()
        .method("POST")
        .uri("/createTestData")
        .header(header::AUTHORIZATION, "Basic Zm9vOmJhcg==")
        .body(Body::empty())
        .unwrap();

    let response = router(&server).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_super_admin_missing_fields() {
    let server = MockServer::start_async().await;
    let response = router(&server)
        .oneshot(call(
            "/createSuperAdmin",
            None,
            json!({ "data": { "email": "admin@clinic.com" } }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await,
        json!({
            "error": {
                "status": "INVALID_ARGUMENT",
                "message": "Email and password are required"
            }
        })
    );
}

#[tokio::test]
async fn test_create_super_admin_forwards_bootstrap_header() {
    let server = MockServer::start_async().await;
    let accounts = server
        .mock_async(|when, then| {
            when.method(POST).path(format!("{}/accounts", AUTH_PATH));
            then.status(200).json_body(json!({ "localId": "new-uid" }));
        })
        .await;

    let mut request = call(
        "/createSuperAdmin",
        None,
        json!({ "data": { "email": "admin@clinic.com", "password": "s3cure-pass" } }),
    );
    request.headers_mut().insert(
        callable::BOOTSTRAP_TOKEN_HEADER,
        "wrong-token".parse().unwrap(),
    );

    let response = router(&server).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(read_json(response).await["error"]["status"], "PERMISSION_DENIED");
    accounts.assert_calls_async(0).await;
}

#[tokio::test]
async fn test_create_test_data_as_super_admin() {
    let server = MockServer::start_async().await;
    mock_jwks(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{}/users/root", DOCUMENTS_PATH));
            then.status(200).json_body(document(
                "users/root",
                json!({ "role": { "stringValue": "super_admin" } }),
            ));
        })
        .await;
    let writes = server
        .mock_async(|when, then| {
            when.method(POST).path(format!("{}:commit", DOCUMENTS_PATH));
            then.status(200).json_body(commit_ok());
        })
        .await;

    let token = sign_id_token("root");
    let response = router(&server)
        .oneshot(call("/createTestData", Some(&token), json!({ "data": null })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({
            "result": {
                "success": true,
                "message": "Test data created successfully"
            }
        })
    );
    writes.assert_calls_async(9).await;
}

#[tokio::test]
async fn test_create_test_data_as_doctor_is_forbidden() {
    let server = MockServer::start_async().await;
    mock_jwks(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{}/users/doc-1", DOCUMENTS_PATH));
            then.status(200).json_body(document(
                "users/doc-1",
                json!({ "role": { "stringValue": "doctor" } }),
            ));
        })
        .await;

    let token = sign_id_token("doc-1");
    let response = router(&server)
        .oneshot(call("/createTestData", Some(&token), json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        read_json(response).await["error"]["message"],
        "Only super admins can perform this action"
    );
}

#[tokio::test]
async fn test_send_welcome_email_returns_null_result() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{}/users/u1", DOCUMENTS_PATH));
            then.status(404).json_body(json!({
                "error": { "code": 404, "message": "not found", "status": "NOT_FOUND" }
            }));
        })
        .await;
    let link = server
        .mock_async(|when, then| {
            when.method(POST).path(format!("{}/accounts:sendOobCode", AUTH_PATH));
            then.status(200).json_body(json!({ "oobLink": "https://example.com/l" }));
        })
        .await;

    let response = router(&server)
        .oneshot(trigger(
            Some(TRIGGER_SECRET),
            json!({ "data": { "uid": "u1", "email": "x@y.com" } }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({ "result": null }));
    link.assert_calls_async(1).await;
}

#[tokio::test]
async fn test_upstream_failure_maps_to_internal() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{}/users/u1", DOCUMENTS_PATH));
            then.status(500).body("boom");
        })
        .await;

    let response = router(&server)
        .oneshot(trigger(
            Some(TRIGGER_SECRET),
            json!({ "data": { "uid": "u1", "email": "x@y.com" } }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(response).await["error"]["status"], "INTERNAL");
}

#[tokio::test]
async fn test_create_super_admin_rejects_bad_input_before_token_check() {
    let server = MockServer::start_async().await;
    let keys = server
        .mock_async(|when, then| {
            when.method(GET).path(JWKS_PATH);
            then.status(200).json_body(jwks());
        })
        .await;
    let app = router(&server);

    let response = app
        .clone()
        .oneshot(call("/createSuperAdmin", Some("expired.or.bad"), json!({ "data": {} })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"]["status"], "INVALID_ARGUMENT");

    let token = sign_id_token("root");
    let response = app
        .oneshot(call("/createSuperAdmin", Some(&token), json!({ "data": {} })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    keys.assert_calls_async(0).await;
}

#[tokio::test]
async fn test_send_welcome_email_requires_trigger_secret() {
    let server = MockServer::start_async().await;
    let link = server
        .mock_async(|when, then| {
            when.method(POST).path(format!("{}/accounts:sendOobCode", AUTH_PATH));
            then.status(200).json_body(json!({ "oobLink": "https://example.com/l" }));
        })
        .await;
    let body = json!({ "data": { "uid": "anything", "email": "victim@example.com" } });

    let response = router(&server)
        .oneshot(trigger(None, body.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = router(&server)
        .oneshot(trigger(Some("guess"), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(read_json(response).await["error"]["message"], "Invalid trigger secret");

    link.assert_calls_async(0).await;
}

#[tokio::test]
async fn test_send_welcome_email_disabled_without_configured_secret() {
    let server = MockServer::start_async().await;
    let app = create_router(AppState::new(test_app(&server), FunctionsSettings::default()));

    let response = app
        .oneshot(trigger(
            Some(""),
            json!({ "data": { "uid": "u1", "email": "x@y.com" } }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        read_json(response).await["error"]["message"],
        "Trigger endpoint is not enabled"
    );
}

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::router::auth_routes;
use auth_cell::services::password::hash_password;
use shared_utils::jwt::validate_token;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TEST_JWT_SECRET};

fn app(server: &MockServer) -> Router {
    auth_routes(TestConfig::with_mock_server(&server.uri()).to_arc())
}

fn admin_row(id: &str, email: &str, password: &str) -> Value {
    json!({
        "id": id,
        "name": "Front Desk",
        "email": email,
        "password_hash": hash_password(password).unwrap(),
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    })
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_register_hashes_password_and_returns_profile() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/admins"))
        .and(query_param("email", "eq.desk@clinic.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/admins"))
        .and(body_partial_json(json!({ "email": "desk@clinic.test", "name": "Front Desk" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!([admin_row(&id, "desk@clinic.test", "s3cret-pass")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = app(&server)
        .oneshot(post_json(
            "/register",
            json!({ "name": "Front Desk", "email": "Desk@Clinic.test", "password": "s3cret-pass" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = json_body(response).await;
    assert_eq!(json["admin"]["id"], id);
    assert!(json["admin"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/admins"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            admin_row(&Uuid::new_v4().to_string(), "desk@clinic.test", "s3cret-pass")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/admins"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let response = app(&server)
        .oneshot(post_json(
            "/register",
            json!({ "name": "Front Desk", "email": "desk@clinic.test", "password": "s3cret-pass" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let server = MockServer::start().await;

    let response = app(&server)
        .oneshot(post_json(
            "/register",
            json!({ "name": "Front Desk", "email": "desk@clinic.test", "password": "short" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_issues_admin_token() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/admins"))
        .and(query_param("email", "eq.desk@clinic.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            admin_row(&id, "desk@clinic.test", "s3cret-pass")
        ])))
        .mount(&server)
        .await;

    let response = app(&server)
        .oneshot(post_json(
            "/login",
            json!({ "email": "desk@clinic.test", "password": "s3cret-pass" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["token_type"], "Bearer");
    assert_eq!(json["expires_in"], 24 * 3600);

    let admin = validate_token(json["token"].as_str().unwrap(), TEST_JWT_SECRET).unwrap();
    assert_eq!(admin.id, id);
    assert_eq!(admin.name.as_deref(), Some("Front Desk"));
}

#[tokio::test]
async fn test_login_rejects_wrong_password_and_unknown_email() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/admins"))
        .and(query_param("email", "eq.desk@clinic.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            admin_row(&Uuid::new_v4().to_string(), "desk@clinic.test", "s3cret-pass")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/admins"))
        .and(query_param("email", "eq.nobody@clinic.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let response = app(&server)
        .oneshot(post_json("/login", json!({ "email": "desk@clinic.test", "password": "guessing" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app(&server)
        .oneshot(post_json("/login", json!({ "email": "nobody@clinic.test", "password": "guessing" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_me_requires_valid_token() {
    let server = MockServer::start().await;

    let request = Request::builder().uri("/me").body(Body::empty()).unwrap();
    let response = app(&server).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/me")
        .header("Authorization", JwtTestUtils::bearer(&JwtTestUtils::expired_token(TEST_JWT_SECRET)))
        .body(Body::empty())
        .unwrap();
    let response = app(&server).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

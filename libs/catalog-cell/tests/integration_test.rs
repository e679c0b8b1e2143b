use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use catalog_cell::router::{admin_service_routes, public_service_routes};
use catalog_cell::CatalogService;
use catalog_cell::CatalogError;
use shared_database::StoreClient;
use shared_utils::test_utils::{JwtTestUtils, MockStoreResponses, TestConfig, TEST_JWT_SECRET};

fn admin_app(server: &MockServer) -> Router {
    admin_service_routes(TestConfig::with_mock_server(&server.uri()).to_arc())
}

fn authed(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let token = JwtTestUtils::admin_token(TEST_JWT_SECRET);
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", JwtTestUtils::bearer(&token))
        .header("content-type", "application/json");
    match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn test_public_service_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::service(&Uuid::new_v4().to_string(), "Cleaning", 500.0),
            MockStoreResponses::service(&Uuid::new_v4().to_string(), "Filling", 300.0)
        ])))
        .mount(&server)
        .await;

    let app = public_service_routes(TestConfig::with_mock_server(&server.uri()).to_arc());
    let response = app
        .oneshot(Request::builder().uri("/services").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);
    assert_eq!(json[0]["base_price"], 500.0);
}

#[tokio::test]
async fn test_create_service_rejects_negative_price() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/services"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let response = admin_app(&server)
        .oneshot(authed(
            "POST",
            "/services",
            Some(json!({ "name": "Whitening", "base_price": -10.0 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_service_allows_advisory_range_outside_base() {
    let server = MockServer::start().await;
    let service_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/services"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::service(&service_id, "Braces", 40000.0)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let response = admin_app(&server)
        .oneshot(authed(
            "POST",
            "/services",
            Some(json!({
                "name": "Braces",
                "base_price": 40000.0,
                "min_price": 45000.0,
                "max_price": 30000.0
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_create_service_name_clash_ignores_case() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/services"))
        .and(query_param("name", "ilike.cleaning"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::service(&Uuid::new_v4().to_string(), "Cleaning", 500.0)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/services"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let response = admin_app(&server)
        .oneshot(authed(
            "POST",
            "/services",
            Some(json!({ "name": "cleaning", "base_price": 450.0 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_referenced_service_is_blocked() {
    let server = MockServer::start().await;
    let service_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("services", format!("cs.{{{}}}", service_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": Uuid::new_v4() }])))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let response = admin_app(&server)
        .oneshot(authed("DELETE", &format!("/services/{}", service_id), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_unreferenced_service() {
    let server = MockServer::start().await;
    let service_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/services"))
        .and(query_param("id", format!("eq.{}", service_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::service(&service_id, "Cleaning", 500.0)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let response = admin_app(&server)
        .oneshot(authed("DELETE", &format!("/services/{}", service_id), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_lookup_by_ids_keeps_request_order_and_reports_missing() {
    let server = MockServer::start().await;
    let x = Uuid::new_v4();
    let y = Uuid::new_v4();
    let z = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::service(&y.to_string(), "Y", 300.0),
            MockStoreResponses::service(&x.to_string(), "X", 500.0)
        ])))
        .mount(&server)
        .await;

    let config = TestConfig::with_mock_server(&server.uri()).to_app_config();
    let catalog = CatalogService::with_store(StoreClient::new(&config));

    let services = catalog.get_services_by_ids(&[x, y]).await.unwrap();
    assert_eq!(services[0].name, "X");
    assert_eq!(services[1].name, "Y");

    let missing = catalog.get_services_by_ids(&[x, z]).await.unwrap_err();
    match missing {
        CatalogError::MissingServices(ids) => assert_eq!(ids, z.to_string()),
        other => panic!("unexpected error: {:?}", other),
    }
}

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::router::admin_appointment_routes;
use shared_utils::test_utils::{JwtTestUtils, MockStoreResponses, TestConfig, TEST_JWT_SECRET};

const BOUNDARY: &str = "clinic-test-boundary";

fn app(server: &MockServer, upload_dir: &TempDir) -> Router {
    let config = TestConfig {
        upload_dir: upload_dir.path().to_string_lossy().into_owned(),
        ..TestConfig::with_mock_server(&server.uri())
    };
    admin_appointment_routes(config.to_arc())
}

fn multipart_request(uri: &str, file_name: &str, content_type: &str, content: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: {c}\r\n\r\n{content}\r\n--{b}--\r\n",
        b = BOUNDARY,
        f = file_name,
        c = content_type,
        content = content
    );
    Request::builder()
        .method("PATCH")
        .uri(uri)
        .header("Authorization", JwtTestUtils::bearer(&JwtTestUtils::admin_token(TEST_JWT_SECRET)))
        .header("content-type", format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}

async fn mount_appointment(server: &MockServer, id: &str) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment(id, "APT-UPLOADS001", &Uuid::new_v4().to_string(), "2025-03-12", "Completed")
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_document_upload_is_written_and_attached() {
    let server = MockServer::start().await;
    let upload_dir = TempDir::new().unwrap();
    let id = Uuid::new_v4().to_string();

    mount_appointment(&server, &id).await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment(&id, "APT-UPLOADS001", &Uuid::new_v4().to_string(), "2025-03-12", "Completed")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let response = app(&server, &upload_dir)
        .oneshot(multipart_request(
            &format!("/appointments/{}/upload-document", id),
            "x ray.pdf",
            "application/pdf",
            "%PDF-1.4 test",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let written: Vec<_> = std::fs::read_dir(upload_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(written.len(), 1);
    let name = written[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.ends_with("-x_ray.pdf"));
    assert_eq!(std::fs::read_to_string(&written[0]).unwrap(), "%PDF-1.4 test");
}

#[tokio::test]
async fn test_image_slots_reject_non_images() {
    let server = MockServer::start().await;
    let upload_dir = TempDir::new().unwrap();
    let id = Uuid::new_v4().to_string();

    mount_appointment(&server, &id).await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let response = app(&server, &upload_dir)
        .oneshot(multipart_request(
            &format!("/appointments/{}/upload-before-image", id),
            "notes.txt",
            "text/plain",
            "not an image",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(std::fs::read_dir(upload_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_form_without_file_is_rejected() {
    let server = MockServer::start().await;
    let upload_dir = TempDir::new().unwrap();

    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"comment\"\r\n\r\nno file here\r\n--{b}--\r\n",
        b = BOUNDARY
    );
    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/appointments/{}/upload-after-image", Uuid::new_v4()))
        .header("Authorization", JwtTestUtils::bearer(&JwtTestUtils::admin_token(TEST_JWT_SECRET)))
        .header("content-type", format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap();

    let response = app(&server, &upload_dir).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

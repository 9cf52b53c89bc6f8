//! HTTP tests for the users service
//!
//! The full router (auth middleware included) runs in-process on top of the
//! in-memory repository and a temporary photo directory.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use axum_extra::headers::{Authorization, HeaderMapExt};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt; // For oneshot()
use users::{
    config::AuthConfig, photos::PhotoStore, repositories::InMemoryUserRepository,
    routes::create_router, service::UserService, state::AppState,
};

const BOUNDARY: &str = "users-test-boundary";

fn app() -> (Router, TempDir) {
    app_with_upload_limit(1024 * 1024)
}

fn app_with_upload_limit(max_upload_bytes: usize) -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let service = UserService::new(
        Arc::new(InMemoryUserRepository::new()),
        PhotoStore::new(dir.path().join("photos")),
    );
    let credentials = AuthConfig {
        username: "admin".to_string(),
        password: "admin".to_string(),
    };

    (
        create_router(AppState::new(service, credentials, max_upload_bytes)),
        dir,
    )
}

fn request(method: Method, uri: &str, body: Body) -> Request<Body> {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .body(body)
        .unwrap();
    request
        .headers_mut()
        .typed_insert(Authorization::basic("admin", "admin"));
    request
}

fn json_request(method: Method, uri: &str, value: &Value) -> Request<Body> {
    let mut request = request(method, uri, Body::from(value.to_string()));
    request.headers_mut().insert(
        header::CONTENT_TYPE,
        "application/json".parse().unwrap(),
    );
    request
}

fn photo_request(uri: &str, file_name: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: image/jpeg\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let mut request = request(Method::POST, uri, Body::from(body));
    request.headers_mut().insert(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}")
            .parse()
            .unwrap(),
    );
    request
}

async fn body_bytes(body: Body) -> Vec<u8> {
    body.collect().await.unwrap().to_bytes().to_vec()
}

async fn json_body(body: Body) -> Value {
    serde_json::from_slice(&body_bytes(body).await).unwrap()
}

fn testov() -> Value {
    json!({
        "lastName": "Testov",
        "firstName": "Test",
        "dateOfBirth": "1990-01-01",
        "email": "test@example.tst",
        "phoneNumber": "7987654321"
    })
}

async fn create_testov(app: &Router) -> i64 {
    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/users", &testov()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response.into_body()).await["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_create_get_delete_roundtrip() {
    let (app, _dir) = app();

    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/users", &testov()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = json_body(response.into_body()).await;
    assert_eq!(created["lastName"], "Testov");
    assert!(created["pathToPhoto"].is_null());
    let id = created["id"].as_i64().unwrap();

    let uri = format!("/api/users/{id}");
    let response = app
        .clone()
        .oneshot(request(Method::GET, &uri, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response.into_body()).await["firstName"], "Test");

    let response = app
        .clone()
        .oneshot(request(Method::DELETE, &uri, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(response.into_body()).await.is_empty());

    let response = app
        .clone()
        .oneshot(request(Method::GET, &uri, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(request(Method::DELETE, &uri, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_list_users_with_and_without_trailing_slash() {
    let (app, _dir) = app();
    create_testov(&app).await;

    for uri in ["/api/users", "/api/users/"] {
        let response = app
            .clone()
            .oneshot(request(Method::GET, uri, Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let users = json_body(response.into_body()).await;
        assert_eq!(users.as_array().unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_create_user_with_trailing_slash() {
    let (app, _dir) = app();

    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/users/", &testov()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = json_body(response.into_body()).await;
    assert_eq!(created["email"], "test@example.tst");

    let response = app
        .oneshot(request(
            Method::GET,
            &format!("/api/users/{}", created["id"]),
            Body::empty(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_duplicate_phone_is_conflict() {
    let (app, _dir) = app();
    create_testov(&app).await;

    let mut duplicate = testov();
    duplicate["email"] = json!("other@example.tst");

    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/users", &duplicate))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(request(Method::GET, "/api/users", Body::empty()))
        .await
        .unwrap();
    let users = json_body(response.into_body()).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_required_field_is_rejected() {
    let (app, _dir) = app();

    let mut incomplete = testov();
    incomplete.as_object_mut().unwrap().remove("email");

    let response = app
        .oneshot(json_request(Method::POST, "/api/users", &incomplete))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_user() {
    let (app, _dir) = app();
    let id = create_testov(&app).await;

    let patch = json!({
        "lastName": "Petrov",
        "firstName": "Petr",
        "middleName": "Petrovich",
        "dateOfBirth": "1985-05-17",
        "email": "petr@example.tst",
        "phoneNumber": "71234567890"
    });

    let response = app
        .clone()
        .oneshot(json_request(Method::PUT, &format!("/api/users/{id}"), &patch))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response.into_body()).await;
    assert_eq!(updated["id"], id);
    assert_eq!(updated["lastName"], "Petrov");
    assert_eq!(updated["middleName"], "Petrovich");

    let response = app
        .oneshot(json_request(Method::PUT, "/api/users/999", &patch))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_photo_lifecycle() {
    let (app, _dir) = app();
    let id = create_testov(&app).await;
    let uri = format!("/api/users/{id}/photo");

    let response = app
        .clone()
        .oneshot(request(Method::GET, &uri, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(photo_request(&uri, "me.png", b"\x89PNG fake image"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response.into_body()).await["message"],
        "Photo uploaded successfully"
    );

    let response = app
        .clone()
        .oneshot(request(Method::GET, &uri, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(body_bytes(response.into_body()).await, b"\x89PNG fake image");

    let response = app
        .clone()
        .oneshot(request(Method::DELETE, &uri, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(Method::GET, &uri, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(request(Method::DELETE, &uri, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_photo_upload_for_missing_user() {
    let (app, _dir) = app();

    let response = app
        .oneshot(photo_request("/api/users/42/photo", "me.jpg", b"img"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response.into_body()).await["error"], "User not found");
}

#[tokio::test]
async fn test_photo_upload_without_file_part() {
    let (app, _dir) = app();
    let id = create_testov(&app).await;

    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
    );
    let mut upload = request(
        Method::POST,
        &format!("/api/users/{id}/photo"),
        Body::from(body),
    );
    upload.headers_mut().insert(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}")
            .parse()
            .unwrap(),
    );

    let response = app.oneshot(upload).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_photo_is_rejected() {
    let (app, _dir) = app_with_upload_limit(1024);
    let id = create_testov(&app).await;

    let response = app
        .clone()
        .oneshot(photo_request(
            &format!("/api/users/{id}/photo"),
            "big.jpg",
            &[0u8; 4096],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let response = app
        .oneshot(request(
            Method::GET,
            &format!("/api/users/{id}/photo"),
            Body::empty(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_api_path_requires_credentials() {
    let (app, _dir) = app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

    let response = app
        .oneshot(request(Method::GET, "/api/nope", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_api_requires_credentials() {
    let (app, _dir) = app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/users")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

    let mut wrong = Request::builder()
        .uri("/api/users")
        .body(Body::empty())
        .unwrap();
    wrong
        .headers_mut()
        .typed_insert(Authorization::basic("admin", "wrong"));
    let response = app.clone().oneshot(wrong).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

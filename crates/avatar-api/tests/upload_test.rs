//! Avatar upload API integration tests.
//!
//! Run with: `cargo test -p avatar-api --test upload_test`

mod helpers;

use std::sync::Arc;

use avatar_api::setup::routes;
use avatar_api::AppState;
use avatar_directory::ThrottledVerifier;
use avatar_storage::S3Storage;
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use helpers::fixtures::{
    base64, create_test_gif_header, create_test_jpeg, create_test_png, is_png,
};
use helpers::{setup_test_app, setup_test_app_with, FakeDirectory, TEST_PASSWORD, TEST_USER};
use serde_json::{json, Value};

fn json_body(username: &str, password: &str, image: &[u8]) -> Value {
    json!({
        "username": username,
        "password": password,
        "image": base64(image),
    })
}

#[tokio::test]
async fn test_json_jpeg_upload_stores_png() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/upload")
        .json(&json_body(TEST_USER, TEST_PASSWORD, &create_test_jpeg()))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "Image uploaded successfully");

    let stored = app.stored_avatar(TEST_USER).await.expect("avatar stored");
    assert!(is_png(&stored));
}

#[tokio::test]
async fn test_multipart_png_upload_stored_verbatim() {
    let app = setup_test_app();
    let png = create_test_png(7);

    let form = MultipartForm::new()
        .add_text("username", TEST_USER)
        .add_text("password", TEST_PASSWORD)
        .add_part(
            "image",
            Part::bytes(png.clone())
                .file_name("me.png")
                .mime_type("image/png"),
        );

    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(&app.stored_avatar(TEST_USER).await.unwrap()[..], &png[..]);
}

#[tokio::test]
async fn test_multipart_accepts_file_field_name() {
    let app = setup_test_app();

    let form = MultipartForm::new()
        .add_text("username", TEST_USER)
        .add_text("password", TEST_PASSWORD)
        .add_part("file", Part::bytes(create_test_jpeg()).file_name("me.jpg"));

    let response = app.client().post("/upload").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_json_without_content_type_is_accepted() {
    let app = setup_test_app();
    let body = json_body(TEST_USER, TEST_PASSWORD, &create_test_png(1)).to_string();

    let response = app.client().post("/upload").text(body).await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_second_upload_replaces_first() {
    let app = setup_test_app();
    let first = create_test_png(10);
    let second = create_test_png(200);

    for (user, png) in [(TEST_USER, &first), ("Alice", &second)] {
        let response = app
            .client()
            .post("/upload")
            .json(&json_body(user, TEST_PASSWORD, png))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    assert_eq!(&app.stored_avatar(TEST_USER).await.unwrap()[..], &second[..]);
}

#[tokio::test]
async fn test_wrong_password_is_401_without_detail() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/upload")
        .json(&json_body(TEST_USER, "wrongpass", &create_test_jpeg()))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["error"], "Authentication failed");
    assert!(body.get("details").is_none());
    assert!(!response.text().contains("rc=49"));
    assert!(app.stored_avatar(TEST_USER).await.is_none());
}

#[tokio::test]
async fn test_directory_down_is_500_and_distinct_from_401() {
    let app = setup_test_app_with(FakeDirectory::unreachable(), &[]);

    let response = app
        .client()
        .post("/upload")
        .json(&json_body(TEST_USER, TEST_PASSWORD, &create_test_jpeg()))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["code"], "DIRECTORY_UNAVAILABLE");
    assert_eq!(body["recoverable"], true);
    assert!(!response.text().contains("ldap.test.invalid"));
}

#[tokio::test]
async fn test_missing_fields_are_400_before_directory() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/upload")
        .json(&json!({ "username": TEST_USER }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(app.directory.binds(), 0);
}

#[tokio::test]
async fn test_bad_request_details_shown_outside_production() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/upload")
        .json(&json_body("", TEST_PASSWORD, &create_test_png(1)))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error_type"], "BadRequest");
    assert!(body["details"].as_str().unwrap().contains("username"));
}

#[tokio::test]
async fn test_empty_image_is_400_after_auth() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/upload")
        .json(&json!({ "username": TEST_USER, "password": TEST_PASSWORD, "image": "" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(app.directory.binds(), 1);
    assert!(app.stored_avatar(TEST_USER).await.is_none());
}

#[tokio::test]
async fn test_bad_credentials_win_over_bad_image() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/upload")
        .json(&json!({ "username": TEST_USER, "password": "nope", "image": "***" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_base64_is_400() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/upload")
        .json(&json!({ "username": TEST_USER, "password": TEST_PASSWORD, "image": "not base64!" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unparseable_body_is_400() {
    let app = setup_test_app();

    let response = app.client().post("/upload").text("{not json").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(app.directory.binds(), 0);
}

#[tokio::test]
async fn test_gif_is_unsupported_format() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/upload")
        .json(&json_body(TEST_USER, TEST_PASSWORD, &create_test_gif_header()))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["code"], "UNSUPPORTED_FORMAT");
}

#[tokio::test]
async fn test_corrupt_jpeg_is_codec_error() {
    let app = setup_test_app();
    let mut jpeg = create_test_jpeg();
    jpeg.truncate(24);

    let response = app
        .client()
        .post("/upload")
        .json(&json_body(TEST_USER, TEST_PASSWORD, &jpeg))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["code"], "CODEC_ERROR");
}

#[tokio::test]
async fn test_image_over_cap_is_413() {
    let app = setup_test_app();
    // Just over the 1 MiB test cap, PNG signature so only size can reject it.
    let mut big = create_test_png(0);
    big.resize(1024 * 1024 + 1, 0);

    let form = MultipartForm::new()
        .add_text("username", TEST_USER)
        .add_text("password", TEST_PASSWORD)
        .add_part("image", Part::bytes(big).file_name("big.png"));

    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.stored_avatar(TEST_USER).await.is_none());
}

#[tokio::test]
async fn test_body_over_limit_is_413() {
    let app = setup_test_app();
    let huge = "A".repeat(4 * 1024 * 1024);

    let response = app
        .client()
        .post("/upload")
        .json(&json!({ "username": TEST_USER, "password": TEST_PASSWORD, "image": huge }))
        .await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.directory.binds(), 0);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/upload")
        .add_header("X-Request-ID", "req-123")
        .json(&json_body(TEST_USER, TEST_PASSWORD, &create_test_png(3)))
        .await;

    assert_eq!(response.header("x-request-id"), "req-123");
}

#[tokio::test]
async fn test_throttle_returns_429_after_repeated_failures() {
    let config = helpers::create_test_config(&[]);
    let directory = Arc::new(FakeDirectory::new());
    let verifier = Arc::new(ThrottledVerifier::new(directory.clone(), 2, 900));
    let storage = Arc::new(S3Storage::in_memory("test-avatars"));
    let state = Arc::new(AppState::new(&config, verifier, storage));
    let server = TestServer::new(routes::setup_routes(&config, state).unwrap()).unwrap();

    for _ in 0..2 {
        let response = server
            .post("/upload")
            .json(&json_body(TEST_USER, "wrong", &create_test_png(1)))
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    let response = server
        .post("/upload")
        .json(&json_body(TEST_USER, TEST_PASSWORD, &create_test_png(1)))
        .await;
    assert_eq!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(directory.binds(), 2);
}

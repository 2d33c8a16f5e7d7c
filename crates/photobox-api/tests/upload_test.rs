//! Upload API integration tests.
//!
//! Run with: `cargo test -p photobox-api --test upload_test`

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use helpers::fixtures::{create_oriented_jpeg, create_test_jpeg, create_test_png, dimensions};
use helpers::{files_form, setup_test_app, setup_test_app_with};
use serde_json::Value;

#[tokio::test]
async fn test_upload_stores_originals_and_thumbnails() {
    let app = setup_test_app().await;
    let png = create_test_png(32, 16);

    let response = app
        .client()
        .post("/upload")
        .multipart(files_form(vec![
            ("one.png", png.clone()),
            ("two.jpg", create_test_jpeg(20, 20)),
        ]))
        .await;

    response.assert_status_ok();
    assert_eq!(response.text(), "Files uploaded successfully");

    assert_eq!(std::fs::read(app.original("one.png")).unwrap(), png);
    assert!(app.original("two.jpg").is_file());
    assert_eq!(
        dimensions(&std::fs::read(app.thumbnail("one.png")).unwrap()),
        (32, 16)
    );
    assert!(app.thumbnail("two.jpg").is_file());
}

#[tokio::test]
async fn test_upload_corrects_exif_orientation() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/upload")
        .multipart(files_form(vec![("sideways.jpg", create_oriented_jpeg(60, 30, 6))]))
        .await;

    response.assert_status_ok();
    let thumbnail = std::fs::read(app.thumbnail("sideways.jpg")).unwrap();
    assert_eq!(dimensions(&thumbnail), (30, 60));
}

#[tokio::test]
async fn test_too_many_files_rejected_without_side_effects() {
    let app = setup_test_app().await;
    let png = create_test_png(4, 4);
    let names: Vec<String> = (0..21).map(|i| format!("img{:02}.png", i)).collect();
    let files = names.iter().map(|n| (n.as_str(), png.clone())).collect();

    let response = app.client().post("/upload").multipart(files_form(files)).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Too many files. Maximum is 20.");
    assert_eq!(body["code"], "ADMISSION_REJECTED");

    for name in &names {
        assert!(!app.original(name).exists());
    }
}

#[tokio::test]
async fn test_oversized_file_keeps_earlier_files() {
    let app = setup_test_app_with(|config| config.max_file_size_bytes = 10_000).await;

    let response = app
        .client()
        .post("/upload")
        .multipart(files_form(vec![
            ("first.png", create_test_png(8, 8)),
            ("huge.bin", vec![7u8; 20_000]),
            ("third.png", create_test_png(8, 8)),
        ]))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "File too large. Maximum size is 10000 bytes.");

    assert!(app.original("first.png").is_file());
    assert!(app.thumbnail("first.png").is_file());
    assert!(!app.original("huge.bin").exists());
    assert!(!app.original("third.png").exists());
}

#[tokio::test]
async fn test_atomic_admission_stores_nothing() {
    let app = setup_test_app_with(|config| {
        config.max_file_size_bytes = 10_000;
        config.atomic_admission = true;
    })
    .await;

    let response = app
        .client()
        .post("/upload")
        .multipart(files_form(vec![
            ("first.png", create_test_png(8, 8)),
            ("huge.bin", vec![7u8; 20_000]),
        ]))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(!app.original("first.png").exists());
}

#[tokio::test]
async fn test_traversal_name_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/upload")
        .multipart(files_form(vec![("..", create_test_png(4, 4))]))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid file name"));
}

#[tokio::test]
async fn test_client_directories_are_stripped() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/upload")
        .multipart(files_form(vec![("holiday/beach.png", create_test_png(4, 4))]))
        .await;

    response.assert_status_ok();
    assert!(app.original("beach.png").is_file());
    assert!(!app.originals_dir().join("holiday").exists());
}

#[tokio::test]
async fn test_corrupt_image_is_server_error() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/upload")
        .multipart(files_form(vec![
            ("good.png", create_test_png(4, 4)),
            ("broken.jpg", b"this is not a jpeg".to_vec()),
            ("later.png", create_test_png(4, 4)),
        ]))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["code"], "DECODE_FAILED");
    assert!(body["error"].as_str().unwrap().starts_with("Failed to open image"));

    assert!(app.thumbnail("good.png").is_file());
    assert!(app.original("broken.jpg").is_file());
    assert!(!app.thumbnail("broken.jpg").exists());
    assert!(!app.original("later.png").exists());
}

#[tokio::test]
async fn test_same_name_overwrites() {
    let app = setup_test_app().await;
    let second = create_test_png(10, 10);

    for data in [create_test_png(4, 4), second.clone()] {
        app.client()
            .post("/upload")
            .multipart(files_form(vec![("same.png", data)]))
            .await
            .assert_status_ok();
    }

    assert_eq!(std::fs::read(app.original("same.png")).unwrap(), second);
    assert_eq!(
        dimensions(&std::fs::read(app.thumbnail("same.png")).unwrap()),
        (10, 10)
    );
}

#[tokio::test]
async fn test_batch_without_files_succeeds() {
    let app = setup_test_app().await;
    let form = MultipartForm::new().add_text("note", "no files here");

    let response = app.client().post("/upload").multipart(form).await;

    response.assert_status_ok();
    assert_eq!(std::fs::read_dir(app.originals_dir()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_empty_file_input_is_ignored() {
    let app = setup_test_app().await;
    let part = Part::bytes(bytes::Bytes::new())
        .file_name("")
        .mime_type("application/octet-stream");
    let form = MultipartForm::new().add_part("files", part);

    let response = app.client().post("/upload").multipart(form).await;

    response.assert_status_ok();
    assert_eq!(response.text(), "Files uploaded successfully");
    assert_eq!(std::fs::read_dir(app.originals_dir()).unwrap().count(), 1);
    assert_eq!(std::fs::read_dir(app.thumbnails_dir()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_non_multipart_body_rejected() {
    let app = setup_test_app().await;

    let response = app.client().post("/upload").text("not a form").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "BAD_REQUEST");
}

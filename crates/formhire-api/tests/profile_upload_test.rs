mod common;

use axum::body::Body;
use axum::extract::Multipart;
use axum::http::{Method, Request, StatusCode, header};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use common::{APPLICANT, TestApp};
use formhire_api::MediaHostConfig;

const BOUNDARY: &str = "formhire-test-boundary";

fn multipart_request(token: Option<&str>, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"cv.pdf\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/upload/resume")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

/// Stand-in for the media host: echoes the folder it was given.
async fn fake_media_host() -> String {
    async fn upload(mut multipart: Multipart) -> Json<Value> {
        let mut folder = String::new();
        let mut size = 0;
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("folder") => folder = field.text().await.unwrap(),
                Some("file") => size = field.bytes().await.unwrap().len(),
                _ => {}
            }
        }
        Json(json!({
            "secure_url": format!("https://cdn.test/{}/cv.pdf", folder),
            "public_id": format!("{}/cv-{}", folder, size),
        }))
    }

    let app = Router::new().route("/{cloud}/raw/upload", post(upload));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn profile_fetch_creates_user_and_welcomes_once() {
    let app = TestApp::new();
    let token = app.token(APPLICANT);

    let (status, body) = app.get("/api/user/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], APPLICANT);
    assert_eq!(body["user"]["name"], "Test User");

    let (status, _) = app.get("/api/user/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let emails = app.wait_for_emails(1).await;
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].subject, "Welcome to FormHire!");

    let (status, _) = app.get("/api/user/profile", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_update_merges_fields() {
    let app = TestApp::new();
    let token = app.token(APPLICANT);
    app.get("/api/user/profile", Some(&token)).await;

    let (status, body) = app
        .request(
            Method::PUT,
            "/api/user/profile",
            Some(&token),
            Some(json!({ "bio": "  Rustacean ", "github": "ada" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["bio"], "Rustacean");
    assert_eq!(body["user"]["github"], "ada");
    assert_eq!(body["user"]["name"], "Test User");

    let (_, body) = app
        .request(
            Method::PUT,
            "/api/user/profile",
            Some(&token),
            Some(json!({ "github": "" })),
        )
        .await;
    assert!(body["user"]["github"].is_null());
    assert_eq!(body["user"]["bio"], "Rustacean");

    let (status, body) = app
        .request(Method::PUT, "/api/user/profile", Some(&token), Some(json!({ "name": " " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name cannot be empty");
}

#[tokio::test]
async fn upload_requires_authentication() {
    let app = TestApp::new();
    let (status, _) = app
        .send(multipart_request(None, "application/pdf", b"%PDF-1.4"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn upload_rejects_other_file_types() {
    let app = TestApp::new();
    let token = app.token(APPLICANT);
    let (status, body) = app
        .send(multipart_request(Some(&token), "image/png", b"\x89PNG"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid file type"));
}

#[tokio::test]
async fn upload_rejects_files_over_five_megabytes() {
    let app = TestApp::new();
    let token = app.token(APPLICANT);
    let data = vec![b'x'; 5 * 1024 * 1024 + 1];
    let (status, body) = app
        .send(multipart_request(Some(&token), "application/pdf", &data))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "File size must be less than 5MB");
}

#[tokio::test]
async fn upload_without_media_host_is_a_500() {
    let app = TestApp::new();
    let token = app.token(APPLICANT);
    let (status, body) = app
        .send(multipart_request(Some(&token), "application/pdf", b"%PDF-1.4"))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "File host not configured");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn error_details_follow_each_routers_config() {
    let quiet = TestApp::new();
    let verbose = TestApp::exposing_errors();

    for (app, exposed) in [(&verbose, true), (&quiet, false)] {
        let token = app.token(APPLICANT);
        let (status, body) = app
            .send(multipart_request(Some(&token), "application/pdf", b"%PDF-1.4"))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "File host not configured");
        if exposed {
            assert_eq!(body["details"], "CLOUDINARY_CLOUD_NAME is not set");
        } else {
            assert!(body.get("details").is_none());
        }
    }

    // Client errors never carry details
    let token = verbose.token(APPLICANT);
    let (status, body) = verbose
        .send(multipart_request(Some(&token), "image/png", b"\x89PNG"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn upload_is_forwarded_to_media_host() {
    let api_base = fake_media_host().await;
    let app = TestApp::with_media(MediaHostConfig {
        api_base,
        cloud_name: Some("demo".into()),
        upload_preset: Some("resumes_unsigned".into()),
        folder: "resumes".into(),
    });
    let token = app.token(APPLICANT);

    let (status, body) = app
        .send(multipart_request(Some(&token), "application/pdf", b"%PDF-1.4"))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["secure_url"], "https://cdn.test/resumes/cv.pdf");
    assert_eq!(body["public_id"], "resumes/cv-8");
    assert_eq!(body["message"], "File uploaded successfully");
}

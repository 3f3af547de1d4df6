mod common;

use axum::http::{Method, StatusCode};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;

use common::{ADMIN, APPLICANT, SECRET, TestApp, job_body};
use formhire_api::middleware::Claims;
use formhire_types::models::Role;

#[tokio::test]
async fn admin_routes_require_a_token() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/admin/verify", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication required");

    let (status, _) = app.get("/api/admin/jobs", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_admin_is_forbidden() {
    let app = TestApp::new();
    let token = app.token(APPLICANT);

    let (status, body) = app
        .request(Method::POST, "/api/admin/jobs", Some(&token), Some(job_body("Nope")))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access required");
    assert!(app.state.db.get_admin_by_email(APPLICANT).unwrap().is_none());
}

#[tokio::test]
async fn admin_role_claim_alone_is_not_trusted() {
    let app = TestApp::new();
    let forged = Claims {
        sub: APPLICANT.into(),
        email: APPLICANT.into(),
        name: None,
        image: None,
        role: Role::Admin,
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &forged,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let (status, _) = app.get("/api/admin/dashboard", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn allow_listed_admin_is_created_on_first_request() {
    let app = TestApp::new();
    let token = app.token("HR@FormHire.test");

    let (status, body) = app.get("/api/admin/verify", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["admin"]["email"], ADMIN);
    assert_eq!(body["admin"]["isActive"], true);

    let (status, again) = app.get("/api/admin/verify", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["admin"]["id"], body["admin"]["id"]);
}

#[tokio::test]
async fn deactivated_admin_is_forbidden() {
    let app = TestApp::new();
    let token = app.token(ADMIN);

    let (status, _) = app.get("/api/admin/verify", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.state.db.set_admin_active(ADMIN, false).unwrap());

    let (status, body) = app.get("/api/admin/verify", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin account is deactivated");

    let (status, _) = app
        .request(Method::POST, "/api/admin/jobs", Some(&token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

//! Shared helpers for router-level tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use formhire_api::{AdminAllowList, AppConfig, AppState, AppStateInner, MediaHostConfig};
use formhire_db::Database;
use formhire_mailer::{EmailSender, MailError, Notifier, OutgoingEmail};

pub const SECRET: &str = "test-secret";
pub const ADMIN: &str = "hr@formhire.test";
pub const APPLICANT: &str = "ada@example.com";

/// Records every email instead of sending it.
#[derive(Default, Clone)]
pub struct MockEmailSender {
    pub sent: Arc<Mutex<Vec<OutgoingEmail>>>,
}

impl MockEmailSender {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

impl EmailSender for MockEmailSender {
    fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Fails every send, like an unreachable SMTP relay.
pub struct FailingEmailSender;

impl EmailSender for FailingEmailSender {
    fn send(&self, _email: &OutgoingEmail) -> Result<(), MailError> {
        Err(MailError::Transport("connection refused".into()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub mail: MockEmailSender,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(None, |_| {})
    }

    pub fn with_media(media: MediaHostConfig) -> Self {
        Self::build(None, |config| config.media = media)
    }

    pub fn with_failing_mail() -> Self {
        Self::build(Some(Arc::new(FailingEmailSender)), |_| {})
    }

    /// 500 bodies carry the internal message under `details`.
    pub fn exposing_errors() -> Self {
        Self::build(None, |config| config.expose_errors = true)
    }

    fn build(sender: Option<Arc<dyn EmailSender>>, configure: impl FnOnce(&mut AppConfig)) -> Self {
        let mail = MockEmailSender::default();
        let sender = sender.unwrap_or_else(|| Arc::new(mail.clone()));
        let (notifier, _worker) = Notifier::spawn(sender, "http://localhost:3000".into());

        let mut config = AppConfig {
            jwt_secret: SECRET.into(),
            admins: AdminAllowList::parse(ADMIN),
            public_url: "http://localhost:3000".into(),
            expose_errors: false,
            media: MediaHostConfig::default(),
        };
        configure(&mut config);

        let state: AppState = Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            config,
            notifier,
            http: reqwest::Client::new(),
        });

        Self {
            router: formhire_api::create_router(state.clone()),
            state,
            mail,
        }
    }

    pub fn token(&self, email: &str) -> String {
        formhire_api::issue_token(
            SECRET,
            &self.state.config.admins,
            email,
            Some("Test User"),
            chrono::Duration::hours(1),
        )
        .unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    /// Create a job as the allow-listed admin and return its JSON.
    pub async fn create_job(&self, body: Value) -> Value {
        let token = self.token(ADMIN);
        let (status, body) = self
            .request(Method::POST, "/api/admin/jobs", Some(&token), Some(body))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["job"].clone()
    }

    /// Wait until at least `count` emails were recorded.
    pub async fn wait_for_emails(&self, count: usize) -> Vec<OutgoingEmail> {
        for _ in 0..200 {
            let sent = self.mail.sent();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.mail.sent()
    }
}

pub fn job_body(title: &str) -> Value {
    json!({
        "title": title,
        "description": "Build and run the hiring pipeline",
        "requirements": "3+ years of backend work",
        "department": "Engineering",
        "location": "Remote",
        "skills": ["Rust", "SQL"],
        "resumeRequired": false,
    })
}

pub fn application_body(job_id: &str) -> Value {
    json!({
        "jobId": job_id,
        "phoneNumber": "+1 555 0100",
        "whyInterested": "The product",
        "relevantExperience": "Five years",
        "workAuthorization": "Citizen",
    })
}

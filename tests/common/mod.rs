#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use quizbit_backend::{
    config::{BlockedVerifyResponse, Config},
    database::memory::MemoryStore,
    error::{Error, Result},
    routes::build_router,
    services::mail_service::{MailMessage, Mailer},
    utils::otp::CodeGenerator,
    AppState, Backends,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<MailMessage>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, email: &str) -> usize {
        self.sent().iter().filter(|m| m.to == email).count()
    }

    pub fn fail_deliveries(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Internal("relay unavailable".into()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Hands out whatever code the test pinned last.
pub struct PinnedCode(AtomicI32);

impl PinnedCode {
    pub fn set(&self, code: i32) {
        self.0.store(code, Ordering::SeqCst);
    }
}

impl CodeGenerator for PinnedCode {
    fn generate(&self) -> i32 {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub codes: Arc<PinnedCode>,
}

pub fn test_config() -> Config {
    Config {
        server_address: "127.0.0.1:0".into(),
        database_url: "postgres://unused".into(),
        database_max_connections: 1,
        jwt_secret: "test_secret_key".into(),
        access_token_ttl_minutes: 5,
        refresh_token_ttl_hours: 24,
        mail_relay_url: None,
        mail_from: "no-reply@quizbit.test".into(),
        auth_rps: 1000,
        cors_allowed_origins: Vec::new(),
        blocked_verify_response: BlockedVerifyResponse::Blocked,
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(test_config())
}

pub fn spawn_app_with(config: Config) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let mailer = Arc::new(RecordingMailer::default());
    let codes = Arc::new(PinnedCode(AtomicI32::new(1234)));
    let backends = Backends {
        users: store.clone(),
        questions: store.clone(),
        submissions: store.clone(),
        mailer: mailer.clone(),
        codes: codes.clone(),
    };
    let state = AppState::new(&config, backends);
    let router = build_router(state, config.auth_rps, &config.cors_allowed_origins);
    TestApp {
        router,
        store,
        mailer,
        codes,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<JsonValue>,
        bearer: Option<&str>,
    ) -> (StatusCode, JsonValue) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| JsonValue::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, JsonValue) {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: JsonValue) -> (StatusCode, JsonValue) {
        self.request(Method::POST, uri, Some(body), None).await
    }

    pub async fn register(&self, email: &str, password: &str) -> (StatusCode, JsonValue) {
        self.post(
            "/api/register/",
            json!({ "email": email, "password": password, "name": "Test User" }),
        )
        .await
    }

    pub async fn verify(&self, email: &str, otp: i32) -> (StatusCode, JsonValue) {
        self.post("/api/verify-otp/", json!({ "email": email, "otp": otp }))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, JsonValue) {
        self.post("/api/login/", json!({ "email": email, "password": password }))
            .await
    }

    /// Registers, verifies and logs in; returns the access token.
    pub async fn active_user(&self, email: &str, password: &str, code: i32) -> String {
        self.codes.set(code);
        let (status, _) = self.register(email, password).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = self.verify(email, code).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = self.login(email, password).await;
        assert_eq!(status, StatusCode::OK);
        body["token"]["access"].as_str().unwrap().to_string()
    }
}

//! Common test utilities and fixtures for integration tests
//!
//! - [`TestApp`]: the full router over in-memory stores
//! - [`MutableClock`]: a clock tests move forward explicitly
//! - [`FailingLlm`]: a language model that always errors
//! - request builders and body parsing

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, Response, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, Local, Utc};
use mockable::Clock;
use serde_json::{json, Value};
use tower::ServiceExt;

use chatai_app::{build_router, AppDependencies};
use chatai_auth::AuthConfig;
use chatai_chat::{ChatRepositories, InMemoryMessageStore, InMemoryThreadStore};
use chatai_llm::{LlmError, LlmMessage, LlmService, MockLlmService};
use chatai_users::InMemoryUserStore;

pub const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_only";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Clock whose time only changes through [`MutableClock::advance`]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: Duration) {
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Language model double that always fails, counting calls
#[derive(Default)]
pub struct FailingLlm {
    pub calls: Mutex<usize>,
}

#[async_trait]
impl LlmService for FailingLlm {
    async fn generate(&self, _messages: &[LlmMessage]) -> Result<String, LlmError> {
        *self.calls.lock().unwrap() += 1;
        Err(LlmError::Response(
            "OpenAI API returned 500 Internal Server Error".to_string(),
        ))
    }

    fn model(&self) -> &str {
        "failing"
    }
}

/// Full application over in-memory stores
pub struct TestApp {
    router: Router,
    pub clock: Arc<MutableClock>,
    pub threads: Arc<InMemoryThreadStore>,
    pub messages: Arc<InMemoryMessageStore>,
    pub auth_config: AuthConfig,
}

impl TestApp {
    /// App answering with the deterministic mock model
    pub fn new() -> Self {
        Self::with_llm(Arc::new(MockLlmService::new()))
    }

    pub fn with_llm(llm: Arc<dyn LlmService>) -> Self {
        // Tokens are validated against wall-clock time, so start there
        let clock = Arc::new(MutableClock::new(Utc::now()));
        let threads = Arc::new(InMemoryThreadStore::new());
        let messages = Arc::new(InMemoryMessageStore::new());
        let auth_config = AuthConfig {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            issuer: Some("chatai-test".to_string()),
            token_ttl_minutes: 60,
        };

        let router = build_router(AppDependencies {
            users: Arc::new(InMemoryUserStore::new()),
            chat_repos: ChatRepositories {
                threads: threads.clone(),
                messages: messages.clone(),
            },
            llm,
            clock: clock.clone(),
            auth_config: auth_config.clone(),
            thread_timeout_minutes: 30,
        });

        Self {
            router,
            clock,
            threads,
            messages,
            auth_config,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Register `email` through the API, asserting success
    pub async fn sign_up(&self, email: &str) -> Value {
        let response = self
            .send(json_request(
                Method::POST,
                "/api/v1/auth/sign-up",
                json!({"email": email, "password": TEST_PASSWORD, "name": "Test User"}),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED, "sign-up of {} failed", email);
        parse_body(response).await
    }

    /// Sign in `email` and return the access token
    pub async fn sign_in(&self, email: &str) -> String {
        let response = self
            .send(json_request(
                Method::POST,
                "/api/v1/auth/sign-in",
                json!({"email": email, "password": TEST_PASSWORD}),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK, "sign-in of {} failed", email);
        let body = parse_body(response).await;
        body["accessToken"].as_str().unwrap().to_string()
    }

    /// POST a chat message and return the raw response
    pub async fn chat(&self, email: &str, question: &str) -> Response<Body> {
        self.send(json_request(
            Method::POST,
            "/api/v1/chat/message",
            json!({"userEmail": email, "question": question}),
        ))
        .await
    }

    pub fn thread_count(&self) -> usize {
        self.threads.len().unwrap()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len().unwrap()
    }
}

/// Helper: build a JSON request
pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Helper: build a bodiless request with an optional bearer token
pub fn get_request(uri: &str, jwt: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = jwt {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// Helper: parse response body as JSON Value
pub async fn parse_body(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

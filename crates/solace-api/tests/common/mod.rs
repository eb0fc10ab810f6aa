#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use solace_ai::mock::ScriptedModel;
use solace_ai::retry::Backoff;
use solace_api::moderation::{FailMode, ModerationPolicy};
use solace_api::pending::PendingSubmissions;
use solace_api::storage::MediaStore;
use solace_api::{AppState, AppStateInner};
use solace_db::Database;

pub const SAFE: &str = r#"{"category": "safe", "reason": "general sharing"}"#;
pub const URGENT: &str = r#"{"category": "urgent_risk", "reason": "expresses intent to self-harm"}"#;
pub const HARMFUL: &str = r#"{"category": "harmful_instruction", "reason": "asks for methods"}"#;
pub const SUPPORT: &str = r#"{"category": "support_needed", "reason": "feeling very low"}"#;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub model: Arc<ScriptedModel>,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_fail_mode(FailMode::Open).await
    }

    pub async fn with_fail_mode(fail_mode: FailMode) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.db")).unwrap();
        let media = MediaStore::new(dir.path().join("media")).await.unwrap();
        let model = Arc::new(ScriptedModel::new());

        let state: AppState = Arc::new(AppStateInner {
            db,
            jwt_secret: "integration-test-secret".into(),
            model: model.clone(),
            media,
            pending: PendingSubmissions::new(Duration::from_secs(60)),
            moderation: ModerationPolicy { fail_mode },
            chat_backoff: Backoff {
                max_attempts: 3,
                initial_delay: Duration::from_millis(1),
            },
        });

        Self {
            app: solace_api::router(state.clone()),
            state,
            model,
            _dir: dir,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, body)
    }

    pub async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(req).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn upload(&self, token: &str, content_type: &str, bytes: &[u8]) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/media")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(bytes.to_vec()))
            .unwrap();
        self.send(req).await
    }

    /// Register a user and return their bearer token.
    pub async fn register(&self, username: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({ "username": username, "password": "correct-horse-battery" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    pub fn post_count(&self) -> usize {
        self.state.db.list_posts(u32::MAX, None).unwrap().len()
    }

    pub fn comment_count(&self, post_id: &str) -> usize {
        self.state.db.list_comments(post_id).unwrap().len()
    }
}

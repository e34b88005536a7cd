//! Shared harness for the router tests
//!
//! Builds the full router over a `MemoryStore` seeded with one admin and one
//! learner, and drives it with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use lms_api::{
    app::{build_router, AppState},
    config::Config,
};
use lms_shared::auth::password::hash_password;
use lms_shared::models::user::{CreateUser, Role, User};
use lms_shared::store::{MemoryStore, UserStore};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const LEARNER_PASSWORD: &str = "learner-password";

pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub admin: User,
    pub learner: User,
    pub admin_token: String,
    pub learner_token: String,
}

fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://localhost/lms_test".to_string()),
        "JWT_SECRET" => Some(JWT_SECRET.to_string()),
        "JWT_EXPIRY" => Some("1h".to_string()),
        _ => None,
    })
    .expect("test config")
}

async fn seed_user(store: &MemoryStore, email: &str, role: Role, password_hash: String) -> User {
    store
        .create_user(CreateUser {
            first_name: "Test".to_string(),
            last_name: role.as_str().to_string(),
            email: email.to_string(),
            password_hash,
            phone: "555-0100".to_string(),
            role,
            photo: None,
        })
        .await
        .expect("seed user")
}

impl TestContext {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());

        // Only the learner logs in, so only the learner pays for a real hash
        let admin = seed_user(&store, "admin@example.com", Role::Admin, "unused".to_string()).await;
        let learner = seed_user(
            &store,
            "learner@example.com",
            Role::User,
            hash_password(LEARNER_PASSWORD).expect("hash"),
        )
        .await;

        let state = AppState::new(store.clone(), test_config());
        let admin_token = state.auth.issue_token(admin.id, &admin.email).expect("admin token");
        let learner_token = state.auth.issue_token(learner.id, &learner.email).expect("learner token");

        Self {
            app: build_router(state),
            store,
            admin,
            learner,
            admin_token,
            learner_token,
        }
    }

    /// Sends one request and returns the status with the parsed JSON body
    /// (`Value::Null` for an empty body)
    pub async fn request(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).expect("request")).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("PUT", uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("DELETE", uri, token, None).await
    }

    /// Creates a course through the API and returns its id
    pub async fn create_course(&self, title: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/course",
                None,
                serde_json::json!({ "title": title, "description": "A course" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create course: {}", body);
        body["data"]["id"].as_str().expect("course id").to_string()
    }

    /// Creates a module, chapter or section under `parent` and returns its id
    pub async fn create_child(&self, kind: &str, parent: &str, title: &str) -> String {
        let (status, body) = self
            .post(
                &format!("/api/v1/course/{}", kind),
                None,
                serde_json::json!({ "title": title, "description": "Part", "id": parent }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create {}: {}", kind, body);
        body["data"]["id"].as_str().expect("child id").to_string()
    }
}

//! Shared helpers: an in-process server over the in-memory backend.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use notesbe_api::{router, AppState, RateLimitConfig, TokenIssuer};
use notesbe_core::{AccessResolver, MemoryStore};
use serde_json::{json, Value};

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub store: MemoryStore,
}

/// Spawn the router on an ephemeral port.
pub async fn spawn_server(rate_limit: RateLimitConfig) -> TestServer {
    let store = MemoryStore::new();
    let access = AccessResolver::new(Arc::new(store.clone()), Arc::new(store.clone()));
    let state = AppState::new(
        Arc::new(store.clone()),
        access,
        TokenIssuer::new(TEST_SECRET, Duration::from_secs(7200)),
        &rate_limit,
    )
    .unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
        store,
    }
}

pub async fn spawn_default_server() -> TestServer {
    spawn_server(RateLimitConfig::disabled()).await
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn signup(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/auth/signup"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap()
    }

    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap()
    }

    /// Sign up and log in; returns `(user_id, token)`.
    pub async fn register(&self, username: &str, password: &str) -> (i64, String) {
        assert_eq!(self.signup(username, password).await.status(), 201);
        let body: Value = self.login(username, password).await.json().await.unwrap();
        (
            body["user_id"].as_i64().unwrap(),
            body["token"].as_str().unwrap().to_string(),
        )
    }

    pub async fn create_note(&self, token: &str, body: &str) -> Value {
        let resp = self
            .client
            .post(self.url("/api/notes"))
            .bearer_auth(token)
            .json(&json!({ "body": body }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        resp.json().await.unwrap()
    }

    pub async fn share(&self, token: &str, note_id: i64, receiver_id: i64) -> reqwest::Response {
        self.client
            .post(self.url(&format!("/api/notes/{}/share", note_id)))
            .bearer_auth(token)
            .json(&json!({ "receiver_id": receiver_id }))
            .send()
            .await
            .unwrap()
    }

    pub async fn get(&self, token: &str, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }
}

/// Note ids from a JSON array response.
pub fn note_ids(value: &Value) -> Vec<i64> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_i64().unwrap())
        .collect()
}

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use hotel_ops::api::rest::router::create_router;
use hotel_ops::application::services::accounts::create_account;
use hotel_ops::application::services::notifications::{Notification, Notifier};
use hotel_ops::domain::models::user::Role;
use hotel_ops::infrastructure::config::Config;
use hotel_ops::infrastructure::data::db_context::surrealdb_context::{Db, init_memory_db};
use hotel_ops::state::AppState;

pub const PASSWORD: &str = "correct-horse-battery";

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) -> bool {
        self.sent.lock().unwrap().push(notification);
        true
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: Db,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn test_config() -> Config {
    let vars = HashMap::from([
        ("JWT_SECRET", "integration-test-secret"),
        ("JWT_EXPIRATION_MINUTES", "30"),
    ]);
    Config::from_lookup(|key| vars.get(key).map(|value| value.to_string()))
        .expect("test config should load")
}

impl TestApp {
    /// Fresh in-memory database with one account per role.
    pub async fn spawn() -> Self {
        let db = init_memory_db().await.expect("in-memory database");
        for (username, role) in [
            ("admin", Role::Admin),
            ("housekeeper", Role::Housekeeper),
            ("storekeeper", Role::StoreManager),
        ] {
            create_account(&db, username, PASSWORD, role)
                .await
                .expect("seed account");
        }

        let notifier = Arc::new(RecordingNotifier::default());
        let state = AppState::new(db.clone(), test_config(), notifier.clone());

        Self {
            router: create_router(state),
            db,
            notifier,
        }
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
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request should build");

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should be readable")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn login(&self, username: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/login",
                None,
                Some(json!({ "username": username, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }
}

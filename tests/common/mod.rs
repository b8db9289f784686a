//! Common test helpers for integration tests.
//!
//! The `#![allow(dead_code)]` attribute is needed because every integration
//! test file compiles this module as part of its own crate.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use task_service::api::{AppState, create_router};
use task_service::domain::{Task, TaskFields, TaskId};
use task_service::infrastructure::{
    InMemoryTaskRepository, RepositoryError, RepositoryFuture, TaskRepository,
};

/// Request body used by most scenarios.
pub const TASK_BODY: &str = r#"{"name":"A","status":"Pending","description":"d","timeEstimate":1,"dueDate":"2024-01-01","isComplete":false}"#;

/// Creates an `AppState` over a fresh in-memory store.
pub fn create_test_app_state() -> AppState {
    AppState::new(Arc::new(InMemoryTaskRepository::new()))
}

/// Creates the full router over a fresh in-memory store.
pub fn create_test_app() -> Router {
    create_router(create_test_app_state())
}

/// Repository whose backing store is unreachable: every call fails.
pub struct UnavailableRepository;

fn unavailable<T: Send + 'static>() -> RepositoryFuture<T> {
    Box::pin(async {
        Err(RepositoryError::Unavailable(
            "connection refused by mongodb://user:secret@db".to_string(),
        ))
    })
}

impl TaskRepository for UnavailableRepository {
    fn check_id(&self, _id: &TaskId) -> Result<(), RepositoryError> {
        Ok(())
    }

    fn list_all(&self) -> RepositoryFuture<Vec<Task>> {
        unavailable()
    }

    fn find_by_id(&self, _id: &TaskId) -> RepositoryFuture<Option<Task>> {
        unavailable()
    }

    fn create(&self, _fields: TaskFields) -> RepositoryFuture<Task> {
        unavailable()
    }

    fn update(&self, _id: &TaskId, _fields: TaskFields) -> RepositoryFuture<Option<Task>> {
        unavailable()
    }

    fn toggle_complete(&self, _id: &TaskId) -> RepositoryFuture<Option<Task>> {
        unavailable()
    }

    fn delete(&self, _id: &TaskId) -> RepositoryFuture<bool> {
        unavailable()
    }

    fn ping(&self) -> RepositoryFuture<()> {
        unavailable()
    }
}

/// Creates the full router over a store that cannot be reached.
pub fn create_unavailable_app() -> Router {
    create_router(AppState::new(Arc::new(UnavailableRepository)))
}

/// Response captured by [`send`].
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Decodes the body as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    /// Returns the body as UTF-8 text.
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("response body is not UTF-8")
    }
}

/// Sends one request through the router.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder
        .body(body.map_or_else(Body::empty, |text| Body::from(text.to_string())))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();

    TestResponse {
        status,
        headers,
        body,
    }
}

/// Creates a task with the given name and returns its id.
pub async fn create_named_task(app: &Router, name: &str) -> String {
    let body = serde_json::json!({
        "name": name,
        "status": "Pending",
        "description": "d",
        "timeEstimate": 1,
        "dueDate": "2024-01-01",
        "isComplete": false
    })
    .to_string();

    let response = send(app, Method::POST, "/tasks", Some(&body)).await;
    assert_eq!(response.status, StatusCode::CREATED);
    response.json()["id"].as_str().unwrap().to_string()
}

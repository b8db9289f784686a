//! HTTP handlers for the Task Management API.
//!
//! Each handler makes exactly one task store call, bounded by the configured
//! deadline, and converts the outcome into a status code and JSON body.
//!
//! # Endpoints
//!
//! - `GET /tasks` - List every task
//! - `GET /tasks/{id}` - Fetch one task
//! - `POST /tasks` - Create a task
//! - `PUT /tasks/{id}` - Replace every field of a task
//! - `PUT /tasks/complete/{id}` - Flip a task's completion flag
//! - `DELETE /tasks/{id}` - Delete a task
//! - `GET /health` - Check that the task store answers

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};

use super::dto::{HealthResponse, MessageResponse, TaskRequest, TaskResponse};
use super::error::ApiErrorResponse;
use crate::config::DEFAULT_STORE_TIMEOUT;
use crate::domain::{TaskFields, TaskId};
use crate::infrastructure::{RepositoryFuture, TaskRepository, with_deadline};

// =============================================================================
// Application Configuration
// =============================================================================

/// Application configuration for request handling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// Deadline applied to each store call.
    pub store_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
///
/// The repository is a trait object so the backend can be chosen at runtime
/// by `RepositoryFactory`. It is built once at startup and handed to the
/// router with `Router::with_state`.
#[derive(Clone)]
pub struct AppState {
    /// Task repository for persistence.
    pub task_repository: Arc<dyn TaskRepository>,
    /// Application configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Creates a new `AppState` with default configuration.
    #[must_use]
    pub fn new(task_repository: Arc<dyn TaskRepository>) -> Self {
        Self {
            task_repository,
            config: AppConfig::default(),
        }
    }

    /// Creates a new `AppState` with custom configuration.
    #[must_use]
    pub fn with_config(task_repository: Arc<dyn TaskRepository>, config: AppConfig) -> Self {
        Self {
            task_repository,
            config,
        }
    }

    /// Awaits a store call under the configured deadline.
    pub(crate) async fn run<T>(&self, operation: RepositoryFuture<T>) -> Result<T, ApiErrorResponse> {
        with_deadline(self.config.store_timeout, operation)
            .await
            .map_err(ApiErrorResponse::from)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AppState")
            .field("task_repository", &"Arc<dyn TaskRepository>")
            .field("config", &self.config)
            .finish()
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn decode_body(
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> Result<TaskFields, ApiErrorResponse> {
    let Json(request) = payload?;
    Ok(TaskFields::from(request))
}

fn path_id(path: Result<Path<String>, PathRejection>) -> Result<TaskId, ApiErrorResponse> {
    let Path(id) = path?;
    Ok(TaskId::from(id))
}

fn task_not_found() -> ApiErrorResponse {
    ApiErrorResponse::not_found("task not found")
}

// =============================================================================
// GET /tasks
// =============================================================================

/// Lists every task.
///
/// # Response
///
/// - **200 OK**: JSON array of tasks (possibly empty)
/// - **500 Internal Server Error**: Store failure
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] if the store call fails or times out.
pub async fn list_tasks(
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskResponse>>, ApiErrorResponse> {
    let tasks = state.run(state.task_repository.list_all()).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

// =============================================================================
// GET /tasks/{id}
// =============================================================================

/// Fetches a single task.
///
/// # Response
///
/// - **200 OK**: The task
/// - **400 Bad Request**: Malformed id
/// - **404 Not Found**: No task with this id
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for the cases above and for store failures.
pub async fn get_task(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let id = path_id(path)?;
    let task = state
        .run(state.task_repository.find_by_id(&id))
        .await?
        .ok_or_else(task_not_found)?;

    Ok(Json(TaskResponse::from(task)))
}

// =============================================================================
// POST /tasks
// =============================================================================

/// Creates a new task.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "A",
///   "status": "Pending",
///   "description": "d",
///   "timeEstimate": 1,
///   "dueDate": "2024-01-01",
///   "isComplete": false
/// }
/// ```
///
/// # Response
///
/// - **201 Created**: Task created, body includes the assigned `id`
/// - **400 Bad Request**: Body does not decode
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for an undecodable body or a store failure.
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiErrorResponse> {
    let fields = decode_body(payload)?;
    let task = state.run(state.task_repository.create(fields)).await?;

    tracing::debug!(task_id = %task.id, "Task created");
    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

// =============================================================================
// PUT /tasks/{id}
// =============================================================================

/// Replaces every field of an existing task except its id.
///
/// The id is checked before the body, so a request with both a malformed id
/// and a malformed body reports the id.
///
/// # Response
///
/// - **200 OK**: The updated task
/// - **400 Bad Request**: Malformed id or body
/// - **404 Not Found**: No task with this id (nothing is created)
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for the cases above and for store failures.
pub async fn update_task(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let id = path_id(path)?;
    state
        .task_repository
        .check_id(&id)
        .map_err(ApiErrorResponse::from)?;
    let fields = decode_body(payload)?;

    let task = state
        .run(state.task_repository.update(&id, fields))
        .await?
        .ok_or_else(task_not_found)?;

    tracing::debug!(task_id = %task.id, "Task updated");
    Ok(Json(TaskResponse::from(task)))
}

// =============================================================================
// PUT /tasks/complete/{id}
// =============================================================================

/// Flips the completion flag of a task.
///
/// # Response
///
/// - **200 OK**: The task with its flag flipped
/// - **400 Bad Request**: Malformed id
/// - **404 Not Found**: No task with this id
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for the cases above and for store failures.
pub async fn toggle_complete(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let id = path_id(path)?;
    let task = state
        .run(state.task_repository.toggle_complete(&id))
        .await?
        .ok_or_else(task_not_found)?;

    tracing::debug!(task_id = %task.id, is_complete = task.is_complete(), "Task toggled");
    Ok(Json(TaskResponse::from(task)))
}

// =============================================================================
// DELETE /tasks/{id}
// =============================================================================

/// Deletes a task.
///
/// # Response
///
/// - **200 OK**: `{"message": "task deleted successfully"}`
/// - **400 Bad Request**: Malformed id
/// - **404 Not Found**: No task with this id
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for the cases above and for store failures.
pub async fn delete_task(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiErrorResponse> {
    let id = path_id(path)?;
    let deleted = state.run(state.task_repository.delete(&id)).await?;
    if !deleted {
        return Err(task_not_found());
    }

    tracing::debug!(task_id = %id, "Task deleted");
    Ok(Json(MessageResponse::new("task deleted successfully")))
}

// =============================================================================
// GET /health
// =============================================================================

/// Health check endpoint.
///
/// Pings the task store so a broken database shows up here rather than on
/// the first real request.
///
/// # Response
///
/// - **200 OK**: Store answered
/// - **500 Internal Server Error**: Store unreachable
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] if the ping fails or times out.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, ApiErrorResponse> {
    state.run(state.task_repository.ping()).await?;

    Ok(Json(HealthResponse {
        ok: true,
        message: "task store connection is good".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

// =============================================================================
// Tests
// =============================================================================

//! HTTP layer: handlers, DTOs, error mapping and routing.

pub mod dto;
pub mod error;
pub mod export;
pub mod handlers;
pub mod routes;

pub use dto::{HealthResponse, MessageResponse, TaskRequest, TaskResponse};
pub use error::{ApiError, ApiErrorResponse};
pub use export::{CSV_HEADER, encode_tasks, export_tasks};
pub use handlers::{
    AppConfig, AppState, create_task, delete_task, get_task, health_check, list_tasks,
    toggle_complete, update_task,
};
pub use routes::create_router;

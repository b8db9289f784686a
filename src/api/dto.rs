//! Data Transfer Objects for API requests and responses.
//!
//! The wire shape is a flat camelCase object:
//!
//! ```json
//! {
//!   "id": "1",
//!   "name": "A",
//!   "status": "Pending",
//!   "description": "d",
//!   "timeEstimate": 1,
//!   "dueDate": "2024-01-01",
//!   "isComplete": false
//! }
//! ```

use std::fmt;

use serde::de::{self, MapAccess, Visitor, value::MapAccessDeserializer};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{MAX_TIME_ESTIMATE, Task, TaskFields};

// =============================================================================
// Task DTOs
// =============================================================================

/// Request body for creating or replacing a task.
///
/// The body must be a JSON object. Missing keys take zero values and unknown
/// keys (including `id`) are ignored. A key with the wrong type, `null`, or a
/// `timeEstimate` outside `0..=MAX_TIME_ESTIMATE` fails to decode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskRequest {
    pub name: String,
    pub status: String,
    pub description: String,
    pub time_estimate: u64,
    pub due_date: String,
    pub is_complete: bool,
}

/// Field-level decoding of a request object.
#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TaskRequestObject {
    name: String,
    status: String,
    description: String,
    time_estimate: u64,
    due_date: String,
    is_complete: bool,
}

struct TaskRequestVisitor;

impl<'de> Visitor<'de> for TaskRequestVisitor {
    type Value = TaskRequest;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a task object")
    }

    fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let object = TaskRequestObject::deserialize(MapAccessDeserializer::new(map))?;
        if object.time_estimate > MAX_TIME_ESTIMATE {
            return Err(de::Error::custom(format_args!(
                "timeEstimate {} exceeds {MAX_TIME_ESTIMATE}",
                object.time_estimate
            )));
        }

        Ok(TaskRequest {
            name: object.name,
            status: object.status,
            description: object.description,
            time_estimate: object.time_estimate,
            due_date: object.due_date,
            is_complete: object.is_complete,
        })
    }
}

impl<'de> Deserialize<'de> for TaskRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(TaskRequestVisitor)
    }
}

impl From<TaskRequest> for TaskFields {
    fn from(request: TaskRequest) -> Self {
        Self {
            name: request.name,
            status: request.status,
            description: request.description,
            time_estimate: request.time_estimate,
            due_date: request.due_date,
            is_complete: request.is_complete,
        }
    }
}

/// Response DTO for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: String,
    pub name: String,
    pub status: String,
    pub description: String,
    pub time_estimate: u64,
    pub due_date: String,
    pub is_complete: bool,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            name: task.fields.name.clone(),
            status: task.fields.status.clone(),
            description: task.fields.description.clone(),
            time_estimate: task.fields.time_estimate,
            due_date: task.fields.due_date.clone(),
            is_complete: task.fields.is_complete,
        }
    }
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id.to_string(),
            name: task.fields.name,
            status: task.fields.status,
            description: task.fields.description,
            time_estimate: task.fields.time_estimate,
            due_date: task.fields.due_date,
            is_complete: task.fields.is_complete,
        }
    }
}

/// Response body carrying a confirmation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Whether the task store answered.
    pub ok: bool,
    pub message: String,
    /// Service version.
    pub version: String,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskId;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn test_task_request_decodes_camel_case() {
        let request: TaskRequest = serde_json::from_value(json!({
            "name": "A",
            "status": "Pending",
            "description": "d",
            "timeEstimate": 1,
            "dueDate": "2024-01-01",
            "isComplete": true
        }))
        .unwrap();

        assert_eq!(request.time_estimate, 1);
        assert_eq!(request.due_date, "2024-01-01");
        assert!(request.is_complete);
    }

    #[rstest]
    fn test_task_request_missing_keys_take_zero_values() {
        let request: TaskRequest = serde_json::from_value(json!({ "name": "only" })).unwrap();

        assert_eq!(
            request,
            TaskRequest {
                name: "only".to_string(),
                ..TaskRequest::default()
            }
        );
    }

    #[rstest]
    fn test_task_request_ignores_unknown_keys_and_id() {
        let request: TaskRequest =
            serde_json::from_value(json!({ "id": "99", "priority": "high", "name": "x" })).unwrap();
        assert_eq!(request.name, "x");
    }

    #[rstest]
    #[case(json!({ "timeEstimate": "three" }))]
    #[case(json!({ "timeEstimate": -1 }))]
    #[case(json!({ "isComplete": "yes" }))]
    #[case(json!({ "name": null }))]
    #[case(json!({ "name": 5 }))]
    #[case(json!([1, 2, 3]))]
    #[case(json!([]))]
    #[case(json!("task"))]
    #[case(json!(null))]
    #[case(json!({ "timeEstimate": 9_223_372_036_854_775_808_u64 }))]
    fn test_task_request_type_mismatch_fails(#[case] body: serde_json::Value) {
        assert!(serde_json::from_value::<TaskRequest>(body).is_err());
    }

    #[rstest]
    fn test_task_request_accepts_estimate_beyond_u32() {
        let request: TaskRequest =
            serde_json::from_value(json!({ "timeEstimate": 5_000_000_000_u64 })).unwrap();
        assert_eq!(request.time_estimate, 5_000_000_000);
    }

    #[rstest]
    fn test_task_request_decodes_from_json_text() {
        let request: TaskRequest =
            serde_json::from_str(r#"{"name":"A","timeEstimate":2}"#).unwrap();
        assert_eq!(request.name, "A");
        assert_eq!(request.time_estimate, 2);

        assert!(serde_json::from_str::<TaskRequest>("[]").is_err());
    }

    #[rstest]
    fn test_task_response_serializes_flat_camel_case() {
        let task = Task::new(
            TaskId::new("1"),
            TaskFields {
                name: "A".to_string(),
                status: "Pending".to_string(),
                description: "d".to_string(),
                time_estimate: 1,
                due_date: "2024-01-01".to_string(),
                is_complete: false,
            },
        );

        let json = serde_json::to_value(TaskResponse::from(&task)).unwrap();

        assert_eq!(
            json,
            json!({
                "id": "1",
                "name": "A",
                "status": "Pending",
                "description": "d",
                "timeEstimate": 1,
                "dueDate": "2024-01-01",
                "isComplete": false
            })
        );
    }
}

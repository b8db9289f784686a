//! CSV export of the whole task collection.
//!
//! The store is read before anything is written, so a failing store still
//! produces a normal JSON error. Once the rows are encoded the body is handed
//! to axum as a stream of one chunk per row.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::stream;

use super::error::ApiErrorResponse;
use super::handlers::AppState;
use crate::domain::Task;

/// Column titles of the first CSV record.
pub const CSV_HEADER: [&str; 7] = [
    "ID",
    "Name",
    "Status",
    "Description",
    "Time Estimate",
    "Due Date",
    "Is Complete",
];

const CSV_CONTENT_TYPE: &str = "text/csv";
const CSV_DISPOSITION: &str = "attachment;filename=tasks.csv";

// =============================================================================
// Encoding
// =============================================================================

fn task_record(task: &Task) -> [String; 7] {
    [
        task.id.to_string(),
        task.fields.name.clone(),
        task.fields.status.clone(),
        task.fields.description.clone(),
        task.fields.time_estimate.to_string(),
        task.fields.due_date.clone(),
        task.fields.is_complete.to_string(),
    ]
}

fn encode_record<I, T>(record: I) -> Result<Bytes, csv::Error>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(record)?;
    let buffer = writer
        .into_inner()
        .map_err(|error| csv::Error::from(error.into_error()))?;
    Ok(Bytes::from(buffer))
}

/// Encodes the header and one record per task, in the given order.
///
/// Fields containing commas, quotes or line breaks are quoted; booleans are
/// written as `true`/`false`.
///
/// # Errors
///
/// Returns [`csv::Error`] if a record cannot be written.
pub fn encode_tasks(tasks: &[Task]) -> Result<Vec<Bytes>, csv::Error> {
    let mut chunks = Vec::with_capacity(tasks.len() + 1);
    chunks.push(encode_record(CSV_HEADER)?);
    for task in tasks {
        chunks.push(encode_record(task_record(task))?);
    }
    Ok(chunks)
}

// =============================================================================
// GET /tasks/export
// =============================================================================

/// Streams every task as a CSV attachment named `tasks.csv`.
///
/// # Response
///
/// - **200 OK**: `text/csv` body, header record first
/// - **500 Internal Server Error**: Store failure (JSON envelope, no CSV)
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] if listing fails or a record cannot be encoded.
pub async fn export_tasks(State(state): State<AppState>) -> Result<Response, ApiErrorResponse> {
    let tasks = state.run(state.task_repository.list_all()).await?;

    let chunks = encode_tasks(&tasks).map_err(|error| {
        tracing::error!(%error, "Failed to encode CSV export");
        ApiErrorResponse::store_unavailable("failed to encode the task export")
    })?;

    tracing::debug!(rows = tasks.len(), "Exporting tasks as CSV");

    let body = Body::from_stream(stream::iter(
        chunks.into_iter().map(Ok::<_, std::convert::Infallible>),
    ));

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(CSV_CONTENT_TYPE)),
            (
                header::CONTENT_DISPOSITION,
                HeaderValue::from_static(CSV_DISPOSITION),
            ),
        ],
        body,
    )
        .into_response())
}

// =============================================================================
// Tests
// =============================================================================

//! Repository trait for the task store.
//!
//! Every operation returns a boxed `'static` future so the trait stays object
//! safe and handlers can hold any backend as `Arc<dyn TaskRepository>`.
//! Implementations clone what they need out of `self` and move it into the
//! future; nothing is borrowed across the await.

use std::time::Duration;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{Task, TaskFields, TaskId};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The identifier is not well-formed for this backend.
    #[error("Invalid task id: {0}")]
    InvalidId(String),

    /// The backing store could not be reached or rejected the command.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored document could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The store did not answer within the request deadline.
    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),
}

/// Future returned by every repository operation.
pub type RepositoryFuture<T> = BoxFuture<'static, Result<T, RepositoryError>>;

// =============================================================================
// Task Repository
// =============================================================================

/// Repository trait for Task entities.
///
/// Identifier syntax is backend specific. Every id-taking operation rejects a
/// malformed id with [`RepositoryError::InvalidId`] before looking anything
/// up, so a well-formed but unknown id is always reported as absent rather
/// than invalid.
pub trait TaskRepository: Send + Sync {
    /// Checks that an identifier is well-formed for this backend without
    /// touching stored data.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::InvalidId`] for a malformed identifier.
    fn check_id(&self, id: &TaskId) -> Result<(), RepositoryError>;

    /// Returns every stored task.
    ///
    /// The in-memory backend returns insertion order; MongoDB returns natural
    /// order.
    fn list_all(&self) -> RepositoryFuture<Vec<Task>>;

    /// Finds a task by its ID.
    ///
    /// Returns `Ok(Some(task))` if found, `Ok(None)` if not found.
    fn find_by_id(&self, id: &TaskId) -> RepositoryFuture<Option<Task>>;

    /// Stores a new task under a freshly assigned ID and returns it.
    fn create(&self, fields: TaskFields) -> RepositoryFuture<Task>;

    /// Replaces every field of an existing task except its ID.
    ///
    /// Returns `Ok(None)` if no task has this ID; nothing is created.
    fn update(&self, id: &TaskId, fields: TaskFields) -> RepositoryFuture<Option<Task>>;

    /// Atomically flips the completion flag and returns the updated task.
    fn toggle_complete(&self, id: &TaskId) -> RepositoryFuture<Option<Task>>;

    /// Deletes a task by its ID.
    ///
    /// Returns `Ok(true)` if the task was deleted, `Ok(false)` if it didn't exist.
    fn delete(&self, id: &TaskId) -> RepositoryFuture<bool>;

    /// Checks that the backend is reachable.
    fn ping(&self) -> RepositoryFuture<()>;
}

// =============================================================================
// Deadline
// =============================================================================

/// Runs a repository operation under a deadline.
///
/// # Errors
///
/// Returns [`RepositoryError::Timeout`] if the operation does not finish in
/// time, otherwise whatever the operation returns.
pub async fn with_deadline<T>(
    deadline: Duration,
    operation: RepositoryFuture<T>,
) -> Result<T, RepositoryError> {
    tokio::time::timeout(deadline, operation)
        .await
        .map_err(|_| RepositoryError::Timeout(deadline))?
}

// =============================================================================
// Tests
// =============================================================================

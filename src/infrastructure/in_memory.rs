//! In-memory repository implementation.
//!
//! Tasks live in a `BTreeMap` keyed by their numeric id. Ids are issued in
//! increasing order, so iteration order is insertion order.
//!
//! # Features
//!
//! - Thread-safe with `Arc<RwLock<...>>`
//! - Reads share the lock; every mutation holds the write lock for its whole
//!   read-modify-write, so concurrent toggles never lose an update
//! - Ids are never reused, even after the newest task is deleted

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{Task, TaskFields, TaskId};
use crate::infrastructure::{RepositoryError, RepositoryFuture, TaskRepository};

// =============================================================================
// Identifier Parsing
// =============================================================================

/// Parses an in-memory task id.
///
/// Only canonical decimal strings are accepted: `"12"` is valid, `"012"`,
/// `"+12"`, `""` and `"abc"` are not.
fn parse_id(id: &TaskId) -> Result<u64, RepositoryError> {
    let raw = id.as_str();
    let invalid = || RepositoryError::InvalidId(raw.to_string());

    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(invalid());
    }

    let value: u64 = raw.parse().map_err(|_| invalid())?;
    if value.to_string() != raw {
        return Err(invalid());
    }
    Ok(value)
}

// =============================================================================
// Store State
// =============================================================================

#[derive(Debug, Default)]
struct StoreState {
    tasks: BTreeMap<u64, Task>,
    /// Highest id ever issued. Zero for a fresh store.
    last_issued: u64,
}

impl StoreState {
    fn next_id(&mut self) -> Result<u64, RepositoryError> {
        let next = self
            .last_issued
            .checked_add(1)
            .ok_or_else(|| RepositoryError::Unavailable("task id space exhausted".to_string()))?;
        self.last_issued = next;
        Ok(next)
    }
}

// =============================================================================
// In-Memory Task Repository
// =============================================================================

/// In-memory implementation of `TaskRepository`.
///
/// # Example
///
/// ```ignore
/// use task_service::infrastructure::InMemoryTaskRepository;
///
/// let repository = InMemoryTaskRepository::new();
/// let task = repository.create(fields).await?;
/// let found = repository.find_by_id(&task.id).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryTaskRepository {
    /// Creates a new empty in-memory task repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl TaskRepository for InMemoryTaskRepository {
    fn check_id(&self, id: &TaskId) -> Result<(), RepositoryError> {
        parse_id(id).map(|_| ())
    }

    fn list_all(&self) -> RepositoryFuture<Vec<Task>> {
        let state = Arc::clone(&self.state);
        Box::pin(async move {
            let guard = state.read().await;
            Ok(guard.tasks.values().cloned().collect())
        })
    }

    fn find_by_id(&self, id: &TaskId) -> RepositoryFuture<Option<Task>> {
        let state = Arc::clone(&self.state);
        let key = parse_id(id);
        Box::pin(async move {
            let key = key?;
            let guard = state.read().await;
            Ok(guard.tasks.get(&key).cloned())
        })
    }

    fn create(&self, fields: TaskFields) -> RepositoryFuture<Task> {
        let state = Arc::clone(&self.state);
        Box::pin(async move {
            let mut guard = state.write().await;
            let key = guard.next_id()?;
            let task = Task::new(TaskId::new(key.to_string()), fields);
            guard.tasks.insert(key, task.clone());
            Ok(task)
        })
    }

    fn update(&self, id: &TaskId, fields: TaskFields) -> RepositoryFuture<Option<Task>> {
        let state = Arc::clone(&self.state);
        let key = parse_id(id);
        Box::pin(async move {
            let key = key?;
            let mut guard = state.write().await;
            let Some(existing) = guard.tasks.get_mut(&key) else {
                return Ok(None);
            };
            *existing = existing.clone().with_fields(fields);
            Ok(Some(existing.clone()))
        })
    }

    fn toggle_complete(&self, id: &TaskId) -> RepositoryFuture<Option<Task>> {
        let state = Arc::clone(&self.state);
        let key = parse_id(id);
        Box::pin(async move {
            let key = key?;
            let mut guard = state.write().await;
            let Some(existing) = guard.tasks.get_mut(&key) else {
                return Ok(None);
            };
            *existing = existing.clone().toggled();
            Ok(Some(existing.clone()))
        })
    }

    fn delete(&self, id: &TaskId) -> RepositoryFuture<bool> {
        let state = Arc::clone(&self.state);
        let key = parse_id(id);
        Box::pin(async move {
            let key = key?;
            let mut guard = state.write().await;
            Ok(guard.tasks.remove(&key).is_some())
        })
    }

    fn ping(&self) -> RepositoryFuture<()> {
        Box::pin(async { Ok(()) })
    }
}

// =============================================================================
// Tests
// =============================================================================

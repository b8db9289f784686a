//! Task domain model.
//!
//! A task is an identifier plus a flat set of client-supplied fields. The
//! identifier is opaque at this layer: each storage backend decides what a
//! well-formed identifier looks like.

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Unique identifier for a task.
///
/// Rendered as a string on the wire. The in-memory backend issues decimal
/// counters (`"1"`, `"2"`, ...) and the MongoDB backend issues 24-character
/// hex object ids; this type does not check either syntax.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(String);

impl TaskId {
    /// Wraps a raw identifier without validating it.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// =============================================================================
// Task Fields
// =============================================================================

/// Largest accepted `time_estimate`, the range of a signed 64-bit integer.
pub const MAX_TIME_ESTIMATE: u64 = i64::MAX.unsigned_abs();

/// Every task attribute except the identifier.
///
/// This is what clients send on create and update. An update replaces all of
/// these fields at once; there is no partial patch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskFields {
    /// Free-text label.
    pub name: String,
    /// Free-text classification such as `Pending` or `In Progress`.
    pub status: String,
    /// Free-text body.
    pub description: String,
    /// Opaque non-negative estimate, at most [`MAX_TIME_ESTIMATE`].
    pub time_estimate: u64,
    /// Due date, conventionally `YYYY-MM-DD`. Not validated.
    pub due_date: String,
    /// Completion flag.
    pub is_complete: bool,
}

// =============================================================================
// Task Entity
// =============================================================================

/// A stored task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Identifier assigned by the store at creation. Never changes.
    pub id: TaskId,
    /// Client-supplied attributes.
    pub fields: TaskFields,
}

impl Task {
    /// Creates a task from an identifier and its fields.
    #[must_use]
    pub const fn new(id: TaskId, fields: TaskFields) -> Self {
        Self { id, fields }
    }

    /// Replaces every field except the identifier.
    #[must_use]
    pub fn with_fields(self, fields: TaskFields) -> Self {
        Self {
            id: self.id,
            fields,
        }
    }

    /// Returns the task with its completion flag flipped.
    #[must_use]
    pub fn toggled(mut self) -> Self {
        self.fields.is_complete = !self.fields.is_complete;
        self
    }

    /// Returns true if the task is marked complete.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.fields.is_complete
    }
}

// =============================================================================
// Tests
// =============================================================================

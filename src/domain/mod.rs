//! Domain module for task management.
//!
//! This module contains the task entity and its value objects.

pub mod task;

pub use task::{MAX_TIME_ESTIMATE, Task, TaskFields, TaskId};

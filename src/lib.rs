//! # task-service
//!
//! A task management HTTP API with interchangeable storage backends.
//!
//! ## Modules
//!
//! - [`domain`]: the `Task` entity and its identifier
//! - [`infrastructure`]: the `TaskRepository` trait, its in-memory and
//!   `MongoDB` implementations, and the factory that picks one at startup
//! - [`api`]: axum handlers, request/response bodies, error mapping and CSV export
//! - [`config`]: server settings read from the environment

#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;

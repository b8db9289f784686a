//! Infrastructure module for external services.
//!
//! This module contains the task repository trait, its in-memory and
//! `MongoDB` implementations, and the factory that picks one at startup.

pub mod factory;
pub mod in_memory;
pub mod mongo;
pub mod repository;

pub use factory::{
    ConfigurationError, FactoryError, RepositoryConfig, RepositoryFactory, StorageMode,
};
pub use in_memory::InMemoryTaskRepository;
pub use mongo::MongoTaskRepository;
pub use repository::{RepositoryError, RepositoryFuture, TaskRepository, with_deadline};

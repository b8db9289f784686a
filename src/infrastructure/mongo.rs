//! `MongoDB` repository implementation.
//!
//! This module provides a `MongoDB`-backed implementation of `TaskRepository`
//! using the official `mongodb` driver. Tasks are stored one document per
//! task in a single collection.
//!
//! # Features
//!
//! - Connection pooling is handled by `mongodb::Client`
//! - Ids are native `ObjectId`s, exposed as 24-character hex strings
//! - Update and toggle are single server-side commands returning the
//!   post-image, so neither has a read-then-write window
//!
//! # Document Shape
//!
//! ```json
//! {
//!   "_id": ObjectId("65f1c0ffee0ddba11ca7e000"),
//!   "name": "Write report",
//!   "status": "Pending",
//!   "description": "Quarterly numbers",
//!   "timeEstimate": 3,
//!   "dueDate": "2024-03-01",
//!   "isComplete": false
//! }
//! ```

use futures::TryStreamExt;
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::error::ErrorKind;
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};

use crate::domain::{Task, TaskFields, TaskId};
use crate::infrastructure::{RepositoryError, RepositoryFuture, TaskRepository};

// =============================================================================
// Stored Document
// =============================================================================

/// A task as persisted in the collection.
///
/// Missing fields decode to their zero values so documents written by older
/// clients still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    time_estimate: u64,
    #[serde(default)]
    due_date: String,
    #[serde(default)]
    is_complete: bool,
}

impl TaskDocument {
    fn new(id: ObjectId, fields: TaskFields) -> Self {
        Self {
            id,
            name: fields.name,
            status: fields.status,
            description: fields.description,
            time_estimate: fields.time_estimate,
            due_date: fields.due_date,
            is_complete: fields.is_complete,
        }
    }

    fn into_task(self) -> Task {
        Task::new(
            TaskId::new(self.id.to_hex()),
            TaskFields {
                name: self.name,
                status: self.status,
                description: self.description,
                time_estimate: self.time_estimate,
                due_date: self.due_date,
                is_complete: self.is_complete,
            },
        )
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parses a hex object id.
fn parse_id(id: &TaskId) -> Result<ObjectId, RepositoryError> {
    ObjectId::parse_str(id.as_str()).map_err(|_| RepositoryError::InvalidId(id.to_string()))
}

/// Builds the `$set` body that replaces every field except `_id`.
fn replacement_document(fields: &TaskFields) -> Result<Document, RepositoryError> {
    let time_estimate = i64::try_from(fields.time_estimate).map_err(|_| {
        RepositoryError::Serialization(format!(
            "timeEstimate {} does not fit a BSON int64",
            fields.time_estimate
        ))
    })?;

    Ok(doc! {
        "name": fields.name.as_str(),
        "status": fields.status.as_str(),
        "description": fields.description.as_str(),
        "timeEstimate": time_estimate,
        "dueDate": fields.due_date.as_str(),
        "isComplete": fields.is_complete,
    })
}

/// Aggregation-pipeline update that negates `isComplete` in place.
fn toggle_pipeline() -> Vec<Document> {
    vec![doc! { "$set": { "isComplete": { "$not": ["$isComplete"] } } }]
}

/// Maps a driver error onto the repository error space.
#[allow(clippy::needless_pass_by_value)]
fn classify(error: mongodb::error::Error) -> RepositoryError {
    match *error.kind {
        ErrorKind::BsonDeserialization(_) | ErrorKind::BsonSerialization(_) => {
            RepositoryError::Serialization(error.to_string())
        }
        _ => RepositoryError::Unavailable(error.to_string()),
    }
}

// =============================================================================
// MongoDB Task Repository
// =============================================================================

/// `MongoDB` implementation of `TaskRepository`.
///
/// # Example
///
/// ```ignore
/// use task_service::infrastructure::MongoTaskRepository;
///
/// let repository =
///     MongoTaskRepository::connect("mongodb://localhost:27017", "gotask", "tasks").await?;
/// let task = repository.create(fields).await?;
/// let found = repository.find_by_id(&task.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct MongoTaskRepository {
    database: Database,
    collection: Collection<TaskDocument>,
}

impl MongoTaskRepository {
    /// Creates a repository over an existing database handle.
    #[must_use]
    pub fn new(database: &Database, collection_name: &str) -> Self {
        Self {
            database: database.clone(),
            collection: database.collection(collection_name),
        }
    }

    /// Connects to `MongoDB` and verifies the connection with a ping.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Unavailable` if the URI is invalid or the
    /// server does not answer the ping.
    pub async fn connect(
        uri: &str,
        database_name: &str,
        collection_name: &str,
    ) -> Result<Self, RepositoryError> {
        let client = Client::with_uri_str(uri).await.map_err(classify)?;
        let repository = Self::new(&client.database(database_name), collection_name);
        repository.ping().await?;
        Ok(repository)
    }
}

impl TaskRepository for MongoTaskRepository {
    fn check_id(&self, id: &TaskId) -> Result<(), RepositoryError> {
        parse_id(id).map(|_| ())
    }

    fn list_all(&self) -> RepositoryFuture<Vec<Task>> {
        let collection = self.collection.clone();
        Box::pin(async move {
            let documents: Vec<TaskDocument> = collection
                .find(doc! {})
                .await
                .map_err(classify)?
                .try_collect()
                .await
                .map_err(classify)?;

            Ok(documents.into_iter().map(TaskDocument::into_task).collect())
        })
    }

    fn find_by_id(&self, id: &TaskId) -> RepositoryFuture<Option<Task>> {
        let collection = self.collection.clone();
        let object_id = parse_id(id);
        Box::pin(async move {
            let object_id = object_id?;
            let document = collection
                .find_one(doc! { "_id": object_id })
                .await
                .map_err(classify)?;

            Ok(document.map(TaskDocument::into_task))
        })
    }

    fn create(&self, fields: TaskFields) -> RepositoryFuture<Task> {
        let collection = self.collection.clone();
        Box::pin(async move {
            let document = TaskDocument::new(ObjectId::new(), fields);
            collection.insert_one(&document).await.map_err(classify)?;
            Ok(document.into_task())
        })
    }

    fn update(&self, id: &TaskId, fields: TaskFields) -> RepositoryFuture<Option<Task>> {
        let collection = self.collection.clone();
        let object_id = parse_id(id);
        Box::pin(async move {
            let object_id = object_id?;
            let replacement = replacement_document(&fields)?;
            let document = collection
                .find_one_and_update(doc! { "_id": object_id }, doc! { "$set": replacement })
                .return_document(ReturnDocument::After)
                .await
                .map_err(classify)?;

            Ok(document.map(TaskDocument::into_task))
        })
    }

    fn toggle_complete(&self, id: &TaskId) -> RepositoryFuture<Option<Task>> {
        let collection = self.collection.clone();
        let object_id = parse_id(id);
        Box::pin(async move {
            let object_id = object_id?;
            let document = collection
                .find_one_and_update(doc! { "_id": object_id }, toggle_pipeline())
                .return_document(ReturnDocument::After)
                .await
                .map_err(classify)?;

            Ok(document.map(TaskDocument::into_task))
        })
    }

    fn delete(&self, id: &TaskId) -> RepositoryFuture<bool> {
        let collection = self.collection.clone();
        let object_id = parse_id(id);
        Box::pin(async move {
            let object_id = object_id?;
            let result = collection
                .delete_one(doc! { "_id": object_id })
                .await
                .map_err(classify)?;

            Ok(result.deleted_count > 0)
        })
    }

    fn ping(&self) -> RepositoryFuture<()> {
        let database = self.database.clone();
        Box::pin(async move {
            database
                .run_command(doc! { "ping": 1 })
                .await
                .map_err(classify)?;
            Ok(())
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Cloud Firestore module.
//!
//! A narrow REST client for the document store: typed reads, writes that carry
//! server-side field transforms (used for `createdAt`), auto-id inserts and
//! simple equality queries. Every write goes through a single-write `:commit`.

pub mod models;
pub mod query;
pub mod reference;
pub mod snapshot;


use self::models::{CommitRequest, CommitResponse, Write, WriteResult};
use self::query::Query;
use self::reference::{CollectionReference, DocumentReference};
use crate::core::parse_error_response;
use reqwest_middleware::ClientWithMiddleware;
use thiserror::Error;

const FIRESTORE_V1_API: &str = "https://firestore.googleapis.com/v1";

/// Errors that can occur during Firestore operations.
#[derive(Error, Debug)]
pub enum FirestoreError {
    /// Wrapper for `reqwest::Error`.
    #[error("HTTP Request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    /// Wrapper for `reqwest_middleware::Error`.
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),
    /// Errors returned by the Firestore API.
    #[error("API error: {0}")]
    ApiError(String),
    /// A create precondition failed because the document exists.
    #[error("Document already exists: {0}")]
    AlreadyExists(String),
    /// Wrapper for `serde_json::Error`.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl FirestoreError {
    /// The message reported by the API itself, if the failure got that far.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            FirestoreError::ApiError(msg) | FirestoreError::AlreadyExists(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Client for interacting with Cloud Firestore.
pub struct FirebaseFirestore {
    pub(crate) client: ClientWithMiddleware,
    base_url: String,
    database: String,
}

impl FirebaseFirestore {
    /// Creates a client for the `(default)` database of `project_id`.
    pub fn new(client: ClientWithMiddleware, project_id: &str) -> Self {
        Self::new_with_url(client, FIRESTORE_V1_API.to_string(), project_id)
    }

    /// Creates a client against a custom API root such as the emulator
    /// (`http://localhost:8080/v1`).
    pub fn new_with_url(client: ClientWithMiddleware, base_url: String, project_id: &str) -> Self {
        Self {
            client,
            base_url,
            database: format!("projects/{}/databases/(default)", project_id),
        }
    }

    pub(crate) fn documents_url(&self) -> String {
        format!("{}/{}/documents", self.base_url, self.database)
    }

    pub(crate) fn document_name(&self, path: &str) -> String {
        format!("{}/documents/{}", self.database, path)
    }

    /// Gets a `CollectionReference` for the collection at `collection_path`.
    pub fn collection(&self, collection_path: &str) -> CollectionReference<'_> {
        CollectionReference {
            firestore: self,
            path: collection_path.to_string(),
        }
    }

    /// Gets a `DocumentReference` for the slash-separated `document_path`.
    pub fn doc(&self, document_path: &str) -> DocumentReference<'_> {
        DocumentReference {
            firestore: self,
            path: document_path.to_string(),
        }
    }

    /// Starts a query over the collection at `collection_path`.
    pub fn query(&self, collection_path: &str) -> Query<'_> {
        Query::new(self, collection_path)
    }

    pub(crate) async fn commit(&self, writes: Vec<Write>) -> Result<Vec<WriteResult>, FirestoreError> {
        let url = format!("{}:commit", self.documents_url());
        let request = CommitRequest { writes };

        let response = self.client.post(&url).json(&request).send().await?;

        if response.status() == reqwest::StatusCode::CONFLICT {
            return Err(FirestoreError::AlreadyExists(
                parse_error_response(response, "Commit failed").await,
            ));
        }

        if !response.status().is_success() {
            return Err(FirestoreError::ApiError(
                parse_error_response(response, "Commit failed").await,
            ));
        }

        let result: CommitResponse = response.json().await?;
        Ok(result.write_results)
    }
}

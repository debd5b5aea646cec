use super::models::Document;
use super::reference::convert_fields_to_serde_value;
use super::FirestoreError;
use serde::de::DeserializeOwned;

/// A document read from Firestore.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    id: String,
    document: Document,
}

impl DocumentSnapshot {
    pub(crate) fn new(document: Document) -> Self {
        let id = document
            .name
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        Self { id, document }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Deserializes all fields into `T`.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T, FirestoreError> {
        let serde_value = convert_fields_to_serde_value(self.document.fields.clone())?;
        Ok(serde_json::from_value(serde_value)?)
    }
}

/// The result of running a query.
#[derive(Debug, Clone)]
pub struct QuerySnapshot {
    pub(crate) documents: Vec<DocumentSnapshot>,
    pub(crate) read_time: Option<String>,
}

impl QuerySnapshot {
    pub fn documents(&self) -> &[DocumentSnapshot] {
        &self.documents
    }

    pub fn empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn size(&self) -> usize {
        self.documents.len()
    }

    pub fn read_time(&self) -> Option<&str> {
        self.read_time.as_deref()
    }
}

use super::models::{
    CollectionSelector, CompositeFilter, CompositeOperator, FieldFilter, FieldOperator,
    FieldReference, Filter, RunQueryRequest, RunQueryResponse, StructuredQuery,
};
use super::reference::convert_serde_value_to_firestore_value;
use super::snapshot::{DocumentSnapshot, QuerySnapshot};
use super::{FirebaseFirestore, FirestoreError};
use crate::core::parse_error_response;
use serde::Serialize;

/// A structured query over one collection, bound to a Firestore client.
#[derive(Clone)]
pub struct Query<'a> {
    firestore: &'a FirebaseFirestore,
    parent: String,
    query: StructuredQuery,
}

impl<'a> Query<'a> {
    /// `collection_path` is relative to the database root, e.g. `users` or
    /// `clinics/c1/rooms`.
    pub(crate) fn new(firestore: &'a FirebaseFirestore, collection_path: &str) -> Self {
        let (parent, collection_id) = match collection_path.rsplit_once('/') {
            Some((parent, id)) => (parent.to_string(), id.to_string()),
            None => (String::new(), collection_path.to_string()),
        };
        Self {
            firestore,
            parent,
            query: StructuredQuery {
                from: vec![CollectionSelector { collection_id }],
                where_clause: None,
                limit: None,
            },
        }
    }

    /// Adds an equality filter; multiple filters are ANDed together.
    pub fn where_equal<T: Serialize>(self, field: &str, value: T) -> Result<Self, FirestoreError> {
        self.where_filter(field, FieldOperator::Equal, value)
    }

    pub fn where_filter<T: Serialize>(
        mut self,
        field: &str,
        op: FieldOperator,
        value: T,
    ) -> Result<Self, FirestoreError> {
        let value = convert_serde_value_to_firestore_value(serde_json::to_value(value)?)?;
        let filter = Filter::FieldFilter(FieldFilter {
            field: FieldReference {
                field_path: field.to_string(),
            },
            op,
            value,
        });

        self.query.where_clause = Some(match self.query.where_clause.take() {
            None => filter,
            Some(Filter::CompositeFilter(mut composite)) => {
                composite.filters.push(filter);
                Filter::CompositeFilter(composite)
            }
            Some(existing) => Filter::CompositeFilter(CompositeFilter {
                op: CompositeOperator::And,
                filters: vec![existing, filter],
            }),
        });

        Ok(self)
    }

    pub fn limit(mut self, limit: i32) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Runs the query.
    pub async fn get(&self) -> Result<QuerySnapshot, FirestoreError> {
        let parent_url = if self.parent.is_empty() {
            self.firestore.documents_url()
        } else {
            format!("{}/{}", self.firestore.documents_url(), self.parent)
        };
        let url = format!("{}:runQuery", parent_url);

        let request = RunQueryRequest {
            structured_query: self.query.clone(),
        };

        let response = self.firestore.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(FirestoreError::ApiError(
                parse_error_response(response, "Run query failed").await,
            ));
        }

        let responses: Vec<RunQueryResponse> = response.json().await?;

        let mut documents = Vec::new();
        let mut read_time = None;
        for res in responses {
            if res.read_time.is_some() {
                read_time = res.read_time;
            }
            if let Some(document) = res.document {
                documents.push(DocumentSnapshot::new(document));
            }
        }

        Ok(QuerySnapshot {
            documents,
            read_time,
        })
    }
}

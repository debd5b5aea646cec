use super::models::{
    ArrayValue, Document, FieldTransform, MapValue, Precondition, Value, ValueType, Write,
    WriteResult,
};
use super::query::Query;
use super::{FirebaseFirestore, FirestoreError};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::de::{DeserializeOwned, Error};
use serde::ser::Error as SerError;
use serde::Serialize;
use serde_json::map::Map;
use serde_json::Value as SerdeValue;
use std::collections::HashMap;

const AUTO_ID_LENGTH: usize = 20;

/// A random 20-character alphanumeric document id.
pub(crate) fn auto_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(AUTO_ID_LENGTH)
        .map(char::from)
        .collect()
}

pub(crate) fn convert_fields_to_serde_value(
    fields: HashMap<String, Value>,
) -> Result<SerdeValue, FirestoreError> {
    let mut map = Map::new();
    for (key, value) in fields {
        map.insert(key, convert_value_to_serde_value(value)?);
    }
    Ok(SerdeValue::Object(map))
}

pub(crate) fn convert_value_to_serde_value(value: Value) -> Result<SerdeValue, FirestoreError> {
    use serde_json::json;
    Ok(match value.value_type {
        ValueType::StringValue(s) => SerdeValue::String(s),
        ValueType::IntegerValue(s) => {
            let i: i64 = s.parse().map_err(|e| {
                <serde_json::Error as Error>::custom(format!(
                    "Failed to parse integer string '{}': {}",
                    s, e
                ))
            })?;
            SerdeValue::Number(i.into())
        }
        ValueType::DoubleValue(d) => SerdeValue::Number(
            serde_json::Number::from_f64(d).ok_or_else(|| {
                <serde_json::Error as Error>::custom(format!("Invalid f64 value: {}", d))
            })?,
        ),
        ValueType::BooleanValue(b) => SerdeValue::Bool(b),
        ValueType::MapValue(map_value) => convert_fields_to_serde_value(map_value.fields)?,
        ValueType::ArrayValue(array_value) => SerdeValue::Array(
            array_value
                .values
                .into_iter()
                .map(convert_value_to_serde_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        ValueType::NullValue(_) => SerdeValue::Null,
        ValueType::GeoPointValue(gp) => {
            json!({ "latitude": gp.latitude, "longitude": gp.longitude })
        }
        ValueType::TimestampValue(s) | ValueType::BytesValue(s) | ValueType::ReferenceValue(s) => {
            SerdeValue::String(s)
        }
    })
}

pub(crate) fn convert_serializable_to_fields<T: Serialize>(
    value: &T,
) -> Result<HashMap<String, Value>, FirestoreError> {
    match serde_json::to_value(value)? {
        SerdeValue::Object(map) => map
            .into_iter()
            .map(|(k, v)| Ok((k, convert_serde_value_to_firestore_value(v)?)))
            .collect(),
        _ => Err(FirestoreError::SerializationError(SerError::custom(
            "Can only write objects as documents",
        ))),
    }
}

pub(crate) fn convert_serde_value_to_firestore_value(
    value: SerdeValue,
) -> Result<Value, FirestoreError> {
    let value_type = match value {
        SerdeValue::Null => ValueType::NullValue(()),
        SerdeValue::Bool(b) => ValueType::BooleanValue(b),
        SerdeValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                ValueType::IntegerValue(i.to_string())
            } else if let Some(f) = n.as_f64() {
                ValueType::DoubleValue(f)
            } else {
                return Err(FirestoreError::SerializationError(SerError::custom(format!(
                    "Unsupported number type: {}",
                    n
                ))));
            }
        }
        SerdeValue::String(s) => ValueType::StringValue(s),
        SerdeValue::Array(a) => ValueType::ArrayValue(ArrayValue {
            values: a
                .into_iter()
                .map(convert_serde_value_to_firestore_value)
                .collect::<Result<Vec<_>, _>>()?,
        }),
        SerdeValue::Object(o) => ValueType::MapValue(MapValue {
            fields: o
                .into_iter()
                .map(|(k, v)| Ok((k, convert_serde_value_to_firestore_value(v)?)))
                .collect::<Result<HashMap<_, _>, FirestoreError>>()?,
        }),
    };
    Ok(Value { value_type })
}

/// A reference to a single document, addressed by its slash-separated path
/// relative to the database root (e.g. `users/alice`).
#[derive(Clone)]
pub struct DocumentReference<'a> {
    pub(crate) firestore: &'a FirebaseFirestore,
    pub(crate) path: String,
}

impl<'a> DocumentReference<'a> {
    /// The last path segment.
    pub fn id(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or_default()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Reads the document, returning `None` when it does not exist.
    pub async fn get<T: DeserializeOwned>(&self) -> Result<Option<T>, FirestoreError> {
        let url = format!("{}/{}", self.firestore.documents_url(), self.path);
        let response = self.firestore.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(FirestoreError::ApiError(
                crate::core::parse_error_response(response, "Get document failed").await,
            ));
        }

        let doc: Document = response.json().await?;
        let serde_value = convert_fields_to_serde_value(doc.fields)?;
        Ok(Some(serde_json::from_value(serde_value)?))
    }

    /// Overwrites the document with `value`, then applies `transforms`.
    pub async fn set_with_transforms<T: Serialize>(
        &self,
        value: &T,
        transforms: &[FieldTransform],
    ) -> Result<WriteResult, FirestoreError> {
        self.write(value, transforms, None).await
    }

    /// Like `set_with_transforms`, but fails if the document already exists.
    pub async fn create_with_transforms<T: Serialize>(
        &self,
        value: &T,
        transforms: &[FieldTransform],
    ) -> Result<WriteResult, FirestoreError> {
        self.write(value, transforms, Some(Precondition { exists: Some(false) }))
            .await
    }

    async fn write<T: Serialize>(
        &self,
        value: &T,
        transforms: &[FieldTransform],
        current_document: Option<Precondition>,
    ) -> Result<WriteResult, FirestoreError> {
        let write = Write {
            update: Document {
                name: self.firestore.document_name(&self.path),
                fields: convert_serializable_to_fields(value)?,
                ..Default::default()
            },
            update_transforms: transforms.to_vec(),
            current_document,
        };

        self.firestore
            .commit(vec![write])
            .await?
            .pop()
            .ok_or_else(|| FirestoreError::ApiError("Commit returned no write result".to_string()))
    }
}

/// A reference to a collection at the database root or under a document.
#[derive(Clone)]
pub struct CollectionReference<'a> {
    pub(crate) firestore: &'a FirebaseFirestore,
    pub(crate) path: String,
}

impl<'a> CollectionReference<'a> {
    pub fn id(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or_default()
    }

    pub fn doc(&self, document_id: &str) -> DocumentReference<'a> {
        DocumentReference {
            firestore: self.firestore,
            path: format!("{}/{}", self.path, document_id),
        }
    }

    /// Creates a document with a generated id and returns its reference.
    pub async fn add_with_transforms<T: Serialize>(
        &self,
        value: &T,
        transforms: &[FieldTransform],
    ) -> Result<DocumentReference<'a>, FirestoreError> {
        let doc_ref = self.doc(&auto_id());
        doc_ref.create_with_transforms(value, transforms).await?;
        Ok(doc_ref)
    }

    /// Starts a query over this collection filtered on `field == value`.
    pub fn where_equal<T: Serialize>(
        &self,
        field: &str,
        value: T,
    ) -> Result<Query<'a>, FirestoreError> {
        Query::new(self.firestore, &self.path).where_equal(field, value)
    }
}

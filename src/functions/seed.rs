use super::access::require_super_admin;
use super::models::{Department, Doctor, Patient, CREATED_AT, DEPARTMENTS, DOCTORS, PATIENTS};
use super::{CallableContext, FunctionsError};
use crate::firestore::models::FieldTransform;
use crate::firestore::{FirebaseFirestore, FirestoreError};
use crate::FirebaseApp;
use serde::Serialize;

const CONTEXT: &str = "Failed to create test data";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateTestDataResponse {
    pub success: bool,
    pub message: String,
}

/// Inserts the sample departments, doctors and patients.
///
/// Every call appends a fresh copy of each record; nothing is deduplicated.
pub async fn create_test_data(
    app: &FirebaseApp,
    ctx: &CallableContext,
) -> Result<CreateTestDataResponse, FunctionsError> {
    let auth = ctx.auth.as_ref().ok_or_else(|| {
        tracing::warn!("createTestData called without authentication");
        FunctionsError::unauthenticated("The function must be called while authenticated")
    })?;

    require_super_admin(app, auth, CONTEXT).await?;

    seed(app.firestore()).await.map_err(|e| {
        tracing::error!(uid = %auth.uid, error = %e, "failed to create test data");
        FunctionsError::upstream(CONTEXT, &e)
    })?;

    tracing::info!(uid = %auth.uid, "test data created");

    Ok(CreateTestDataResponse {
        success: true,
        message: "Test data created successfully".to_string(),
    })
}

async fn seed(firestore: &FirebaseFirestore) -> Result<(), FirestoreError> {
    insert_all(firestore, DEPARTMENTS, &departments()).await?;
    insert_all(firestore, DOCTORS, &doctors()).await?;
    insert_all(firestore, PATIENTS, &patients()).await?;
    Ok(())
}

// One write at a time, in order.
async fn insert_all<T: Serialize>(
    firestore: &FirebaseFirestore,
    collection: &str,
    records: &[T],
) -> Result<(), FirestoreError> {
    let transforms = [FieldTransform::server_timestamp(CREATED_AT)];
    let collection_ref = firestore.collection(collection);
    for record in records {
        let doc = collection_ref.add_with_transforms(record, &transforms).await?;
        tracing::debug!(collection, id = doc.id(), "inserted sample record");
    }
    Ok(())
}

pub fn departments() -> Vec<Department> {
    [
        ("Cardiology", "Heart and cardiovascular system care"),
        ("Neurology", "Brain, spinal cord and nervous system care"),
        ("Pediatrics", "Medical care for infants, children and adolescents"),
    ]
    .into_iter()
    .map(|(name, description)| Department {
        name: name.to_string(),
        description: description.to_string(),
        is_active: true,
    })
    .collect()
}

pub fn doctors() -> Vec<Doctor> {
    [
        (
            "Dr. Sarah Johnson",
            "sarah.johnson@clinic.com",
            "Cardiology",
            "Interventional Cardiology",
        ),
        (
            "Dr. Michael Chen",
            "michael.chen@clinic.com",
            "Neurology",
            "Clinical Neurophysiology",
        ),
        (
            "Dr. Emily Rodriguez",
            "emily.rodriguez@clinic.com",
            "Pediatrics",
            "Pediatric Emergency Medicine",
        ),
    ]
    .into_iter()
    .map(|(full_name, email, department, specialization)| Doctor {
        full_name: full_name.to_string(),
        email: email.to_string(),
        department: department.to_string(),
        specialization: specialization.to_string(),
        is_active: true,
    })
    .collect()
}

pub fn patients() -> Vec<Patient> {
    [
        ("John Smith", "john.smith@example.com", "+1-555-0101", "1985-03-15", "male"),
        ("Maria Garcia", "maria.garcia@example.com", "+1-555-0102", "1992-07-22", "female"),
        ("David Lee", "david.lee@example.com", "+1-555-0103", "1978-11-08", "male"),
    ]
    .into_iter()
    .map(|(full_name, email, phone, date_of_birth, gender)| Patient {
        full_name: full_name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        date_of_birth: date_of_birth.to_string(),
        gender: gender.to_string(),
        is_active: true,
    })
    .collect()
}

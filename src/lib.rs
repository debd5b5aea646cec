//! Clinic backend functions hosted on Firebase Auth and Cloud Firestore.
//!
//! Three entry points share one [`FirebaseApp`]: a registration hook that
//! issues an email verification link, a callable that provisions super admin
//! accounts, and a callable that seeds sample clinic data.

pub mod auth;
pub mod config;
pub mod core;
pub mod firestore;
pub mod functions;
pub mod server;

#[cfg(test)]
pub(crate) mod testing;

use crate::auth::verifier::IdTokenVerifier;
use crate::auth::FirebaseAuth;
use crate::core::middleware::AuthMiddleware;
use crate::firestore::FirebaseFirestore;
use reqwest_middleware::ClientBuilder;
use yup_oauth2::ServiceAccountKey;

/// The process-wide set of backend clients.
///
/// Built once at startup and shared by reference; the clients hold the
/// connection pool, the OAuth token cache and the ID token key cache.
pub struct FirebaseApp {
    project_id: String,
    auth: FirebaseAuth,
    firestore: FirebaseFirestore,
    verifier: IdTokenVerifier,
}

impl FirebaseApp {
    pub fn new(service_account_key: ServiceAccountKey, project_id: String) -> Self {
        let client = ClientBuilder::new(reqwest::Client::new())
            .with(AuthMiddleware::new(service_account_key))
            .build();

        Self::from_parts(
            FirebaseAuth::new(client.clone(), &project_id),
            FirebaseFirestore::new(client, &project_id),
            IdTokenVerifier::new(project_id.clone()),
            project_id,
        )
    }

    /// Assembles an app from preconfigured clients, e.g. ones pointed at emulators.
    pub fn from_parts(
        auth: FirebaseAuth,
        firestore: FirebaseFirestore,
        verifier: IdTokenVerifier,
        project_id: String,
    ) -> Self {
        Self {
            project_id,
            auth,
            firestore,
            verifier,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn auth(&self) -> &FirebaseAuth {
        &self.auth
    }

    pub fn firestore(&self) -> &FirebaseFirestore {
        &self.firestore
    }

    pub fn verifier(&self) -> &IdTokenVerifier {
        &self.verifier
    }
}

//! Fixtures shared by the unit tests: an app wired to a mock server and ID
//! tokens signed with a fixed RSA test key.

use crate::auth::verifier::IdTokenVerifier;
use crate::auth::FirebaseAuth;
use crate::firestore::FirebaseFirestore;
use crate::FirebaseApp;
use httpmock::MockServer;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use reqwest_middleware::ClientBuilder;
use serde_json::{json, Value};

pub const TEST_PROJECT: &str = "test-project";
pub const TEST_KID: &str = "test-key";
pub const AUTH_PATH: &str = "/v1/projects/test-project";
pub const DOCUMENTS_PATH: &str = "/v1/projects/test-project/databases/(default)/documents";
pub const JWKS_PATH: &str = "/jwks";

const TEST_RSA_PRIVATE_KEY: &str = include_str!("../tests/data/test_rsa_key.pem");

const TEST_RSA_MODULUS: &str = "qL12_xG-BA6WNgR292-HHy9Xe8-zgjE_tqiWmxkRCPGLEw1_soCTrTGpAKc4MVLs_ke_p0xC6jXPB2LepS4YV7twQ0bzwpPNtpWWb8O9Fsz7pO8qt_pjBizUioZMZzEfqgAlk2K_2rAOzZBXGYdXK0FtByz84-tCAVyQ4kCyXWNSUh0X2TklEcKm0xsppXtEDYyAphT7nOyeZ6eDF9o-Pi_a3a6zXpeQiUCt69Tk3Ua_iQhY8d8tAlYU8mS7GGk4LZXvH-mvhuquYyfDzmYyxqkcoiMTj-LSEemVTYAIQDdVS_TGswiYX436iBKLyVI0FajaZBuLKFr_K0FlIV3RYQ";

/// An app whose clients all talk to `server`, without the OAuth middleware.
pub fn test_app(server: &MockServer) -> FirebaseApp {
    let client = ClientBuilder::new(Client::new()).build();
    FirebaseApp::from_parts(
        FirebaseAuth::new_with_client(client.clone(), server.url(AUTH_PATH)),
        FirebaseFirestore::new_with_url(client, server.url("/v1"), TEST_PROJECT),
        IdTokenVerifier::new_with_keys_url(TEST_PROJECT.to_string(), server.url(JWKS_PATH)),
        TEST_PROJECT.to_string(),
    )
}

pub fn jwks() -> Value {
    json!({
        "keys": [{
            "kty": "RSA",
            "alg": "RS256",
            "use": "sig",
            "kid": TEST_KID,
            "n": TEST_RSA_MODULUS,
            "e": "AQAB"
        }]
    })
}

pub fn id_token_claims(uid: &str) -> Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "aud": TEST_PROJECT,
        "iss": format!("https://securetoken.google.com/{}", TEST_PROJECT),
        "sub": uid,
        "user_id": uid,
        "email": format!("{}@clinic.test", uid),
        "iat": now,
        "exp": now + 3600,
        "auth_time": now,
    })
}

pub fn sign_claims(claims: &Value, kid: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(TEST_RSA_PRIVATE_KEY.as_bytes()).unwrap();
    encode(&header, claims, &key).unwrap()
}

pub fn sign_id_token(uid: &str) -> String {
    sign_claims(&id_token_claims(uid), TEST_KID)
}

/// A Firestore document body as returned by a GET.
pub fn document(path: &str, fields: Value) -> Value {
    json!({
        "name": format!("projects/{}/databases/(default)/documents/{}", TEST_PROJECT, path),
        "fields": fields,
        "createTime": "2025-01-01T00:00:00Z",
        "updateTime": "2025-01-01T00:00:00Z"
    })
}

pub fn commit_ok() -> Value {
    json!({
        "writeResults": [{
            "updateTime": "2025-01-01T00:00:01Z",
            "transformResults": [{ "timestampValue": "2025-01-01T00:00:01Z" }]
        }],
        "commitTime": "2025-01-01T00:00:01Z"
    })
}

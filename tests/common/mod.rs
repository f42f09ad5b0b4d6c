//! Shared harness: an in-memory drink menu served on an ephemeral port, and
//! RS256 tokens signed with the fixture key.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use drink_menu::auth::{KeySource, StaticJwks, TokenVerifier};
use drink_menu::drink::{DrinkStore, MemoryDrinkStore};
use drink_menu::gateway::{build_router, state::AppState};

pub const SIGNING_KEY: &str = include_str!("../fixtures/signing_key.pem");
pub const FOREIGN_KEY: &str = include_str!("../fixtures/foreign_key.pem");
pub const MODULUS: &str = include_str!("../fixtures/signing_key.n");
pub const KID: &str = "test-key";
pub const ISSUER: &str = "https://menu.example.com/";
pub const AUDIENCE: &str = "drinks";

pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// JWKS document publishing the fixture signing key.
pub fn jwks_json() -> Value {
    json!({"keys": [{
        "kty": "RSA",
        "kid": KID,
        "use": "sig",
        "alg": "RS256",
        "n": MODULUS.trim(),
        "e": "AQAB"
    }]})
}

pub fn static_keys() -> Arc<dyn KeySource> {
    Arc::new(StaticJwks::from_json(&jwks_json().to_string()).unwrap())
}

pub fn verifier_with(keys: Arc<dyn KeySource>) -> TokenVerifier {
    TokenVerifier::new(ISSUER, AUDIENCE, vec![Algorithm::RS256], keys)
}

/// Sign arbitrary claims with the fixture key.
pub fn sign_claims(claims: Value) -> String {
    sign_with(SIGNING_KEY, claims)
}

pub fn sign_with(pem: &str, claims: Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(KID.to_string());
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap();
    encode(&header, &claims, &key).unwrap()
}

/// A valid token granting `permissions`.
pub fn token(permissions: &[&str]) -> String {
    sign_claims(json!({
        "iss": ISSUER,
        "aud": AUDIENCE,
        "sub": "auth0|barista",
        "exp": now() + 3600,
        "permissions": permissions
    }))
}

pub struct TestServer {
    pub base_url: String,
    pub drinks: Arc<MemoryDrinkStore>,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Serve a fresh in-memory menu whose tokens are checked against the fixture key.
pub async fn spawn_app() -> TestServer {
    spawn_app_with_keys(static_keys()).await
}

pub async fn spawn_app_with_keys(keys: Arc<dyn KeySource>) -> TestServer {
    let drinks = Arc::new(MemoryDrinkStore::new());
    let base_url = serve(drinks.clone(), keys).await;
    TestServer {
        base_url,
        drinks,
        client: reqwest::Client::new(),
    }
}

/// Serve the router over an arbitrary store; returns the base URL.
pub async fn serve(store: Arc<dyn DrinkStore>, keys: Arc<dyn KeySource>) -> String {
    let state = Arc::new(AppState::new(store, Arc::new(verifier_with(keys)), None));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });
    format!("http://{}", addr)
}

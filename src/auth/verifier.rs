//! Bearer token verification against a JSON Web Key Set.
//!
//! The verifier resolves the signing key by the token's `kid`, then checks
//! signature, expiry, issuer and audience. Keys come from a [`KeySource`]:
//! normally [`RemoteJwks`], which fetches the identity provider's
//! `/.well-known/jwks.json` with a bounded timeout and an optional per-kid TTL
//! cache.

use async_trait::async_trait;
use cached::{Cached, TimedCache};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::claims::Claims;
use super::error::{AuthError, AuthErrorCode};
use crate::config::AuthConfig;

/// Where signing keys come from.
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Look up the key with the given key-id. `Ok(None)` means the set was
    /// retrieved but holds no such key.
    async fn find_key(&self, kid: &str) -> Result<Option<Jwk>, AuthError>;
}

/// Fixed, in-process key set.
#[derive(Debug, Clone)]
pub struct StaticJwks {
    set: JwkSet,
}

impl StaticJwks {
    pub fn new(set: JwkSet) -> Self {
        Self { set }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }
}

#[async_trait]
impl KeySource for StaticJwks {
    async fn find_key(&self, kid: &str) -> Result<Option<Jwk>, AuthError> {
        Ok(self.set.find(kid).cloned())
    }
}

/// Default floor between two key set fetches triggered by unknown key-ids.
pub const DEFAULT_MIN_REFRESH: Duration = Duration::from_secs(30);

struct KeyCache {
    keys: TimedCache<String, Jwk>,
    /// Completion time of the last successful fetch
    fetched_at: Option<Instant>,
}

/// JWKS fetched over HTTP(S).
///
/// With caching on, a key-id missing from the cache only triggers a fetch
/// when the last one is older than the refresh floor; otherwise it is
/// reported as unknown straight away.
pub struct RemoteJwks {
    url: String,
    client: reqwest::Client,
    /// `None` when caching is disabled: every lookup re-fetches.
    cache: Option<Mutex<KeyCache>>,
    min_refresh: Duration,
}

impl RemoteJwks {
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
        cache_ttl_secs: u64,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let cache = (cache_ttl_secs > 0).then(|| {
            Mutex::new(KeyCache {
                keys: TimedCache::with_lifespan(cache_ttl_secs),
                fetched_at: None,
            })
        });
        Ok(Self {
            url: url.into(),
            client,
            cache,
            min_refresh: DEFAULT_MIN_REFRESH,
        })
    }

    /// Set the floor between fetches caused by cache misses.
    pub fn with_min_refresh(mut self, min_refresh: Duration) -> Self {
        self.min_refresh = min_refresh;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        tracing::debug!("[jwks] Fetching key set from {}", self.url);
        let unavailable = |e: reqwest::Error| {
            tracing::error!("[jwks] Key set fetch from {} failed: {}", self.url, e);
            AuthError::from_code(AuthErrorCode::KeysUnavailable)
        };
        self.client
            .get(&self.url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(unavailable)?
            .json::<JwkSet>()
            .await
            .map_err(unavailable)
    }
}

#[async_trait]
impl KeySource for RemoteJwks {
    async fn find_key(&self, kid: &str) -> Result<Option<Jwk>, AuthError> {
        let Some(cache) = &self.cache else {
            return Ok(self.fetch().await?.find(kid).cloned());
        };

        // Held across the fetch: concurrent misses wait for one refresh.
        let mut cache = cache.lock().await;
        if let Some(jwk) = cache.keys.cache_get(kid) {
            return Ok(Some(jwk.clone()));
        }
        if let Some(at) = cache.fetched_at {
            if at.elapsed() < self.min_refresh {
                tracing::debug!("[jwks] Unknown kid {}, refresh not due", kid);
                return Ok(None);
            }
        }

        let set = self.fetch().await?;
        cache.fetched_at = Some(Instant::now());
        let found = set.find(kid).cloned();
        for key in set.keys {
            if let Some(id) = key.common.key_id.clone() {
                cache.keys.cache_set(id, key);
            }
        }
        Ok(found)
    }
}

/// Verifies bearer tokens and yields their claim set.
pub struct TokenVerifier {
    issuer: String,
    audience: String,
    algorithms: Vec<Algorithm>,
    keys: Arc<dyn KeySource>,
}

impl TokenVerifier {
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        algorithms: Vec<Algorithm>,
        keys: Arc<dyn KeySource>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            algorithms,
            keys,
        }
    }

    /// Verifier backed by the remote JWKS of the configured domain.
    pub fn from_config(config: &AuthConfig) -> Result<Self, reqwest::Error> {
        let jwks = RemoteJwks::new(
            config.jwks_url(),
            Duration::from_millis(config.jwks_timeout_ms),
            config.jwks_cache_ttl_secs,
        )?
        .with_min_refresh(Duration::from_secs(config.jwks_min_refresh_secs));
        tracing::info!(
            "Token verifier: issuer={}, audience={}, jwks={}",
            config.issuer(),
            config.audience,
            jwks.url()
        );
        Ok(Self::new(
            config.issuer(),
            config.audience.clone(),
            config.algorithms.clone(),
            Arc::new(jwks),
        ))
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header =
            decode_header(token).map_err(|_| AuthError::from_code(AuthErrorCode::MalformedToken))?;

        let kid = header
            .kid
            .ok_or_else(|| AuthError::from_code(AuthErrorCode::InvalidHeader))?;

        let jwk = self.keys.find_key(&kid).await?.ok_or_else(|| {
            AuthError::new(
                AuthErrorCode::InvalidHeader,
                "Unable to find the appropriate key.",
            )
        })?;

        let key = DecodingKey::from_jwk(&jwk).map_err(|e| {
            tracing::warn!("[jwks] Unusable key {}: {}", kid, e);
            AuthError::new(
                AuthErrorCode::InvalidHeader,
                "Unable to find the appropriate key.",
            )
        })?;

        let mut validation = Validation::new(header.alg);
        validation.algorithms = self.algorithms.clone();
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);

        let data = decode::<Map<String, Value>>(token, &key, &validation).map_err(|e| {
            let code = match e.kind() {
                ErrorKind::ExpiredSignature => AuthErrorCode::TokenExpired,
                ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => {
                    AuthErrorCode::InvalidClaims
                }
                _ => AuthErrorCode::MalformedToken,
            };
            tracing::debug!("Token rejected: {:?}", e);
            AuthError::from_code(code)
        })?;

        Ok(Claims::new(data.claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;
    use std::time::{SystemTime, UNIX_EPOCH};

    const SIGNING_KEY: &str = include_str!("../../tests/fixtures/signing_key.pem");
    const FOREIGN_KEY: &str = include_str!("../../tests/fixtures/foreign_key.pem");
    const MODULUS: &str = include_str!("../../tests/fixtures/signing_key.n");
    const ISSUER: &str = "https://menu.example.com/";
    const AUDIENCE: &str = "drinks";

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    fn verifier() -> TokenVerifier {
        let set = json!({"keys": [{
            "kty": "RSA",
            "kid": "test-key",
            "use": "sig",
            "alg": "RS256",
            "n": MODULUS.trim(),
            "e": "AQAB"
        }]});
        let jwks = StaticJwks::new(serde_json::from_value(set).unwrap());
        TokenVerifier::new(ISSUER, AUDIENCE, vec![Algorithm::RS256], Arc::new(jwks))
    }

    fn sign(pem: &str, kid: Option<&str>, claims: Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = kid.map(str::to_string);
        let key = EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap();
        encode(&header, &claims, &key).unwrap()
    }

    fn valid_claims() -> Value {
        json!({
            "iss": ISSUER,
            "aud": AUDIENCE,
            "sub": "auth0|manager",
            "exp": now() + 3600,
            "permissions": ["post:drinks"]
        })
    }

    #[tokio::test]
    async fn test_verify_valid_token() {
        let token = sign(SIGNING_KEY, Some("test-key"), valid_claims());
        let claims = verifier().verify(&token).await.unwrap();
        assert_eq!(claims.sub(), Some("auth0|manager"));
        assert!(claims.grants("post:drinks"));
    }

    #[tokio::test]
    async fn test_verify_garbage_token() {
        let err = verifier().verify("not-a-jwt").await.unwrap_err();
        assert_eq!(err.code, AuthErrorCode::MalformedToken);
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_verify_missing_kid() {
        let token = sign(SIGNING_KEY, None, valid_claims());
        let err = verifier().verify(&token).await.unwrap_err();
        assert_eq!(err.code, AuthErrorCode::InvalidHeader);
    }

    #[tokio::test]
    async fn test_verify_unknown_kid() {
        let token = sign(SIGNING_KEY, Some("rotated-away"), valid_claims());
        let err = verifier().verify(&token).await.unwrap_err();
        assert_eq!(err.code, AuthErrorCode::InvalidHeader);
        assert_eq!(err.description, "Unable to find the appropriate key.");
    }

    #[tokio::test]
    async fn test_verify_expired() {
        let mut claims = valid_claims();
        claims["exp"] = json!(now() - 3600);
        let token = sign(SIGNING_KEY, Some("test-key"), claims);
        let err = verifier().verify(&token).await.unwrap_err();
        assert_eq!(err.code, AuthErrorCode::TokenExpired);
    }

    #[tokio::test]
    async fn test_verify_wrong_audience() {
        let mut claims = valid_claims();
        claims["aud"] = json!("someone-else");
        let token = sign(SIGNING_KEY, Some("test-key"), claims);
        let err = verifier().verify(&token).await.unwrap_err();
        assert_eq!(err.code, AuthErrorCode::InvalidClaims);
    }

    #[tokio::test]
    async fn test_verify_wrong_issuer() {
        let mut claims = valid_claims();
        claims["iss"] = json!("https://evil.example.com/");
        let token = sign(SIGNING_KEY, Some("test-key"), claims);
        let err = verifier().verify(&token).await.unwrap_err();
        assert_eq!(err.code, AuthErrorCode::InvalidClaims);
    }

    #[tokio::test]
    async fn test_verify_bad_signature() {
        let token = sign(FOREIGN_KEY, Some("test-key"), valid_claims());
        let err = verifier().verify(&token).await.unwrap_err();
        assert_eq!(err.code, AuthErrorCode::MalformedToken);
    }

    #[tokio::test]
    async fn test_remote_jwks_unreachable_fails_fast() {
        // Nothing listens on port 9 (discard) in the test environment.
        let jwks = RemoteJwks::new(
            "http://127.0.0.1:9/.well-known/jwks.json",
            Duration::from_millis(500),
            0,
        )
        .unwrap();
        let err = jwks.find_key("test-key").await.unwrap_err();
        assert_eq!(err.code, AuthErrorCode::KeysUnavailable);
    }
}

//! Permission guard.
//!
//! Runs in front of protected handlers as an axum middleware:
//!
//! 1. Extract `Authorization: Bearer <token>`
//! 2. Verify the token ([`TokenVerifier`])
//! 3. Check the route's required permission against the claim set
//! 4. Inject [`Claims`] into request extensions for the handler

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::claims::Claims;
use super::error::{AuthError, AuthErrorCode};
use super::verifier::TokenVerifier;

/// Per-route middleware state: which permission the route requires.
#[derive(Clone)]
pub struct PermissionGate {
    pub verifier: Arc<TokenVerifier>,
    pub permission: &'static str,
}

impl PermissionGate {
    pub fn new(verifier: Arc<TokenVerifier>, permission: &'static str) -> Self {
        Self {
            verifier,
            permission,
        }
    }
}

/// Axum middleware enforcing a [`PermissionGate`].
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = authorize(request.headers(), gate.permission, &gate.verifier).await?;
    tracing::debug!(
        "Authorized {} for {} {}",
        claims.sub().unwrap_or("<no sub>"),
        request.method(),
        request.uri().path()
    );
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Full guard: header extraction, token verification, permission check.
pub async fn authorize(
    headers: &HeaderMap,
    permission: &str,
    verifier: &TokenVerifier,
) -> Result<Claims, AuthError> {
    let token = extract_bearer_token(headers)?;
    let claims = verifier.verify(token).await?;
    check_permissions(permission, &claims)?;
    Ok(claims)
}

/// Extract the token part of `Authorization: Bearer <token>`.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    if headers.is_empty() {
        return Err(AuthError::from_code(AuthErrorCode::MissingHeader));
    }

    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| {
            AuthError::new(
                AuthErrorCode::InvalidHeader,
                "Authorization information not provided",
            )
        })?
        .to_str()
        .map_err(|_| AuthError::from_code(AuthErrorCode::InvalidHeader))?;

    let parts: Vec<&str> = auth_header.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::from_code(AuthErrorCode::InvalidHeader)),
    }
}

/// Check that `permission` is granted by the claim set.
pub fn check_permissions(permission: &str, claims: &Claims) -> Result<(), AuthError> {
    if claims.is_empty() {
        return Err(AuthError::new(
            AuthErrorCode::TokenMalformed,
            "Payload is missing",
        ));
    }
    if !claims.has_permissions() {
        return Err(AuthError::from_code(AuthErrorCode::TokenMalformed));
    }
    if !claims.grants(permission) {
        return Err(AuthError::new(
            AuthErrorCode::Unauthorized,
            format!("Token lack permission: {}", permission),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn headers_with(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    #[test]
    fn test_extract_valid_bearer() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_extract_scheme_case_insensitive() {
        let headers = headers_with("bEaReR abc.def.ghi");
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_extract_no_headers() {
        let err = extract_bearer_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.code, AuthErrorCode::MissingHeader);
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_extract_no_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
        let err = extract_bearer_token(&headers).unwrap_err();
        assert_eq!(err.code, AuthErrorCode::InvalidHeader);
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_extract_malformed_headers() {
        for value in [
            "Bearer",
            "abc.def.ghi",
            "Bearer a b",
            "Basic abc.def.ghi",
            "Bearer  abc",
            "",
        ] {
            let err = extract_bearer_token(&headers_with(value)).unwrap_err();
            assert_eq!(err.code, AuthErrorCode::InvalidHeader, "value: {:?}", value);
        }
    }

    #[test]
    fn test_check_permissions_empty_payload() {
        let err = check_permissions("post:drinks", &Claims::default()).unwrap_err();
        assert_eq!(err.code, AuthErrorCode::TokenMalformed);
        assert_eq!(err.description, "Payload is missing");
    }

    #[test]
    fn test_check_permissions_missing_claim() {
        let claims: Claims = serde_json::from_value(json!({"sub": "x"})).unwrap();
        let err = check_permissions("post:drinks", &claims).unwrap_err();
        assert_eq!(err.code, AuthErrorCode::TokenMalformed);
    }

    #[test]
    fn test_check_permissions_lacking() {
        let claims: Claims =
            serde_json::from_value(json!({"permissions": ["get:drinks-detail"]})).unwrap();
        let err = check_permissions("delete:drinks", &claims).unwrap_err();
        assert_eq!(err.code, AuthErrorCode::Unauthorized);
        assert!(err.description.contains("delete:drinks"));
    }

    #[test]
    fn test_check_permissions_granted() {
        let claims: Claims =
            serde_json::from_value(json!({"permissions": ["patch:drinks"]})).unwrap();
        assert!(check_permissions("patch:drinks", &claims).is_ok());
    }
}

//! Bearer token authorization.
//!
//! ## Components
//! - `claims`: decoded token payload
//! - `error`: authorization error codes and descriptions
//! - `verifier`: JWKS-backed token verification
//! - `guard`: header parsing, permission check and axum middleware

pub mod claims;
pub mod error;
pub mod guard;
pub mod verifier;

pub use claims::Claims;
pub use error::{AuthError, AuthErrorCode};
pub use guard::{
    PermissionGate, authorize, check_permissions, extract_bearer_token, require_permission,
};
pub use verifier::{KeySource, RemoteJwks, StaticJwks, TokenVerifier};

/// Permission strings understood by the drink routes.
pub mod permissions {
    pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
    pub const POST_DRINKS: &str = "post:drinks";
    pub const PATCH_DRINKS: &str = "patch:drinks";
    pub const DELETE_DRINKS: &str = "delete:drinks";
}

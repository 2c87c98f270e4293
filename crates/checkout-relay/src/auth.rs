//! Bearer-token gate for operator endpoints.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::RelayError;

/// Compare two secrets without leaking their content or length through timing.
fn secrets_match(presented: &[u8], expected: &[u8]) -> bool {
    Sha256::digest(presented)
        .ct_eq(&Sha256::digest(expected))
        .into()
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Check the request's `Authorization: Bearer` header against `expected`.
///
/// With no token configured every request passes.
pub fn require_bearer(headers: &HeaderMap, expected: Option<&str>) -> Result<(), RelayError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    match bearer_token(headers) {
        Some(token) if secrets_match(token.as_bytes(), expected.as_bytes()) => Ok(()),
        Some(_) => Err(RelayError::Unauthorized("invalid bearer token")),
        None => Err(RelayError::Unauthorized("bearer token required")),
    }
}

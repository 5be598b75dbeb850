//! Inbound bearer-token check.

use axum::http::{HeaderMap, header};
use dart::{DartError, Result};

/// Checks `Authorization: Bearer <token>` against the configured token.
///
/// With no configured token every request passes. A missing or non-bearer
/// header is [`DartError::Unauthenticated`]; a wrong token is
/// [`DartError::Unauthorized`].
pub fn check_bearer(expected: Option<&str>, headers: &HeaderMap) -> Result<()> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            let (scheme, token) = value.split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
        })
        .ok_or_else(|| {
            DartError::Unauthenticated("Missing Authorization: Bearer <token>".to_string())
        })?;

    if presented == expected {
        Ok(())
    } else {
        Err(DartError::Unauthorized("Invalid bearer token".to_string()))
    }
}

//! Bearer-token verification for the inbound event webhook.

/// Errors that can occur while authenticating an inbound webhook call.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("bearer token verification failed")]
    BearerVerificationFailed,

    #[error("missing authentication: {0}")]
    MissingAuth(String),
}

/// Verify a bearer token using constant-time comparison.
///
/// `provided` may carry the `Bearer ` prefix.
pub fn verify_bearer_token(expected: &str, provided: &str) -> Result<(), WebhookError> {
    let token = provided.strip_prefix("Bearer ").unwrap_or(provided);

    if constant_time_eq(expected.as_bytes(), token.as_bytes()) {
        Ok(())
    } else {
        Err(WebhookError::BearerVerificationFailed)
    }
}

/// Check an `Authorization` header against the configured token, if any.
///
/// With no token configured every request is accepted.
pub fn authorize(expected: Option<&str>, authorization: Option<&str>) -> Result<(), WebhookError> {
    let Some(expected) = expected.filter(|t| !t.is_empty()) else {
        return Ok(());
    };
    let provided = authorization
        .ok_or_else(|| WebhookError::MissingAuth("Authorization header".to_string()))?;
    verify_bearer_token(expected, provided)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

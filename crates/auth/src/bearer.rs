use crate::{AuthError, UnauthorizedReason};

const BEARER_PREFIX: &str = "bearer ";

/// Extracts the token from an `Authorization` header value.
///
/// Accepts both `Bearer <token>` (scheme matched case-insensitively) and a raw
/// token. Every protected route goes through this routine.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.map(str::trim).unwrap_or_default();

    let token = match value.get(..BEARER_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(BEARER_PREFIX) => {
            value.get(BEARER_PREFIX.len()..).unwrap_or_default().trim()
        }
        // A bare scheme with nothing after it.
        _ if value.eq_ignore_ascii_case(BEARER_PREFIX.trim_end()) => "",
        _ => value,
    };

    if token.is_empty() {
        return Err(AuthError::Unauthorized(UnauthorizedReason::Missing));
    }
    Ok(token)
}

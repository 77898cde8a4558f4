//! Field-level checks shared by record `validate` hooks.

use crate::error::ValidationError;

/// Require an absolute `http`/`https` URL with a host.
///
/// # Errors
/// Returns [`ValidationError::InvalidUrl`] naming `field`.
pub fn validate_http_url(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let parsed = url::Url::parse(value.trim())
        .map_err(|err| ValidationError::InvalidUrl { field, reason: err.to_string() })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::InvalidUrl {
            field,
            reason: format!("unsupported scheme `{}`", parsed.scheme()),
        });
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ValidationError::InvalidUrl { field, reason: "missing host".to_string() });
    }

    Ok(())
}

/// # Errors
/// Returns [`ValidationError::OutOfRange`] when `value` is outside `[min, max]`.
pub fn validate_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange { field, min, max })
    }
}

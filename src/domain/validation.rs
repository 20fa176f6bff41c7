//! Input validation for link creation.
//!
//! Validation is a plain function over plain values so it can be shared by the
//! HTTP layer, the admin CLI and tests without any framework binding.

use serde_json::{Value, json};
use url::Url;

use crate::utils::code_generator::{MAX_CODE_LENGTH, MIN_CODE_LENGTH, validate_custom_code};

/// Longest destination URL accepted.
pub const MAX_URL_LENGTH: usize = 2048;

/// A single reason why a creation request was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkViolation {
    #[error("URL must not be empty")]
    EmptyUrl,

    #[error("URL must be at most {} characters", MAX_URL_LENGTH)]
    UrlTooLong { length: usize },

    #[error("Invalid URL format")]
    MalformedUrl(String),

    #[error("Only http and https URLs are allowed")]
    UnsupportedScheme(String),

    #[error("Code must be {}-{} alphanumeric characters", MIN_CODE_LENGTH, MAX_CODE_LENGTH)]
    CodeLength { length: usize },

    #[error("Code must be {}-{} alphanumeric characters", MIN_CODE_LENGTH, MAX_CODE_LENGTH)]
    CodeCharacters { code: String },

    #[error("This code is reserved")]
    ReservedCode { code: String },
}

impl LinkViolation {
    /// Machine-readable details attached to the 400 response.
    pub fn details(&self) -> Value {
        match self {
            LinkViolation::EmptyUrl => json!({ "field": "url" }),
            LinkViolation::UrlTooLong { length } => {
                json!({ "field": "url", "length": length, "max_length": MAX_URL_LENGTH })
            }
            LinkViolation::MalformedUrl(reason) => json!({ "field": "url", "reason": reason }),
            LinkViolation::UnsupportedScheme(scheme) => {
                json!({ "field": "url", "scheme": scheme })
            }
            LinkViolation::CodeLength { length } => json!({
                "field": "code",
                "length": length,
                "min_length": MIN_CODE_LENGTH,
                "max_length": MAX_CODE_LENGTH,
            }),
            LinkViolation::CodeCharacters { code } | LinkViolation::ReservedCode { code } => {
                json!({ "field": "code", "code": code })
            }
        }
    }
}

/// A creation request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLink {
    /// Destination exactly as submitted, minus surrounding whitespace.
    pub url: String,
    pub code: Option<String>,
}

/// Validates a destination URL and an optional custom code.
///
/// The URL must parse as an absolute `http` or `https` URL with a host.
/// The code, when present, must satisfy [`validate_custom_code`].
///
/// # Errors
///
/// Returns the first [`LinkViolation`] found, URL checks first.
pub fn validate_create_link(
    url: &str,
    code: Option<&str>,
) -> Result<ValidatedLink, LinkViolation> {
    let url = validate_url(url)?;

    if let Some(code) = code {
        validate_custom_code(code)?;
    }

    Ok(ValidatedLink {
        url,
        code: code.map(str::to_string),
    })
}

fn validate_url(input: &str) -> Result<String, LinkViolation> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(LinkViolation::EmptyUrl);
    }

    if trimmed.len() > MAX_URL_LENGTH {
        return Err(LinkViolation::UrlTooLong {
            length: trimmed.len(),
        });
    }

    let parsed = Url::parse(trimmed).map_err(|e| LinkViolation::MalformedUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(LinkViolation::UnsupportedScheme(other.to_string())),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(LinkViolation::MalformedUrl("URL has no host".to_string()));
    }

    Ok(trimmed.to_string())
}

//! Short code generation and validation utilities.
//!
//! Generated and custom codes share one alphabet (`[A-Za-z0-9]`) and one
//! length window, so any generated code is also a valid custom code.

use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

use crate::domain::validation::LinkViolation;

/// Alphabet for generated codes.
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Default length of generated codes.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Shortest accepted code.
pub const MIN_CODE_LENGTH: usize = 6;

/// Longest accepted code.
pub const MAX_CODE_LENGTH: usize = 8;

/// Codes that would collide with fixed routes.
const RESERVED_CODES: &[&str] = &["healthz"];

static CODE_CHARS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("static regex is valid"));

/// Generates a random alphanumeric code of `length` characters.
///
/// Uniqueness is not checked here; the link store rejects duplicates.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(6);
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();

    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 6-8 characters
/// - Allowed characters: ASCII letters and digits (case-sensitive)
/// - Cannot be a reserved route name
///
/// # Errors
///
/// Returns the matching [`LinkViolation`] for the first rule broken.
pub fn validate_custom_code(code: &str) -> Result<(), LinkViolation> {
    let length = code.chars().count();
    if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&length) {
        return Err(LinkViolation::CodeLength { length });
    }

    if !CODE_CHARS_REGEX.is_match(code) {
        return Err(LinkViolation::CodeCharacters {
            code: code.to_string(),
        });
    }

    if RESERVED_CODES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(code))
    {
        return Err(LinkViolation::ReservedCode {
            code: code.to_string(),
        });
    }

    Ok(())
}

/// Returns true if `code` could name a stored link.
///
/// Lookups use this to answer "not found" without touching the store.
pub fn is_well_formed_code(code: &str) -> bool {
    validate_custom_code(code).is_ok()
}

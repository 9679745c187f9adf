//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use chrono::{DateTime, SubsecRound, Utc};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

const NAME_MIN_CHARS: usize = 3;
const NAME_MAX_CHARS: usize = 64;
const EMAIL_MAX_CHARS: usize = 254;

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidInput(format!("invalid {label} id")))
}

/// Current instant truncated to whole seconds, the precision the store keeps.
pub(crate) fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Convert stored epoch seconds back into a UTC instant.
pub(crate) fn from_epoch(seconds: i64, label: &str) -> ResultEngine<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| EngineError::InvalidInput(format!("invalid {label} timestamp")))
}

pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Validate a display name.
///
/// The trimmed name must be 3 to 64 characters long, start and end with a
/// letter and contain only letters, spaces, `.`, `'` or `-` in between.
pub(crate) fn normalize_user_name(value: &str) -> ResultEngine<String> {
    let name = value.trim();
    let len = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        return Err(EngineError::InvalidInput(format!(
            "name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"
        )));
    }

    let first = name.chars().next();
    let last = name.chars().next_back();
    if !first.is_some_and(char::is_alphabetic) || !last.is_some_and(char::is_alphabetic) {
        return Err(EngineError::InvalidInput(
            "name must start and end with a letter".to_string(),
        ));
    }

    let valid_inner = name
        .chars()
        .all(|c| c.is_alphabetic() || matches!(c, ' ' | '.' | '\'' | '-'));
    if !valid_inner {
        return Err(EngineError::InvalidInput(
            "name may only contain letters, spaces, dots, apostrophes and hyphens".to_string(),
        ));
    }

    Ok(name.to_string())
}

/// Normalize an email address for storage and lookup (trim, NFKC, lowercase)
/// and check its basic shape.
pub(crate) fn normalize_email(value: &str) -> ResultEngine<String> {
    let email: String = value.trim().nfkc().collect::<String>().to_lowercase();
    let invalid = || EngineError::InvalidInput("invalid email address".to_string());

    if email.is_empty() || email.chars().count() > EMAIL_MAX_CHARS {
        return Err(invalid());
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }

    Ok(email)
}

//! Shared field validators.

use super::state::ValidationError;

/// Trims and validates a free-text field against inclusive character bounds.
///
/// Too-short (or empty) input is rejected outright; too-long input returns
/// the recoverable [`ValidationError::TooLong`] so the user's text is kept
/// for correction.
pub(crate) fn required_text(
    field: &'static str,
    input: &str,
    min_chars: usize,
    max_chars: usize,
) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    let count = trimmed.chars().count();
    if count < min_chars {
        return Err(ValidationError::Rejected(format!(
            "{field} must be at least {min_chars} characters"
        )));
    }
    if count > max_chars {
        return Err(ValidationError::TooLong(format!(
            "{field} must be at most {max_chars} characters (you sent {count}) — please shorten it"
        )));
    }
    Ok(trimmed.to_string())
}

/// Parses a whole number and checks it against an inclusive range.
///
/// Spaces and underscores are tolerated as digit grouping.
pub(crate) fn bounded_number(
    field: &'static str,
    input: &str,
    min: u64,
    max: u64,
) -> Result<u64, ValidationError> {
    let digits: String = input
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '_'))
        .collect();
    let value: u64 = digits.parse().map_err(|_| {
        ValidationError::Rejected(format!("{field} must be a whole number"))
    })?;
    if value < min || value > max {
        return Err(ValidationError::Rejected(format!(
            "{field} must be between {min} and {max}"
        )));
    }
    Ok(value)
}

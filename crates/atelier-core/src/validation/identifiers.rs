//! Identifier validation for create requests.
//!
//! Request DTOs carry identifiers as strings exactly as callers supply them.
//! They are checked here, before any store or storage call, and turned into
//! typed `Uuid`s.

use std::borrow::Cow;

use uuid::Uuid;
use validator::ValidationError;

use crate::error::AppError;

/// `validator` custom rule: the value must contain something other than whitespace.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(Cow::Borrowed("must not be empty or whitespace"));
        return Err(err);
    }
    Ok(())
}

/// Parse a required identifier, rejecting empty and whitespace-only values.
pub fn parse_required_id(field: &str, value: &str) -> Result<Uuid, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required", field)));
    }
    Uuid::parse_str(trimmed)
        .map_err(|_| AppError::InvalidInput(format!("{} is not a valid id: {}", field, trimmed)))
}

/// Parse an optional identifier; blank strings count as absent.
pub fn parse_optional_id(field: &str, value: Option<&str>) -> Result<Option<Uuid>, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_required_id(field, v).map(Some),
    }
}

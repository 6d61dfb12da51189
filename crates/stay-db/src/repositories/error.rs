//! Error handling utilities for repositories

use sqlx::Error as SqlxError;
use stay_core::error::DomainError;

/// SQLSTATE raised when an EXCLUDE constraint rejects a row
const EXCLUSION_VIOLATION: &str = "23P01";

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    map_db_error(e)
}

/// Check for exclusion-constraint violation and return appropriate error or fallback
pub fn map_exclusion_violation<F>(e: SqlxError, on_exclusion: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.code().as_deref() == Some(EXCLUSION_VIOLATION) {
            return on_exclusion();
        }
    }
    map_db_error(e)
}

/// Escape `%`, `_` and `\` so user text matches literally inside ILIKE
pub fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

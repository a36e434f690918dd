//! Error taxonomy shared by every layer of the consolidation engine.
//!
//! Most of these variants are never returned to a caller as a hard failure:
//! per the policy table they are logged at the point they occur and
//! processing continues. `CoreError` exists so every layer speaks the same
//! vocabulary, not so every layer unwinds on it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed inventory row {row_id}: {reason}")]
    MalformedRow { row_id: String, reason: String },

    #[error("invalid day expression: {0:?}")]
    InvalidDayExpression(String),

    #[error("user classes on one regulation disagree on is_except")]
    InvalidUserClassMix,

    #[error("conflicting rules cannot cohabit on the same sign: {0} vs {1}")]
    ConflictingRules(String, String),
}

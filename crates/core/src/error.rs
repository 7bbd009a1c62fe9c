//! Errors raised while interpreting user-supplied values.

use thiserror::Error;

/// Rejected input: a route parameter that is not an id, a form field name
/// that does not exist.
///
/// Transport and storage failures have their own error types in the crates
/// that perform them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_offending_value() {
        assert_eq!(
            DomainError::validation("unknown user field 'nick'").to_string(),
            "validation failed: unknown user field 'nick'"
        );
        assert_eq!(
            DomainError::invalid_id("UserId: abc").to_string(),
            "invalid identifier: UserId: abc"
        );
    }
}

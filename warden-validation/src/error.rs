// Validation errors

use thiserror::Error;

/// Hard failures of a validation pass.
///
/// A field failing its rules is not an error; it is recorded on the
/// [`Validation`](crate::Validation) and reported by `errors()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A rule could not be resolved to something callable
    #[error("cannot resolve rule `{rule}`: {reason}")]
    RuleResolution { rule: String, reason: String },
}

impl ValidationError {
    pub(crate) fn unresolved(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::RuleResolution {
            rule: rule.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;

use thiserror::Error;

use crate::rule::RuleId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("index {index} out of range, the table holds {len} rules")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("rule {index} is a built-in command")]
    ProtectedRule { index: usize },

    #[error("no rule with id {0}")]
    UnknownRule(RuleId),
}

pub type Result<T> = std::result::Result<T, RuleError>;

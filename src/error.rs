//! Error types for tree traversal
//!
//! Every failure here is a configuration or caller error. Nothing is retried
//! and the trail is left untouched when one is returned.

use thiserror::Error;

/// Error type for registry, resolver and trail operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrailError {
    /// A string junction reference names no partial
    #[error("unknown partial '{0}'")]
    UnknownPartial(String),

    /// No branch, wildcard included, matches the value
    #[error("no path found for '{0}'")]
    NoPath(String),

    /// A fixed option offers no choice with this value
    #[error("no choice found with value '{0}'")]
    ChoiceNotFound(String),

    /// A junction names an option missing from the registry
    #[error("unknown option '{0}'")]
    UnknownOption(String),

    /// An auto-skip chain or cascade ran past the step limit
    #[error("gave up after {0} chained steps; the tree probably loops through implicit junctions")]
    CycleDetected(usize),

    /// An option definition breaks a registry invariant
    #[error("invalid option '{name}': {reason}")]
    InvalidOption { name: String, reason: String },

    /// `retreat` was pointed at a decision that is not on the trail
    #[error("no decision at index {0}")]
    NoSuchDecision(usize),
}

pub type Result<T> = std::result::Result<T, TrailError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_value() {
        assert_eq!(
            TrailError::NoPath("bogus".to_string()).to_string(),
            "no path found for 'bogus'"
        );
        assert_eq!(
            TrailError::ChoiceNotFound("x".to_string()).to_string(),
            "no choice found with value 'x'"
        );
        let err = TrailError::InvalidOption {
            name: "size".to_string(),
            reason: "choices must not be empty".to_string(),
        };
        assert_eq!(err.to_string(), "invalid option 'size': choices must not be empty");
    }
}

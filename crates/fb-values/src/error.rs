//! Error types for value store access.

use thiserror::Error;

use crate::kind::ScalarKind;

/// Result type for value store operations.
pub type ValueResult<T> = Result<T, ValueError>;

/// Errors raised by typed value and reference stores.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Kind index outside of that kind's sequence.
    #[error("Index out of range for {kind} values (index={index}, len={len})")]
    Index {
        kind: ScalarKind,
        index: usize,
        len: usize,
    },

    /// Two stores that must be positionally aligned disagree on a kind's length.
    #[error("Length mismatch for {kind} values (expected={expected}, actual={actual})")]
    LengthMismatch {
        kind: ScalarKind,
        expected: usize,
        actual: usize,
    },

    /// A dynamically kinded value was stored into a sequence of another kind.
    #[error("Kind mismatch: expected {expected} value, got {actual}")]
    KindMismatch {
        expected: ScalarKind,
        actual: ScalarKind,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValueError::Index {
            kind: ScalarKind::Integer,
            index: 4,
            len: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("Int"));
        assert!(msg.contains("index=4"));
    }
}

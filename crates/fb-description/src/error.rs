//! Error types for model descriptions and classification.

use fb_values::{ScalarKind, ValueRef};
use thiserror::Error;

/// Malformed variable declarations detected while classifying references.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    /// The same reference is declared twice for one kind.
    #[error("Duplicate {kind} value reference {reference} (variable '{name}')")]
    DuplicateReference {
        name: String,
        kind: ScalarKind,
        reference: ValueRef,
    },

    /// Two variables share one name.
    #[error("Duplicate variable name '{name}'")]
    DuplicateName { name: String },

    /// A start value does not match the variable's declared kind.
    #[error("Start value of '{name}' is {actual}, declared as {expected}")]
    StartKindMismatch {
        name: String,
        expected: ScalarKind,
        actual: ScalarKind,
    },
}

pub type DescriptionResult<T> = Result<T, DescriptionError>;

#[derive(Debug, Error)]
pub enum DescriptionError {
    #[error("Classification error: {0}")]
    Classification(#[from] ClassificationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

//! Error types for component adapter operations.

use std::path::PathBuf;

use fb_core::FbError;
use fb_description::ClassificationError;
use fb_values::ValueError;
use thiserror::Error;

use crate::lifecycle::LifecycleState;
use crate::native::Status;
use crate::plan::PlanError;

/// Errors surfaced by a component adapter.
///
/// Native failures are never retried or downgraded; after any error the
/// adapter stays in its last reached lifecycle state.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Binding to the image or instantiating the model failed.
    #[error("Failed to load component from {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    /// The native initialize call reported worse than a warning.
    #[error("Initialization rejected by component (status {status})")]
    Initialization { status: Status },

    /// A get/set/step/event call reported worse than a warning.
    #[error("Native call {operation} failed with status {status}")]
    NativeCall {
        operation: &'static str,
        status: Status,
    },

    /// Out-of-range or misaligned value store access.
    #[error("Value store error: {0}")]
    Value(#[from] ValueError),

    #[error("Classification error: {0}")]
    Classification(#[from] ClassificationError),

    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },

    /// Operation called outside the lifecycle states that permit it.
    #[error("Operation {operation} not allowed while {state}")]
    InvalidState {
        operation: &'static str,
        state: LifecycleState,
    },

    #[error("Buffer length mismatch for {what} (expected={expected}, actual={actual})")]
    BufferLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// Process-wide resources such as component ids ran out.
    #[error(transparent)]
    Core(#[from] FbError),
}

pub type AdapterResult<T> = Result<T, AdapterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = AdapterError::NativeCall {
            operation: "get_real",
            status: Status::Error,
        };
        let msg = err.to_string();
        assert!(msg.contains("get_real"));
        assert!(msg.contains("error"));

        let err = AdapterError::Load {
            path: PathBuf::from("/tmp/model.fmu"),
            reason: "instantiation failed".into(),
        };
        assert!(err.to_string().contains("/tmp/model.fmu"));
    }

    #[test]
    fn value_error_conversion() {
        let err: AdapterError = ValueError::Index {
            kind: fb_values::ScalarKind::Real,
            index: 3,
            len: 1,
        }
        .into();
        assert!(matches!(err, AdapterError::Value(ValueError::Index { index: 3, .. })));
    }

    #[test]
    fn exhausted_ids_surface_as_core_error() {
        let err: AdapterError = FbError::Exhausted {
            what: "component ids",
        }
        .into();
        assert!(matches!(err, AdapterError::Core(FbError::Exhausted { .. })));
        assert!(err.to_string().contains("component ids"));
    }
}

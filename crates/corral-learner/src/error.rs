//! Error types for the learner runtime.
//!
//! Native-boundary failures are never swallowed or retried here; they
//! propagate to the immediate caller. The one internally absorbed case is a
//! second `close()` on an already-closed learner, which is a no-op.

use thiserror::Error;

use crate::prediction::PredictionType;

/// Result type alias for learner operations.
pub type LearnerResult<T> = Result<T, LearnerError>;

/// Error type for all learner runtime operations.
#[derive(Error, Debug)]
pub enum LearnerError {
    // ========== Module Loading Errors ==========
    /// The current OS family or pointer width has no packaged engine module.
    #[error("unsupported platform: {os} ({pointer_width}-bit)")]
    UnsupportedPlatform { os: String, pointer_width: u32 },

    /// No engine module was found in any packaged resource location.
    #[error("engine module not found; searched: {searched}")]
    ModuleNotFound { searched: String },

    /// The engine module was found but could not be loaded or is missing
    /// required entry points.
    #[error("engine module load failed: {0}")]
    Load(String),

    // ========== Learner Creation Errors ==========
    /// The engine rejected the configuration.
    #[error("engine initialization failed: {0}")]
    Initialization(String),

    /// The engine reported an output type this runtime does not recognize.
    #[error("unknown prediction type for command: {command}")]
    UnknownPredictionType { command: String },

    /// A learner was narrowed to a variant that does not match its actual
    /// output type. The learner is closed when this error is returned.
    #[error("prediction type mismatch: expected {expected}, actual {actual}")]
    TypeMismatch {
        expected: PredictionType,
        actual: PredictionType,
    },

    // ========== Handle Lifecycle Errors ==========
    /// An operation was attempted on a closed learner.
    #[error("learner is closed")]
    Closed,

    /// A native engine call failed.
    #[error("engine {operation} failed: {message}")]
    Native { operation: String, message: String },

    /// A host-side argument could not cross the native boundary
    /// (for example an interior NUL byte in an example line or path).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // ========== I/O Errors ==========
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unsupported_platform() {
        let err = LearnerError::UnsupportedPlatform {
            os: "freebsd".to_string(),
            pointer_width: 64,
        };
        let msg = err.to_string();
        assert!(msg.contains("freebsd"));
        assert!(msg.contains("64"));
    }

    #[test]
    fn test_error_display_module_not_found() {
        let err = LearnerError::ModuleNotFound {
            searched: "/opt/lib/libole.Linux.so, lib/libole.so".to_string(),
        };
        assert!(err.to_string().contains("libole.Linux.so"));
    }

    #[test]
    fn test_error_display_type_mismatch() {
        let err = LearnerError::TypeMismatch {
            expected: PredictionType::Scalar,
            actual: PredictionType::Multiclass,
        };
        let msg = err.to_string();
        assert!(msg.contains("Scalar"));
        assert!(msg.contains("Multiclass"));
    }

    #[test]
    fn test_error_display_native() {
        let err = LearnerError::Native {
            operation: "save_model".to_string(),
            message: "disk full".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("save_model"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LearnerError = io_err.into();
        assert!(matches!(err, LearnerError::Io(_)));
    }

    #[test]
    fn test_learner_result_type_alias() {
        fn example_fn() -> LearnerResult<u32> {
            Ok(42)
        }
        assert_eq!(example_fn().unwrap(), 42);
    }
}

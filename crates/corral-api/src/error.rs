//! Error types for configuration and example assembly.

use thiserror::Error;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error type for command assembly, example assembly, and model utilities.
#[derive(Error, Debug)]
pub enum ApiError {
    // ========== Example Format Errors ==========
    /// A namespace name is empty or contains control characters.
    #[error("invalid namespace name: {0:?}")]
    InvalidNamespace(String),

    /// Two namespaces share a first character while uniqueness checking is
    /// on. The engine's interaction options address namespaces by first
    /// character only.
    #[error("namespaces {namespace:?} and {existing:?} share a first character; \
             use ExampleBuilder::without_namespace_check() to allow this")]
    DuplicateNamespaceFirstChar { namespace: String, existing: String },

    /// A feature name contains whitespace, ':' or '|'.
    #[error("invalid feature name in namespace {namespace:?}: {feature:?}")]
    InvalidFeature { namespace: String, feature: String },

    /// An example tag contains control characters.
    #[error("invalid example tag: {0:?}")]
    InvalidTag(String),

    /// A label, importance or feature value is NaN or infinite.
    #[error("{context} must be finite, got {value}")]
    NonFiniteValue { context: &'static str, value: f64 },

    /// A label was requested from an example that has none.
    #[error("example has no label")]
    MissingLabel,

    /// A label string could not be read back as a number.
    #[error("label is not numeric: {0:?}")]
    InvalidLabel(String),

    // ========== Passthrough Errors ==========
    /// Learner runtime error from a build terminal or model utility.
    #[error(transparent)]
    Learner(#[from] corral_learner::LearnerError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

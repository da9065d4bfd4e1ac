//! Progressive validation metrics for online learning.
//!
//! Online learners see each example once; progressive validation scores the
//! prediction made for an example against its label at the moment the
//! example arrives, before the model updates on it. The running scores
//! converge to held-out-set quality without splitting the stream.
//!
//! Every metric here updates in O(1) per example and holds O(1) state.
//!
//! # Example
//!
//! ```
//! use corral_validation::Metrics;
//!
//! let mut metrics = Metrics::regression(0);
//! metrics.update(0.9, 1.0);
//! metrics.update(1.1, 1.0);
//! let scores = metrics.scores();
//! assert!(scores["RMSE"] < 0.2);
//! ```

pub mod aggregate;
pub mod classification;
pub mod progressive;
pub mod regression;

// Re-exports for convenience
pub use aggregate::Metrics;
pub use classification::{Accuracy, FScore, LogLoss, Precision, Recall};
pub use progressive::ProgressiveValidation;
pub use regression::{Mae, Mape, Rmse};

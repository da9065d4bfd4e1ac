//! Safe learner runtime over the native online-learning engine.
//!
//! The engine is a natively-implemented library addressed through a C ABI;
//! this crate owns everything needed to use it safely from Rust: loading
//! the packaged platform module exactly once per process, turning a textual
//! configuration into an opaque resource handle, resolving at runtime which
//! output type that resource produces, and wrapping it in a typed learner
//! that cannot leak, double-free, or touch a closed resource.
//!
//! # Architecture
//!
//! - **loader**: once-per-process location, extraction and loading of the
//!   engine module
//! - **ffi**: the engine's C ABI surface (all entry-point declarations)
//! - **prediction**: output-type tags and the typed prediction values
//! - **learner**: the closed set of typed learner variants
//! - **factory**: configuration → learner construction and type dispatch
//! - **error**: error taxonomy with `LearnerError`
//!
//! # Example
//!
//! ```no_run
//! use corral_learner::create;
//!
//! let mut learner = create("--quiet")?.into_scalar()?;
//! learner.learn("1 |features price:0.23 sqft:0.25")?;
//! let prediction = learner.predict("|features price:0.23 sqft:0.25")?;
//! learner.close()?;
//! # Ok::<(), corral_learner::LearnerError>(())
//! ```
//!
//! # Threading
//!
//! Learner creation is safe from any number of threads; the module load
//! happens once. A single learner must stay on one thread at a time (its
//! operations take `&mut self`); independent learners are isolated and run
//! concurrently without coordination.

pub mod error;
pub mod factory;
pub mod ffi;
pub mod learner;
pub mod loader;
pub mod prediction;

mod handle;
#[cfg(test)]
pub(crate) mod stub_engine;

// Re-exports for convenience
pub use error::{LearnerError, LearnerResult};
pub use factory::{create, create_from_args, COMMAND_PLACEHOLDER};
pub use learner::{
    ActionProbsLearner, ActionScoresLearner, Learner, MulticlassLearner, MultilabelsLearner,
    ProbLearner, ScalarLearner, ScalarsLearner,
};
pub use loader::{engine_available, ensure_loaded};
pub use prediction::{ActionProb, ActionScore, PredictionType};

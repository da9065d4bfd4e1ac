//! Configuration builder and example serializer for the corral learner
//! runtime.
//!
//! Everything this crate produces crosses into `corral-learner` as opaque
//! text: the [`CommandBuilder`] assembles the argument vector a learner is
//! created from, and the [`ExampleBuilder`] renders single example lines in
//! the engine's input format. Neither side interprets the other's output.
//!
//! # Example
//!
//! ```no_run
//! use corral_api::{CommandBuilder, ExampleBuilder, Loss};
//!
//! let mut learner = CommandBuilder::new()
//!     .loss_function(Loss::Logistic)
//!     .build_scalar_learner()?;
//!
//! let mut example = ExampleBuilder::new();
//! example.binary_label(true);
//! example.namespace("features")?.numerical("price", 0.23)?;
//! learner.learn(&example.build())?;
//! # Ok::<(), corral_api::ApiError>(())
//! ```

pub mod command;
pub mod error;
pub mod example;
pub mod model;

// Re-exports for convenience
pub use command::{CommandBuilder, Hash, Ldf, Link, Loss};
pub use error::{ApiError, ApiResult};
pub use example::{ExampleBuilder, NamespaceBuilder};
pub use model::count_nonzero_weights;

//! Utilities over saved model files.

use std::path::Path;

use crate::command::CommandBuilder;
use crate::error::ApiResult;

/// Count the non-zero weights in a saved model.
///
/// Loads the model through the engine, dumps it in readable form into a
/// scratch file and counts the dumped lines. Needs the packaged engine
/// module, like any learner creation.
///
/// # Errors
///
/// Fails when the engine cannot be loaded, the model cannot be read, or the
/// scratch dump cannot be written.
pub fn count_nonzero_weights<P: AsRef<Path>>(model: P) -> ApiResult<u64> {
    let scratch = tempfile::Builder::new()
        .prefix("readable-model")
        .suffix(".txt")
        .tempfile()?;
    CommandBuilder::new()
        .initial_regressor(model.as_ref())
        .readable_model(scratch.path())
        .build_scalar_learner()?
        .close()?;
    let dump = std::fs::read_to_string(scratch.path())?;
    Ok(dump.lines().count() as u64)
}

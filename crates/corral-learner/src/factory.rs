//! The single entry point for creating learners.
//!
//! A configuration (command string or argument vector) is handed to the
//! engine, which materializes a resource and reports its output type; the
//! factory wraps the resource in the matching variant. A resource whose
//! reported type is unrecognized is closed here, before the error is
//! returned, because no variant will ever own it.

use std::ffi::CString;
use std::os::raw::{c_char, c_int};

use tracing::debug;

use crate::error::{LearnerError, LearnerResult};
use crate::ffi::{EngineApi, RawHandle};
use crate::handle::LearnerHandle;
use crate::learner::{
    ActionProbsLearner, ActionScoresLearner, Learner, MulticlassLearner, MultilabelsLearner,
    ProbLearner, ScalarLearner, ScalarsLearner,
};
use crate::loader;
use crate::prediction::PredictionType;

/// Conventional program-name token the engine ignores.
pub const COMMAND_PLACEHOLDER: &str = "corral";

/// Create a learner from a configuration command string.
///
/// The string is split on whitespace and prefixed with the conventional
/// program-name placeholder. Use [`create_from_args`] when an option value
/// must contain whitespace (for example a model path).
///
/// ```no_run
/// use corral_learner::create;
///
/// let mut learner = create("--quiet --loss_function logistic")?.into_scalar()?;
/// learner.learn("1 |features price:0.23 sqft:0.25")?;
/// # Ok::<(), corral_learner::LearnerError>(())
/// ```
///
/// # Errors
///
/// Fails when the engine module cannot be loaded, when the engine rejects
/// the configuration, or when the engine reports an output type this
/// runtime does not recognize. No native resource outlives any of these
/// failures.
pub fn create(command: &str) -> LearnerResult<Learner> {
    let mut args = vec![COMMAND_PLACEHOLDER.to_string()];
    args.extend(command.split_whitespace().map(str::to_string));
    create_from_args(args)
}

/// Create a learner from a pre-tokenized argument vector.
///
/// The first token is the program-name placeholder; the engine skips it.
///
/// # Errors
///
/// Same conditions as [`create`].
pub fn create_from_args<I, S>(args: I) -> LearnerResult<Learner>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let engine = loader::ensure_loaded()?;
    create_with_engine(engine, args)
}

pub(crate) fn create_with_engine<I, S>(engine: &'static EngineApi, args: I) -> LearnerResult<Learner>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let args: Vec<String> = args.into_iter().map(|arg| arg.as_ref().to_string()).collect();
    if args.is_empty() {
        return Err(LearnerError::InvalidArgument(
            "argument vector must at least contain the program-name placeholder".to_string(),
        ));
    }
    let c_args = args
        .iter()
        .map(|arg| {
            CString::new(arg.as_str()).map_err(|_| {
                LearnerError::InvalidArgument(format!(
                    "argument contains an interior NUL byte: {arg:?}"
                ))
            })
        })
        .collect::<LearnerResult<Vec<_>>>()?;
    let arg_ptrs: Vec<*const c_char> = c_args.iter().map(|arg| arg.as_ptr()).collect();

    let mut raw: RawHandle = 0;
    // SAFETY: arg_ptrs outlives the call and raw is a writable out-parameter.
    let status =
        unsafe { (engine.initialize)(arg_ptrs.len() as c_int, arg_ptrs.as_ptr(), &mut raw) };
    if status != 0 {
        return Err(LearnerError::Initialization(engine.last_error_message()));
    }

    // Ownership of the fresh token moves into the handle immediately, so
    // every failure path below releases it.
    let mut handle = LearnerHandle::new(engine, raw);
    let kind = handle.prediction_type()?;
    debug!(prediction_type = %kind, command = %args.join(" "), "created learner");

    let learner = match kind {
        PredictionType::ActionProbs => Learner::ActionProbs(ActionProbsLearner::new(handle)),
        PredictionType::ActionScores => Learner::ActionScores(ActionScoresLearner::new(handle)),
        PredictionType::Multiclass => Learner::Multiclass(MulticlassLearner::new(handle)),
        PredictionType::Multilabels => Learner::Multilabels(MultilabelsLearner::new(handle)),
        PredictionType::Prob => Learner::Prob(ProbLearner::new(handle)),
        PredictionType::Scalar => Learner::Scalar(ScalarLearner::new(handle)),
        PredictionType::Scalars => Learner::Scalars(ScalarsLearner::new(handle)),
        PredictionType::Unknown => {
            // The resource will never be wrapped by a variant; this close is
            // its only cleanup path.
            handle.close()?;
            return Err(LearnerError::UnknownPredictionType {
                command: args.join(" "),
            });
        }
    };
    Ok(learner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub_engine;

    #[test]
    fn test_create_dispatches_every_recognized_tag() {
        let cases = [
            (1, PredictionType::ActionProbs),
            (2, PredictionType::ActionScores),
            (3, PredictionType::Multiclass),
            (4, PredictionType::Multilabels),
            (5, PredictionType::Prob),
            (6, PredictionType::Scalar),
            (7, PredictionType::Scalars),
        ];
        for (tag, expected) in cases {
            let kind = tag.to_string();
            let learner =
                create_with_engine(stub_engine::stub_api(), ["corral", "--kind", kind.as_str()])
                    .unwrap();
            assert_eq!(learner.prediction_type(), expected, "tag {tag}");
            let matches_variant = match (&learner, expected) {
                (Learner::ActionProbs(_), PredictionType::ActionProbs) => true,
                (Learner::ActionScores(_), PredictionType::ActionScores) => true,
                (Learner::Multiclass(_), PredictionType::Multiclass) => true,
                (Learner::Multilabels(_), PredictionType::Multilabels) => true,
                (Learner::Prob(_), PredictionType::Prob) => true,
                (Learner::Scalar(_), PredictionType::Scalar) => true,
                (Learner::Scalars(_), PredictionType::Scalars) => true,
                _ => false,
            };
            assert!(matches_variant, "tag {tag} wrapped the wrong variant");
        }
    }

    #[test]
    fn test_unknown_tag_closes_the_orphaned_resource() {
        let err = create_with_engine(stub_engine::stub_api(), ["corral", "--kind", "0"])
            .unwrap_err();
        assert!(matches!(err, LearnerError::UnknownPredictionType { .. }));
        let orphan = stub_engine::last_initialized_handle();
        assert_eq!(stub_engine::close_count(orphan), 1);
    }

    #[test]
    fn test_unknown_tag_error_carries_the_command() {
        let err = create_with_engine(stub_engine::stub_api(), ["corral", "--kind", "99"])
            .unwrap_err();
        assert!(err.to_string().contains("--kind 99"));
    }

    #[test]
    fn test_initialization_failure_propagates_engine_message() {
        let err =
            create_with_engine(stub_engine::stub_api(), ["corral", "--fail"]).unwrap_err();
        match err {
            LearnerError::Initialization(message) => {
                assert!(message.contains("forced failure"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_argument_vector_is_rejected() {
        let err = create_with_engine(stub_engine::stub_api(), Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, LearnerError::InvalidArgument(_)));
    }

    #[test]
    fn test_interior_nul_in_argument_is_rejected() {
        let err = create_with_engine(stub_engine::stub_api(), ["corral", "--bad\0arg"])
            .unwrap_err();
        assert!(matches!(err, LearnerError::InvalidArgument(_)));
    }
}

//! The closed set of typed learner variants.
//!
//! Every recognized output type gets one thin typed front-end over the
//! shared handle: the variants differ only in the value type their
//! learn/predict calls produce and in the decode step bound at definition.
//! [`Learner`] is the tagged union over the set, for callers that cannot
//! know the output type before the engine reports it.

use std::path::Path;

use crate::error::{LearnerError, LearnerResult};
use crate::handle::LearnerHandle;
use crate::prediction::{ActionProb, ActionScore, PredictionType};

macro_rules! learner_variant {
    (
        $(#[$doc:meta])*
        $name:ident, $value:ty, $kind:ident, $decode:ident
    ) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name {
            handle: LearnerHandle,
        }

        impl $name {
            pub(crate) fn new(handle: LearnerHandle) -> Self {
                Self { handle }
            }

            /// Update the model with one example and return the prediction
            /// made after the update.
            pub fn learn(&mut self, example: &str) -> LearnerResult<$value> {
                Ok(self.handle.predict_raw(&[example], true, false)?.$decode())
            }

            /// Predict for one example without updating the model.
            pub fn predict(&mut self, example: &str) -> LearnerResult<$value> {
                Ok(self.handle.predict_raw(&[example], false, false)?.$decode())
            }

            /// Update the model with one multi-line example.
            pub fn learn_multiline(&mut self, examples: &[&str]) -> LearnerResult<$value> {
                Ok(self.handle.predict_raw(examples, true, true)?.$decode())
            }

            /// Predict for one multi-line example without updating the model.
            pub fn predict_multiline(&mut self, examples: &[&str]) -> LearnerResult<$value> {
                Ok(self.handle.predict_raw(examples, false, true)?.$decode())
            }

            /// Write the current model state to `path`.
            pub fn save_model<P: AsRef<Path>>(&mut self, path: P) -> LearnerResult<()> {
                self.handle.save_model(path.as_ref())
            }

            /// Run the remaining configured training passes.
            pub fn finish_passes(&mut self) -> LearnerResult<()> {
                self.handle.finish_passes()
            }

            /// Release the native resource. Idempotent; also performed on
            /// drop if not called explicitly.
            pub fn close(&mut self) -> LearnerResult<()> {
                self.handle.close()
            }

            pub fn is_open(&self) -> bool {
                self.handle.is_open()
            }

            /// The output type this variant decodes.
            pub fn prediction_type(&self) -> PredictionType {
                PredictionType::$kind
            }

            #[cfg(test)]
            pub(crate) fn raw_handle(&self) -> crate::ffi::RawHandle {
                self.handle.raw()
            }
        }
    };
}

learner_variant! {
    /// Learner producing a single scalar value per call.
    ScalarLearner, f32, Scalar, into_scalar
}

learner_variant! {
    /// Learner producing a probability in [0, 1] per call.
    ProbLearner, f32, Prob, into_prob
}

learner_variant! {
    /// Learner producing an array of scalar values per call.
    ScalarsLearner, Vec<f32>, Scalars, into_scalars
}

learner_variant! {
    /// Learner producing a single class label per call.
    MulticlassLearner, u32, Multiclass, into_multiclass
}

learner_variant! {
    /// Learner producing a set of class labels per call.
    MultilabelsLearner, Vec<u32>, Multilabels, into_multilabels
}

learner_variant! {
    /// Learner producing a ranked action-score list per call.
    ActionScoresLearner, Vec<ActionScore>, ActionScores, into_action_scores
}

learner_variant! {
    /// Learner producing a ranked action-probability list per call.
    ActionProbsLearner, Vec<ActionProb>, ActionProbs, into_action_probs
}

/// A learner of engine-determined output type.
///
/// The factory returns this union because the output type is only known at
/// runtime, from the engine's report. Lifecycle operations are available
/// without narrowing, so a learner of unexpected type can always be saved or
/// closed; the `into_*` narrowers move out the typed variant and close the
/// learner (by drop) when the type does not match.
#[derive(Debug)]
pub enum Learner {
    Scalar(ScalarLearner),
    Prob(ProbLearner),
    Scalars(ScalarsLearner),
    Multiclass(MulticlassLearner),
    Multilabels(MultilabelsLearner),
    ActionScores(ActionScoresLearner),
    ActionProbs(ActionProbsLearner),
}

macro_rules! for_each_variant {
    ($self:ident, $learner:ident => $body:expr) => {
        match $self {
            Learner::Scalar($learner) => $body,
            Learner::Prob($learner) => $body,
            Learner::Scalars($learner) => $body,
            Learner::Multiclass($learner) => $body,
            Learner::Multilabels($learner) => $body,
            Learner::ActionScores($learner) => $body,
            Learner::ActionProbs($learner) => $body,
        }
    };
}

macro_rules! narrower {
    (
        $(#[$doc:meta])*
        $fn_name:ident, $variant:ident, $target:ty
    ) => {
        $(#[$doc])*
        pub fn $fn_name(self) -> LearnerResult<$target> {
            let actual = self.prediction_type();
            match self {
                Learner::$variant(learner) => Ok(learner),
                // The mismatched learner drops here, which closes it.
                _ => Err(LearnerError::TypeMismatch {
                    expected: PredictionType::$variant,
                    actual,
                }),
            }
        }
    };
}

impl Learner {
    /// The output type reported by the engine for this learner.
    pub fn prediction_type(&self) -> PredictionType {
        for_each_variant!(self, learner => learner.prediction_type())
    }

    /// Write the current model state to `path`.
    pub fn save_model<P: AsRef<Path>>(&mut self, path: P) -> LearnerResult<()> {
        let path = path.as_ref();
        for_each_variant!(self, learner => learner.save_model(path))
    }

    /// Run the remaining configured training passes.
    pub fn finish_passes(&mut self) -> LearnerResult<()> {
        for_each_variant!(self, learner => learner.finish_passes())
    }

    /// Release the native resource. Idempotent; also performed on drop.
    pub fn close(&mut self) -> LearnerResult<()> {
        for_each_variant!(self, learner => learner.close())
    }

    pub fn is_open(&self) -> bool {
        for_each_variant!(self, learner => learner.is_open())
    }

    narrower! {
        /// Move out the scalar variant.
        into_scalar, Scalar, ScalarLearner
    }
    narrower! {
        /// Move out the probability variant.
        into_prob, Prob, ProbLearner
    }
    narrower! {
        /// Move out the scalar-array variant.
        into_scalars, Scalars, ScalarsLearner
    }
    narrower! {
        /// Move out the multiclass variant.
        into_multiclass, Multiclass, MulticlassLearner
    }
    narrower! {
        /// Move out the multilabel variant.
        into_multilabels, Multilabels, MultilabelsLearner
    }
    narrower! {
        /// Move out the action-scores variant.
        into_action_scores, ActionScores, ActionScoresLearner
    }
    narrower! {
        /// Move out the action-probs variant.
        into_action_probs, ActionProbs, ActionProbsLearner
    }

    #[cfg(test)]
    pub(crate) fn raw_handle(&self) -> crate::ffi::RawHandle {
        for_each_variant!(self, learner => learner.raw_handle())
    }
}

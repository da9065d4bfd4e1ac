//! Output-type tags and the typed values learners produce.
//!
//! The engine reports, once per resource, which shape of prediction that
//! resource will emit; the tag never changes for the lifetime of a handle
//! and selects the variant that wraps it (see [`crate::learner`]).

use serde::{Deserialize, Serialize};

use crate::ffi::RawPrediction;

/// Output type reported by the engine for a freshly initialized resource.
///
/// Discriminants must match the engine's C enum values exactly.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredictionType {
    /// Unrecognized output type; the factory refuses to wrap these.
    Unknown = 0,
    /// Ranked actions with exploration probabilities.
    ActionProbs = 1,
    /// Ranked actions with scores.
    ActionScores = 2,
    /// Single class label.
    Multiclass = 3,
    /// Set of class labels.
    Multilabels = 4,
    /// Probability in [0, 1].
    Prob = 5,
    /// Single scalar value.
    Scalar = 6,
    /// Array of scalar values.
    Scalars = 7,
}

impl PredictionType {
    /// Map an engine discriminant to a tag.
    ///
    /// Total: discriminants this runtime does not know map to `Unknown`.
    pub fn from_tag(tag: i32) -> Self {
        match tag {
            1 => Self::ActionProbs,
            2 => Self::ActionScores,
            3 => Self::Multiclass,
            4 => Self::Multilabels,
            5 => Self::Prob,
            6 => Self::Scalar,
            7 => Self::Scalars,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for PredictionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unknown => "Unknown",
            Self::ActionProbs => "ActionProbs",
            Self::ActionScores => "ActionScores",
            Self::Multiclass => "Multiclass",
            Self::Multilabels => "Multilabels",
            Self::Prob => "Prob",
            Self::Scalar => "Scalar",
            Self::Scalars => "Scalars",
        };
        f.write_str(name)
    }
}

/// One entry of an action-score ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionScore {
    pub action: u32,
    pub score: f32,
}

/// One entry of an action-probability ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionProb {
    pub action: u32,
    pub probability: f32,
}

/// Owned snapshot of a [`RawPrediction`].
///
/// Created by copying every engine-owned buffer out before the raw result is
/// freed, so decoding never touches native memory. The per-variant decoders
/// below are total: absent slots read as zero or empty.
#[derive(Debug, Clone, Default)]
pub(crate) struct PredictionData {
    pub scalar: f32,
    pub label: u32,
    pub floats: Vec<f32>,
    pub labels: Vec<u32>,
    pub actions: Vec<u32>,
    pub action_values: Vec<f32>,
}

impl PredictionData {
    /// Copy a filled raw result into owned memory.
    ///
    /// # Safety
    ///
    /// Every non-null (pointer, length) pair in `raw` must describe a live
    /// buffer of at least that many elements.
    pub(crate) unsafe fn copy_from_raw(raw: &RawPrediction) -> Self {
        Self {
            scalar: raw.scalar,
            label: raw.label,
            floats: copy_slice(raw.floats, raw.num_floats),
            labels: copy_slice(raw.labels, raw.num_labels),
            actions: copy_slice(raw.actions, raw.num_actions),
            action_values: copy_slice(raw.action_values, raw.num_actions),
        }
    }

    pub(crate) fn into_scalar(self) -> f32 {
        self.scalar
    }

    pub(crate) fn into_prob(self) -> f32 {
        self.scalar
    }

    pub(crate) fn into_scalars(self) -> Vec<f32> {
        self.floats
    }

    pub(crate) fn into_multiclass(self) -> u32 {
        self.label
    }

    pub(crate) fn into_multilabels(self) -> Vec<u32> {
        self.labels
    }

    pub(crate) fn into_action_scores(self) -> Vec<ActionScore> {
        self.actions
            .into_iter()
            .zip(self.action_values)
            .map(|(action, score)| ActionScore { action, score })
            .collect()
    }

    pub(crate) fn into_action_probs(self) -> Vec<ActionProb> {
        self.actions
            .into_iter()
            .zip(self.action_values)
            .map(|(action, probability)| ActionProb {
                action,
                probability,
            })
            .collect()
    }
}

/// Copy a raw (pointer, length) pair into a `Vec`, treating null as empty.
unsafe fn copy_slice<T: Copy>(ptr: *const T, len: usize) -> Vec<T> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    std::slice::from_raw_parts(ptr, len).to_vec()
}

//! The progressive validation contract.

/// A running score over a prediction stream, updated in O(1) per example.
///
/// Progressive validation scores each prediction against its label before
/// the model trains on the example, so the score tracks generalization
/// without a held-out set.
pub trait ProgressiveValidation: Send {
    /// Fold one (prediction, actual) pair into the score.
    fn update(&mut self, prediction: f64, actual: f64);

    /// The current score.
    fn score(&self) -> f64;

    /// Short display name of the metric.
    fn name(&self) -> &'static str;

    /// Whether larger scores are better for this metric.
    fn bigger_is_better(&self) -> bool;
}

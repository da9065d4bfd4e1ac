//! Classification metrics.
//!
//! Threshold-based metrics treat an actual label greater than a small
//! epsilon as positive and a prediction above the decision threshold as
//! positive, so they work unchanged for {0, 1} and {-1, 1} label schemes.

use crate::progressive::ProgressiveValidation;

/// Labels this close to zero (or below) count as negative.
const ACTUAL_EPSILON: f64 = 1e-13;

/// Log-loss predictions are clamped into [EPS, 1 - EPS] so a single
/// overconfident mistake cannot produce an infinite score.
const LOG_LOSS_EPSILON: f64 = 1e-7;

fn is_actual_positive(actual: f64) -> bool {
    actual > ACTUAL_EPSILON
}

/// Fraction of examples classified correctly at the decision threshold.
#[derive(Debug)]
pub struct Accuracy {
    decision_threshold: f64,
    correct: u64,
    count: u64,
}

impl Accuracy {
    pub fn new(decision_threshold: f64) -> Self {
        Self {
            decision_threshold,
            correct: 0,
            count: 0,
        }
    }
}

impl ProgressiveValidation for Accuracy {
    fn update(&mut self, prediction: f64, actual: f64) {
        let predicted_positive = prediction > self.decision_threshold;
        if predicted_positive == is_actual_positive(actual) {
            self.correct += 1;
        }
        self.count += 1;
    }

    fn score(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.correct as f64 / self.count as f64
    }

    fn name(&self) -> &'static str {
        "ACCURACY"
    }

    fn bigger_is_better(&self) -> bool {
        true
    }
}

/// true positives / (true positives + false positives)
#[derive(Debug)]
pub struct Precision {
    decision_threshold: f64,
    true_positives: u64,
    false_positives: u64,
}

impl Precision {
    pub fn new(decision_threshold: f64) -> Self {
        Self {
            decision_threshold,
            true_positives: 0,
            false_positives: 0,
        }
    }
}

impl ProgressiveValidation for Precision {
    fn update(&mut self, prediction: f64, actual: f64) {
        if prediction <= self.decision_threshold {
            return;
        }
        if is_actual_positive(actual) {
            self.true_positives += 1;
        } else {
            self.false_positives += 1;
        }
    }

    fn score(&self) -> f64 {
        let predicted_positives = self.true_positives + self.false_positives;
        if predicted_positives == 0 {
            return 0.0;
        }
        self.true_positives as f64 / predicted_positives as f64
    }

    fn name(&self) -> &'static str {
        "Pr"
    }

    fn bigger_is_better(&self) -> bool {
        true
    }
}

/// true positives / (true positives + false negatives)
#[derive(Debug)]
pub struct Recall {
    decision_threshold: f64,
    true_positives: u64,
    false_negatives: u64,
}

impl Recall {
    pub fn new(decision_threshold: f64) -> Self {
        Self {
            decision_threshold,
            true_positives: 0,
            false_negatives: 0,
        }
    }
}

impl ProgressiveValidation for Recall {
    fn update(&mut self, prediction: f64, actual: f64) {
        if !is_actual_positive(actual) {
            return;
        }
        if prediction > self.decision_threshold {
            self.true_positives += 1;
        } else {
            self.false_negatives += 1;
        }
    }

    fn score(&self) -> f64 {
        let actual_positives = self.true_positives + self.false_negatives;
        if actual_positives == 0 {
            return 0.0;
        }
        self.true_positives as f64 / actual_positives as f64
    }

    fn name(&self) -> &'static str {
        "Re"
    }

    fn bigger_is_better(&self) -> bool {
        true
    }
}

/// F-beta score: the weighted harmonic mean of precision and recall.
#[derive(Debug)]
pub struct FScore {
    beta: f64,
    precision: Precision,
    recall: Recall,
}

impl FScore {
    pub fn new(decision_threshold: f64, beta: f64) -> Self {
        Self {
            beta,
            precision: Precision::new(decision_threshold),
            recall: Recall::new(decision_threshold),
        }
    }

    /// The balanced F1 score.
    pub fn f1(decision_threshold: f64) -> Self {
        Self::new(decision_threshold, 1.0)
    }
}

impl ProgressiveValidation for FScore {
    fn update(&mut self, prediction: f64, actual: f64) {
        self.precision.update(prediction, actual);
        self.recall.update(prediction, actual);
    }

    fn score(&self) -> f64 {
        let precision = self.precision.score();
        let recall = self.recall.score();
        let beta_squared = self.beta * self.beta;
        let denominator = beta_squared * precision + recall;
        if denominator == 0.0 {
            return 0.0;
        }
        (1.0 + beta_squared) * precision * recall / denominator
    }

    fn name(&self) -> &'static str {
        "F-SCORE"
    }

    fn bigger_is_better(&self) -> bool {
        true
    }
}

/// Negative mean log-likelihood of probability predictions.
#[derive(Debug, Default)]
pub struct LogLoss {
    log_likelihood: f64,
    count: u64,
}

impl LogLoss {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressiveValidation for LogLoss {
    fn update(&mut self, prediction: f64, actual: f64) {
        let constrained = prediction.clamp(LOG_LOSS_EPSILON, 1.0 - LOG_LOSS_EPSILON);
        if actual > 0.0 {
            self.log_likelihood += constrained.ln();
        } else {
            self.log_likelihood += (1.0 - constrained).ln();
        }
        self.count += 1;
    }

    fn score(&self) -> f64 {
        if self.count == 0 {
            return f64::NEG_INFINITY;
        }
        -self.log_likelihood / self.count as f64
    }

    fn name(&self) -> &'static str {
        "LOG-LOSS"
    }

    fn bigger_is_better(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_counts_both_classes() {
        let mut accuracy = Accuracy::new(0.5);
        accuracy.update(0.9, 1.0); // true positive
        accuracy.update(0.1, 0.0); // true negative
        accuracy.update(0.9, 0.0); // false positive
        accuracy.update(0.1, 1.0); // false negative
        assert!((accuracy.score() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_accuracy_handles_minus_one_labels() {
        let mut accuracy = Accuracy::new(0.0);
        accuracy.update(0.7, 1.0);
        accuracy.update(-0.3, -1.0);
        assert_eq!(accuracy.score(), 1.0);
    }

    #[test]
    fn test_precision_ignores_predicted_negatives() {
        let mut precision = Precision::new(0.5);
        precision.update(0.2, 1.0); // predicted negative, ignored
        assert_eq!(precision.score(), 0.0);
        precision.update(0.9, 1.0); // true positive
        precision.update(0.8, 0.0); // false positive
        assert!((precision.score() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_recall_ignores_actual_negatives() {
        let mut recall = Recall::new(0.5);
        recall.update(0.9, 0.0); // actual negative, ignored
        assert_eq!(recall.score(), 0.0);
        recall.update(0.9, 1.0); // found
        recall.update(0.2, 1.0); // missed
        assert!((recall.score() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_f1_is_harmonic_mean() {
        let mut f1 = FScore::f1(0.5);
        // precision 1/2, recall 1/1
        f1.update(0.9, 1.0);
        f1.update(0.8, 0.0);
        let expected = 2.0 * 0.5 * 1.0 / (0.5 + 1.0);
        assert!((f1.score() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_fscore_empty_stream_is_zero() {
        assert_eq!(FScore::f1(0.5).score(), 0.0);
    }

    #[test]
    fn test_log_loss_known_value() {
        let mut log_loss = LogLoss::new();
        log_loss.update(0.8, 1.0);
        log_loss.update(0.2, 0.0);
        let expected = -(0.8_f64.ln() + 0.8_f64.ln()) / 2.0;
        assert!((log_loss.score() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_log_loss_clamps_overconfident_predictions() {
        let mut log_loss = LogLoss::new();
        log_loss.update(1.0, 0.0);
        assert!(log_loss.score().is_finite());
    }

    #[test]
    fn test_log_loss_empty_stream() {
        assert_eq!(LogLoss::new().score(), f64::NEG_INFINITY);
    }
}

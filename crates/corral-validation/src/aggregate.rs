//! Aggregation of several metrics over one prediction stream.

use std::collections::BTreeMap;

use tracing::info;

use crate::classification::{Accuracy, FScore, LogLoss};
use crate::progressive::ProgressiveValidation;
use crate::regression::{Mae, Rmse};

/// A set of metrics updated together, with scores logged every N examples.
pub struct Metrics {
    metrics: Vec<Box<dyn ProgressiveValidation>>,
    examples: u64,
    log_every: u64,
}

impl Metrics {
    /// Aggregate the given metrics, logging scores every `log_every`
    /// examples (0 disables periodic logging).
    pub fn new(log_every: u64, metrics: Vec<Box<dyn ProgressiveValidation>>) -> Self {
        Self {
            metrics,
            examples: 0,
            log_every,
        }
    }

    /// Standard regression metrics: RMSE and MAE.
    pub fn regression(log_every: u64) -> Self {
        Self::new(log_every, vec![Box::new(Rmse::new()), Box::new(Mae::new())])
    }

    /// Standard 1-0 classification metrics: accuracy and F1 at the given
    /// decision threshold.
    pub fn zero_one_classification(log_every: u64, decision_threshold: f64) -> Self {
        Self::new(
            log_every,
            vec![
                Box::new(Accuracy::new(decision_threshold)),
                Box::new(FScore::f1(decision_threshold)),
            ],
        )
    }

    /// Standard probability classification metric: log-loss.
    pub fn probability_classification(log_every: u64) -> Self {
        Self::new(log_every, vec![Box::new(LogLoss::new())])
    }

    /// Fold one (prediction, actual) pair into every metric.
    pub fn update(&mut self, prediction: f64, actual: f64) {
        for metric in &mut self.metrics {
            metric.update(prediction, actual);
        }
        self.examples += 1;
        if self.log_every > 0 && self.examples % self.log_every == 0 {
            self.log_scores();
        }
    }

    /// Log the current scores at info level.
    pub fn log_scores(&self) {
        info!(examples = self.examples, "{}", self.format_scores());
    }

    /// Current score of every metric, keyed by metric name.
    pub fn scores(&self) -> BTreeMap<&'static str, f64> {
        self.metrics
            .iter()
            .map(|metric| (metric.name(), metric.score()))
            .collect()
    }

    /// Number of examples folded in so far.
    pub fn examples(&self) -> u64 {
        self.examples
    }

    fn format_scores(&self) -> String {
        self.metrics
            .iter()
            .map(|metric| format!("{}={:.6}", metric.name(), metric.score()))
            .collect::<Vec<_>>()
            .join("\t")
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("examples", &self.examples)
            .field("scores", &self.scores())
            .finish()
    }
}

//! Regression metrics.

use crate::progressive::ProgressiveValidation;

/// Root mean squared error.
#[derive(Debug, Default)]
pub struct Rmse {
    squared_error: f64,
    count: u64,
}

impl Rmse {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressiveValidation for Rmse {
    fn update(&mut self, prediction: f64, actual: f64) {
        let error = prediction - actual;
        self.squared_error += error * error;
        self.count += 1;
    }

    fn score(&self) -> f64 {
        if self.count == 0 {
            return f64::INFINITY;
        }
        (self.squared_error / self.count as f64).sqrt()
    }

    fn name(&self) -> &'static str {
        "RMSE"
    }

    fn bigger_is_better(&self) -> bool {
        false
    }
}

/// Mean absolute error.
#[derive(Debug, Default)]
pub struct Mae {
    absolute_error: f64,
    count: u64,
}

impl Mae {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressiveValidation for Mae {
    fn update(&mut self, prediction: f64, actual: f64) {
        self.absolute_error += (prediction - actual).abs();
        self.count += 1;
    }

    fn score(&self) -> f64 {
        if self.count == 0 {
            return f64::INFINITY;
        }
        self.absolute_error / self.count as f64
    }

    fn name(&self) -> &'static str {
        "MAE"
    }

    fn bigger_is_better(&self) -> bool {
        false
    }
}

/// Mean absolute percentage error.
///
/// Examples with a zero label are skipped; the percentage is undefined
/// there.
#[derive(Debug, Default)]
pub struct Mape {
    percentage_error: f64,
    count: u64,
}

impl Mape {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressiveValidation for Mape {
    fn update(&mut self, prediction: f64, actual: f64) {
        if actual == 0.0 {
            return;
        }
        self.percentage_error += ((prediction - actual) / actual).abs();
        self.count += 1;
    }

    fn score(&self) -> f64 {
        if self.count == 0 {
            return f64::INFINITY;
        }
        100.0 * self.percentage_error / self.count as f64
    }

    fn name(&self) -> &'static str {
        "MAPE"
    }

    fn bigger_is_better(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rmse_known_values() {
        let mut rmse = Rmse::new();
        rmse.update(1.0, 0.0);
        rmse.update(0.0, 1.0);
        // Two errors of magnitude 1.
        assert!((rmse.score() - 1.0).abs() < 1e-12);

        rmse.update(0.0, 0.0);
        rmse.update(0.0, 0.0);
        // sqrt(2/4)
        assert!((rmse.score() - 0.5_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_rmse_empty_stream() {
        assert_eq!(Rmse::new().score(), f64::INFINITY);
    }

    #[test]
    fn test_mae_known_values() {
        let mut mae = Mae::new();
        mae.update(3.0, 1.0);
        mae.update(1.0, 2.0);
        assert!((mae.score() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_mape_skips_zero_labels() {
        let mut mape = Mape::new();
        mape.update(1.0, 0.0);
        assert_eq!(mape.score(), f64::INFINITY);

        mape.update(90.0, 100.0);
        mape.update(110.0, 100.0);
        assert!((mape.score() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_direction_flags() {
        assert!(!Rmse::new().bigger_is_better());
        assert!(!Mae::new().bigger_is_better());
        assert!(!Mape::new().bigger_is_better());
    }
}

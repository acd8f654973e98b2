//! Least squares fit of `y = intercept + slope * x` by gradient descent.
//!
//! The loss graph is rebuilt on every iteration because forward values are computed
//! eagerly. The two coefficients are long-lived leaves, so their gradients are reset
//! before each backward pass.

use tracing::{debug, info, warn};

use crate::{config::FitConfig, data::Samples, error::Result, Value};

/// Sum of squared errors, accumulated in place.
pub fn sse_loss(y: &[Value], y_hat: &[Value]) -> Value {
    let mut loss = Value::new(0.);
    for (y, y_hat) in y.iter().zip(y_hat) {
        loss += (y - y_hat).pow(2.);
    }
    loss
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The loss improved by less than the configured tolerance.
    Converged,
    /// The loss went up or stopped being finite.
    Diverged,
    MaxIters,
}

#[derive(Debug, Clone)]
pub struct FitReport {
    pub iterations: usize,
    /// Loss before each update, in order.
    pub losses: Vec<f64>,
    pub stop: StopReason,
}

impl FitReport {
    pub fn final_loss(&self) -> Option<f64> {
        self.losses.last().copied()
    }
}

#[derive(Debug, Clone)]
pub struct LinearModel {
    pub intercept: Value,
    pub slope: Value,
}

impl LinearModel {
    pub fn new(intercept: f64, slope: f64) -> Self {
        Self {
            intercept: Value::new(intercept),
            slope: Value::new(slope),
        }
    }

    pub fn from_config(config: &FitConfig) -> Self {
        Self::new(config.init_intercept, config.init_slope)
    }

    pub fn predict(&self, x: &[Value]) -> Vec<Value> {
        x.iter()
            .map(|x| &self.intercept + &self.slope * x)
            .collect()
    }

    pub fn loss(&self, samples: &Samples) -> Value {
        sse_loss(&samples.y, &self.predict(&samples.x))
    }

    /// Move both coefficients against their current gradients.
    pub fn step(&self, learning_rate: f64) {
        for param in [&self.intercept, &self.slope] {
            param.set_value(param.value() - learning_rate * param.grad());
        }
    }

    pub fn fit(&self, samples: &Samples, config: &FitConfig) -> Result<FitReport> {
        let mut losses = vec![];
        let mut stop = StopReason::MaxIters;
        let mut prev = f64::INFINITY;

        for iter in 0..config.max_iters {
            let loss = self.loss(samples);
            let current = loss.value();
            if !current.is_finite() || current > prev {
                warn!(iter, loss = current, prev, "loss stopped improving");
                stop = StopReason::Diverged;
                break;
            }
            losses.push(current);
            if prev - current < config.tolerance {
                stop = StopReason::Converged;
                break;
            }

            loss.zero_grad();
            loss.backward(1.)?;
            debug!(
                iter,
                loss = current,
                d_intercept = self.intercept.grad(),
                d_slope = self.slope.grad(),
                "gradient step"
            );
            self.step(config.learning_rate);
            prev = current;
        }

        info!(
            iterations = losses.len(),
            intercept = self.intercept.value(),
            slope = self.slope.value(),
            loss = losses.last().copied().unwrap_or(f64::NAN),
            ?stop,
            "fit finished"
        );
        Ok(FitReport {
            iterations: losses.len(),
            losses,
            stop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_gradients_match_closed_form() {
        let samples = Samples::from_pairs([(1., 5.), (2., 8.)]);
        let model = LinearModel::new(1., 1.);
        let loss = model.loss(&samples);
        // residuals: 5 - 2 = 3, 8 - 3 = 5
        assert_eq!(loss.value(), 34.);
        loss.backward(1.).unwrap();
        assert_eq!(model.intercept.grad(), -2. * (3. + 5.));
        assert_eq!(model.slope.grad(), -2. * (3. * 1. + 5. * 2.));
    }

    #[test]
    fn step_moves_against_gradient() {
        let samples = Samples::from_pairs([(1., 5.), (2., 8.)]);
        let model = LinearModel::new(1., 1.);
        let loss = model.loss(&samples);
        loss.backward(1.).unwrap();
        model.step(0.01);
        assert!((model.intercept.value() - 1.16).abs() < 1e-12);
        assert!((model.slope.value() - 1.26).abs() < 1e-12);
        assert!(model.loss(&samples).value() < loss.value());
    }

    #[test]
    fn repeated_passes_need_reset() {
        let samples = Samples::from_pairs([(1., 3.)]);
        let model = LinearModel::new(0., 0.);
        model.loss(&samples).backward(1.).unwrap();
        let first = model.slope.grad();

        let loss = model.loss(&samples);
        loss.backward(1.).unwrap();
        assert_eq!(model.slope.grad(), 2. * first);

        loss.zero_grad();
        loss.backward(1.).unwrap();
        assert_eq!(model.slope.grad(), first);
    }

    #[test]
    fn stops_on_divergence() {
        let samples = Samples::from_pairs((0..5).map(|i| (i as f64, 2. + 3. * i as f64)));
        let model = LinearModel::new(2., 4.);
        let config = FitConfig {
            learning_rate: 1.,
            ..FitConfig::default()
        };
        let report = model.fit(&samples, &config).unwrap();
        assert_eq!(report.stop, StopReason::Diverged);
        assert!(report.iterations < 10);
    }
}

//! L2-regularized logistic regression fit by stochastic dual coordinate ascent.
//!
//! Each example owns a dual variable `b` in `(0, 1)`; the primal weights are
//! kept in sync as `w = 1/(l2 * n) * sum(b_i * y_i * x_i)`. A coordinate step
//! solves `ln((1 - b) / b) = y * w.x + (b - b_old) * |x|^2 / (l2 * n)` with a
//! bracketed Newton iteration.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::classifier::featurize::SparseVector;
use crate::errors::{PipelineError, Result};

const BRACKET_EPS: f64 = 1e-12;
const NEWTON_STEPS: usize = 30;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SdcaOptions {
    pub l2: f64,
    pub max_epochs: usize,
    /// stop once no dual variable moves more than this in an epoch
    pub tolerance: f64,
    pub seed: u64,
}

impl Default for SdcaOptions {
    fn default() -> Self {
        Self {
            l2: 1e-4,
            max_epochs: 30,
            tolerance: 1e-4,
            seed: 1,
        }
    }
}

impl SdcaOptions {
    /// `l2` must be positive and finite; `tolerance` must be finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        if !(self.l2.is_finite() && self.l2 > 0.0) {
            return Err(PipelineError::Configuration(format!(
                "l2 regularization must be positive and finite, got {}",
                self.l2
            )));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(PipelineError::Configuration(format!(
                "solver tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinearModel {
    weights: Vec<f64>,
}

impl LinearModel {
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn score(&self, x: &SparseVector) -> f64 {
        x.iter()
            .map(|(idx, value)| self.weights.get(*idx).copied().unwrap_or(0.0) * value)
            .sum()
    }

    pub fn probability(&self, x: &SparseVector) -> f64 {
        sigmoid(self.score(x))
    }
}

pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^-margin)` without overflow.
fn logistic_loss(margin: f64) -> f64 {
    if margin < -30.0 {
        -margin
    } else {
        (-margin).exp().ln_1p()
    }
}

/// Fit weights of length `dimension` to `(features, label)` examples.
pub fn train(
    examples: &[(SparseVector, bool)],
    dimension: usize,
    options: &SdcaOptions,
) -> LinearModel {
    let n = examples.len();
    let mut weights = vec![0.0; dimension];
    if n == 0 {
        return LinearModel { weights };
    }
    let lambda_n = options.l2 * n as f64;
    let mut duals = vec![0.0f64; n];
    let sq_norms: Vec<f64> = examples
        .iter()
        .map(|(x, _)| x.iter().map(|(_, v)| v * v).sum())
        .collect();
    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(options.seed);

    for epoch in 0..options.max_epochs {
        order.shuffle(&mut rng);
        let mut max_step = 0.0f64;
        for &i in &order {
            let (x, label) = &examples[i];
            if sq_norms[i] == 0.0 {
                continue;
            }
            let y = if *label { 1.0 } else { -1.0 };
            let margin = y * dot(&weights, x);
            let q = sq_norms[i] / lambda_n;
            let updated = solve_dual(duals[i], margin, q);
            let step = updated - duals[i];
            if step == 0.0 {
                continue;
            }
            duals[i] = updated;
            let scale = step * y / lambda_n;
            for (idx, value) in x {
                weights[*idx] += scale * value;
            }
            max_step = max_step.max(step.abs());
        }

        let loss = examples
            .iter()
            .map(|(x, label)| {
                let y = if *label { 1.0 } else { -1.0 };
                logistic_loss(y * dot(&weights, x))
            })
            .sum::<f64>()
            / n as f64;
        let reg = 0.5 * options.l2 * weights.iter().map(|w| w * w).sum::<f64>();
        tracing::debug!(
            "sdca epoch {}: primal objective {:.6}, largest dual step {:.2e}",
            epoch + 1,
            loss + reg,
            max_step
        );
        if max_step < options.tolerance {
            break;
        }
    }

    LinearModel { weights }
}

fn dot(weights: &[f64], x: &SparseVector) -> f64 {
    x.iter().map(|(idx, value)| weights[*idx] * value).sum()
}

/// Root of `f(b) = ln((1 - b) / b) - margin - (b - current) * q` on `(0, 1)`.
///
/// `f` is strictly decreasing, so the root is unique and stays bracketed.
fn solve_dual(current: f64, margin: f64, q: f64) -> f64 {
    let f = |b: f64| ((1.0 - b) / b).ln() - margin - (b - current) * q;
    let mut lo = BRACKET_EPS;
    let mut hi = 1.0 - BRACKET_EPS;
    let mut b = current.clamp(lo, hi);
    for _ in 0..NEWTON_STEPS {
        let value = f(b);
        if value.abs() < 1e-12 {
            break;
        }
        if value > 0.0 {
            lo = b;
        } else {
            hi = b;
        }
        let slope = -1.0 / (b * (1.0 - b)) - q;
        let next = b - value / slope;
        b = if next > lo && next < hi { next } else { 0.5 * (lo + hi) };
    }
    b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(x: f64, label: bool) -> (SparseVector, bool) {
        (vec![(0, x), (1, 1.0)], label)
    }

    #[test]
    fn dual_root_satisfies_optimality() {
        for (current, margin, q) in [(0.0, 0.0, 1.0), (0.3, 2.0, 10.0), (0.9, -4.0, 0.01)] {
            let b = solve_dual(current, margin, q);
            assert!(b > 0.0 && b < 1.0);
            let residual = ((1.0 - b) / b).ln() - margin - (b - current) * q;
            assert!(residual.abs() < 1e-8, "residual {residual}");
        }
    }

    #[test]
    fn separates_a_one_dimensional_problem() {
        let examples: Vec<_> = (0..40)
            .map(|i| {
                let x = i as f64 / 10.0 - 2.0;
                example(x, x > 0.0)
            })
            .collect();
        let model = train(&examples, 2, &SdcaOptions::default());
        assert!(model.weights()[0] > 0.0);
        let correct = examples
            .iter()
            .filter(|(x, label)| (model.probability(x) >= 0.5) == *label)
            .count();
        assert!(correct >= 38, "only {correct} of 40 correct");
    }

    #[test]
    fn training_is_deterministic_for_a_seed() {
        let examples: Vec<_> = (0..20).map(|i| example(i as f64 - 10.0, i % 3 == 0)).collect();
        let a = train(&examples, 2, &SdcaOptions::default());
        let b = train(&examples, 2, &SdcaOptions::default());
        assert_eq!(a, b);
    }

    #[test]
    fn empty_training_set_yields_zero_model() {
        let model = train(&[], 3, &SdcaOptions::default());
        assert_eq!(model.weights(), &[0.0, 0.0, 0.0]);
        assert_eq!(model.probability(&vec![(0, 1.0)]), 0.5);
    }

    #[test]
    fn non_positive_or_non_finite_settings_are_rejected() {
        assert!(SdcaOptions::default().validate().is_ok());
        for l2 in [0.0, -1e-4, f64::NAN, f64::INFINITY] {
            let options = SdcaOptions { l2, ..SdcaOptions::default() };
            assert!(matches!(options.validate(), Err(PipelineError::Configuration(_))));
        }
        for tolerance in [f64::NAN, f64::INFINITY, -1.0] {
            let options = SdcaOptions { tolerance, ..SdcaOptions::default() };
            assert!(matches!(options.validate(), Err(PipelineError::Configuration(_))));
        }
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(logistic_loss(-1000.0).is_finite());
    }
}

//! Monte Carlo estimates of optimality and value remaining.
//!
//! Each call draws one `M x n` matrix from the current posteriors. The
//! probability that arm `a` is optimal is the fraction of rows where `a`
//! holds the row maximum. Value remaining is a percentile of the per-row
//! relative regret `(max - theta_best) / theta_best`, where `best` is the arm
//! with the highest optimality probability. Both come from the same matrix.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{BanditError, Result};

use super::posterior::PosteriorModel;
use super::samples::{SampleMatrix, argmax};

pub const DEFAULT_MC_SAMPLES: usize = 5000;

/// Output of one Monte Carlo pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Empirical probability that each arm is optimal, in arm order.
    pub probabilities: Vec<f64>,
    /// Arm with the highest probability (lowest index on ties).
    pub best: usize,
    /// Requested percentile of the relative regret against `best`.
    pub value_remaining: f64,
    /// The percentile, as a fraction in (0, 1).
    pub percentile: f64,
    /// Rows drawn.
    pub samples: usize,
}

impl Estimate {
    /// Optimality probability of the best arm.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.probabilities.get(self.best).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct OptimalityEstimator {
    samples: usize,
    matrix: SampleMatrix,
    regrets: Vec<f64>,
}

impl Default for OptimalityEstimator {
    fn default() -> Self {
        Self {
            samples: DEFAULT_MC_SAMPLES,
            matrix: SampleMatrix::new(),
            regrets: Vec::new(),
        }
    }
}

impl OptimalityEstimator {
    pub fn new(samples: usize) -> Result<Self> {
        if samples == 0 {
            return Err(BanditError::InvalidConfiguration(
                "Monte Carlo sample count must be positive".to_string(),
            ));
        }
        Ok(Self {
            samples,
            ..Self::default()
        })
    }

    #[must_use]
    pub const fn samples(&self) -> usize {
        self.samples
    }

    /// Draw a fresh matrix and compute both estimates from it.
    ///
    /// `percentile` is the value-remaining quantile as a fraction, e.g. 0.95.
    pub fn estimate<R: Rng + ?Sized>(
        &mut self,
        model: &PosteriorModel,
        percentile: f64,
        rng: &mut R,
    ) -> Result<Estimate> {
        if !(percentile > 0.0 && percentile < 1.0) {
            return Err(BanditError::InvalidConfiguration(format!(
                "value percentile must be in (0, 1), got {percentile}"
            )));
        }

        self.matrix.fill(model, self.samples, rng)?;

        let probabilities = optimality(&self.matrix);
        let best = argmax(&probabilities).unwrap_or(0);
        let value_remaining = self.value_remaining(best, percentile);

        trace!(
            best,
            confidence = probabilities[best],
            value_remaining,
            "monte carlo estimate"
        );

        Ok(Estimate {
            probabilities,
            best,
            value_remaining,
            percentile,
            samples: self.samples,
        })
    }

    fn value_remaining(&mut self, best: usize, percentile: f64) -> f64 {
        self.regrets.clear();
        self.regrets
            .extend(self.matrix.iter_rows().map(|row| relative_regret(row, best)));
        percentile_of(&mut self.regrets, percentile)
    }
}

/// One-shot estimate for already collected `(successes, trials)` per arm.
pub fn estimate_observations<R: Rng + ?Sized>(
    observations: &[(u64, u64)],
    samples: usize,
    percentile: f64,
    rng: &mut R,
) -> Result<Estimate> {
    let model = PosteriorModel::from_observations(observations)?;
    OptimalityEstimator::new(samples)?.estimate(&model, percentile, rng)
}

/// Fraction of rows in which each arm attains the row maximum.
#[must_use]
pub fn optimality(matrix: &SampleMatrix) -> Vec<f64> {
    let mut wins = vec![0u64; matrix.arms()];
    for row in matrix.iter_rows() {
        if let Some(winner) = argmax(row) {
            wins[winner] += 1;
        }
    }
    let rows = matrix.rows().max(1) as f64;
    wins.into_iter().map(|count| count as f64 / rows).collect()
}

fn relative_regret(row: &[f64], best: usize) -> f64 {
    let theta_best = row[best];
    let row_max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let gap = row_max - theta_best;
    if theta_best > 0.0 {
        gap / theta_best
    } else if gap > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

/// Linearly interpolated percentile, `q` as a fraction in [0, 1].
///
/// Sorts `values` in place. Returns 0.0 for an empty slice.
pub fn percentile_of(values: &mut [f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_unstable_by(f64::total_cmp);

    let rank = q.clamp(0.0, 1.0) * (values.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return values[lower];
    }
    let weight = rank - lower as f64;
    let (lo, hi) = (values[lower], values[upper]);
    if lo == hi {
        // Also covers two infinite neighbours, where interpolation gives NaN.
        return lo;
    }
    lo + (hi - lo) * weight
}

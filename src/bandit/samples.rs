//! Reusable Monte Carlo sample buffer.

use rand::Rng;
use rand_distr::Distribution;

use crate::error::{BanditError, Result};

use super::posterior::PosteriorModel;

/// Row-major `rows x arms` matrix of posterior draws.
///
/// Row `r` is one Monte Carlo trial; column `a` holds a draw from arm `a`'s
/// posterior. The backing storage is kept between refills so repeated rounds
/// do not reallocate.
#[derive(Debug, Clone, Default)]
pub struct SampleMatrix {
    rows: usize,
    arms: usize,
    values: Vec<f64>,
}

impl SampleMatrix {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: 0,
            arms: 0,
            values: Vec::new(),
        }
    }

    /// Replace the contents with `rows` fresh draws from every posterior in
    /// `model`.
    pub fn fill<R: Rng + ?Sized>(
        &mut self,
        model: &PosteriorModel,
        rows: usize,
        rng: &mut R,
    ) -> Result<()> {
        let posteriors = model.posteriors()?;
        let arms = posteriors.len();

        let len = rows.checked_mul(arms).ok_or_else(|| {
            BanditError::InvalidConfiguration(format!(
                "{rows} Monte Carlo rows x {arms} arms overflows the sample buffer"
            ))
        })?;
        self.rows = 0;
        self.values.clear();
        self.values.try_reserve_exact(len).map_err(|err| {
            BanditError::InvalidConfiguration(format!(
                "cannot allocate {rows} Monte Carlo rows x {arms} arms: {err}"
            ))
        })?;
        self.values.resize(len, 0.0);
        self.rows = rows;
        self.arms = arms;

        for row in self.values.chunks_exact_mut(arms) {
            for (slot, posterior) in row.iter_mut().zip(&posteriors) {
                *slot = posterior.sample(rng);
            }
        }
        Ok(())
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn arms(&self) -> usize {
        self.arms
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Allocated capacity in samples.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.values.capacity()
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.arms;
        Some(&self.values[start..start + self.arms])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on zero, and a zero-arm matrix has no rows anyway.
        self.values.chunks_exact(self.arms.max(1)).take(self.rows)
    }
}

/// Index of the largest value, lowest index on ties.
#[must_use]
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

//! Single-draw Thompson selection.
//!
//! Draw one sample from each arm's posterior and play the largest. Repeated
//! over many rounds, each arm is chosen with its posterior probability of
//! being optimal.

use rand::Rng;
use rand_distr::Distribution;

use crate::error::Result;

use super::posterior::PosteriorModel;
use super::samples::argmax;

#[derive(Debug, Clone, Copy, Default)]
pub struct ThompsonSelector;

impl ThompsonSelector {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Arm with the maximal posterior draw, lowest index on ties.
    pub fn select<R: Rng + ?Sized>(&self, model: &PosteriorModel, rng: &mut R) -> Result<usize> {
        let draws = self.draw(model, rng)?;
        // PosteriorModel always holds at least one arm.
        Ok(argmax(&draws).unwrap_or(0))
    }

    /// One posterior draw per arm, in arm order.
    pub fn draw<R: Rng + ?Sized>(&self, model: &PosteriorModel, rng: &mut R) -> Result<Vec<f64>> {
        Ok(model
            .posteriors()?
            .iter()
            .map(|posterior| posterior.sample(rng))
            .collect())
    }
}

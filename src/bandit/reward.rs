//! Reward sources consumed by the experiment loop.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{BanditError, Result};

use super::posterior::Reward;

/// Produces a binary outcome for a pulled arm.
///
/// Implementations report out-of-range arms as [`BanditError::ArmOutOfRange`].
/// Any error is passed through the experiment loop untouched.
pub trait RewardSource {
    fn pull(&mut self, arm: usize) -> Result<Reward>;
}

impl<F> RewardSource for F
where
    F: FnMut(usize) -> Result<Reward>,
{
    fn pull(&mut self, arm: usize) -> Result<Reward> {
        self(arm)
    }
}

/// Simulated source drawing Bernoulli outcomes from fixed per-arm rates.
#[derive(Debug, Clone)]
pub struct BernoulliRewardSource {
    rates: Vec<f64>,
    rng: StdRng,
}

impl BernoulliRewardSource {
    pub fn new(rates: Vec<f64>, rng: StdRng) -> Result<Self> {
        if rates.is_empty() {
            return Err(BanditError::InvalidConfiguration(
                "at least one reward rate is required".to_string(),
            ));
        }
        if let Some((arm, rate)) = rates
            .iter()
            .enumerate()
            .find(|(_, rate)| !(0.0..=1.0).contains(*rate))
        {
            return Err(BanditError::InvalidConfiguration(format!(
                "rate for arm {arm} must be in [0, 1], got {rate}"
            )));
        }
        Ok(Self { rates, rng })
    }

    pub fn with_seed(rates: Vec<f64>, seed: u64) -> Result<Self> {
        Self::new(rates, StdRng::seed_from_u64(seed))
    }

    #[must_use]
    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    /// Arm with the highest true rate.
    #[must_use]
    pub fn best_arm(&self) -> usize {
        super::samples::argmax(&self.rates).unwrap_or(0)
    }
}

impl RewardSource for BernoulliRewardSource {
    fn pull(&mut self, arm: usize) -> Result<Reward> {
        let rate = *self.rates.get(arm).ok_or(BanditError::ArmOutOfRange {
            arm,
            arms: self.rates.len(),
        })?;
        Ok(Reward::from(self.rng.random::<f64>() < rate))
    }
}

//! Beta-Bernoulli posterior per arm.
//!
//! Every arm starts from a uniform Beta(1, 1) prior. Observing a Bernoulli
//! outcome is the conjugate update, so the posterior after `s` successes in
//! `t` trials is Beta(1 + s, 1 + t - s).

use rand_distr::Beta;
use serde::{Deserialize, Serialize};

use crate::error::{BanditError, Result};

/// Binary outcome of a single pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reward {
    Success,
    Failure,
}

impl Reward {
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// 1 for a success, 0 for a failure.
    #[must_use]
    pub const fn value(self) -> u64 {
        match self {
            Self::Success => 1,
            Self::Failure => 0,
        }
    }
}

impl From<bool> for Reward {
    fn from(success: bool) -> Self {
        if success { Self::Success } else { Self::Failure }
    }
}

impl TryFrom<u8> for Reward {
    type Error = BanditError;

    fn try_from(outcome: u8) -> Result<Self> {
        match outcome {
            0 => Ok(Self::Failure),
            1 => Ok(Self::Success),
            other => Err(BanditError::RewardSource(format!(
                "outcome must be 0 or 1, got {other}"
            ))),
        }
    }
}

/// Observed evidence for one arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arm {
    pub id: usize,
    successes: u64,
    trials: u64,
}

impl Arm {
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self {
            id,
            successes: 0,
            trials: 0,
        }
    }

    #[must_use]
    pub const fn successes(&self) -> u64 {
        self.successes
    }

    #[must_use]
    pub const fn trials(&self) -> u64 {
        self.trials
    }

    #[must_use]
    pub const fn failures(&self) -> u64 {
        self.trials - self.successes
    }

    /// Shape parameters `(alpha, beta)` of the posterior.
    #[must_use]
    pub fn shape(&self) -> (f64, f64) {
        (
            1.0 + self.successes as f64,
            1.0 + self.failures() as f64,
        )
    }

    /// Posterior mean, `alpha / (alpha + beta)`.
    #[must_use]
    pub fn posterior_mean(&self) -> f64 {
        let (alpha, beta) = self.shape();
        alpha / (alpha + beta)
    }

    fn observe(&mut self, reward: Reward) {
        self.trials += 1;
        self.successes += reward.value();
    }
}

/// Per-arm posteriors for a fixed set of arms.
///
/// `update` is the only mutation path, which keeps `successes <= trials` for
/// every arm and the sum of trials equal to the number of updates applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosteriorModel {
    arms: Vec<Arm>,
}

impl PosteriorModel {
    /// Create a model with `n_arms` fresh arms.
    pub fn new(n_arms: usize) -> Result<Self> {
        if n_arms == 0 {
            return Err(BanditError::InvalidConfiguration(
                "experiment needs at least one arm".to_string(),
            ));
        }
        Ok(Self {
            arms: (0..n_arms).map(Arm::new).collect(),
        })
    }

    /// Build a model from already observed `(successes, trials)` pairs.
    pub fn from_observations(observations: &[(u64, u64)]) -> Result<Self> {
        let mut model = Self::new(observations.len())?;
        for (arm, &(successes, trials)) in model.arms.iter_mut().zip(observations) {
            if successes > trials {
                return Err(BanditError::InvalidConfiguration(format!(
                    "arm {}: {successes} successes exceed {trials} trials",
                    arm.id
                )));
            }
            arm.successes = successes;
            arm.trials = trials;
        }
        Ok(model)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.arms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    #[must_use]
    pub fn arms(&self) -> &[Arm] {
        &self.arms
    }

    pub fn arm(&self, arm_id: usize) -> Result<&Arm> {
        self.arms.get(arm_id).ok_or(BanditError::ArmOutOfRange {
            arm: arm_id,
            arms: self.arms.len(),
        })
    }

    #[must_use]
    pub fn total_trials(&self) -> u64 {
        self.arms.iter().map(Arm::trials).sum()
    }

    /// Record one outcome for `arm_id`.
    pub fn update(&mut self, arm_id: usize, reward: Reward) -> Result<()> {
        let arms = self.arms.len();
        let arm = self
            .arms
            .get_mut(arm_id)
            .ok_or(BanditError::ArmOutOfRange { arm: arm_id, arms })?;
        arm.observe(reward);
        Ok(())
    }

    /// Posterior distribution for `arm_id`.
    pub fn posterior(&self, arm_id: usize) -> Result<Beta<f64>> {
        let (alpha, beta) = self.arm(arm_id)?.shape();
        Beta::new(alpha, beta).map_err(|err| {
            BanditError::InvalidConfiguration(format!(
                "posterior for arm {arm_id} (alpha={alpha}, beta={beta}): {err}"
            ))
        })
    }

    /// Posteriors for every arm, in arm order.
    pub fn posteriors(&self) -> Result<Vec<Beta<f64>>> {
        (0..self.arms.len()).map(|id| self.posterior(id)).collect()
    }
}

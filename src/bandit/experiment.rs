//! Experiment loop: estimate, check stopping rules, pull, update.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{BanditError, Result};

use super::estimator::{Estimate, OptimalityEstimator};
use super::posterior::{PosteriorModel, Reward};
use super::reward::RewardSource;
use super::stopping::{StoppingDecision, StoppingRules, Winner};
use super::thompson::ThompsonSelector;

/// Hard limit on rounds, applied even when no budget is configured.
pub const DEFAULT_ROUND_CAP: u64 = 1_000_000;

/// Which arm to pull on a `Continue` round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Arm with the highest Monte Carlo optimality probability.
    #[default]
    EstimatedBest,
    /// Fresh single Thompson draw per round.
    Thompson,
}

impl SelectionPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EstimatedBest => "estimated_best",
            Self::Thompson => "thompson",
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionPolicy {
    type Err = BanditError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().replace('-', "_").as_str() {
            "estimated_best" | "best" => Ok(Self::EstimatedBest),
            "thompson" => Ok(Self::Thompson),
            other => Err(BanditError::InvalidConfiguration(format!(
                "unknown selection policy: {other} (expected estimated_best or thompson)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExperimentState {
    Running,
    Terminated { decision: StoppingDecision },
}

/// A running experiment over a fixed set of arms.
///
/// Owns the posterior model and the random generator; counters change only
/// through [`Experiment::step`].
#[derive(Debug, Clone)]
pub struct Experiment<R = StdRng> {
    model: PosteriorModel,
    estimator: OptimalityEstimator,
    selector: ThompsonSelector,
    policy: SelectionPolicy,
    round: u64,
    round_cap: u64,
    capped: bool,
    state: ExperimentState,
    last_estimate: Option<Estimate>,
    rng: R,
}

impl Experiment<StdRng> {
    /// Experiment driven by a `StdRng` seeded with `seed`.
    pub fn with_seed(n_arms: usize, seed: u64) -> Result<Self> {
        Self::new(n_arms, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Experiment<R> {
    pub fn new(n_arms: usize, rng: R) -> Result<Self> {
        Ok(Self {
            model: PosteriorModel::new(n_arms)?,
            estimator: OptimalityEstimator::default(),
            selector: ThompsonSelector::new(),
            policy: SelectionPolicy::default(),
            round: 0,
            round_cap: DEFAULT_ROUND_CAP,
            capped: false,
            state: ExperimentState::Running,
            last_estimate: None,
            rng,
        })
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Monte Carlo rows drawn per round.
    pub fn with_samples(mut self, samples: usize) -> Result<Self> {
        self.estimator = OptimalityEstimator::new(samples)?;
        Ok(self)
    }

    pub fn with_round_cap(mut self, round_cap: u64) -> Result<Self> {
        if round_cap == 0 {
            return Err(BanditError::InvalidConfiguration(
                "round cap must be positive".to_string(),
            ));
        }
        self.round_cap = round_cap;
        Ok(self)
    }

    #[must_use]
    pub const fn model(&self) -> &PosteriorModel {
        &self.model
    }

    #[must_use]
    pub const fn round(&self) -> u64 {
        self.round
    }

    #[must_use]
    pub const fn round_cap(&self) -> u64 {
        self.round_cap
    }

    /// True when the run ended on the hard round cap rather than a rule.
    #[must_use]
    pub const fn hit_round_cap(&self) -> bool {
        self.capped
    }

    #[must_use]
    pub const fn state(&self) -> ExperimentState {
        self.state
    }

    #[must_use]
    pub const fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    #[must_use]
    pub const fn last_estimate(&self) -> Option<&Estimate> {
        self.last_estimate.as_ref()
    }

    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        matches!(self.state, ExperimentState::Terminated { .. })
    }

    /// Run rounds until a stopping rule fires.
    pub fn run<S>(&mut self, source: &mut S, rules: &StoppingRules) -> Result<StoppingDecision>
    where
        S: RewardSource + ?Sized,
    {
        rules.validate()?;
        if rules.max_rounds.is_none() {
            debug!(
                round_cap = self.round_cap,
                "no round budget set, relying on the hard round cap"
            );
        }
        loop {
            let decision = self.step(source, rules)?;
            if decision.is_terminal() {
                return Ok(decision);
            }
        }
    }

    /// Run a single round.
    ///
    /// Returns `Continue` after pulling an arm and updating its posterior, or
    /// the terminal decision. Once terminated, returns that decision again
    /// without pulling.
    pub fn step<S>(&mut self, source: &mut S, rules: &StoppingRules) -> Result<StoppingDecision>
    where
        S: RewardSource + ?Sized,
    {
        if let ExperimentState::Terminated { decision } = self.state {
            return Ok(decision);
        }

        let estimate = self
            .estimator
            .estimate(&self.model, rules.stop_value, &mut self.rng)?;
        let mut decision = rules.evaluate(&estimate, self.round);

        if !decision.is_terminal() && self.round >= self.round_cap {
            warn!(
                round = self.round,
                round_cap = self.round_cap,
                "round cap reached before any stopping rule fired"
            );
            self.capped = true;
            decision = StoppingDecision::WinnerByBudget(Winner {
                arm: estimate.best,
                confidence: estimate.confidence(),
                value_remaining: estimate.value_remaining,
                rounds: self.round,
            });
        }

        if let Some(winner) = decision.winner() {
            info!(
                decision = decision.label(),
                arm = winner.arm,
                confidence = winner.confidence,
                value_remaining = winner.value_remaining,
                rounds = winner.rounds,
                "experiment finished"
            );
            self.state = ExperimentState::Terminated { decision };
            self.last_estimate = Some(estimate);
            return Ok(decision);
        }

        let arm = match self.policy {
            SelectionPolicy::EstimatedBest => estimate.best,
            SelectionPolicy::Thompson => self.selector.select(&self.model, &mut self.rng)?,
        };
        let reward = source.pull(arm)?;
        self.record(arm, reward)?;

        debug!(
            round = self.round,
            arm,
            success = reward.is_success(),
            best = estimate.best,
            confidence = estimate.confidence(),
            value_remaining = estimate.value_remaining,
            "round complete"
        );
        self.last_estimate = Some(estimate);
        Ok(StoppingDecision::Continue)
    }

    fn record(&mut self, arm: usize, reward: Reward) -> Result<()> {
        self.model.update(arm, reward)?;
        self.round += 1;
        Ok(())
    }

    /// Snapshot of per-arm evidence and the latest estimate.
    #[must_use]
    pub fn report(&self) -> ExperimentReport {
        let probabilities = self.last_estimate.as_ref().map(|e| &e.probabilities);
        let arms = self
            .model
            .arms()
            .iter()
            .map(|arm| ArmReport {
                id: arm.id,
                successes: arm.successes(),
                trials: arm.trials(),
                posterior_mean: arm.posterior_mean(),
                optimality: probabilities.and_then(|p| p.get(arm.id).copied()),
            })
            .collect();

        ExperimentReport {
            state: self.state,
            rounds: self.round,
            policy: self.policy,
            samples: self.estimator.samples(),
            value_remaining: self.last_estimate.as_ref().map(|e| e.value_remaining),
            arms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmReport {
    pub id: usize,
    pub successes: u64,
    pub trials: u64,
    pub posterior_mean: f64,
    pub optimality: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub state: ExperimentState,
    pub rounds: u64,
    pub policy: SelectionPolicy,
    pub samples: usize,
    pub value_remaining: Option<f64>,
    pub arms: Vec<ArmReport>,
}

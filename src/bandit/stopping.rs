//! Stopping rules evaluated once per round.
//!
//! Checked in priority order: confidence, value remaining, round budget.

use serde::{Deserialize, Serialize};

use crate::error::{BanditError, Result};

use super::estimator::Estimate;

pub const DEFAULT_STOP_ALPHA: f64 = 0.05;
pub const DEFAULT_STOP_VALUE: f64 = 0.95;
pub const DEFAULT_MAX_ROUNDS: u64 = 1000;
pub const DEFAULT_VALUE_THRESHOLD: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoppingRules {
    /// Stop once the best arm is optimal with probability `>= 1 - stop_alpha`.
    pub stop_alpha: f64,
    /// Percentile of the relative regret used for value remaining.
    pub stop_value: f64,
    /// Stop once value remaining falls below this fraction.
    pub value_threshold: f64,
    /// Round budget; `None` runs until another rule fires or the hard cap.
    pub max_rounds: Option<u64>,
}

impl Default for StoppingRules {
    fn default() -> Self {
        Self {
            stop_alpha: DEFAULT_STOP_ALPHA,
            stop_value: DEFAULT_STOP_VALUE,
            value_threshold: DEFAULT_VALUE_THRESHOLD,
            max_rounds: Some(DEFAULT_MAX_ROUNDS),
        }
    }
}

impl StoppingRules {
    pub fn new(stop_alpha: f64, stop_value: f64, max_rounds: Option<u64>) -> Result<Self> {
        let rules = Self {
            stop_alpha,
            stop_value,
            max_rounds,
            ..Self::default()
        };
        rules.validate()?;
        Ok(rules)
    }

    #[must_use]
    pub const fn with_value_threshold(mut self, value_threshold: f64) -> Self {
        self.value_threshold = value_threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.stop_alpha > 0.0 && self.stop_alpha <= 1.0) {
            return Err(BanditError::InvalidConfiguration(format!(
                "stop_alpha must be in (0, 1], got {}",
                self.stop_alpha
            )));
        }
        if !(self.stop_value > 0.0 && self.stop_value < 1.0) {
            return Err(BanditError::InvalidConfiguration(format!(
                "stop_value must be in (0, 1), got {}",
                self.stop_value
            )));
        }
        if !(self.value_threshold >= 0.0 && self.value_threshold.is_finite()) {
            return Err(BanditError::InvalidConfiguration(format!(
                "value_threshold must be a non-negative fraction, got {}",
                self.value_threshold
            )));
        }
        if self.max_rounds == Some(0) {
            return Err(BanditError::InvalidConfiguration(
                "max_rounds must be positive when set".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn confidence_threshold(&self) -> f64 {
        1.0 - self.stop_alpha
    }

    /// Decide for the current round.
    #[must_use]
    pub fn evaluate(&self, estimate: &Estimate, round: u64) -> StoppingDecision {
        let winner = Winner {
            arm: estimate.best,
            confidence: estimate.confidence(),
            value_remaining: estimate.value_remaining,
            rounds: round,
        };

        if winner.confidence >= self.confidence_threshold() {
            StoppingDecision::WinnerByConfidence(winner)
        } else if winner.value_remaining < self.value_threshold {
            StoppingDecision::WinnerByValueRemaining(winner)
        } else if self.max_rounds.is_some_and(|budget| round >= budget) {
            StoppingDecision::WinnerByBudget(winner)
        } else {
            StoppingDecision::Continue
        }
    }
}

/// Terminal details reported with every winning decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Winner {
    pub arm: usize,
    /// Optimality probability of `arm` at termination.
    pub confidence: f64,
    /// Value remaining at termination.
    pub value_remaining: f64,
    /// Rounds elapsed.
    pub rounds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum StoppingDecision {
    Continue,
    WinnerByConfidence(Winner),
    WinnerByValueRemaining(Winner),
    WinnerByBudget(Winner),
}

impl StoppingDecision {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Continue)
    }

    #[must_use]
    pub const fn winner(&self) -> Option<&Winner> {
        match self {
            Self::Continue => None,
            Self::WinnerByConfidence(winner)
            | Self::WinnerByValueRemaining(winner)
            | Self::WinnerByBudget(winner) => Some(winner),
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Continue => "continue",
            Self::WinnerByConfidence(_) => "winner_by_confidence",
            Self::WinnerByValueRemaining(_) => "winner_by_value_remaining",
            Self::WinnerByBudget(_) => "winner_by_budget",
        }
    }
}

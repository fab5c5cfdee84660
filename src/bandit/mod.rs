//! Bayesian experiment engine.
//!
//! - `posterior`: Beta-Bernoulli model per arm
//! - `thompson`: single-draw Thompson selection
//! - `samples` / `estimator`: Monte Carlo optimality and value remaining
//! - `stopping`: confidence, value-remaining and budget rules
//! - `experiment`: the round loop tying them together
//! - `reward`: reward sources the loop pulls from

pub mod estimator;
pub mod experiment;
pub mod posterior;
pub mod reward;
pub mod samples;
pub mod stopping;
pub mod thompson;

pub use estimator::{DEFAULT_MC_SAMPLES, Estimate, OptimalityEstimator, estimate_observations};
pub use experiment::{
    ArmReport, DEFAULT_ROUND_CAP, Experiment, ExperimentReport, ExperimentState, SelectionPolicy,
};
pub use posterior::{Arm, PosteriorModel, Reward};
pub use reward::{BernoulliRewardSource, RewardSource};
pub use samples::SampleMatrix;
pub use stopping::{StoppingDecision, StoppingRules, Winner};
pub use thompson::ThompsonSelector;

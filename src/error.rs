//! Error types for banditry.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BanditError {
    /// Rejected experiment parameters (arm count, thresholds, rates, observations).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("arm {arm} out of range for experiment with {arms} arms")]
    ArmOutOfRange { arm: usize, arms: usize },

    #[error("reward source failed: {0}")]
    RewardSource(String),

    /// Config file or environment override could not be read.
    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BanditError {
    /// Stable machine-readable code used by robot output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "invalid_configuration",
            Self::ArmOutOfRange { .. } => "arm_out_of_range",
            Self::RewardSource(_) => "reward_source",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}

pub type Result<T> = std::result::Result<T, BanditError>;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bandit::stopping::{
    DEFAULT_MAX_ROUNDS, DEFAULT_STOP_ALPHA, DEFAULT_STOP_VALUE, DEFAULT_VALUE_THRESHOLD,
};
use crate::bandit::{DEFAULT_MC_SAMPLES, DEFAULT_ROUND_CAP, SelectionPolicy, StoppingRules};
use crate::error::{BanditError, Result};

pub const PROJECT_CONFIG_FILE: &str = "banditry.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub experiment: ExperimentConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
}

impl Config {
    /// Layer defaults, files and environment.
    ///
    /// An explicit path (argument or `BANDITRY_CONFIG`) replaces the
    /// global + project pair.
    pub fn load(explicit_path: Option<&Path>, project_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("BANDITRY_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(project_root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    #[must_use]
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("banditry/config.toml"))
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        match Self::global_path() {
            Some(path) => Self::load_patch(&path),
            None => Ok(None),
        }
    }

    fn load_project(project_root: &Path) -> Result<Option<ConfigPatch>> {
        Self::load_patch(&project_root.join(PROJECT_CONFIG_FILE))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path).map_err(|err| {
            BanditError::Config(format!("read config {}: {err}", path.display()))
        })?;
        let patch = toml::from_str(&raw).map_err(|err| {
            BanditError::Config(format!("parse config {}: {err}", path.display()))
        })?;
        debug!(path = %path.display(), "loaded config layer");
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.experiment {
            self.experiment.merge(patch);
        }
        if let Some(patch) = patch.sampling {
            self.sampling.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_f64("BANDITRY_STOP_ALPHA")? {
            self.experiment.stop_alpha = value;
        }
        if let Some(value) = env_f64("BANDITRY_STOP_VALUE")? {
            self.experiment.stop_value = value;
        }
        if let Some(value) = env_u64("BANDITRY_MAX_ROUNDS")? {
            self.experiment.max_rounds = value;
        }
        if let Some(value) = env_f64("BANDITRY_VALUE_THRESHOLD")? {
            self.experiment.value_threshold = value;
        }
        if let Some(value) = env_u64("BANDITRY_ROUND_CAP")? {
            self.experiment.round_cap = value;
        }
        if let Some(value) = env_string("BANDITRY_POLICY") {
            self.experiment.policy = value
                .parse()
                .map_err(|err| BanditError::Config(format!("BANDITRY_POLICY: {err}")))?;
        }

        if let Some(value) = env_u64("BANDITRY_MC_SAMPLES")? {
            self.sampling.mc_samples = usize::try_from(value)
                .map_err(|_| BanditError::Config(format!("BANDITRY_MC_SAMPLES too large: {value}")))?;
        }
        if let Some(value) = env_u64("BANDITRY_SEED")? {
            self.sampling.seed = Some(value);
        }

        Ok(())
    }

    /// Reject values no experiment could run with.
    pub fn validate(&self) -> Result<()> {
        self.stopping_rules()
            .map_err(|err| BanditError::Config(err.to_string()))?;
        if self.sampling.mc_samples == 0 {
            return Err(BanditError::Config(
                "sampling.mc_samples must be positive".to_string(),
            ));
        }
        if self.experiment.round_cap == 0 {
            return Err(BanditError::Config(
                "experiment.round_cap must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn stopping_rules(&self) -> Result<StoppingRules> {
        let rules = StoppingRules::new(
            self.experiment.stop_alpha,
            self.experiment.stop_value,
            self.experiment.budget(),
        )?
        .with_value_threshold(self.experiment.value_threshold);
        rules.validate()?;
        Ok(rules)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    #[serde(default = "default_stop_alpha")]
    pub stop_alpha: f64,
    #[serde(default = "default_stop_value")]
    pub stop_value: f64,
    /// Round budget; 0 leaves it unset.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u64,
    #[serde(default = "default_value_threshold")]
    pub value_threshold: f64,
    #[serde(default = "default_round_cap")]
    pub round_cap: u64,
    #[serde(default)]
    pub policy: SelectionPolicy,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            stop_alpha: DEFAULT_STOP_ALPHA,
            stop_value: DEFAULT_STOP_VALUE,
            max_rounds: DEFAULT_MAX_ROUNDS,
            value_threshold: DEFAULT_VALUE_THRESHOLD,
            round_cap: DEFAULT_ROUND_CAP,
            policy: SelectionPolicy::default(),
        }
    }
}

impl ExperimentConfig {
    #[must_use]
    pub const fn budget(&self) -> Option<u64> {
        if self.max_rounds == 0 {
            None
        } else {
            Some(self.max_rounds)
        }
    }

    fn merge(&mut self, patch: ExperimentPatch) {
        if let Some(value) = patch.stop_alpha {
            self.stop_alpha = value;
        }
        if let Some(value) = patch.stop_value {
            self.stop_value = value;
        }
        if let Some(value) = patch.max_rounds {
            self.max_rounds = value;
        }
        if let Some(value) = patch.value_threshold {
            self.value_threshold = value;
        }
        if let Some(value) = patch.round_cap {
            self.round_cap = value;
        }
        if let Some(value) = patch.policy {
            self.policy = value;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_mc_samples")]
    pub mc_samples: usize,
    /// Fixed seed for reproducible runs; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            mc_samples: DEFAULT_MC_SAMPLES,
            seed: None,
        }
    }
}

impl SamplingConfig {
    fn merge(&mut self, patch: SamplingPatch) {
        if let Some(value) = patch.mc_samples {
            self.mc_samples = value;
        }
        if let Some(value) = patch.seed {
            self.seed = Some(value);
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    experiment: Option<ExperimentPatch>,
    sampling: Option<SamplingPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ExperimentPatch {
    stop_alpha: Option<f64>,
    stop_value: Option<f64>,
    max_rounds: Option<u64>,
    value_threshold: Option<f64>,
    round_cap: Option<u64>,
    policy: Option<SelectionPolicy>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SamplingPatch {
    mc_samples: Option<usize>,
    seed: Option<u64>,
}

const fn default_stop_alpha() -> f64 {
    DEFAULT_STOP_ALPHA
}

const fn default_stop_value() -> f64 {
    DEFAULT_STOP_VALUE
}

const fn default_max_rounds() -> u64 {
    DEFAULT_MAX_ROUNDS
}

const fn default_value_threshold() -> f64 {
    DEFAULT_VALUE_THRESHOLD
}

const fn default_round_cap() -> u64 {
    DEFAULT_ROUND_CAP
}

const fn default_mc_samples() -> usize {
    DEFAULT_MC_SAMPLES
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    let Some(value) = env_string(key) else {
        return Ok(None);
    };
    let parsed = value
        .trim()
        .parse::<u64>()
        .map_err(|err| BanditError::Config(format!("{key}: {err}")))?;
    Ok(Some(parsed))
}

fn env_f64(key: &str) -> Result<Option<f64>> {
    let Some(value) = env_string(key) else {
        return Ok(None);
    };
    let parsed = value
        .trim()
        .parse::<f64>()
        .map_err(|err| BanditError::Config(format!("{key}: {err}")))?;
    Ok(Some(parsed))
}

use std::path::PathBuf;

use rand::Rng;
use tracing::info;

use crate::config::Config;
use crate::error::Result;

pub struct AppContext {
    pub project_root: PathBuf,
    pub config: Config,
    pub robot_mode: bool,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let project_root = std::env::current_dir()?;
        let config = Config::load(cli.config.as_deref(), &project_root)?;

        Ok(Self {
            project_root,
            config,
            robot_mode: cli.robot,
        })
    }

    /// Seed from the flag, then the config, then OS entropy.
    ///
    /// Entropy seeds are logged so the run can be replayed.
    #[must_use]
    pub fn resolve_seed(&self, flag: Option<u64>) -> u64 {
        if let Some(seed) = flag.or(self.config.sampling.seed) {
            return seed;
        }
        let seed = rand::rng().random::<u64>();
        info!(seed, "no seed configured, drew one from entropy");
        seed
    }
}

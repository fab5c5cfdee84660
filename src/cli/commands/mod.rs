//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;

pub mod config;
pub mod estimate;
pub mod run;

use crate::app::AppContext;
use crate::error::Result;

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Run(args) => run::run(ctx, args),
        Commands::Estimate(args) => estimate::run(ctx, args),
        Commands::Config(args) => config::run(ctx, args),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Simulate an experiment against fixed Bernoulli reward rates
    Run(run::RunArgs),

    /// Estimate optimality and value remaining from observed counts
    Estimate(estimate::EstimateArgs),

    /// Show the effective configuration
    Config(config::ConfigArgs),
}

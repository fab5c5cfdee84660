use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::config::{Config, PROJECT_CONFIG_FILE};
use crate::error::{BanditError, Result};

#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Print the effective configuration as TOML
    #[arg(long)]
    pub toml: bool,
}

pub fn run(ctx: &AppContext, args: &ConfigArgs) -> Result<()> {
    let config = &ctx.config;

    if ctx.robot_mode {
        let payload = serde_json::json!({
            "config": config,
            "sources": {
                "global": Config::global_path().map(|p| p.display().to_string()),
                "project": ctx.project_root.join(PROJECT_CONFIG_FILE).display().to_string(),
            },
        });
        return emit_robot(&robot_ok(payload));
    }

    if args.toml {
        let raw = toml::to_string_pretty(config)
            .map_err(|err| BanditError::Config(format!("serialize config: {err}")))?;
        println!("{raw}");
        return Ok(());
    }

    let experiment = &config.experiment;
    let mut layout = HumanLayout::new();
    layout
        .title("Configuration")
        .section("Experiment")
        .kv("Stop alpha", &experiment.stop_alpha.to_string())
        .kv("Stop value", &experiment.stop_value.to_string())
        .kv(
            "Max rounds",
            &experiment
                .budget()
                .map_or_else(|| "unbounded".to_string(), |r| r.to_string()),
        )
        .kv("Value threshold", &experiment.value_threshold.to_string())
        .kv("Round cap", &experiment.round_cap.to_string())
        .kv("Policy", experiment.policy.as_str())
        .blank()
        .section("Sampling")
        .kv("MC samples", &config.sampling.mc_samples.to_string())
        .kv(
            "Seed",
            &config
                .sampling
                .seed
                .map_or_else(|| "(entropy)".to_string(), |s| s.to_string()),
        );
    emit_human(layout);
    Ok(())
}

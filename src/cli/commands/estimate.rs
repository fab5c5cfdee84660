use clap::Args;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::app::AppContext;
use crate::bandit::estimate_observations;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, percent, robot_ok};
use crate::error::Result;

#[derive(Args, Debug, Default)]
pub struct EstimateArgs {
    /// Observed counts per arm as SUCCESSES/TRIALS (repeat once per arm)
    #[arg(long = "arm", value_name = "SUCCESSES/TRIALS", required = true, value_parser = parse_observation)]
    pub arms: Vec<(u64, u64)>,

    /// Monte Carlo rows to draw
    #[arg(long)]
    pub samples: Option<usize>,

    /// Value-remaining percentile, as a fraction
    #[arg(long)]
    pub stop_value: Option<f64>,

    /// Sampler seed
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ArmEstimate {
    id: usize,
    successes: u64,
    trials: u64,
    optimality: f64,
}

#[derive(Debug, Serialize)]
struct EstimateOutput {
    seed: u64,
    samples: usize,
    percentile: f64,
    best: usize,
    confidence: f64,
    value_remaining: f64,
    arms: Vec<ArmEstimate>,
}

pub fn run(ctx: &AppContext, args: &EstimateArgs) -> Result<()> {
    let seed = ctx.resolve_seed(args.seed);
    let samples = args.samples.unwrap_or(ctx.config.sampling.mc_samples);
    let percentile = args.stop_value.unwrap_or(ctx.config.experiment.stop_value);

    let mut rng = StdRng::seed_from_u64(seed);
    let estimate = estimate_observations(&args.arms, samples, percentile, &mut rng)?;

    let output = EstimateOutput {
        seed,
        samples,
        percentile,
        best: estimate.best,
        confidence: estimate.confidence(),
        value_remaining: estimate.value_remaining,
        arms: args
            .arms
            .iter()
            .zip(&estimate.probabilities)
            .enumerate()
            .map(|(id, (&(successes, trials), &optimality))| ArmEstimate {
                id,
                successes,
                trials,
                optimality,
            })
            .collect(),
    };

    if ctx.robot_mode {
        return emit_robot(&robot_ok(output));
    }

    let mut layout = HumanLayout::new();
    layout
        .title("Posterior Estimate")
        .kv("Best arm", &output.best.to_string())
        .kv("Confidence", &percent(output.confidence))
        .kv(
            &format!("Value remaining (p{:.0})", percentile * 100.0),
            &percent(output.value_remaining),
        )
        .kv("MC samples", &samples.to_string())
        .kv("Seed", &seed.to_string())
        .blank()
        .section("Arms");
    for arm in &output.arms {
        layout.bullet(&format!(
            "arm {}: {}/{} successes, P(best) {}",
            arm.id,
            arm.successes,
            arm.trials,
            percent(arm.optimality)
        ));
    }
    emit_human(layout);
    Ok(())
}

fn parse_observation(raw: &str) -> std::result::Result<(u64, u64), String> {
    let (successes, trials) = raw
        .split_once('/')
        .ok_or_else(|| format!("expected SUCCESSES/TRIALS, got '{raw}'"))?;
    let successes = successes
        .trim()
        .parse::<u64>()
        .map_err(|err| format!("successes '{successes}': {err}"))?;
    let trials = trials
        .trim()
        .parse::<u64>()
        .map_err(|err| format!("trials '{trials}': {err}"))?;
    if successes > trials {
        return Err(format!("{successes} successes exceed {trials} trials"));
    }
    Ok((successes, trials))
}

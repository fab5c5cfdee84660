use clap::Args;
use console::style;

use crate::app::AppContext;
use crate::bandit::{
    BernoulliRewardSource, Experiment, ExperimentReport, SelectionPolicy, StoppingDecision,
    StoppingRules,
};
use crate::cli::output::{HumanLayout, emit_human, emit_robot, percent, robot_ok};
use crate::error::Result;

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// True success rate per arm, comma separated (e.g. 0.4,0.5)
    #[arg(long, value_delimiter = ',', required = true, num_args = 1..)]
    pub rates: Vec<f64>,

    /// Seed for both the sampler and the simulated rewards
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop when the best arm is optimal with probability >= 1 - alpha
    #[arg(long)]
    pub stop_alpha: Option<f64>,

    /// Value-remaining percentile, as a fraction
    #[arg(long)]
    pub stop_value: Option<f64>,

    /// Round budget
    #[arg(long, conflicts_with = "unbounded")]
    pub max_rounds: Option<u64>,

    /// Run without a round budget (the hard round cap still applies)
    #[arg(long)]
    pub unbounded: bool,

    /// Relative improvement below which the experiment stops
    #[arg(long)]
    pub value_threshold: Option<f64>,

    /// Monte Carlo rows per round
    #[arg(long)]
    pub samples: Option<usize>,

    /// Arm selection policy (estimated_best or thompson)
    #[arg(long)]
    pub policy: Option<SelectionPolicy>,

    /// Hard limit on rounds
    #[arg(long)]
    pub round_cap: Option<u64>,
}

#[derive(Debug, serde::Serialize)]
struct RunOutput<'a> {
    seed: u64,
    rates: &'a [f64],
    true_best: usize,
    rules: StoppingRules,
    decision: StoppingDecision,
    report: ExperimentReport,
}

pub fn run(ctx: &AppContext, args: &RunArgs) -> Result<()> {
    let experiment_config = &ctx.config.experiment;
    let mut rules = ctx.config.stopping_rules()?;
    if let Some(value) = args.stop_alpha {
        rules.stop_alpha = value;
    }
    if let Some(value) = args.stop_value {
        rules.stop_value = value;
    }
    if let Some(value) = args.value_threshold {
        rules.value_threshold = value;
    }
    if args.unbounded {
        rules.max_rounds = None;
    } else if let Some(value) = args.max_rounds {
        rules.max_rounds = Some(value);
    }
    rules.validate()?;

    let seed = ctx.resolve_seed(args.seed);
    let samples = args.samples.unwrap_or(ctx.config.sampling.mc_samples);
    let policy = args.policy.unwrap_or(experiment_config.policy);
    let round_cap = args.round_cap.unwrap_or(experiment_config.round_cap);

    let mut source = BernoulliRewardSource::with_seed(args.rates.clone(), seed.wrapping_add(1))?;
    let mut experiment = Experiment::with_seed(args.rates.len(), seed)?
        .with_samples(samples)?
        .with_round_cap(round_cap)?
        .with_policy(policy);

    let decision = experiment.run(&mut source, &rules)?;
    let output = RunOutput {
        seed,
        rates: &args.rates,
        true_best: source.best_arm(),
        rules,
        decision,
        report: experiment.report(),
    };

    let cap_warning = experiment.hit_round_cap().then(|| {
        format!("round cap of {round_cap} reached before any stopping rule fired")
    });

    if ctx.robot_mode {
        let mut response = robot_ok(output);
        if let Some(warning) = cap_warning {
            response = response.with_warning(warning);
        }
        return emit_robot(&response);
    }

    let mut layout = HumanLayout::new();
    layout.title("Experiment Result").section("Decision");
    layout.kv("Outcome", decision.label());
    if let Some(winner) = decision.winner() {
        layout
            .kv("Winning arm", &winner.arm.to_string())
            .kv("Confidence", &percent(winner.confidence))
            .kv("Value remaining", &percent(winner.value_remaining))
            .kv("Rounds", &winner.rounds.to_string());
    }
    if let Some(warning) = &cap_warning {
        layout.push_line(style(format!("warning: {warning}")).yellow().to_string());
    }
    layout
        .kv("True best arm", &output.true_best.to_string())
        .kv("Seed", &seed.to_string())
        .blank()
        .section("Rules")
        .kv("Confidence", &percent(rules.confidence_threshold()))
        .kv("Value percentile", &percent(rules.stop_value))
        .kv("Value threshold", &percent(rules.value_threshold))
        .kv(
            "Max rounds",
            &rules
                .max_rounds
                .map_or_else(|| format!("unbounded (cap {round_cap})"), |r| r.to_string()),
        )
        .kv("Policy", policy.as_str())
        .kv("MC samples", &samples.to_string())
        .blank()
        .section("Arms");

    for (arm, rate) in output.report.arms.iter().zip(&args.rates) {
        let optimality = arm.optimality.map_or_else(|| "-".to_string(), percent);
        layout.bullet(&format!(
            "arm {}: {}/{} successes, mean {:.4}, P(best) {}, true rate {:.4}",
            arm.id, arm.successes, arm.trials, arm.posterior_mean, optimality, rate
        ));
    }

    emit_human(layout);
    Ok(())
}

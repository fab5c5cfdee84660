use banditry::bandit::{
    BernoulliRewardSource, Experiment, OptimalityEstimator, PosteriorModel, SelectionPolicy,
    StoppingDecision, StoppingRules,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn run_once(
    rates: &[f64],
    seed: u64,
    budget: u64,
    samples: usize,
    policy: SelectionPolicy,
) -> (StoppingDecision, u64) {
    let mut experiment = Experiment::with_seed(rates.len(), seed)
        .unwrap()
        .with_samples(samples)
        .unwrap()
        .with_policy(policy);
    let mut source = BernoulliRewardSource::with_seed(rates.to_vec(), seed ^ 0x5eed).unwrap();
    let rules = StoppingRules::new(0.05, 0.95, Some(budget)).unwrap();
    let decision = experiment.run(&mut source, &rules).unwrap();
    (decision, experiment.round())
}

/// Two arms at 0.4 and 0.5, alpha 0.05, 95th percentile, budget 200.
fn run_close_arms(seed: u64) -> (StoppingDecision, u64) {
    let mut experiment = Experiment::with_seed(2, seed)
        .unwrap()
        .with_policy(SelectionPolicy::Thompson);
    let mut source = BernoulliRewardSource::with_seed(vec![0.4, 0.5], seed + 1).unwrap();
    let rules = StoppingRules::new(0.05, 0.95, Some(200)).unwrap();
    let decision = experiment.run(&mut source, &rules).unwrap();
    (decision, experiment.round())
}

#[test]
fn fixed_seed_picks_higher_rate_arm_by_confidence() {
    let (decision, rounds) = run_close_arms(1);

    let StoppingDecision::WinnerByConfidence(winner) = decision else {
        panic!("expected a confidence stop, got {decision:?}");
    };
    assert_eq!(winner.arm, 1);
    assert_eq!(winner.rounds, 5);
    assert_eq!(rounds, 5);
    assert!(winner.confidence >= 0.95);
    assert_eq!(run_close_arms(1), (decision, rounds));
}

#[test]
fn fixed_seed_picks_higher_rate_arm_by_value_remaining() {
    let (decision, rounds) = run_close_arms(2);

    let StoppingDecision::WinnerByValueRemaining(winner) = decision else {
        panic!("expected a value-remaining stop, got {decision:?}");
    };
    assert_eq!(winner.arm, 1);
    assert_eq!(winner.rounds, 133);
    assert_eq!(rounds, 133);
    assert!(winner.value_remaining < 0.01);
    assert_eq!(run_close_arms(2), (decision, rounds));
}

#[test]
fn greedy_fixed_seed_is_reproducible() {
    let policy = SelectionPolicy::EstimatedBest;
    let (first, first_rounds) = run_once(&[0.4, 0.5], 20_240_601, 200, 5000, policy);
    let (second, second_rounds) = run_once(&[0.4, 0.5], 20_240_601, 200, 5000, policy);

    assert_eq!(first, second);
    assert_eq!(first_rounds, second_rounds);
    assert!(first_rounds <= 200);
    assert!(first.is_terminal());
}

#[test]
fn greedy_policy_separates_deterministic_arms() {
    for seed in 0..5 {
        let (decision, _) = run_once(&[0.0, 1.0], seed, 200, 2000, SelectionPolicy::EstimatedBest);
        assert_eq!(decision.label(), "winner_by_confidence", "seed {seed}");
        assert_eq!(decision.winner().unwrap().arm, 1, "seed {seed}");
    }
}

#[test]
fn clear_gap_names_higher_rate_arm() {
    for seed in 0..5 {
        let (decision, rounds) = run_once(&[0.1, 0.6], seed, 1000, 2000, SelectionPolicy::Thompson);
        assert!(
            matches!(
                decision,
                StoppingDecision::WinnerByConfidence(_) | StoppingDecision::WinnerByValueRemaining(_)
            ),
            "seed {seed}: {decision:?}"
        );
        assert_eq!(decision.winner().unwrap().arm, 1, "seed {seed}");
        assert!(rounds < 1000);
    }
}

#[test]
fn wider_gap_stops_sooner_on_average() {
    let seeds = 0..12u64;
    let average = |rates: &[f64]| {
        let total: u64 = seeds
            .clone()
            .map(|seed| run_once(rates, seed, 300, 1000, SelectionPolicy::Thompson).1)
            .sum();
        total as f64 / 12.0
    };

    let narrow = average(&[0.45, 0.55]);
    let wide = average(&[0.2, 0.8]);
    assert!(wide < narrow, "wide = {wide}, narrow = {narrow}");
}

#[test]
fn repeated_estimates_are_consistent() {
    let model = PosteriorModel::from_observations(&[(40, 100), (50, 100)]).unwrap();
    let mut rng = StdRng::seed_from_u64(77);
    let mut estimator = OptimalityEstimator::new(5000).unwrap();

    let first = estimator.estimate(&model, 0.95, &mut rng).unwrap();
    let second = estimator.estimate(&model, 0.95, &mut rng).unwrap();

    assert_eq!(first.best, 1);
    assert_eq!(first.best, second.best);
    assert!((first.confidence() - second.confidence()).abs() < 0.03);
    let ratio = first.value_remaining / second.value_remaining;
    assert!((0.5..2.0).contains(&ratio), "ratio = {ratio}");
}

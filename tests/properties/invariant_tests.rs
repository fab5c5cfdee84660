use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use banditry::bandit::{
    BernoulliRewardSource, Experiment, PosteriorModel, Reward, SelectionPolicy, StoppingRules,
    estimate_observations,
};

fn observations() -> impl Strategy<Value = Vec<(u64, u64)>> {
    prop::collection::vec(
        (0u64..200).prop_flat_map(|trials| (0..=trials, Just(trials))),
        1..6,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn optimality_is_a_distribution(obs in observations(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let estimate = estimate_observations(&obs, 400, 0.95, &mut rng).unwrap();

        let sum: f64 = estimate.probabilities.iter().sum();
        prop_assert!((sum - 1.0).abs() < 1e-9);
        prop_assert!(estimate.probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
        prop_assert!(estimate.best < obs.len());
        prop_assert!(estimate.value_remaining >= 0.0);
    }

    #[test]
    fn updates_keep_counts_consistent(
        n_arms in 1usize..6,
        pulls in prop::collection::vec((0usize..6, any::<bool>()), 0..200),
    ) {
        let mut model = PosteriorModel::new(n_arms).unwrap();
        let mut applied = 0u64;
        for (arm, success) in pulls {
            match model.update(arm, Reward::from(success)) {
                Ok(()) => applied += 1,
                Err(_) => prop_assert!(arm >= n_arms),
            }
        }
        prop_assert_eq!(model.total_trials(), applied);
        prop_assert!(model.arms().iter().all(|a| a.successes() <= a.trials()));
    }

    #[test]
    fn experiment_respects_budget_and_invariants(
        rates in prop::collection::vec(0.0f64..=1.0, 1..4),
        seed in any::<u64>(),
        budget in 1u64..30,
        thompson in any::<bool>(),
    ) {
        let policy = if thompson { SelectionPolicy::Thompson } else { SelectionPolicy::EstimatedBest };
        let mut experiment = Experiment::with_seed(rates.len(), seed)
            .unwrap()
            .with_samples(200)
            .unwrap()
            .with_policy(policy);
        let mut source = BernoulliRewardSource::with_seed(rates, seed).unwrap();
        let rules = StoppingRules::new(0.05, 0.95, Some(budget)).unwrap();

        let decision = experiment.run(&mut source, &rules).unwrap();
        let winner = decision.winner().unwrap();

        prop_assert!(winner.rounds <= budget);
        prop_assert_eq!(winner.rounds, experiment.round());
        prop_assert_eq!(experiment.model().total_trials(), experiment.round());
        prop_assert!(experiment.model().arms().iter().all(|a| a.successes() <= a.trials()));
        prop_assert!(winner.arm < experiment.model().len());
    }
}

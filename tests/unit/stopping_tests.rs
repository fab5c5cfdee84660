use banditry::bandit::{Estimate, StoppingDecision, StoppingRules};
use banditry::test_utils::{TestCase, run_table_tests};

fn estimate(confidence: f64, value_remaining: f64) -> Estimate {
    Estimate {
        probabilities: vec![1.0 - confidence, confidence],
        best: 1,
        value_remaining,
        percentile: 0.95,
        samples: 5000,
    }
}

#[test]
fn stopping_priority_table() -> Result<(), String> {
    let cases = vec![
        TestCase {
            name: "confident and cheap",
            input: (0.97, 0.001, 10u64),
            expected: "winner_by_confidence",
            should_panic: false,
        },
        TestCase {
            name: "exactly at confidence threshold",
            input: (0.96, 0.5, 10),
            expected: "winner_by_confidence",
            should_panic: false,
        },
        TestCase {
            name: "value remaining below one percent",
            input: (0.80, 0.009, 10),
            expected: "winner_by_value_remaining",
            should_panic: false,
        },
        TestCase {
            name: "value remaining at threshold continues",
            input: (0.80, 0.01, 10),
            expected: "continue",
            should_panic: false,
        },
        TestCase {
            name: "budget reached",
            input: (0.80, 0.2, 100),
            expected: "winner_by_budget",
            should_panic: false,
        },
        TestCase {
            name: "value rule beats budget",
            input: (0.80, 0.0, 100),
            expected: "winner_by_value_remaining",
            should_panic: false,
        },
    ];

    let rules = StoppingRules::new(0.05, 0.95, Some(100)).expect("rules");
    run_table_tests(cases, |(confidence, value_remaining, round)| {
        rules.evaluate(&estimate(confidence, value_remaining), round).label()
    })
}

#[test]
fn winner_carries_terminal_values() {
    let rules = StoppingRules::new(0.1, 0.95, Some(20)).unwrap();
    let decision = rules.evaluate(&estimate(0.92, 0.3), 7);

    let StoppingDecision::WinnerByConfidence(winner) = decision else {
        panic!("unexpected {decision:?}");
    };
    assert_eq!(winner.arm, 1);
    assert_eq!(winner.rounds, 7);
    assert!((winner.confidence - 0.92).abs() < 1e-12);
    assert!((winner.value_remaining - 0.3).abs() < 1e-12);
}

//! Properties of the reward that must hold across whole input ranges, checked
//! against every case of the employees benchmark.

use rstest::rstest;
use sqlbench_eval::reward::{correctness, efficiency, round6};
use sqlbench_eval::similarity::ratio;
use sqlbench_eval::{compute_reward, CaseSet, RewardError, EFFICIENCY_HALF_LIFE};

const NEAR_MISSES: [&str; 6] = ["", "x", "Arno", "Kumaresan Arno", "ARNO KUMARESAN", "Development"];

#[test]
fn test_reward_is_bounded() {
    for case in &CaseSet::employees() {
        for answer in NEAR_MISSES.iter().copied().chain([case.expected_answer.as_str()]) {
            for n_actions in 1..=40 {
                let reward =
                    compute_reward(answer, &case.expected_answer, n_actions, case.optimal_actions)
                        .unwrap();
                assert!(
                    (0.0..=1.0).contains(&reward),
                    "{:?} vs {:?} in {} actions gave {}",
                    answer,
                    case.expected_answer,
                    n_actions,
                    reward
                );
            }
        }
    }
}

#[test]
fn test_reward_never_increases_with_more_actions() {
    for case in &CaseSet::employees() {
        let mut previous = f64::INFINITY;
        for n_actions in 1..=60 {
            let reward = compute_reward(
                case.expected_answer.as_str(),
                &case.expected_answer,
                n_actions,
                case.optimal_actions,
            )
            .unwrap();
            assert!(reward <= previous, "reward rose at {} actions", n_actions);
            previous = reward;
        }
    }
}

#[test]
fn test_no_penalty_within_budget() {
    for case in &CaseSet::employees() {
        for n_actions in 1..=i64::from(case.optimal_actions) {
            let reward = compute_reward(
                case.expected_answer.as_str(),
                &case.expected_answer,
                n_actions,
                case.optimal_actions,
            )
            .unwrap();
            assert_eq!(reward, 1.0);
        }
    }
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(4)]
#[case(10)]
#[case(100)]
fn test_half_life_halves_efficiency(#[case] optimal: u32) {
    let half_life = EFFICIENCY_HALF_LIFE as i64;
    for extra in 1..20_i64 {
        let n = i64::from(optimal) + extra;
        let now = efficiency(n, optimal, EFFICIENCY_HALF_LIFE);
        let later = efficiency(n + half_life, optimal, EFFICIENCY_HALF_LIFE);
        assert!((later - now / 2.0).abs() < 1e-12);
    }
}

#[test]
fn test_correctness_is_monotonic_in_similarity() {
    let mut previous = 0.0;
    for step in 0..=100 {
        let sim = f64::from(step) / 100.0;
        let value = correctness(sim, 0.70, 0.30);
        assert!(value >= previous);
        assert!((0.0..=1.0).contains(&value));
        previous = value;
    }
    assert_eq!(correctness(0.70, 0.70, 0.30), 0.0);
    assert_eq!(correctness(1.0, 0.70, 0.30), 1.0);
}

#[test]
fn test_reward_matches_formula() {
    let expected = "Arno Kumaresan";
    for answer in NEAR_MISSES {
        for n_actions in [1_i64, 4, 5, 9, 17] {
            let sim = ratio(
                &answer.trim().to_lowercase(),
                &expected.trim().to_lowercase(),
            );
            let extra = (n_actions - 4).max(0) as f64;
            let gamma = 0.5_f64.powf(1.0 / 5.0);
            let formula = round6(((sim - 0.70) / 0.30).clamp(0.0, 1.0) * gamma.powf(extra));
            assert_eq!(compute_reward(answer, expected, n_actions, 4).unwrap(), formula);
        }
    }
}

#[rstest]
#[case("Arno Kumaresan", "Arno Kumaresan", 4, 4, 1.0)]
#[case("401", "401", 9, 4, 0.5)]
#[case("wrong", "Manton Leuchs", 4, 4, 0.0)]
#[case("Arno Kumaresan", "Arno Kumaresan", 5, 4, 0.870551)]
#[case("arno kumaresan ", "Arno Kumaresan", 3, 4, 1.0)]
fn test_reference_scenarios(
    #[case] answer: &str,
    #[case] expected: &str,
    #[case] n_actions: i64,
    #[case] optimal: u32,
    #[case] reward: f64,
) {
    assert_eq!(compute_reward(answer, expected, n_actions, optimal).unwrap(), reward);
}

#[rstest]
#[case(0)]
#[case(-1)]
#[case(i64::MIN)]
fn test_invalid_action_counts(#[case] n_actions: i64) {
    assert_eq!(
        compute_reward("401", "401", n_actions, 4),
        Err(RewardError::InvalidInput { n_actions })
    );
}

#[test]
fn test_partial_similarity_uses_full_ramp() {
    // 29 shared characters out of 32 each: similarity 29/32
    let answer = format!("{}abc", "x".repeat(29));
    let expected = format!("{}def", "x".repeat(29));
    assert_eq!(compute_reward(&answer, &expected, 19, 4).unwrap(), 0.085938);
}

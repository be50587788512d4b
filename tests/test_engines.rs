//! End-to-end checks of both engines against hand-computed values and the
//! structural properties of the optimal value function.

use clearance_pricing::constants::*;
use clearance_pricing::state_computation::compare_engines;
use clearance_pricing::{solve, ClearanceProblem, ElasticityTable, Engine, PricingError};

const ENGINES: [Engine; 2] = [Engine::Scalar, Engine::Batched];

fn two_price_problem(time_steps: i64, init_inv: i64) -> ClearanceProblem {
    let el = ElasticityTable::from_pairs(&[(0.0, 1.0), (0.5, 2.0)]).unwrap();
    ClearanceProblem::new(time_steps, init_inv, el).unwrap()
}

fn three_price_table() -> ElasticityTable {
    ElasticityTable::from_pairs(&[(0.3, 0.5), (0.5, 1.1), (0.7, 1.4)]).unwrap()
}

// ── Golden values ────────────────────────────────────────────────────

#[test]
fn test_golden_last_period() {
    // Last period, one unit: V = max_p1 price(p1) · P(D ≥ 1; rate(p1)).
    let full = 1.0 - (-1.0f64).exp();
    let half = 0.5 * (1.0 - (-2.0f64).exp());
    for engine in ENGINES {
        let sched = solve(&two_price_problem(2, 1), engine).unwrap();
        assert!(is_approx_eq(sched.value(1, 1, 0).unwrap(), full.max(half)));
        assert_eq!(sched.action(1, 1, 0), Some(0));
        assert!(is_approx_eq(sched.value(1, 1, 1).unwrap(), half));
    }
}

#[test]
fn test_golden_first_period() {
    // Holding full price twice: (1 − e⁻¹)(1 + e⁻¹) = 1 − e⁻².
    let expected = 1.0 - (-2.0f64).exp();
    for engine in ENGINES {
        let sched = solve(&two_price_problem(2, 1), engine).unwrap();
        assert!(
            is_approx_eq(sched.initial_value(), expected),
            "{engine}: {}",
            sched.initial_value()
        );
        assert_eq!(sched.initial_action(), 0);
    }
}

// ── Boundary conditions ──────────────────────────────────────────────

#[test]
fn test_zero_inventory_fixed_point() {
    for engine in ENGINES {
        let sched = solve(&ClearanceProblem::new(5, 4, three_price_table()).unwrap(), engine).unwrap();
        for t in 0..5 {
            for p in 0..3 {
                assert_eq!(sched.value(t, 0, p), Some(0.0));
            }
        }
    }
}

#[test]
fn test_zero_initial_inventory_problem() {
    let sched = solve(&ClearanceProblem::new(3, 0, three_price_table()).unwrap(), Engine::Batched).unwrap();
    assert_eq!(sched.time_steps(), 3);
    assert_eq!(sched.initial_value(), 0.0);
}

#[test]
fn test_zero_rate_action_sells_nothing() {
    let el = ElasticityTable::from_pairs(&[(0.0, 0.0), (0.4, 1.0)]).unwrap();
    let problem = ClearanceProblem::new(1, 3, el).unwrap();
    for engine in ENGINES {
        let sched = solve(&problem, engine).unwrap();
        // Waiting at full price earns nothing in the last period, so markdown.
        assert_eq!(sched.action(0, 3, 0), Some(1));
        assert!(sched.value(0, 3, 0).unwrap() > 0.0);
    }
}

#[test]
fn test_invalid_parameters() {
    let el = three_price_table();
    for (t, s) in [(0, 3), (-2, 3), (3, -1)] {
        let err = ClearanceProblem::new(t, s, el.clone()).unwrap_err();
        assert!(matches!(err, PricingError::InvalidParameter(_)));
    }
    assert!(matches!(
        ElasticityTable::from_pairs(&[(0.2, -1.0)]),
        Err(PricingError::InvalidParameter(_))
    ));
}

// ── Structural properties ────────────────────────────────────────────

#[test]
fn test_value_monotone_in_time() {
    let problem = ClearanceProblem::new(8, 10, three_price_table()).unwrap();
    let sched = solve(&problem, Engine::Batched).unwrap();
    for t in 0..7 {
        for s in 0..=10 {
            for p in 0..3 {
                let now = sched.value(t, s, p).unwrap();
                let later = sched.value(t + 1, s, p).unwrap();
                assert!(now + EPSILON >= later, "t={t} s={s} p={p}: {now} < {later}");
            }
        }
    }

    // Same state, longer horizon.
    let short = solve(&ClearanceProblem::new(3, 10, three_price_table()).unwrap(), Engine::Scalar).unwrap();
    for s in 0..=10 {
        for p in 0..3 {
            assert!(sched.value(0, s, p).unwrap() + EPSILON >= short.value(0, s, p).unwrap());
        }
    }
}

#[test]
fn test_value_monotone_in_inventory() {
    let sched = solve(&ClearanceProblem::new(6, 12, three_price_table()).unwrap(), Engine::Scalar).unwrap();
    for t in 0..6 {
        for p in 0..3 {
            for s in 0..12 {
                let a = sched.value(t, s, p).unwrap();
                let b = sched.value(t, s + 1, p).unwrap();
                assert!(b + EPSILON >= a, "t={t} p={p} s={s}: {b} < {a}");
            }
        }
    }
}

#[test]
fn test_policy_never_raises_price() {
    let el = ElasticityTable::exponential(12, DEFAULT_ALPHA, DEFAULT_BETA).unwrap();
    let sched = solve(&ClearanceProblem::new(6, 9, el).unwrap(), Engine::Batched).unwrap();
    for t in 0..6 {
        for s in 0..=9 {
            for p in 0..12 {
                assert!(sched.action(t, s, p).unwrap() >= p);
            }
        }
    }
}

// ── Engine equivalence ───────────────────────────────────────────────

#[test]
fn test_engines_equivalent_small() {
    let problem = ClearanceProblem::new(3, 5, three_price_table()).unwrap();
    let cmp = compare_engines(&problem).unwrap();
    assert!(cmp.max_abs_diff <= EPSILON);
    assert!(cmp.same_policy);
    for t in 0..3 {
        for s in 0..=5 {
            for p in 0..3 {
                let a = cmp.scalar.period(t).unwrap();
                let b = cmp.batched.period(t).unwrap();
                assert!(is_approx_eq(a.value(s, p).unwrap(), b.value(s, p).unwrap()));
                assert_eq!(a.action(s, p), b.action(s, p));
            }
        }
    }
}

#[test]
fn test_engines_equivalent_exponential_curve() {
    let el = ElasticityTable::exponential(20, DEFAULT_ALPHA, DEFAULT_BETA).unwrap();
    let problem = ClearanceProblem::new(10, 9, el).unwrap();
    let cmp = compare_engines(&problem).unwrap();
    assert!(cmp.max_abs_diff <= EPSILON, "diff={}", cmp.max_abs_diff);
    assert!(cmp.same_policy);
    assert!(cmp.scalar.initial_value() > 0.0);
}

#[test]
fn test_discount_lowers_value() {
    let base = ClearanceProblem::new(6, 8, three_price_table()).unwrap();
    let discounted = base.clone().with_discount(0.8).unwrap();
    for engine in ENGINES {
        let v1 = solve(&base, engine).unwrap().initial_value();
        let v2 = solve(&discounted, engine).unwrap().initial_value();
        assert!(v2 < v1, "{engine}: discounted {v2} >= undiscounted {v1}");
    }
}

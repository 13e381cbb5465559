//! End-to-end runs of the scenario battery.

use leverage_loop_sim::config::StrategyConfig;
use leverage_loop_sim::simulation::{
    builtin_scenarios, Scenario, ScenarioRunner, SimulationEngine, TerminationReason, MAX_AMOUNT,
    MAX_CYCLES, MIN_AMOUNT, SOLVENCY_EPSILON,
};
use leverage_loop_sim::strategy::StrategyKind;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn battery_respects_ledger_invariants() {
    let config = StrategyConfig::default();
    let engine = SimulationEngine::new(config.clone());

    for scenario in builtin_scenarios() {
        let (position, targets) = scenario.validate().unwrap();
        let report = engine.run(position, targets);

        assert!(
            report.summary.cycles_executed <= MAX_CYCLES,
            "{} ran {} cycles",
            scenario.name,
            report.summary.cycles_executed
        );

        let mut collateral = position.collateral;
        let mut debt = position.debt;
        let mut cash = position.cash;

        for cycle in &report.cycles {
            // Cycles chain: each starts where the previous one ended
            assert_eq!(cycle.cash_before, cash, "{}", scenario.name);
            assert!(cycle.cash_after >= -SOLVENCY_EPSILON, "{}", scenario.name);

            if cycle.ltv_before > config.max_ltv_risk {
                assert_eq!(cycle.strategy, StrategyKind::SafeRepay);
            }

            assert_eq!(cycle.fees_total, cycle.volume * config.fee_rate);
            assert_eq!(
                cycle.fees_flash_loan_share + cycle.fees_platform_share,
                cycle.fees_total
            );
            assert_eq!(cycle.cash_after, cash + cycle.wallet_delta);
            assert_eq!(
                cycle.collateral_after,
                collateral + (cycle.collateral_in + cycle.reinvest_in)
            );
            assert_eq!(
                cycle.debt_after,
                debt + (cycle.borrow_delta - cycle.repay_delta)
            );

            collateral = cycle.collateral_after;
            debt = cycle.debt_after;
            cash = cycle.cash_after;
        }

        let final_position = report.summary.final_position;
        assert_eq!(final_position.collateral, collateral);
        assert_eq!(final_position.cash, cash);
        assert_eq!(
            report.summary.success,
            final_position.collateral >= targets.target_collateral
        );
    }
}

#[test]
fn battery_terminations_match_expectations() {
    let engine = SimulationEngine::new(StrategyConfig::default());
    let terminations: Vec<TerminationReason> = builtin_scenarios()
        .into_iter()
        .map(|s| {
            let (position, targets) = s.validate().unwrap();
            engine.run(position, targets).summary.termination
        })
        .collect();

    assert_eq!(
        terminations,
        vec![
            TerminationReason::GoalReached,
            TerminationReason::CycleBudgetExhausted,
            TerminationReason::GoalReached,
            TerminationReason::GoalReached,
            TerminationReason::Stagnated { cycle: 1 },
            TerminationReason::Stagnated { cycle: 1 },
            TerminationReason::Stagnated { cycle: 1 },
        ]
    );
}

#[test]
fn batch_runner_matches_sequential_runs() {
    let config = StrategyConfig::default();
    let engine = SimulationEngine::new(config.clone());
    let runner = ScenarioRunner::new(config, 4);

    let batch = tokio_test::block_on(runner.run(builtin_scenarios())).unwrap();

    for result in &batch.results {
        let (position, targets) = result.scenario.validate().unwrap();
        let sequential = engine.run(position, targets);
        assert_eq!(result.report.as_ref().unwrap(), &sequential);
    }
}

#[test]
fn custom_fee_rate_changes_fees_only() {
    let config = StrategyConfig {
        fee_rate: dec!(0.002),
        ..StrategyConfig::default()
    };
    let scenario = builtin_scenarios().remove(0);
    let (position, targets) = scenario.validate().unwrap();

    let report = SimulationEngine::new(config).run(position, targets);

    assert_eq!(report.cycles[0].fees_total, dec!(0.001025));
    assert_eq!(report.cycles[0].borrow_delta, dec!(0.2625));
    assert_eq!(report.summary.final_position.pending_reinvest, Decimal::ZERO);
}

#[test]
fn extreme_amounts_are_rejected_without_failing_the_batch() {
    let mut scenarios = builtin_scenarios();
    scenarios.push(Scenario {
        name: "huge collateral".to_string(),
        initial_collateral: Decimal::from_scientific("5e28").unwrap(),
        initial_debt: Decimal::ZERO,
        initial_cash: Decimal::ONE,
        target_collateral: Decimal::from_scientific("7.9e28").unwrap(),
        target_cash: None,
    });
    scenarios.push(Scenario {
        name: "dust collateral".to_string(),
        initial_collateral: Decimal::from_scientific("1e-28").unwrap(),
        initial_debt: dec!(10000000000),
        initial_cash: Decimal::ONE,
        target_collateral: Decimal::ONE,
        target_cash: None,
    });

    let runner = ScenarioRunner::new(StrategyConfig::default(), 4);
    let batch = tokio_test::block_on(runner.run(scenarios)).unwrap();

    assert_eq!(batch.results.len(), 9);
    assert_eq!(batch.rejected, 2);
    assert!(batch.results[..7].iter().all(|r| r.report.is_ok()));
    assert!(batch.results[7].report.is_err());
    assert!(batch.results[8].report.is_err());
}

#[test]
fn largest_accepted_position_runs_to_completion() {
    let scenario = Scenario {
        name: "largest".to_string(),
        initial_collateral: MAX_AMOUNT / dec!(10),
        initial_debt: MIN_AMOUNT,
        initial_cash: MAX_AMOUNT,
        target_collateral: MAX_AMOUNT,
        target_cash: Some(MAX_AMOUNT),
    };
    let (position, targets) = scenario.validate().unwrap();

    let report = SimulationEngine::new(StrategyConfig::default()).run(position, targets);

    assert!(report.summary.cycles_executed <= MAX_CYCLES);
    assert!(report.summary.final_position.cash >= -SOLVENCY_EPSILON);
}

#[test]
fn smallest_collateral_against_largest_debt_runs_to_completion() {
    let scenario = Scenario {
        name: "deep underwater".to_string(),
        initial_collateral: MIN_AMOUNT,
        initial_debt: MAX_AMOUNT,
        initial_cash: MIN_AMOUNT,
        target_collateral: MAX_AMOUNT,
        target_cash: None,
    };
    let (position, targets) = scenario.validate().unwrap();

    let report = SimulationEngine::new(StrategyConfig::default()).run(position, targets);
    let text = leverage_loop_sim::report::render_run(&scenario.name, &report);

    assert!(!report.summary.success);
    assert!(text.contains("SCENARIO: DEEP UNDERWATER"));
}

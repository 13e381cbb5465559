//! Run controller: drives cycles until a goal, the cycle budget, stagnation
//! or an abort stops the run.

use crate::config::StrategyConfig;
use crate::ledger::{Position, Targets};
use crate::simulation::executor::{CycleExecutor, CycleOutcome};
use crate::simulation::metrics::{CycleMetrics, RunReport, RunSummary, TerminationReason};
use crate::strategy::{StrategyCatalog, StrategySelector};
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Hard cap on cycles per run.
pub const MAX_CYCLES: u32 = 15;

/// Mutable state threaded through one run.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub position: Position,
    pub cycle: u32,
    pub cycles: Vec<CycleMetrics>,
}

impl SimulationState {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            cycle: 0,
            cycles: Vec::new(),
        }
    }
}

/// The leverage loop simulation engine.
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    config: StrategyConfig,
    selector: StrategySelector,
    executor: CycleExecutor,
}

impl SimulationEngine {
    /// Create an engine for the given risk/fee parameters.
    pub fn new(config: StrategyConfig) -> Self {
        let selector = StrategySelector::new(StrategyCatalog::new(config.clone()));
        let executor = CycleExecutor::new(config.clone());

        Self {
            config,
            selector,
            executor,
        }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Select and execute one cycle, advancing the cycle counter.
    pub fn step(&self, state: &mut SimulationState, targets: &Targets) -> CycleOutcome {
        state.cycle += 1;
        let selection = self.selector.select(&state.position, targets);

        debug!(
            cycle = state.cycle,
            strategy = %selection.plan.kind,
            "Executing cycle"
        );

        self.executor
            .execute(state.cycle, &mut state.position, targets, &selection)
    }

    /// Run cycles until a stop condition is met.
    pub fn run(&self, initial: Position, targets: Targets) -> RunReport {
        info!(
            collateral = %initial.collateral,
            debt = %initial.debt,
            cash = %initial.cash,
            target_collateral = %targets.target_collateral,
            target_cash = %targets.target_cash,
            "Starting simulation run"
        );

        let mut state = SimulationState::new(initial);
        let mut termination = None;

        while !targets.reached(&state.position) && state.cycle < MAX_CYCLES {
            match self.step(&mut state, &targets) {
                CycleOutcome::Continue(metrics) => state.cycles.push(metrics),
                CycleOutcome::Stagnated(metrics) => {
                    let cycle = metrics.cycle;
                    state.cycles.push(metrics);
                    termination = Some(TerminationReason::Stagnated { cycle });
                    break;
                }
                CycleOutcome::Aborted(details) => {
                    termination = Some(TerminationReason::Aborted(details));
                    break;
                }
            }
        }

        let termination = termination.unwrap_or_else(|| {
            if targets.reached(&state.position) {
                TerminationReason::GoalReached
            } else {
                TerminationReason::CycleBudgetExhausted
            }
        });

        let total_fees: Decimal = state.cycles.iter().map(|c| c.fees_total).sum();
        let success = state.position.collateral >= targets.target_collateral;

        let summary = RunSummary {
            targets,
            initial,
            final_position: state.position,
            cycles_executed: state.cycle,
            total_fees,
            termination,
            success,
        };

        info!(
            cycles = summary.cycles_executed,
            collateral = %summary.final_position.collateral,
            debt = %summary.final_position.debt,
            cash = %summary.final_position.cash,
            termination = ?summary.termination,
            status = summary.status_label(),
            "Simulation run finished"
        );

        RunReport {
            cycles: state.cycles,
            summary,
        }
    }
}

/// Run one simulation with the given configuration.
pub fn run(config: &StrategyConfig, initial: Position, targets: Targets) -> RunReport {
    SimulationEngine::new(config.clone()).run(initial, targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::StrategyKind;
    use rust_decimal_macros::dec;

    fn engine() -> SimulationEngine {
        SimulationEngine::new(StrategyConfig::default())
    }

    #[test]
    fn test_perfect_jump_reaches_goal_in_one_cycle() {
        let report = engine().run(
            Position::new(dec!(0.1), Decimal::ZERO, dec!(0.01)),
            Targets::new(dec!(0.35), Some(Decimal::ZERO)),
        );

        assert_eq!(report.cycles.len(), 1);
        assert_eq!(report.cycles[0].strategy, StrategyKind::LeveragedGrowth);
        assert_eq!(report.summary.termination, TerminationReason::GoalReached);
        assert!(report.summary.success);
        assert_eq!(report.summary.total_fees, dec!(0.0005125));
    }

    #[test]
    fn test_stagnant_position_stops_on_first_cycle() {
        let report = engine().run(
            Position::new(dec!(2.0), dec!(1.5), dec!(0.0001)),
            Targets::new(dec!(3.0), Some(Decimal::ZERO)),
        );

        assert_eq!(report.cycles.len(), 1);
        assert_eq!(
            report.summary.termination,
            TerminationReason::Stagnated { cycle: 1 }
        );
        assert!(!report.summary.success);
        assert_eq!(report.summary.final_position.collateral, dec!(2.0));
    }

    #[test]
    fn test_firefighter_repays_then_grows() {
        let report = engine().run(
            Position::new(dec!(1.0), dec!(0.83), dec!(0.5)),
            Targets::new(dec!(2.0), Some(Decimal::ZERO)),
        );

        assert_eq!(report.cycles[0].strategy, StrategyKind::SafeRepay);
        assert_eq!(report.cycles[1].strategy, StrategyKind::LeveragedGrowth);
        assert_eq!(report.summary.termination, TerminationReason::GoalReached);
        assert_eq!(report.summary.final_position.collateral, dec!(2.0));
        assert_eq!(report.summary.final_position.debt, dec!(1.5));
        assert!(report.summary.success);
    }

    #[test]
    fn test_cash_goal_extracts_profit() {
        let report = engine().run(
            Position::new(dec!(10), Decimal::ZERO, Decimal::ZERO),
            Targets::new(dec!(10), Some(dec!(5))),
        );

        assert_eq!(report.cycles.len(), 1);
        assert_eq!(report.cycles[0].strategy, StrategyKind::ExtractProfit);
        assert_eq!(report.summary.final_position.cash, dec!(7.4925));
        assert_eq!(report.summary.termination, TerminationReason::GoalReached);
    }

    #[test]
    fn test_no_cash_for_fees_stagnates_via_ant_step() {
        let report = engine().run(
            Position::new(dec!(1), Decimal::ZERO, Decimal::ZERO),
            Targets::new(dec!(5), Some(Decimal::ZERO)),
        );

        assert_eq!(report.cycles.len(), 1);
        assert_eq!(report.cycles[0].strategy, StrategyKind::AntStep);
        assert!(report.cycles[0].fallback.is_some());
        assert_eq!(
            report.summary.termination,
            TerminationReason::Stagnated { cycle: 1 }
        );
    }

    #[test]
    fn test_cycle_budget_is_respected() {
        let report = engine().run(
            Position::new(dec!(0.5), dec!(0.37), dec!(0.005)),
            Targets::new(dec!(0.8), Some(Decimal::ZERO)),
        );

        assert_eq!(report.summary.cycles_executed, MAX_CYCLES);
        assert_eq!(report.cycles.len(), MAX_CYCLES as usize);
        assert_eq!(
            report.summary.termination,
            TerminationReason::CycleBudgetExhausted
        );
        assert!(report
            .cycles
            .iter()
            .all(|c| c.strategy == StrategyKind::AntStep));
    }

    #[test]
    fn test_abort_keeps_last_valid_position() {
        let mut initial = Position::new(dec!(2.0), dec!(1.5), Decimal::ZERO);
        initial.pending_reinvest = dec!(1.0);

        let report = engine().run(initial, Targets::new(dec!(3.0), None));

        assert!(report.cycles.is_empty());
        assert!(matches!(
            report.summary.termination,
            TerminationReason::Aborted(_)
        ));
        assert_eq!(report.summary.final_position, initial);
        assert_eq!(report.summary.cycles_executed, 1);
    }

    #[test]
    fn test_goal_already_met_runs_no_cycles() {
        let report = run(
            &StrategyConfig::default(),
            Position::new(dec!(1), Decimal::ZERO, dec!(1)),
            Targets::new(dec!(1), Some(dec!(1))),
        );

        assert!(report.cycles.is_empty());
        assert_eq!(report.summary.cycles_executed, 0);
        assert_eq!(report.summary.termination, TerminationReason::GoalReached);
    }
}

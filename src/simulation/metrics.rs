//! Per-cycle metrics and the run report.
//!
//! Every derived figure is computed once by the executor/engine and carried
//! here, so report sinks only format values.

use crate::ledger::{Position, Targets};
use crate::strategy::{GrowthShortfall, SelectionRule, StrategyKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Everything that happened in one committed cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleMetrics {
    pub cycle: u32,
    pub strategy: StrategyKind,
    pub rule: SelectionRule,
    /// Set when leveraged growth fell back to an ant step
    pub fallback: Option<GrowthShortfall>,

    // Scenario analysis (pre-cycle)
    pub ltv_before: Decimal,
    pub distance_to_goal: Decimal,
    pub cash_before: Decimal,

    // Execution
    pub reused_amount: Decimal,
    pub collateral_in: Decimal,
    pub reinvest_in: Decimal,
    pub borrow_delta: Decimal,
    pub repay_delta: Decimal,

    // Costs
    pub volume: Decimal,
    pub fees_total: Decimal,
    pub fees_flash_loan_share: Decimal,
    pub fees_platform_share: Decimal,

    // Accounting result
    pub profit_out: Decimal,
    pub wallet_delta: Decimal,
    pub pending_reinvest_after: Decimal,

    // Final state
    pub collateral_after: Decimal,
    pub debt_after: Decimal,
    pub cash_after: Decimal,
    pub ltv_after: Decimal,
    pub health_factor: Decimal,
}

/// Details of a cycle rejected by the solvency guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortDetails {
    pub cycle: u32,
    pub strategy: StrategyKind,
    pub cash: Decimal,
    pub wallet_delta: Decimal,
    /// How far below zero the wallet would have gone
    pub shortfall: Decimal,
}

/// Why the run stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Collateral and cash goals both met
    GoalReached,
    /// The cycle budget ran out first
    CycleBudgetExhausted,
    /// A cycle produced a plan with no effect
    Stagnated { cycle: u32 },
    /// A cycle would have left the wallet negative
    Aborted(AbortDetails),
}

/// Achieved vs. target figures at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub targets: Targets,
    pub initial: Position,
    pub final_position: Position,
    pub cycles_executed: u32,
    pub total_fees: Decimal,
    pub termination: TerminationReason,
    /// `collateral >= target_collateral`
    pub success: bool,
}

impl RunSummary {
    pub fn status_label(&self) -> &'static str {
        if self.success {
            "SUCCESS"
        } else {
            "PARTIAL"
        }
    }
}

/// Result of a full run: ordered cycle metrics plus the final summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub cycles: Vec<CycleMetrics>,
    pub summary: RunSummary,
}

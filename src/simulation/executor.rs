//! Cycle executor: applies one plan to the ledger under a solvency guard.
//!
//! A cycle is atomic. Either every effect is committed, or the position is
//! left exactly as it was before the cycle and `Aborted` is returned.

use crate::config::StrategyConfig;
use crate::ledger::{Position, Targets};
use crate::simulation::metrics::{AbortDetails, CycleMetrics};
use crate::strategy::{Selection, StrategyKind};
use crate::utils::decimal::non_negative;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{info, warn};

/// Cash may dip this far below zero from rounding and still be committed.
pub const SOLVENCY_EPSILON: Decimal = dec!(0.00000001);

/// Share of the fees attributed to the flash loan on growth steps (reporting only).
pub const FLASH_LOAN_FEE_SHARE: Decimal = dec!(0.9);

/// Signal returned to the run controller after each cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Committed; more cycles may make progress
    Continue(CycleMetrics),
    /// Committed, but the plan moved nothing
    Stagnated(CycleMetrics),
    /// Rejected by the solvency guard; position untouched
    Aborted(AbortDetails),
}

/// Applies selected plans to a position.
#[derive(Debug, Clone)]
pub struct CycleExecutor {
    config: StrategyConfig,
}

impl CycleExecutor {
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }

    /// Execute one cycle against `position`.
    pub fn execute(
        &self,
        cycle: u32,
        position: &mut Position,
        targets: &Targets,
        selection: &Selection,
    ) -> CycleOutcome {
        let plan = &selection.plan;
        let snapshot = *position;

        let ltv_before = position.ltv();
        let distance_to_goal = non_negative(targets.collateral_gap(position));
        let cash_before = position.cash;

        // Consume the accumulator (read once)
        let reused_amount = if plan.kind.sources_own_collateral() {
            Decimal::ZERO
        } else {
            position.pending_reinvest
        };
        position.pending_reinvest = Decimal::ZERO;

        let volume = plan.volume();
        let fees_total = volume * self.config.fee_rate;
        let fees_flash_loan_share = if plan.kind.is_flash_loan() {
            fees_total * FLASH_LOAN_FEE_SHARE
        } else {
            Decimal::ZERO
        };

        let mut wallet_delta = plan.profit_out - fees_total;
        if plan.kind == StrategyKind::SafeRepay {
            wallet_delta -= non_negative(plan.repay_delta - reused_amount);
        }

        if position.cash + wallet_delta < -SOLVENCY_EPSILON {
            *position = snapshot;

            let details = AbortDetails {
                cycle,
                strategy: plan.kind,
                cash: snapshot.cash,
                wallet_delta,
                shortfall: -(snapshot.cash + wallet_delta),
            };
            warn!(
                cycle,
                strategy = %plan.kind,
                cash = %details.cash,
                wallet_delta = %details.wallet_delta,
                "Cycle aborted - wallet cannot fund the plan"
            );
            return CycleOutcome::Aborted(details);
        }

        position.cash += wallet_delta;
        position.collateral += plan.collateral_in + plan.reinvest_in;
        position.debt += plan.borrow_delta - plan.repay_delta;

        if plan.kind.carries_surplus() {
            position.pending_reinvest += non_negative(wallet_delta);
        }

        let metrics = CycleMetrics {
            cycle,
            strategy: plan.kind,
            rule: selection.rule,
            fallback: selection.fallback,
            ltv_before,
            distance_to_goal,
            cash_before,
            reused_amount,
            collateral_in: plan.collateral_in,
            reinvest_in: plan.reinvest_in,
            borrow_delta: plan.borrow_delta,
            repay_delta: plan.repay_delta,
            volume,
            fees_total,
            fees_flash_loan_share,
            fees_platform_share: fees_total - fees_flash_loan_share,
            profit_out: plan.profit_out,
            wallet_delta,
            pending_reinvest_after: position.pending_reinvest,
            collateral_after: position.collateral,
            debt_after: position.debt,
            cash_after: position.cash,
            ltv_after: position.ltv(),
            health_factor: position.health_factor(self.config.target_ltv),
        };

        info!(
            cycle,
            strategy = %plan.kind,
            ltv_before = %ltv_before.round_dp(6),
            ltv_after = %metrics.ltv_after.round_dp(6),
            fees = %fees_total,
            wallet_delta = %wallet_delta,
            collateral = %position.collateral,
            debt = %position.debt,
            cash = %position.cash,
            "Cycle committed"
        );

        if plan.is_idle() {
            info!(cycle, "No margin left to operate - stagnated");
            CycleOutcome::Stagnated(metrics)
        } else {
            CycleOutcome::Continue(metrics)
        }
    }
}

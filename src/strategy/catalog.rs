//! Strategy catalog: candidate rebalancing plans computed from the ledger.
//!
//! Every strategy is a pure function of the current position, the risk/fee
//! parameters and the run targets. None of them mutate the position, and none
//! of them clear `pending_reinvest`; the cycle executor owns both.

use crate::config::StrategyConfig;
use crate::ledger::{Position, Targets};
use crate::utils::decimal::{non_negative, zero_below};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum collateral increase worth a leveraged growth step.
pub const GROWTH_DUST: Decimal = dec!(0.001);

/// Repayments below this amount are dropped.
pub const REPAY_DUST: Decimal = dec!(0.0001);

/// Multiplier on the fee rate reserved as headroom when sizing a repayment.
pub const REPAY_FEE_BUFFER: Decimal = dec!(1.5);

/// Share of free cash an ant-step deposits (the rest stays for fees).
pub const ANT_STEP_FRACTION: Decimal = dec!(0.90);

/// Which strategy produced a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Borrow all remaining headroom and withdraw it as profit
    ExtractProfit,
    /// Flash-loan jump to the fully levered collateral level
    LeveragedGrowth,
    /// Deposit the accumulated reinvestment cash
    ReinvestAccumulated,
    /// Degraded reinvest used when leveraged growth cannot pay its fees
    AntStep,
    /// Repay as much debt as cash allows after fee headroom
    SafeRepay,
}

impl StrategyKind {
    /// Human-readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            StrategyKind::ExtractProfit => "Extract Profit",
            StrategyKind::LeveragedGrowth => "Leveraged Growth (Flash Loan)",
            StrategyKind::ReinvestAccumulated => "Reinvest Accumulated",
            StrategyKind::AntStep => "Reinvest Accumulated (Ant Step)",
            StrategyKind::SafeRepay => "Safe Repay",
        }
    }

    /// Whether fees for this plan are attributed to a flash loan.
    pub fn is_flash_loan(&self) -> bool {
        matches!(self, StrategyKind::LeveragedGrowth)
    }

    /// Leveraged growth sizes its own collateral delta and must not also
    /// count `pending_reinvest` as reused cash.
    pub fn sources_own_collateral(&self) -> bool {
        matches!(self, StrategyKind::LeveragedGrowth)
    }

    /// Whether a positive wallet delta is rolled into `pending_reinvest`.
    pub fn carries_surplus(&self) -> bool {
        !matches!(
            self,
            StrategyKind::ExtractProfit | StrategyKind::LeveragedGrowth
        )
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Numeric effects a strategy wants applied this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyPlan {
    pub kind: StrategyKind,
    /// Collateral deposited from cash already held
    pub collateral_in: Decimal,
    /// New debt taken
    pub borrow_delta: Decimal,
    /// Debt repaid
    pub repay_delta: Decimal,
    /// Collateral deposited through the flash-loan leg
    pub reinvest_in: Decimal,
    /// Cash withdrawn to the wallet; negative means a net cash cost
    pub profit_out: Decimal,
}

impl StrategyPlan {
    /// A plan with every amount at zero.
    pub fn idle(kind: StrategyKind) -> Self {
        Self {
            kind,
            collateral_in: Decimal::ZERO,
            borrow_delta: Decimal::ZERO,
            repay_delta: Decimal::ZERO,
            reinvest_in: Decimal::ZERO,
            profit_out: Decimal::ZERO,
        }
    }

    /// Total transacted volume the fee is charged on.
    pub fn volume(&self) -> Decimal {
        self.borrow_delta + self.repay_delta + self.reinvest_in + self.collateral_in
    }

    /// True when the plan moves nothing at all.
    pub fn is_idle(&self) -> bool {
        self.collateral_in.is_zero()
            && self.borrow_delta.is_zero()
            && self.repay_delta.is_zero()
            && self.reinvest_in.is_zero()
    }
}

/// How the accumulated cash is reinvested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReinvestMode {
    /// Deposit exactly `pending_reinvest`
    Normal,
    /// Fallback: with nothing pending, deposit 90% of free cash
    AntStep,
}

/// Why a leveraged growth step could not be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthShortfall {
    /// The collateral increase is too small to bother with
    BelowDust { collateral_delta: Decimal },
    /// Neither the gross profit nor the wallet can pay the estimated fee
    FeeUnaffordable {
        estimated_fee: Decimal,
        gross_profit: Decimal,
        cash: Decimal,
    },
}

/// Outcome of the leveraged growth computation.
///
/// The infeasible branch is resolved by the selector, not here, so that
/// each strategy stays independently testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthPlan {
    Feasible(StrategyPlan),
    Infeasible(GrowthShortfall),
}

/// The four strategies, parameterised by the run configuration.
#[derive(Debug, Clone)]
pub struct StrategyCatalog {
    config: StrategyConfig,
}

impl StrategyCatalog {
    /// Create a catalog for the given risk/fee parameters.
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Borrow up to target LTV (counting pending cash as new collateral) and
    /// withdraw the whole new borrow as profit.
    pub fn extract_profit(&self, position: &Position) -> StrategyPlan {
        let collateral_in = position.pending_reinvest;
        let capacity = (position.collateral + collateral_in) * self.config.target_ltv;
        let borrow = non_negative(capacity - position.debt);

        debug!(
            %collateral_in,
            %capacity,
            %borrow,
            "Extract profit plan"
        );

        StrategyPlan {
            kind: StrategyKind::ExtractProfit,
            collateral_in,
            borrow_delta: borrow,
            repay_delta: Decimal::ZERO,
            reinvest_in: Decimal::ZERO,
            profit_out: borrow,
        }
    }

    /// Jump to the fully levered collateral level in one flash-loan step,
    /// capped at the collateral target.
    pub fn leveraged_growth(&self, position: &Position, targets: &Targets) -> GrowthPlan {
        let target_ltv = self.config.target_ltv;

        let levered = (position.collateral + position.pending_reinvest) / (Decimal::ONE - target_ltv);
        let ideal = levered.min(targets.target_collateral);

        let collateral_delta = non_negative(ideal - position.collateral);
        let borrow_delta = non_negative(ideal * target_ltv - position.debt);

        let estimated_fee = (borrow_delta + collateral_delta) * self.config.fee_rate;
        let gross_profit = borrow_delta - collateral_delta;

        debug!(
            %ideal,
            %collateral_delta,
            %borrow_delta,
            %estimated_fee,
            %gross_profit,
            "Leveraged growth estimate"
        );

        if collateral_delta <= GROWTH_DUST {
            return GrowthPlan::Infeasible(GrowthShortfall::BelowDust { collateral_delta });
        }

        let affordable = gross_profit >= estimated_fee || position.cash >= estimated_fee - gross_profit;
        if !affordable {
            return GrowthPlan::Infeasible(GrowthShortfall::FeeUnaffordable {
                estimated_fee,
                gross_profit,
                cash: position.cash,
            });
        }

        GrowthPlan::Feasible(StrategyPlan {
            kind: StrategyKind::LeveragedGrowth,
            collateral_in: Decimal::ZERO,
            borrow_delta,
            repay_delta: Decimal::ZERO,
            reinvest_in: collateral_delta,
            profit_out: gross_profit,
        })
    }

    /// Deposit accumulated cash as collateral.
    pub fn reinvest_accumulated(&self, position: &Position, mode: ReinvestMode) -> StrategyPlan {
        let mut collateral_in = position.pending_reinvest;

        let kind = match mode {
            ReinvestMode::Normal => StrategyKind::ReinvestAccumulated,
            ReinvestMode::AntStep => {
                if collateral_in.is_zero() && position.cash > Decimal::ZERO {
                    collateral_in = position.cash * ANT_STEP_FRACTION;
                }
                StrategyKind::AntStep
            }
        };

        StrategyPlan {
            collateral_in,
            ..StrategyPlan::idle(kind)
        }
    }

    /// Repay as much debt as the available cash allows while keeping fee
    /// headroom.
    pub fn safe_repay(&self, position: &Position) -> StrategyPlan {
        let available = position.pending_reinvest + position.cash;
        let max_repayable = available / (Decimal::ONE + self.config.fee_rate * REPAY_FEE_BUFFER);
        let repay = zero_below(position.debt.min(max_repayable), REPAY_DUST);

        debug!(%available, %max_repayable, %repay, "Safe repay plan");

        StrategyPlan {
            repay_delta: repay,
            ..StrategyPlan::idle(StrategyKind::SafeRepay)
        }
    }
}

//! Position ledger: running totals of a collateralized lending position.
//!
//! The ledger only holds state and derives risk figures from it. Mutation
//! happens exclusively through `simulation::CycleExecutor`.

use crate::config::StrategyConfig;
use crate::utils::decimal::safe_div;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Health factor reported when there is no debt.
pub const HEALTH_FACTOR_SENTINEL: Decimal = dec!(999);

/// Cash goal used when the caller has none ("effectively unreachable").
pub const NO_CASH_GOAL: Decimal = dec!(100000000);

/// Mutable running totals for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Total deposited collateral value
    pub collateral: Decimal,
    /// Total borrowed value
    pub debt: Decimal,
    /// Free, unlent balance
    pub cash: Decimal,
    /// Cash set aside at the end of a cycle for use as collateral next cycle
    pub pending_reinvest: Decimal,
}

impl Position {
    /// Create a position with an empty reinvestment accumulator.
    pub fn new(collateral: Decimal, debt: Decimal, cash: Decimal) -> Self {
        Self {
            collateral,
            debt,
            cash,
            pending_reinvest: Decimal::ZERO,
        }
    }

    /// Loan-to-value ratio (0 when there is no collateral).
    pub fn ltv(&self) -> Decimal {
        safe_div(self.debt, self.collateral)
    }

    /// Liquidation-safety margin proxy: `collateral * target_ltv / debt`.
    ///
    /// Saturates at `Decimal::MAX` when a residual debt is too small to
    /// divide by.
    pub fn health_factor(&self, target_ltv: Decimal) -> Decimal {
        if self.debt == Decimal::ZERO {
            return HEALTH_FACTOR_SENTINEL;
        }
        (self.collateral * target_ltv)
            .checked_div(self.debt)
            .unwrap_or(Decimal::MAX)
    }

    /// Classify the current LTV against the configured thresholds.
    pub fn risk_zone(&self, config: &StrategyConfig) -> RiskZone {
        RiskZone::classify(self.ltv(), config)
    }
}

/// Run goals, fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Targets {
    pub target_collateral: Decimal,
    pub target_cash: Decimal,
}

impl Targets {
    /// Targets with an optional cash goal; `None` means no cash goal.
    pub fn new(target_collateral: Decimal, target_cash: Option<Decimal>) -> Self {
        Self {
            target_collateral,
            target_cash: target_cash.unwrap_or(NO_CASH_GOAL),
        }
    }

    /// Collateral still missing to reach the goal (may be negative).
    pub fn collateral_gap(&self, position: &Position) -> Decimal {
        self.target_collateral - position.collateral
    }

    /// Whether both goals are met.
    pub fn reached(&self, position: &Position) -> bool {
        position.collateral >= self.target_collateral && position.cash >= self.target_cash
    }
}

/// Where the current LTV sits relative to the configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskZone {
    /// Below target LTV - room to borrow
    UnderLevered,
    /// Between target and the emergency threshold (inclusive)
    AtTarget,
    /// Above the emergency threshold - repay first
    Critical,
}

impl RiskZone {
    pub fn classify(ltv: Decimal, config: &StrategyConfig) -> Self {
        if ltv > config.max_ltv_risk {
            RiskZone::Critical
        } else if ltv < config.target_ltv {
            RiskZone::UnderLevered
        } else {
            RiskZone::AtTarget
        }
    }
}

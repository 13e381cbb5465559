//! Priority-ordered strategy selection.
//!
//! Exactly one rule fires per cycle (first match wins). The selector is also
//! the dispatcher that resolves an infeasible leveraged growth step into the
//! ant-step reinvest, so strategies never call each other.

use crate::ledger::{Position, RiskZone, Targets};
use crate::strategy::catalog::{
    GrowthPlan, GrowthShortfall, ReinvestMode, StrategyCatalog, StrategyPlan,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Collateral gap, relative to current collateral, that justifies a growth step.
pub const GROWTH_GAP_RATIO: Decimal = dec!(0.05);

/// The decision-tree branch that fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionRule {
    /// LTV above the emergency threshold
    RiskOverride,
    /// Meaningful collateral gap and room to borrow
    GrowthGap,
    /// Room to borrow, no meaningful gap
    BorrowHeadroom,
    /// At target LTV with cash waiting to be reinvested
    ReinvestPending,
    /// Nothing else applies; extraction is a no-op without headroom
    TerminalExtract,
}

/// The plan chosen for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub rule: SelectionRule,
    pub plan: StrategyPlan,
    /// Set when leveraged growth was attempted and fell back to an ant step
    pub fallback: Option<GrowthShortfall>,
}

/// Chooses and builds the plan for each cycle.
#[derive(Debug, Clone)]
pub struct StrategySelector {
    catalog: StrategyCatalog,
}

impl StrategySelector {
    pub fn new(catalog: StrategyCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &StrategyCatalog {
        &self.catalog
    }

    /// Evaluate the decision tree without building a plan.
    pub fn choose_rule(&self, position: &Position, targets: &Targets) -> SelectionRule {
        let zone = position.risk_zone(self.catalog.config());
        let gap = targets.collateral_gap(position);

        if zone == RiskZone::Critical {
            return SelectionRule::RiskOverride;
        }

        if gap > position.collateral * GROWTH_GAP_RATIO && zone == RiskZone::UnderLevered {
            return SelectionRule::GrowthGap;
        }

        if zone == RiskZone::UnderLevered {
            return SelectionRule::BorrowHeadroom;
        }

        if position.pending_reinvest > Decimal::ZERO {
            return SelectionRule::ReinvestPending;
        }

        SelectionRule::TerminalExtract
    }

    /// Pick the rule for this cycle and build its plan.
    pub fn select(&self, position: &Position, targets: &Targets) -> Selection {
        let rule = self.choose_rule(position, targets);

        debug!(
            rule = ?rule,
            ltv = %position.ltv(),
            gap = %targets.collateral_gap(position),
            pending = %position.pending_reinvest,
            "Strategy rule selected"
        );

        let (plan, fallback) = match rule {
            SelectionRule::RiskOverride => (self.catalog.safe_repay(position), None),
            SelectionRule::GrowthGap => self.growth_or_ant_step(position, targets),
            SelectionRule::BorrowHeadroom | SelectionRule::TerminalExtract => {
                (self.catalog.extract_profit(position), None)
            }
            SelectionRule::ReinvestPending => (
                self.catalog
                    .reinvest_accumulated(position, ReinvestMode::Normal),
                None,
            ),
        };

        Selection {
            rule,
            plan,
            fallback,
        }
    }

    fn growth_or_ant_step(
        &self,
        position: &Position,
        targets: &Targets,
    ) -> (StrategyPlan, Option<GrowthShortfall>) {
        match self.catalog.leveraged_growth(position, targets) {
            GrowthPlan::Feasible(plan) => (plan, None),
            GrowthPlan::Infeasible(shortfall) => {
                warn!(
                    shortfall = ?shortfall,
                    "Leveraged growth infeasible - falling back to ant step"
                );
                let plan = self
                    .catalog
                    .reinvest_accumulated(position, ReinvestMode::AntStep);
                (plan, Some(shortfall))
            }
        }
    }
}

//! Rebalancing strategy implementation.
//!
//! Contains the core decision logic for:
//! - Computing candidate plans (profit extraction, leveraged growth,
//!   reinvestment, safe repayment)
//! - Choosing exactly one plan per cycle in strict priority order

mod catalog;
mod selector;

pub use catalog::{
    GrowthPlan, GrowthShortfall, ReinvestMode, StrategyCatalog, StrategyKind, StrategyPlan,
    ANT_STEP_FRACTION, GROWTH_DUST, REPAY_DUST, REPAY_FEE_BUFFER,
};
pub use selector::{Selection, SelectionRule, StrategySelector, GROWTH_GAP_RATIO};

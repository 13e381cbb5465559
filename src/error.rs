//! Typed errors for input that must be rejected before a run starts.
//!
//! The simulation core itself has no error paths: infeasible or unsafe cycles
//! resolve to terminal outcomes instead (see `simulation::CycleOutcome`).

use rust_decimal::Decimal;
use thiserror::Error;

/// Invalid scenario input rejected by the scenario loader.
#[derive(Debug, Error, PartialEq)]
pub enum ScenarioError {
    #[error("Scenario name must not be empty")]
    MissingName,

    #[error("Scenario '{scenario}': {field} must be non-negative, got {value}")]
    Negative {
        scenario: String,
        field: &'static str,
        value: Decimal,
    },

    #[error("Scenario '{scenario}': {field} must be 0 or within [{min}, {max}], got {value}")]
    OutOfRange {
        scenario: String,
        field: &'static str,
        value: Decimal,
        min: Decimal,
        max: Decimal,
    },

    #[error("Invalid number for {field}: '{input}'")]
    InvalidNumber { field: &'static str, input: String },
}

/// Risk/fee parameters that cannot describe a sane lending market.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("target_ltv must be in (0, 1), got {0}")]
    TargetLtvOutOfRange(Decimal),

    #[error("max_ltv_risk must be in (target_ltv, 1), got {max_ltv_risk} with target_ltv {target_ltv}")]
    MaxLtvOutOfRange {
        target_ltv: Decimal,
        max_ltv_risk: Decimal,
    },

    #[error("fee_rate must be in [0, 1), got {0}")]
    FeeRateOutOfRange(Decimal),
}

//! Leverage loop simulation.
//!
//! This module provides:
//! - The cycle executor (atomic commit-or-abort of one plan)
//! - The run controller (`run`) with goal, budget, stagnation and abort stops
//! - Per-cycle metrics and run reports
//! - Scenario loading and concurrent scenario batteries
//!
//! # Example
//!
//! ```rust
//! use leverage_loop_sim::config::StrategyConfig;
//! use leverage_loop_sim::ledger::{Position, Targets};
//! use leverage_loop_sim::simulation::run;
//! use rust_decimal::Decimal;
//! use rust_decimal_macros::dec;
//!
//! let report = run(
//!     &StrategyConfig::default(),
//!     Position::new(dec!(0.1), Decimal::ZERO, dec!(0.01)),
//!     Targets::new(dec!(0.35), Some(Decimal::ZERO)),
//! );
//! assert!(report.summary.success);
//! ```

mod engine;
mod executor;
mod metrics;
mod runner;
mod scenario;

pub use engine::{run, SimulationEngine, SimulationState, MAX_CYCLES};
pub use executor::{CycleExecutor, CycleOutcome, FLASH_LOAN_FEE_SHARE, SOLVENCY_EPSILON};
pub use metrics::{AbortDetails, CycleMetrics, RunReport, RunSummary, TerminationReason};
pub use runner::{BatchResults, ScenarioResult, ScenarioRunner};
pub use scenario::{
    builtin_scenarios, load_scenarios, parse_amount, Scenario, MAX_AMOUNT, MIN_AMOUNT,
};

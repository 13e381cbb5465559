//! # Leverage Loop Simulator
//!
//! Simulates an iterative collateralized-lending leverage strategy: each
//! cycle picks one rebalancing action to move a position toward its
//! collateral and cash goals while staying under a maximum safe LTV and
//! paying transaction fees.
//!
//! ## Architecture
//!
//! - `config`: Risk/fee parameters and report settings
//! - `ledger`: Position, targets and LTV / health-factor math
//! - `strategy`: Strategy catalog and priority-ordered selector
//! - `simulation`: Cycle executor, run controller, metrics and scenario batteries
//! - `report`: Report sinks (logs, text audit file, JSON)
//! - `error`: Typed input validation errors
//! - `utils`: Shared utilities and decimal arithmetic

pub mod config;
pub mod error;
pub mod ledger;
pub mod report;
pub mod simulation;
pub mod strategy;
pub mod utils;

pub use config::Config;
pub use simulation::{run, RunReport};

//! Configuration management for the leverage loop simulator.
//!
//! Loads settings from environment variables and config files.

use crate::error::ConfigError;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Risk and fee parameters of the lending market
    #[serde(default)]
    pub strategy: StrategyConfig,
    /// Where and how run reports are written
    #[serde(default)]
    pub report: ReportConfig,
}

/// Risk and fee parameters, fixed for the whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Desired loan-to-value ratio (0.0-1.0)
    #[serde(default = "default_target_ltv")]
    pub target_ltv: Decimal,
    /// LTV above which debt must be repaid before anything else (target_ltv-1.0)
    #[serde(default = "default_max_ltv_risk")]
    pub max_ltv_risk: Decimal,
    /// Proportional fee charged on every unit of transacted volume
    #[serde(default = "default_fee_rate")]
    pub fee_rate: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory for report files (None = log only)
    #[serde(default)]
    pub output_dir: Option<String>,
    /// Append the dense per-cycle audit log as text
    #[serde(default = "default_true")]
    pub write_text: bool,
    /// Write the structured per-cycle records as JSON
    #[serde(default = "default_true")]
    pub write_json: bool,
    #[serde(default = "default_text_file")]
    pub text_file: String,
    #[serde(default = "default_json_file")]
    pub json_file: String,
}

// Default value functions
fn default_target_ltv() -> Decimal {
    Decimal::new(75, 2) // 0.75
}

fn default_max_ltv_risk() -> Decimal {
    Decimal::new(82, 2) // 0.82
}

fn default_fee_rate() -> Decimal {
    Decimal::new(1, 3) // 0.001 (0.1%)
}

fn default_true() -> bool {
    true
}

fn default_text_file() -> String {
    "leverage_cycles.txt".to_string()
}

fn default_json_file() -> String {
    "leverage_cycles.json".to_string()
}

impl StrategyConfig {
    /// Check the ordering 0 < target_ltv < max_ltv_risk < 1 and 0 <= fee_rate < 1.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.target_ltv <= Decimal::ZERO || self.target_ltv >= Decimal::ONE {
            return Err(ConfigError::TargetLtvOutOfRange(self.target_ltv));
        }

        if self.max_ltv_risk <= self.target_ltv || self.max_ltv_risk >= Decimal::ONE {
            return Err(ConfigError::MaxLtvOutOfRange {
                target_ltv: self.target_ltv,
                max_ltv_risk: self.max_ltv_risk,
            });
        }

        if self.fee_rate < Decimal::ZERO || self.fee_rate >= Decimal::ONE {
            return Err(ConfigError::FeeRateOutOfRange(self.fee_rate));
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from environment variables and config files.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::default().separator("__").prefix("LLS"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        self.strategy
            .validate()
            .context("Invalid strategy configuration")?;

        anyhow::ensure!(
            !self.report.text_file.is_empty() && !self.report.json_file.is_empty(),
            "report file names must not be empty"
        );

        Ok(())
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            target_ltv: default_target_ltv(),
            max_ltv_risk: default_max_ltv_risk(),
            fee_rate: default_fee_rate(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            write_text: default_true(),
            write_json: default_true(),
            text_file: default_text_file(),
            json_file: default_json_file(),
        }
    }
}

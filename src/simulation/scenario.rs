//! Scenario loading and validation.
//!
//! A scenario is the five numeric inputs of a run. Validation happens here so
//! the engine only ever sees well-formed positions.

use crate::error::ScenarioError;
use crate::ledger::{Position, Targets};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Largest accepted amount.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000000);

/// Smallest accepted nonzero amount. Together with `MAX_AMOUNT` this keeps
/// every ratio the engine derives (and its percentage) inside `Decimal` range.
pub const MIN_AMOUNT: Decimal = dec!(0.00000001);

/// Initial position and goals for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub initial_collateral: Decimal,
    pub initial_debt: Decimal,
    pub initial_cash: Decimal,
    pub target_collateral: Decimal,
    /// No cash goal when absent
    #[serde(default)]
    pub target_cash: Option<Decimal>,
}

impl Scenario {
    /// Check every amount is non-negative and within the supported range,
    /// then build the run inputs.
    pub fn validate(&self) -> std::result::Result<(Position, Targets), ScenarioError> {
        if self.name.trim().is_empty() {
            return Err(ScenarioError::MissingName);
        }

        let mut fields = vec![
            ("initial_collateral", self.initial_collateral),
            ("initial_debt", self.initial_debt),
            ("initial_cash", self.initial_cash),
            ("target_collateral", self.target_collateral),
        ];
        if let Some(target_cash) = self.target_cash {
            fields.push(("target_cash", target_cash));
        }

        if let Some(&(field, value)) = fields.iter().find(|(_, v)| *v < Decimal::ZERO) {
            return Err(ScenarioError::Negative {
                scenario: self.name.clone(),
                field,
                value,
            });
        }

        let out_of_range =
            |v: Decimal| !v.is_zero() && (v < MIN_AMOUNT || v > MAX_AMOUNT);
        if let Some(&(field, value)) = fields.iter().find(|(_, v)| out_of_range(*v)) {
            return Err(ScenarioError::OutOfRange {
                scenario: self.name.clone(),
                field,
                value,
                min: MIN_AMOUNT,
                max: MAX_AMOUNT,
            });
        }

        Ok((
            Position::new(self.initial_collateral, self.initial_debt, self.initial_cash),
            Targets::new(self.target_collateral, self.target_cash),
        ))
    }
}

/// Parse a user-entered amount; empty input is `None` for optional fields.
pub fn parse_amount(field: &'static str, input: &str) -> std::result::Result<Decimal, ScenarioError> {
    let trimmed = input.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| ScenarioError::InvalidNumber {
            field,
            input: trimmed.to_string(),
        })
}

/// Load a JSON array of scenarios.
pub fn load_scenarios<P: AsRef<Path>>(path: P) -> Result<Vec<Scenario>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file {}", path.display()))?;

    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse scenario file {}", path.display()))
}

/// The standard scenario battery.
pub fn builtin_scenarios() -> Vec<Scenario> {
    let scenario = |name: &str, collateral, debt, cash, target_collateral, target_cash| Scenario {
        name: name.to_string(),
        initial_collateral: collateral,
        initial_debt: debt,
        initial_cash: cash,
        target_collateral,
        target_cash: Some(target_cash),
    };

    vec![
        scenario(
            "Perfect Jump (flash loan)",
            dec!(0.1),
            Decimal::ZERO,
            dec!(0.01),
            dec!(0.35),
            Decimal::ZERO,
        ),
        scenario(
            "Ant Steps (resilience)",
            dec!(0.5),
            dec!(0.37),
            dec!(0.005),
            dec!(0.8),
            Decimal::ZERO,
        ),
        scenario(
            "Firefighter (risk rescue)",
            dec!(1.0),
            dec!(0.83),
            dec!(0.5),
            dec!(2.0),
            Decimal::ZERO,
        ),
        scenario(
            "Cash Register (profit extraction)",
            dec!(10.0),
            Decimal::ZERO,
            Decimal::ZERO,
            dec!(10.0),
            dec!(5.0),
        ),
        scenario(
            "Impossible (no cash for fees)",
            dec!(1.0),
            Decimal::ZERO,
            Decimal::ZERO,
            dec!(5.0),
            Decimal::ZERO,
        ),
        scenario(
            "Stagnant (no margin to operate)",
            dec!(2.0),
            dec!(1.5),
            dec!(0.0001),
            dec!(3.0),
            Decimal::ZERO,
        ),
        scenario(
            "Zero Wallet (client request)",
            dec!(1),
            Decimal::ZERO,
            Decimal::ZERO,
            dec!(10),
            Decimal::ZERO,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::NO_CASH_GOAL;
    use std::io::Write;

    #[test]
    fn test_builtin_scenarios_are_valid() {
        let scenarios = builtin_scenarios();
        assert_eq!(scenarios.len(), 7);
        assert!(scenarios.iter().all(|s| s.validate().is_ok()));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let mut scenario = builtin_scenarios().remove(0);
        scenario.initial_debt = dec!(-1);

        assert_eq!(
            scenario.validate(),
            Err(ScenarioError::Negative {
                scenario: scenario.name.clone(),
                field: "initial_debt",
                value: dec!(-1),
            })
        );
    }

    #[test]
    fn test_huge_amount_rejected() {
        let scenario = Scenario {
            name: "huge".to_string(),
            initial_collateral: Decimal::from_scientific("5e28").unwrap(),
            initial_debt: Decimal::ZERO,
            initial_cash: Decimal::ONE,
            target_collateral: Decimal::from_scientific("7.9e28").unwrap(),
            target_cash: None,
        };

        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::OutOfRange {
                field: "initial_collateral",
                ..
            })
        ));
    }

    #[test]
    fn test_dust_amount_rejected() {
        let scenario = Scenario {
            name: "dust".to_string(),
            initial_collateral: dec!(0.0000000000000000000000000001),
            initial_debt: dec!(10000000000),
            initial_cash: Decimal::ONE,
            target_collateral: Decimal::ONE,
            target_cash: None,
        };

        assert_eq!(
            scenario.validate(),
            Err(ScenarioError::OutOfRange {
                scenario: "dust".to_string(),
                field: "initial_collateral",
                value: dec!(0.0000000000000000000000000001),
                min: MIN_AMOUNT,
                max: MAX_AMOUNT,
            })
        );
    }

    #[test]
    fn test_range_edges_accepted() {
        let scenario = Scenario {
            name: "edges".to_string(),
            initial_collateral: MAX_AMOUNT,
            initial_debt: MIN_AMOUNT,
            initial_cash: Decimal::ZERO,
            target_collateral: MAX_AMOUNT,
            target_cash: Some(MIN_AMOUNT),
        };
        assert!(scenario.validate().is_ok());

        let mut above = scenario.clone();
        above.target_collateral = MAX_AMOUNT + MIN_AMOUNT;
        assert!(matches!(
            above.validate(),
            Err(ScenarioError::OutOfRange {
                field: "target_collateral",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_cash_goal_uses_sentinel() {
        let mut scenario = builtin_scenarios().remove(0);
        scenario.target_cash = None;

        let (_, targets) = scenario.validate().unwrap();
        assert_eq!(targets.target_cash, NO_CASH_GOAL);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("cash", " 0.01 "), Ok(dec!(0.01)));
        assert_eq!(parse_amount("cash", "1e-3"), Ok(dec!(0.001)));
        assert!(matches!(
            parse_amount("cash", "abc"),
            Err(ScenarioError::InvalidNumber { field: "cash", .. })
        ));
    }

    #[test]
    fn test_load_scenarios_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "custom", "initial_collateral": 1.5, "initial_debt": "0.5",
                "initial_cash": 0.1, "target_collateral": 3}}]"#
        )
        .unwrap();

        let scenarios = load_scenarios(file.path()).unwrap();
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].initial_collateral, dec!(1.5));
        assert_eq!(scenarios[0].initial_debt, dec!(0.5));
        assert_eq!(scenarios[0].target_cash, None);
    }
}

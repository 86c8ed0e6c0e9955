//! # Break-Even Calculator
//!
//! The per-product break-even calculation an owner runs interactively, and
//! the saved [`BreakEvenScenario`] it produces.
//!
//! ## Saving and Reviewing
//! ```text
//! BreakEvenDraft ──into_scenario()──► BreakEvenScenario ──to_pricing_record()──►
//!   (owner input,                      (defaults applied,         PricingScenarioRecord
//!    validated)                         units/sales computed)     (fed to the risk engine)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::types::PricingScenarioRecord;
use crate::validation;

/// Name given to scenarios saved without one.
pub const DEFAULT_SCENARIO_NAME: &str = "Unnamed Scenario";

/// Tag given to scenarios saved without one.
pub const DEFAULT_SCENARIO_TAG: &str = "Break-Even";

// =============================================================================
// Calculation
// =============================================================================

/// Result of one break-even calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenCalculation {
    pub cm_per_unit: f64,
    /// Contribution margin as a percentage of price.
    pub cm_ratio: f64,
    /// `None` when each sale loses money.
    #[ts(type = "number | null")]
    pub break_even_units: Option<u64>,
    pub break_even_sales: f64,
}

impl BreakEvenCalculation {
    /// Units and sales needed to cover `fixed_cost`.
    ///
    /// ```rust
    /// use bizlens_core::breakeven::BreakEvenCalculation;
    ///
    /// let calc = BreakEvenCalculation::compute(1200.0, 20.0, 8.0);
    /// assert_eq!(calc.break_even_units, Some(100));
    /// assert_eq!(calc.break_even_sales, 2000.0);
    /// ```
    pub fn compute(fixed_cost: f64, price: f64, variable_cost: f64) -> Self {
        let cm_per_unit = price - variable_cost;
        let cm_ratio = if price > 0.0 {
            cm_per_unit / price * 100.0
        } else {
            0.0
        };

        if cm_per_unit <= 0.0 {
            return BreakEvenCalculation {
                cm_per_unit,
                cm_ratio,
                break_even_units: None,
                break_even_sales: 0.0,
            };
        }

        let units = (fixed_cost / cm_per_unit).ceil().max(0.0) as u64;
        BreakEvenCalculation {
            cm_per_unit,
            cm_ratio,
            break_even_units: Some(units),
            break_even_sales: units as f64 * price,
        }
    }
}

// =============================================================================
// Saved Scenario
// =============================================================================

/// Owner input for saving a break-even scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct BreakEvenDraft {
    pub product_name: String,
    pub scenario_name: Option<String>,
    pub description: Option<String>,
    pub tag: Option<String>,
    pub fixed_cost: f64,
    pub variable_cost_per_unit: f64,
    pub price_per_unit: f64,
}

impl BreakEvenDraft {
    /// Validates the draft, fills defaults and runs the calculation.
    pub fn into_scenario(
        self,
        id: impl Into<String>,
        owner_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> CoreResult<BreakEvenScenario> {
        let product_name = validation::validate_required_text(
            "product_name",
            &self.product_name,
            validation::MAX_NAME_LENGTH,
        )?;
        let scenario_name = validation::optional_text_or(
            "scenario_name",
            self.scenario_name.as_deref(),
            DEFAULT_SCENARIO_NAME,
            validation::MAX_NAME_LENGTH,
        )?;
        let tag = validation::optional_text_or(
            "tag",
            self.tag.as_deref(),
            DEFAULT_SCENARIO_TAG,
            validation::MAX_NAME_LENGTH,
        )?;
        let description = validation::optional_text_or(
            "description",
            self.description.as_deref(),
            "",
            validation::MAX_TEXT_LENGTH,
        )?;

        validation::validate_amount("fixed_cost", self.fixed_cost)?;
        validation::validate_amount("variable_cost_per_unit", self.variable_cost_per_unit)?;
        validation::validate_amount("price_per_unit", self.price_per_unit)?;

        let calc = BreakEvenCalculation::compute(
            self.fixed_cost,
            self.price_per_unit,
            self.variable_cost_per_unit,
        );

        Ok(BreakEvenScenario {
            id: id.into(),
            owner_id: owner_id.into(),
            product_name,
            scenario_name,
            description,
            tag,
            fixed_cost: self.fixed_cost,
            variable_cost_per_unit: self.variable_cost_per_unit,
            price_per_unit: self.price_per_unit,
            break_even_units: calc.break_even_units.map(|u| u as f64).unwrap_or(0.0),
            break_even_sales: calc.break_even_sales,
            created_at: now,
        })
    }
}

/// A saved break-even calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenScenario {
    pub id: String,
    pub owner_id: String,
    pub product_name: String,
    pub scenario_name: String,
    pub description: String,
    pub tag: String,
    pub fixed_cost: f64,
    pub variable_cost_per_unit: f64,
    pub price_per_unit: f64,
    /// 0 when the product cannot break even.
    pub break_even_units: f64,
    pub break_even_sales: f64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl BreakEvenScenario {
    /// Expresses this scenario as a pricing record at the break-even volume.
    ///
    /// ## Derivation
    /// ```text
    /// fixed_cost_per_unit = fixed_cost / units            (0 if units ≤ 0)
    /// total_revenue       = break_even_sales, else price × units
    /// total_profit        = revenue − variable_cost × units − fixed_cost
    /// profit_per_unit     = total_profit / units          (0 if units ≤ 0)
    /// profit_margin       = total_profit / revenue × 100  (0 if revenue ≤ 0)
    /// ```
    pub fn to_pricing_record(&self) -> PricingScenarioRecord {
        let units = self.break_even_units;
        let per_unit = |total: f64| if units > 0.0 { total / units } else { 0.0 };

        let total_revenue = if self.break_even_sales != 0.0 {
            self.break_even_sales
        } else {
            self.price_per_unit * units
        };
        let total_profit =
            total_revenue - self.variable_cost_per_unit * units - self.fixed_cost;
        let profit_margin = if total_revenue > 0.0 {
            total_profit / total_revenue * 100.0
        } else {
            0.0
        };

        PricingScenarioRecord {
            id: self.id.clone(),
            owner_id: self.owner_id.clone(),
            product_name: self.product_name.clone(),
            new_price: self.price_per_unit,
            variable_cost: self.variable_cost_per_unit,
            fixed_cost_per_unit: per_unit(self.fixed_cost),
            total_revenue,
            total_profit,
            profit_per_unit: per_unit(total_profit),
            profit_margin,
            source_scenario_id: None,
            created_at: self.created_at,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, ValidationError};

    fn draft() -> BreakEvenDraft {
        BreakEvenDraft {
            product_name: "Widget".into(),
            fixed_cost: 1200.0,
            variable_cost_per_unit: 8.0,
            price_per_unit: 20.0,
            ..BreakEvenDraft::default()
        }
    }

    #[test]
    fn test_compute_break_even() {
        let calc = BreakEvenCalculation::compute(1200.0, 20.0, 8.0);
        assert_eq!(calc.cm_per_unit, 12.0);
        assert_eq!(calc.cm_ratio, 60.0);
        assert_eq!(calc.break_even_units, Some(100));
        assert_eq!(calc.break_even_sales, 2000.0);
    }

    #[test]
    fn test_compute_unprofitable() {
        let calc = BreakEvenCalculation::compute(1200.0, 8.0, 10.0);
        assert_eq!(calc.break_even_units, None);
        assert_eq!(calc.break_even_sales, 0.0);
        assert!(calc.cm_ratio < 0.0);
    }

    #[test]
    fn test_draft_defaults() {
        let scenario = draft().into_scenario("be-1", "owner-1", Utc::now()).unwrap();
        assert_eq!(scenario.scenario_name, DEFAULT_SCENARIO_NAME);
        assert_eq!(scenario.tag, DEFAULT_SCENARIO_TAG);
        assert_eq!(scenario.description, "");
        assert_eq!(scenario.break_even_units, 100.0);
        assert_eq!(scenario.break_even_sales, 2000.0);
    }

    #[test]
    fn test_draft_requires_product_name() {
        let err = BreakEvenDraft {
            product_name: "   ".into(),
            ..draft()
        }
        .into_scenario("be-1", "owner-1", Utc::now())
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_draft_rejects_negative_cost() {
        let err = BreakEvenDraft {
            fixed_cost: -1.0,
            ..draft()
        }
        .into_scenario("be-1", "owner-1", Utc::now())
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Negative { .. })
        ));
    }

    #[test]
    fn test_pricing_record_at_break_even_volume() {
        let scenario = draft().into_scenario("be-1", "owner-1", Utc::now()).unwrap();
        let record = scenario.to_pricing_record();

        assert_eq!(record.id, "be-1");
        assert_eq!(record.fixed_cost_per_unit, 12.0);
        assert_eq!(record.total_revenue, 2000.0);
        assert_eq!(record.total_profit, 0.0);
        assert_eq!(record.profit_per_unit, 0.0);
        assert_eq!(record.profit_margin, 0.0);
    }

    #[test]
    fn test_pricing_record_without_units() {
        let scenario = BreakEvenDraft {
            price_per_unit: 5.0,
            ..draft()
        }
        .into_scenario("be-2", "owner-1", Utc::now())
        .unwrap();
        let record = scenario.to_pricing_record();

        assert_eq!(record.fixed_cost_per_unit, 0.0);
        assert_eq!(record.total_revenue, 0.0);
        assert_eq!(record.total_profit, -1200.0);
        assert_eq!(record.profit_margin, 0.0);
    }
}

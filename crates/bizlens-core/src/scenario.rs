//! # Scenario Risk Engine
//!
//! Normalizes a saved pricing scenario into [`ScenarioMetrics`] and scores
//! how fragile its margin is.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  JSON / record                                                          │
//! │       │ ScenarioInput::from_json (has "breakEvenUnits"?)                │
//! │       ▼                                                                 │
//! │  ScenarioInput::Raw ────────────┐                                       │
//! │  ScenarioInput::BreakEven ──────┤ metrics()                             │
//! │   (revenue, per-unit, margin    │                                       │
//! │    derived from units/sales)    ▼                                       │
//! │                          ScenarioMetrics                                │
//! │             ┌───────────────────┼───────────────────┐                   │
//! │             ▼                   ▼                   ▼                   │
//! │      MarginClass          StressTest           risk_score               │
//! │   (6 bands by margin)  (+10% / +20% var cost)  base + penalty, [0,1]    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::coerce::json_number;
use crate::types::PricingScenarioRecord;

// =============================================================================
// Scenario Input
// =============================================================================

/// The two shapes a saved scenario can arrive in.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioInput {
    /// A pricing calculation with every figure already computed.
    Raw {
        new_price: f64,
        variable_cost: f64,
        fixed_cost_per_unit: f64,
        total_revenue: f64,
        total_profit: f64,
        profit_per_unit: f64,
        profit_margin: f64,
    },

    /// A break-even calculation; revenue and margins are derived.
    BreakEven {
        new_price: f64,
        variable_cost: f64,
        fixed_cost_per_unit: f64,
        break_even_units: f64,
        break_even_sales: f64,
        total_profit: f64,
    },
}

impl ScenarioInput {
    /// Reads either shape from a JSON object with camelCase keys.
    ///
    /// The presence of a `breakEvenUnits` key selects the break-even shape.
    /// Missing or malformed fields read as 0.
    pub fn from_json(value: &Value) -> Self {
        let num = |key: &str| json_number(value, key);

        if value.get("breakEvenUnits").is_some() {
            ScenarioInput::BreakEven {
                new_price: num("newPrice"),
                variable_cost: num("variableCost"),
                fixed_cost_per_unit: num("fixedCostPerUnit"),
                break_even_units: num("breakEvenUnits"),
                break_even_sales: num("breakEvenSales"),
                total_profit: num("totalProfit"),
            }
        } else {
            ScenarioInput::Raw {
                new_price: num("newPrice"),
                variable_cost: num("variableCost"),
                fixed_cost_per_unit: num("fixedCostPerUnit"),
                total_revenue: num("totalRevenue"),
                total_profit: num("totalProfit"),
                profit_per_unit: num("profitPerUnit"),
                profit_margin: num("profitMargin"),
            }
        }
    }

    /// Normalizes either shape into one metrics record.
    pub fn metrics(&self) -> ScenarioMetrics {
        match *self {
            ScenarioInput::Raw {
                new_price,
                variable_cost,
                fixed_cost_per_unit,
                total_revenue,
                total_profit,
                profit_per_unit,
                profit_margin,
            } => ScenarioMetrics {
                price: new_price,
                variable_cost,
                fixed_cost_per_unit,
                total_revenue,
                total_profit,
                profit_per_unit,
                profit_margin,
            },
            ScenarioInput::BreakEven {
                new_price,
                variable_cost,
                fixed_cost_per_unit,
                break_even_units,
                break_even_sales,
                total_profit,
            } => {
                let total_revenue = if break_even_sales != 0.0 {
                    break_even_sales
                } else {
                    new_price * break_even_units
                };
                let profit_per_unit = if break_even_units > 0.0 {
                    total_profit / break_even_units
                } else {
                    0.0
                };
                let profit_margin = if total_revenue > 0.0 {
                    total_profit / total_revenue * 100.0
                } else {
                    0.0
                };

                ScenarioMetrics {
                    price: new_price,
                    variable_cost,
                    fixed_cost_per_unit,
                    total_revenue,
                    total_profit,
                    profit_per_unit,
                    profit_margin,
                }
            }
        }
    }
}

impl From<&PricingScenarioRecord> for ScenarioInput {
    fn from(record: &PricingScenarioRecord) -> Self {
        ScenarioInput::Raw {
            new_price: record.new_price,
            variable_cost: record.variable_cost,
            fixed_cost_per_unit: record.fixed_cost_per_unit,
            total_revenue: record.total_revenue,
            total_profit: record.total_profit,
            profit_per_unit: record.profit_per_unit,
            profit_margin: record.profit_margin,
        }
    }
}

/// One scenario's figures, whatever shape it was saved in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioMetrics {
    pub price: f64,
    pub variable_cost: f64,
    pub fixed_cost_per_unit: f64,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub profit_per_unit: f64,
    /// Percentage.
    pub profit_margin: f64,
}

// =============================================================================
// Margin Classification
// =============================================================================

/// Margin band of a scenario, from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum MarginClass {
    LossMaking,
    DangerouslyThin,
    LowSafety,
    Healthy,
    Strong,
    Excellent,
}

/// Risk level paired with each margin band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum RiskLevel {
    Critical,
    High,
    Elevated,
    Normal,
    Low,
    VeryLow,
}

impl MarginClass {
    /// Classifies a margin percentage; bands are half-open `[lo, hi)`.
    ///
    /// ```text
    ///   < 0   Loss-making       critical
    ///   < 10  Dangerously thin  high
    ///   < 15  Low safety        elevated
    ///   < 30  Healthy           normal
    ///   < 40  Strong            low
    ///   else  Excellent         very-low
    /// ```
    pub fn classify(margin: f64) -> Self {
        if margin < 0.0 {
            MarginClass::LossMaking
        } else if margin < 10.0 {
            MarginClass::DangerouslyThin
        } else if margin < 15.0 {
            MarginClass::LowSafety
        } else if margin < 30.0 {
            MarginClass::Healthy
        } else if margin < 40.0 {
            MarginClass::Strong
        } else {
            MarginClass::Excellent
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MarginClass::LossMaking => "Loss-making",
            MarginClass::DangerouslyThin => "Dangerously thin",
            MarginClass::LowSafety => "Low safety",
            MarginClass::Healthy => "Healthy",
            MarginClass::Strong => "Strong",
            MarginClass::Excellent => "Excellent",
        }
    }

    pub fn risk(self) -> RiskLevel {
        match self {
            MarginClass::LossMaking => RiskLevel::Critical,
            MarginClass::DangerouslyThin => RiskLevel::High,
            MarginClass::LowSafety => RiskLevel::Elevated,
            MarginClass::Healthy => RiskLevel::Normal,
            MarginClass::Strong => RiskLevel::Low,
            MarginClass::Excellent => RiskLevel::VeryLow,
        }
    }
}

// =============================================================================
// Stress Test & Risk Score
// =============================================================================

/// Margins after variable cost rises by 10% and 20%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StressTest {
    pub margin_plus_10: f64,
    pub margin_plus_20: f64,
}

/// Margin percentage with variable cost scaled by `multiplier`.
pub fn stressed_margin(metrics: &ScenarioMetrics, multiplier: f64) -> f64 {
    if metrics.price <= 0.0 {
        return 0.0;
    }
    let profit_per_unit =
        metrics.price - metrics.variable_cost * multiplier - metrics.fixed_cost_per_unit;
    profit_per_unit / metrics.price * 100.0
}

pub fn stress_test(metrics: &ScenarioMetrics) -> StressTest {
    StressTest {
        margin_plus_10: stressed_margin(metrics, 1.1),
        margin_plus_20: stressed_margin(metrics, 1.2),
    }
}

/// Bounded 0-1 risk: a base from today's margin plus a penalty from how
/// the margin holds up under a 20% variable-cost rise.
///
/// ## Scoring Table
/// ```text
/// margin     base         margin_plus_20   penalty
/// < 5        0.8          < 0              +0.2
/// < 10       0.6          < 5              +0.15
/// < 15       0.4          < 10             +0.1
/// < 25       0.2          else             0
/// else       0.1
/// ```
pub fn risk_score(margin: f64, stress: &StressTest) -> f64 {
    let base: f64 = if margin < 5.0 {
        0.8
    } else if margin < 10.0 {
        0.6
    } else if margin < 15.0 {
        0.4
    } else if margin < 25.0 {
        0.2
    } else {
        0.1
    };

    let penalty = if stress.margin_plus_20 < 0.0 {
        0.2
    } else if stress.margin_plus_20 < 5.0 {
        0.15
    } else if stress.margin_plus_20 < 10.0 {
        0.1
    } else {
        0.0
    };

    (base + penalty).clamp(0.0, 1.0)
}

// =============================================================================
// Assessment
// =============================================================================

/// Everything the scenario view shows for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioAssessment {
    pub metrics: ScenarioMetrics,
    pub margin_class: MarginClass,
    pub margin_label: String,
    pub risk_level: RiskLevel,
    pub stress_test: StressTest,
    pub risk_score: f64,
}

/// Normalizes, classifies, stress-tests and scores one scenario.
///
/// ## Example
/// ```rust
/// use bizlens_core::scenario::{assess, MarginClass, ScenarioInput};
///
/// let input = ScenarioInput::from_json(&serde_json::json!({
///     "newPrice": 100, "variableCost": 60, "fixedCostPerUnit": 10,
///     "profitMargin": 30
/// }));
/// let assessment = assess(&input);
/// assert_eq!(assessment.margin_class, MarginClass::Strong);
/// ```
pub fn assess(input: &ScenarioInput) -> ScenarioAssessment {
    let metrics = input.metrics();
    let margin_class = MarginClass::classify(metrics.profit_margin);
    let stress = stress_test(&metrics);
    let risk_score = risk_score(metrics.profit_margin, &stress);

    ScenarioAssessment {
        metrics,
        margin_class,
        margin_label: margin_class.label().to_string(),
        risk_level: margin_class.risk(),
        stress_test: stress,
        risk_score,
    }
}

// =============================================================================
// Comparison
// =============================================================================

/// Which side of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonSide {
    Left,
    Right,
}

/// Two scenarios side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioComparison {
    pub left: ScenarioAssessment,
    pub right: ScenarioAssessment,
    /// Right margin minus left margin, in percentage points.
    pub margin_delta: f64,
    /// `None` when both carry the same risk score.
    pub lower_risk: Option<ComparisonSide>,
}

pub fn compare(left: &ScenarioInput, right: &ScenarioInput) -> ScenarioComparison {
    let left = assess(left);
    let right = assess(right);

    let margin_delta = right.metrics.profit_margin - left.metrics.profit_margin;
    let lower_risk = if left.risk_score < right.risk_score {
        Some(ComparisonSide::Left)
    } else if right.risk_score < left.risk_score {
        Some(ComparisonSide::Right)
    } else {
        None
    };

    ScenarioComparison {
        left,
        right,
        margin_delta,
        lower_risk,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

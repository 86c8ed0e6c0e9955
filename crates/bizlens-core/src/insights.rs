//! # Dashboard Insights
//!
//! Derives the owner dashboard analytics from a [`BusinessDataset`].
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      generate_insights(dataset)                         │
//! │                                                                         │
//! │  products[i] + pricing_scenarios[i] ──► ProductTerms[i]                 │
//! │                         │                                               │
//! │           ┌─────────────┴─────────────┐                                 │
//! │           ▼                           ▼                                 │
//! │     BepInsight[i]              PricingInsight[i]     cash_flow[]        │
//! │     ceil(fixed / cm)           (p − v) / p × 100          │             │
//! │           │                           │                   ▼             │
//! │           │                           │            CashInsights         │
//! │           │                           │            running balance,     │
//! │           │                           │            danger, burn rate    │
//! │           └─────────────┬─────────────┴───────────────────┘             │
//! │                         ▼                                               │
//! │            health_score + recommendations                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here can fail: an empty dataset yields an empty but valid
//! [`Insights`] with a healthy cash picture and the fallback recommendation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{BusinessDataset, CashFlowEntry};

// =============================================================================
// Thresholds
// =============================================================================

/// Margins below this percentage are "low".
pub const LOW_MARGIN_PERCENT: f64 = 30.0;

/// Margins above this percentage are "high".
pub const HIGH_MARGIN_PERCENT: f64 = 60.0;

/// Products above this margin each add to the health score.
pub const SCORING_MARGIN_PERCENT: f64 = 40.0;

const POINTS_PER_STRONG_PRODUCT: u32 = 5;
const HEALTHY_CASH_POINTS: u32 = 60;
const UNHEALTHY_CASH_POINTS: u32 = 20;
const MAX_HEALTH_SCORE: u32 = 100;

const FALLBACK_RECOMMENDATION: &str =
    "Your business fundamentals look healthy. Maintain momentum.";

// =============================================================================
// Output Types
// =============================================================================

/// Everything the owner dashboard displays. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub bep_insights: Vec<BepInsight>,
    pub pricing_insights: Vec<PricingInsight>,
    pub cash_insights: CashInsights,
    /// 0-100.
    pub health_score: u32,
    pub recommendations: Vec<String>,
}

/// Break-even verdict for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BepInsight {
    pub product: String,
    /// True when the product can never break even (price ≤ variable cost).
    pub issue: bool,
    #[ts(type = "number | null")]
    pub break_even_units: Option<u64>,
    pub message: String,
}

/// Margin band for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MarginBand {
    Low,
    Healthy,
    High,
}

impl MarginBand {
    pub fn for_margin(margin: f64) -> Self {
        if margin < LOW_MARGIN_PERCENT {
            MarginBand::Low
        } else if margin > HIGH_MARGIN_PERCENT {
            MarginBand::High
        } else {
            MarginBand::Healthy
        }
    }

    /// The pricing opportunity text shown for this band.
    pub fn opportunity(self) -> &'static str {
        match self {
            MarginBand::Low => "Low margin: consider a slight price increase.",
            MarginBand::Healthy => "Healthy margin.",
            MarginBand::High => "High margin: strong margin, premium pricing is viable.",
        }
    }
}

/// Margin analysis for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingInsight {
    pub product: String,
    /// Percentage of price kept after variable cost.
    pub margin: f64,
    pub band: MarginBand,
    pub opportunity: String,
}

/// A ledger point where the running balance went negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DangerPoint {
    pub month: String,
    pub balance: f64,
}

/// Cash-flow health summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashInsights {
    /// Average size of the negative net flows (positive number).
    pub real_burn_rate: f64,
    pub danger_months: u32,
    pub first_danger_month: Option<String>,
    pub is_healthy: bool,
    pub danger_points: Vec<DangerPoint>,
}

impl Default for CashInsights {
    fn default() -> Self {
        CashInsights {
            real_burn_rate: 0.0,
            danger_months: 0,
            first_danger_month: None,
            is_healthy: true,
            danger_points: Vec::new(),
        }
    }
}

// =============================================================================
// Product Terms
// =============================================================================

/// The price and variable cost a product is evaluated with.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductTerms {
    pub name: String,
    pub price: f64,
    pub variable_cost: f64,
}

/// Pairs each product with the pricing scenario at the same position.
///
/// The scenario's price and variable cost override the product's own when a
/// scenario exists at that index.
pub fn product_terms(dataset: &BusinessDataset) -> Vec<ProductTerms> {
    dataset
        .products
        .iter()
        .enumerate()
        .map(|(i, product)| match dataset.pricing_scenarios.get(i) {
            Some(scenario) => ProductTerms {
                name: product.name.clone(),
                price: scenario.price,
                variable_cost: scenario.variable_cost,
            },
            None => ProductTerms {
                name: product.name.clone(),
                price: product.price_per_unit,
                variable_cost: product.variable_cost_per_unit,
            },
        })
        .collect()
}

// =============================================================================
// Insight Generation
// =============================================================================

/// Computes the full dashboard insight set for a dataset.
pub fn generate_insights(dataset: &BusinessDataset) -> Insights {
    let terms = product_terms(dataset);

    let bep_insights: Vec<BepInsight> = terms
        .iter()
        .map(|t| break_even_insight(t, dataset.fixed_cost))
        .collect();
    let pricing_insights: Vec<PricingInsight> = terms.iter().map(pricing_insight).collect();
    let cash_insights = cash_insights(&dataset.cash_flow);
    let health_score = health_score(&pricing_insights, &cash_insights);
    let recommendations = recommendations(&bep_insights, &pricing_insights, &cash_insights);

    Insights {
        bep_insights,
        pricing_insights,
        cash_insights,
        health_score,
        recommendations,
    }
}

/// Break-even units against the dataset-level fixed cost.
///
/// A non-positive contribution margin means the product loses money on
/// every sale, so it is flagged instead of given a unit count.
pub fn break_even_insight(terms: &ProductTerms, fixed_cost: f64) -> BepInsight {
    let cm = terms.price - terms.variable_cost;

    if cm <= 0.0 {
        return BepInsight {
            product: terms.name.clone(),
            issue: true,
            break_even_units: None,
            message: format!(
                "{} cannot break even because its price is lower than its variable cost.",
                terms.name
            ),
        };
    }

    let units = (fixed_cost / cm).ceil().max(0.0) as u64;
    BepInsight {
        product: terms.name.clone(),
        issue: false,
        break_even_units: Some(units),
        message: format!(
            "{} needs around {} units to cover fixed costs.",
            terms.name,
            group_thousands(units)
        ),
    }
}

/// Gross margin percentage and its band.
pub fn pricing_insight(terms: &ProductTerms) -> PricingInsight {
    let margin = if terms.price > 0.0 {
        (terms.price - terms.variable_cost) / terms.price * 100.0
    } else {
        0.0
    };
    let band = MarginBand::for_margin(margin);

    PricingInsight {
        product: terms.name.clone(),
        margin,
        band,
        opportunity: band.opportunity().to_string(),
    }
}

/// Running balance after each ledger entry.
///
/// ## Seeding
/// ```text
/// first.running_balance = Some(b) → start at b, first net NOT added
/// first.running_balance = None    → start at 0, first net added
/// every later entry               → balance += net_flow()
/// ```
pub fn running_balances(cash_flow: &[CashFlowEntry]) -> Vec<f64> {
    let mut balances = Vec::with_capacity(cash_flow.len());
    let Some(first) = cash_flow.first() else {
        return balances;
    };

    let mut running = match first.running_balance {
        Some(balance) => balance,
        None => first.net_flow(),
    };
    balances.push(running);

    for entry in &cash_flow[1..] {
        running += entry.net_flow();
        balances.push(running);
    }

    balances
}

/// Danger months, first danger month and burn rate for a ledger.
pub fn cash_insights(cash_flow: &[CashFlowEntry]) -> CashInsights {
    if cash_flow.is_empty() {
        return CashInsights::default();
    }

    let danger_points: Vec<DangerPoint> = cash_flow
        .iter()
        .zip(running_balances(cash_flow))
        .filter(|(_, balance)| *balance < 0.0)
        .map(|(entry, balance)| DangerPoint {
            month: entry.date.clone(),
            balance,
        })
        .collect();

    let negative_flows: Vec<f64> = cash_flow
        .iter()
        .map(CashFlowEntry::net_flow)
        .filter(|net| *net < 0.0)
        .collect();
    let real_burn_rate = if negative_flows.is_empty() {
        0.0
    } else {
        (negative_flows.iter().sum::<f64>() / negative_flows.len() as f64).abs()
    };

    let first_danger_month = danger_points
        .first()
        .map(|p| p.month.clone())
        .filter(|month| !month.is_empty());

    CashInsights {
        real_burn_rate,
        danger_months: danger_points.len() as u32,
        first_danger_month,
        is_healthy: danger_points.is_empty(),
        danger_points,
    }
}

/// 5 points per product above 40% margin, plus 60 for healthy cash (20
/// otherwise), capped at 100.
pub fn health_score(pricing: &[PricingInsight], cash: &CashInsights) -> u32 {
    let strong = pricing
        .iter()
        .filter(|p| p.margin > SCORING_MARGIN_PERCENT)
        .count() as u32;
    let cash_points = if cash.is_healthy {
        HEALTHY_CASH_POINTS
    } else {
        UNHEALTHY_CASH_POINTS
    };

    strong
        .saturating_mul(POINTS_PER_STRONG_PRODUCT)
        .saturating_add(cash_points)
        .min(MAX_HEALTH_SCORE)
}

/// Ordered advice: cash danger, then low margins, then break-even issues.
pub fn recommendations(
    bep: &[BepInsight],
    pricing: &[PricingInsight],
    cash: &CashInsights,
) -> Vec<String> {
    let mut recs = Vec::new();

    if cash.danger_months > 0 {
        recs.push(format!(
            "Cash reserves may become negative starting {}. Consider expense reduction or revenue increase.",
            cash.first_danger_month.as_deref().unwrap_or("soon")
        ));
    }

    recs.extend(
        pricing
            .iter()
            .filter(|p| p.margin < LOW_MARGIN_PERCENT)
            .map(|p| {
                format!(
                    "{} has a low profit margin: consider increasing price.",
                    p.product
                )
            }),
    );

    recs.extend(bep.iter().filter(|b| b.issue).map(|b| {
        format!(
            "Review cost structure of {}. It cannot break even.",
            b.product
        )
    }));

    if recs.is_empty() {
        recs.push(FALLBACK_RECOMMENDATION.to_string());
    }

    recs
}

/// Formats an integer with `,` thousands separators.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================

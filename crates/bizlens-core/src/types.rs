//! # Domain Types
//!
//! Core domain types used throughout BizLens.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  BusinessDataset (one per owner, replaced on every upload)       │  │
//! │  │  fixed_cost                                                      │  │
//! │  │  ├── products[]          ← "Contribution Margin" sheet           │  │
//! │  │  ├── cash_flow[]         ← "Cash Flow Statement" sheet           │  │
//! │  │  └── pricing_scenarios[] ← "Pricing Sensitivity" sheet           │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ┌──────────────────────┐  ┌─────────────────────┐  ┌───────────────┐  │
//! │  │ PricingScenarioRecord│  │ AdvisorRecommendation│  │   Session     │  │
//! │  │ ──────────────────── │  │ ─────────────────── │  │ ───────────── │  │
//! │  │ id, owner_id         │  │ advisor_id          │  │ user_id       │  │
//! │  │ new_price, margins   │◄─│ scenario_id (FK)    │  │ role          │  │
//! │  │ source_scenario_id   │  │ text (opaque)       │  │               │  │
//! │  └──────────────────────┘  └─────────────────────┘  └───────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## JSON Shape
//! All records serialize with camelCase keys (`fixedCost`, `pricePerUnit`)
//! to match what the dashboards consume, and export TypeScript bindings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

// =============================================================================
// Business Dataset
// =============================================================================

/// Normalized business data parsed from one uploaded workbook.
///
/// Immutable once parsed: a new upload replaces the whole dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessDataset {
    /// Baseline fixed cost, taken from the first product row.
    pub fixed_cost: f64,

    /// Contribution margin rows, in sheet order.
    pub products: Vec<Product>,

    /// Cash-flow ledger, chronological.
    pub cash_flow: Vec<CashFlowEntry>,

    /// Price sensitivity rows, in sheet order.
    pub pricing_scenarios: Vec<PricingScenario>,
}

impl BusinessDataset {
    /// True when the upload produced no rows at all.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.cash_flow.is_empty() && self.pricing_scenarios.is_empty()
    }
}

/// One product row from the "Contribution Margin" sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub name: String,
    /// Category text from the "Value" column (e.g. "Premium").
    pub value: String,
    pub price_per_unit: f64,
    pub variable_cost_per_unit: f64,
    pub fixed_costs: f64,
    /// Contribution margin as stated in the sheet (not recomputed).
    pub contribution_margin: f64,
    /// Break-even units as stated in the sheet (not recomputed).
    pub break_even_units: f64,
    pub break_even_revenue_sar: f64,
}

impl Product {
    /// Creates a product with only a name, price and variable cost.
    pub fn priced(name: impl Into<String>, price: f64, variable_cost: f64) -> Self {
        Product {
            name: name.into(),
            price_per_unit: price,
            variable_cost_per_unit: variable_cost,
            ..Product::default()
        }
    }
}

/// One ledger row from the "Cash Flow Statement" sheet.
///
/// ## Optional Fields
/// `net_cash_flow` and `running_balance` are always `Some` when parsed from a
/// workbook. They are optional so datasets built elsewhere can say "not
/// provided", which changes how the cash-flow insight seeds its balance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct CashFlowEntry {
    /// `YYYY-MM-DD` when the cell was a recognizable date, else verbatim text.
    pub date: String,
    pub description: String,
    pub cash_in: f64,
    pub cash_out: f64,
    pub net_cash_flow: Option<f64>,
    pub running_balance: Option<f64>,
}

impl CashFlowEntry {
    /// Net movement for the period: stated net flow, else in minus out.
    pub fn net_flow(&self) -> f64 {
        self.net_cash_flow
            .unwrap_or(self.cash_in - self.cash_out)
    }
}

/// One row from the "Pricing Sensitivity" sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingScenario {
    pub scenario_label: String,
    pub price: f64,
    pub units_sold: f64,
    pub revenue: f64,
    pub variable_cost: f64,
    pub contribution_margin: f64,
    pub profit: f64,
}

// =============================================================================
// Pricing Scenario Record
// =============================================================================

/// A saved pricing scenario an owner can compare and an advisor can review.
///
/// ## Lifecycle
/// ```text
/// Break-even calculator ──save──► BreakEvenScenario ──convert──┐
///                                                              ▼
/// Pricing calculator ──────────────save──────────► PricingScenarioRecord
///                                                              │
///                                   "save copy" ◄──────────────┘
/// ```
/// Read-only once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingScenarioRecord {
    pub id: String,
    pub owner_id: String,
    pub product_name: String,
    pub new_price: f64,
    pub variable_cost: f64,
    pub fixed_cost_per_unit: f64,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub profit_per_unit: f64,
    /// Percentage, e.g. `12.5` for 12.5%.
    pub profit_margin: f64,
    /// Set when this record is a copy of another record.
    pub source_scenario_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl PricingScenarioRecord {
    /// Creates a copy of this record with a fresh id and timestamp.
    pub fn copy_of(&self, id: impl Into<String>, now: DateTime<Utc>) -> Self {
        PricingScenarioRecord {
            id: id.into(),
            source_scenario_id: Some(self.id.clone()),
            created_at: now,
            ..self.clone()
        }
    }
}

// =============================================================================
// Advisor Recommendation
// =============================================================================

/// Free-text advice an advisor attaches to one of an owner's scenarios.
///
/// The text is opaque: nothing in the analytics reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorRecommendation {
    pub id: String,
    pub advisor_id: String,
    pub owner_id: String,
    pub scenario_id: String,
    pub text: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Session
// =============================================================================

/// The role a signed-in user acts under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Uploads data and saves scenarios for their own business.
    Owner,
    /// Reviews assigned owners and writes recommendations.
    Advisor,
    /// Oversees advisors.
    Manager,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Owner => write!(f, "owner"),
            Role::Advisor => write!(f, "advisor"),
            Role::Manager => write!(f, "manager"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "owner" | "business_owner" => Ok(Role::Owner),
            "advisor" => Ok(Role::Advisor),
            "manager" => Ok(Role::Manager),
            _ => Err(crate::error::ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["owner".into(), "advisor".into(), "manager".into()],
            }),
        }
    }
}

/// The caller's identity, passed explicitly into every command.
///
/// ## Owner Scope
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Session { user_id: "u-7", role }      owner_scope(requested)           │
/// │                                                                         │
/// │  Owner   ──────────────────────────►  always "u-7" (own business)       │
/// │  Advisor ── requested = Some("o-3") ► "o-3"                             │
/// │  Advisor ── requested = None ───────► CoreError::OwnerRequired          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub role: Role,
}

impl Session {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Session {
            user_id: user_id.into(),
            role,
        }
    }

    /// Resolves which owner's business a command operates on.
    pub fn owner_scope(&self, requested: Option<&str>) -> Result<String, CoreError> {
        match (self.role, requested) {
            (Role::Owner, _) => Ok(self.user_id.clone()),
            (_, Some(owner)) if !owner.trim().is_empty() => Ok(owner.trim().to_string()),
            (role, _) => Err(CoreError::OwnerRequired {
                role: role.to_string(),
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Scenario Commands
//!
//! Saving, listing, copying, assessing and comparing an owner's scenarios.
//!
//! ## Two Tables, One View
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  pricing_scenarios ─────────────────────────┐                           │
//! │                                              ├──► PricingScenarioRecord │
//! │  break_even_scenarios ─ to_pricing_record() ─┘          │               │
//! │                                                          ▼               │
//! │                                          assess(ScenarioInput::from)    │
//! │                                                          │               │
//! │                                                          ▼               │
//! │                  ScenarioView { record, kind, assessment, recs }        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lookups by id check the pricing table first, then the break-even table.

use std::collections::HashMap;

use bizlens_core::breakeven::{BreakEvenDraft, BreakEvenScenario};
use bizlens_core::scenario::{compare, ScenarioComparison};
use bizlens_core::validation::{
    validate_amount, validate_required_text, validate_uuid, MAX_NAME_LENGTH,
};
use bizlens_core::{
    assess, AdvisorRecommendation, CoreError, PricingScenarioRecord, ScenarioAssessment,
    ScenarioInput, Session,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::state::DbState;

/// Which table a listed scenario came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKind {
    Pricing,
    BreakEven,
}

/// One scenario as the scenario view shows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioView {
    pub kind: ScenarioKind,
    pub record: PricingScenarioRecord,
    pub assessment: ScenarioAssessment,
    /// Advisor notes on this scenario, oldest first.
    pub recommendations: Vec<AdvisorRecommendation>,
}

/// Owner input for saving a pricing scenario.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingDraft {
    pub product_name: String,
    pub new_price: f64,
    pub variable_cost: f64,
    pub fixed_cost_per_unit: f64,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub profit_per_unit: f64,
    pub profit_margin: f64,
}

impl PricingDraft {
    fn into_record(self, owner_id: &str) -> ApiResult<PricingScenarioRecord> {
        let product_name =
            validate_required_text("product_name", &self.product_name, MAX_NAME_LENGTH)
                .map_err(CoreError::from)?;
        validate_amount("new_price", self.new_price).map_err(CoreError::from)?;
        validate_amount("variable_cost", self.variable_cost).map_err(CoreError::from)?;
        validate_amount("fixed_cost_per_unit", self.fixed_cost_per_unit)
            .map_err(CoreError::from)?;

        Ok(PricingScenarioRecord {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            product_name,
            new_price: self.new_price,
            variable_cost: self.variable_cost,
            fixed_cost_per_unit: self.fixed_cost_per_unit,
            total_revenue: self.total_revenue,
            total_profit: self.total_profit,
            profit_per_unit: self.profit_per_unit,
            profit_margin: self.profit_margin,
            source_scenario_id: None,
            created_at: Utc::now(),
        })
    }
}

// =============================================================================
// Saving
// =============================================================================

/// Saves a break-even calculation for the owner.
pub async fn save_break_even(
    db: &DbState,
    session: &Session,
    owner: Option<&str>,
    draft: BreakEvenDraft,
) -> ApiResult<BreakEvenScenario> {
    let owner_id = session.owner_scope(owner)?;
    let scenario = draft.into_scenario(Uuid::new_v4().to_string(), &owner_id, Utc::now())?;

    db.inner().scenarios().insert_break_even(&scenario).await?;
    Ok(scenario)
}

/// Saves a pricing calculation for the owner.
pub async fn save_pricing(
    db: &DbState,
    session: &Session,
    owner: Option<&str>,
    draft: PricingDraft,
) -> ApiResult<PricingScenarioRecord> {
    let owner_id = session.owner_scope(owner)?;
    let record = draft.into_record(&owner_id)?;

    db.inner().scenarios().insert_pricing(&record).await?;
    Ok(record)
}

/// Saves a copy of one of the owner's pricing scenarios.
pub async fn copy_scenario(
    db: &DbState,
    session: &Session,
    owner: Option<&str>,
    scenario_id: &str,
) -> ApiResult<PricingScenarioRecord> {
    let owner_id = session.owner_scope(owner)?;
    validate_uuid(scenario_id).map_err(CoreError::from)?;

    let copy = db
        .inner()
        .scenarios()
        .copy_pricing(&owner_id, scenario_id, &Uuid::new_v4().to_string(), Utc::now())
        .await?;

    info!(source = %scenario_id, copy = %copy.id, "Scenario copied");
    Ok(copy)
}

/// Removes one of the owner's break-even scenarios.
pub async fn delete_break_even(
    db: &DbState,
    session: &Session,
    owner: Option<&str>,
    scenario_id: &str,
) -> ApiResult<()> {
    let owner_id = session.owner_scope(owner)?;
    validate_uuid(scenario_id).map_err(CoreError::from)?;

    if !db
        .inner()
        .scenarios()
        .delete_break_even(&owner_id, scenario_id)
        .await?
    {
        return Err(CoreError::ScenarioNotFound(scenario_id.to_string()).into());
    }
    Ok(())
}

// =============================================================================
// Reading
// =============================================================================

/// Every scenario the owner saved, newest first, each with its assessment.
pub async fn list_scenarios(
    db: &DbState,
    session: &Session,
    owner: Option<&str>,
) -> ApiResult<Vec<ScenarioView>> {
    let owner_id = session.owner_scope(owner)?;
    let repo = db.inner().scenarios();

    let pricing = repo.list_pricing(&owner_id).await?;
    let break_even = repo.list_break_even(&owner_id).await?;

    let mut notes: HashMap<String, Vec<AdvisorRecommendation>> = HashMap::new();
    for rec in db
        .inner()
        .recommendations()
        .list_by_owner(&owner_id)
        .await?
        .into_iter()
        .rev()
    {
        notes.entry(rec.scenario_id.clone()).or_default().push(rec);
    }

    let records = pricing
        .into_iter()
        .map(|r| (ScenarioKind::Pricing, r))
        .chain(
            break_even
                .iter()
                .map(|s| (ScenarioKind::BreakEven, s.to_pricing_record())),
        );

    let mut views: Vec<ScenarioView> = records
        .map(|(kind, record)| ScenarioView {
            kind,
            assessment: assess(&ScenarioInput::from(&record)),
            recommendations: notes.remove(&record.id).unwrap_or_default(),
            record,
        })
        .collect();
    views.sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at));

    debug!(owner_id = %owner_id, count = views.len(), "Listed scenarios");
    Ok(views)
}

/// Assesses a scenario supplied as JSON without saving it.
pub fn assess_json(value: &Value) -> ScenarioAssessment {
    assess(&ScenarioInput::from_json(value))
}

/// Compares exactly two of the owner's saved scenarios.
///
/// ## Errors
/// `BUSINESS_LOGIC` unless `ids` holds two distinct ids.
pub async fn compare_scenarios(
    db: &DbState,
    session: &Session,
    owner: Option<&str>,
    ids: &[String],
) -> ApiResult<ScenarioComparison> {
    let owner_id = session.owner_scope(owner)?;

    let [left_id, right_id] = ids else {
        return Err(CoreError::InvalidComparison(ids.len()).into());
    };
    if left_id == right_id {
        return Err(CoreError::InvalidComparison(1).into());
    }

    let left = find_scenario(db, &owner_id, left_id).await?;
    let right = find_scenario(db, &owner_id, right_id).await?;

    Ok(compare(
        &ScenarioInput::from(&left),
        &ScenarioInput::from(&right),
    ))
}

/// Resolves a scenario id in either table, as a pricing record.
pub async fn find_scenario(
    db: &DbState,
    owner_id: &str,
    scenario_id: &str,
) -> ApiResult<PricingScenarioRecord> {
    validate_uuid(scenario_id).map_err(CoreError::from)?;
    let repo = db.inner().scenarios();

    if let Some(record) = repo.get_pricing(owner_id, scenario_id).await? {
        return Ok(record);
    }
    if let Some(scenario) = repo.get_break_even(owner_id, scenario_id).await? {
        return Ok(scenario.to_pricing_record());
    }
    Err(CoreError::ScenarioNotFound(scenario_id.to_string()).into())
}

//! # Scenario Repository
//!
//! Saved break-even scenarios and pricing scenario records.
//!
//! ## Tables
//! ```text
//! break_even_scenarios ──(converted on read by callers)──► PricingScenarioRecord
//! pricing_scenarios    ──────────────────────────────────► PricingScenarioRecord
//!        ▲
//!        └── source_scenario_id (copies point at their original)
//! ```
//!
//! Lists are newest first.

use bizlens_core::breakeven::BreakEvenScenario;
use bizlens_core::PricingScenarioRecord;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct BreakEvenRow {
    id: String,
    owner_id: String,
    product_name: String,
    scenario_name: String,
    description: String,
    tag: String,
    fixed_cost: f64,
    variable_cost_per_unit: f64,
    price_per_unit: f64,
    break_even_units: f64,
    break_even_sales: f64,
    created_at: DateTime<Utc>,
}

impl From<BreakEvenRow> for BreakEvenScenario {
    fn from(row: BreakEvenRow) -> Self {
        BreakEvenScenario {
            id: row.id,
            owner_id: row.owner_id,
            product_name: row.product_name,
            scenario_name: row.scenario_name,
            description: row.description,
            tag: row.tag,
            fixed_cost: row.fixed_cost,
            variable_cost_per_unit: row.variable_cost_per_unit,
            price_per_unit: row.price_per_unit,
            break_even_units: row.break_even_units,
            break_even_sales: row.break_even_sales,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PricingRow {
    id: String,
    owner_id: String,
    product_name: String,
    new_price: f64,
    variable_cost: f64,
    fixed_cost_per_unit: f64,
    total_revenue: f64,
    total_profit: f64,
    profit_per_unit: f64,
    profit_margin: f64,
    source_scenario_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<PricingRow> for PricingScenarioRecord {
    fn from(row: PricingRow) -> Self {
        PricingScenarioRecord {
            id: row.id,
            owner_id: row.owner_id,
            product_name: row.product_name,
            new_price: row.new_price,
            variable_cost: row.variable_cost,
            fixed_cost_per_unit: row.fixed_cost_per_unit,
            total_revenue: row.total_revenue,
            total_profit: row.total_profit,
            profit_per_unit: row.profit_per_unit,
            profit_margin: row.profit_margin,
            source_scenario_id: row.source_scenario_id,
            created_at: row.created_at,
        }
    }
}

const PRICING_COLUMNS: &str = "id, owner_id, product_name, new_price, variable_cost, \
     fixed_cost_per_unit, total_revenue, total_profit, profit_per_unit, profit_margin, \
     source_scenario_id, created_at";

const BREAK_EVEN_COLUMNS: &str = "id, owner_id, product_name, scenario_name, description, tag, \
     fixed_cost, variable_cost_per_unit, price_per_unit, break_even_units, break_even_sales, \
     created_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for saved scenarios.
#[derive(Debug, Clone)]
pub struct ScenarioRepository {
    pool: SqlitePool,
}

impl ScenarioRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ScenarioRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Break-even scenarios
    // -------------------------------------------------------------------------

    pub async fn insert_break_even(&self, scenario: &BreakEvenScenario) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO break_even_scenarios (
                id, owner_id, product_name, scenario_name, description, tag,
                fixed_cost, variable_cost_per_unit, price_per_unit,
                break_even_units, break_even_sales, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&scenario.id)
        .bind(&scenario.owner_id)
        .bind(&scenario.product_name)
        .bind(&scenario.scenario_name)
        .bind(&scenario.description)
        .bind(&scenario.tag)
        .bind(scenario.fixed_cost)
        .bind(scenario.variable_cost_per_unit)
        .bind(scenario.price_per_unit)
        .bind(scenario.break_even_units)
        .bind(scenario.break_even_sales)
        .bind(scenario.created_at)
        .execute(&self.pool)
        .await?;

        info!(
            id = %scenario.id,
            owner_id = %scenario.owner_id,
            product = %scenario.product_name,
            "Break-even scenario saved"
        );
        Ok(())
    }

    pub async fn get_break_even(
        &self,
        owner_id: &str,
        id: &str,
    ) -> DbResult<Option<BreakEvenScenario>> {
        let sql = format!(
            "SELECT {} FROM break_even_scenarios WHERE owner_id = ?1 AND id = ?2",
            BREAK_EVEN_COLUMNS
        );
        let row = sqlx::query_as::<_, BreakEvenRow>(&sql)
            .bind(owner_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    pub async fn list_break_even(&self, owner_id: &str) -> DbResult<Vec<BreakEvenScenario>> {
        let sql = format!(
            "SELECT {} FROM break_even_scenarios WHERE owner_id = ?1 \
             ORDER BY created_at DESC, rowid DESC",
            BREAK_EVEN_COLUMNS
        );
        let rows = sqlx::query_as::<_, BreakEvenRow>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(owner_id = %owner_id, count = rows.len(), "Listed break-even scenarios");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Deletes one of the owner's break-even scenarios.
    pub async fn delete_break_even(&self, owner_id: &str, id: &str) -> DbResult<bool> {
        let result =
            sqlx::query("DELETE FROM break_even_scenarios WHERE owner_id = ?1 AND id = ?2")
                .bind(owner_id)
                .bind(id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    // -------------------------------------------------------------------------
    // Pricing scenarios
    // -------------------------------------------------------------------------

    pub async fn insert_pricing(&self, record: &PricingScenarioRecord) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO pricing_scenarios (
                id, owner_id, product_name, new_price, variable_cost,
                fixed_cost_per_unit, total_revenue, total_profit,
                profit_per_unit, profit_margin, source_scenario_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&record.id)
        .bind(&record.owner_id)
        .bind(&record.product_name)
        .bind(record.new_price)
        .bind(record.variable_cost)
        .bind(record.fixed_cost_per_unit)
        .bind(record.total_revenue)
        .bind(record.total_profit)
        .bind(record.profit_per_unit)
        .bind(record.profit_margin)
        .bind(&record.source_scenario_id)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        info!(
            id = %record.id,
            owner_id = %record.owner_id,
            source = ?record.source_scenario_id,
            "Pricing scenario saved"
        );
        Ok(())
    }

    pub async fn get_pricing(
        &self,
        owner_id: &str,
        id: &str,
    ) -> DbResult<Option<PricingScenarioRecord>> {
        let sql = format!(
            "SELECT {} FROM pricing_scenarios WHERE owner_id = ?1 AND id = ?2",
            PRICING_COLUMNS
        );
        let row = sqlx::query_as::<_, PricingRow>(&sql)
            .bind(owner_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    pub async fn list_pricing(&self, owner_id: &str) -> DbResult<Vec<PricingScenarioRecord>> {
        let sql = format!(
            "SELECT {} FROM pricing_scenarios WHERE owner_id = ?1 \
             ORDER BY created_at DESC, rowid DESC",
            PRICING_COLUMNS
        );
        let rows = sqlx::query_as::<_, PricingRow>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(owner_id = %owner_id, count = rows.len(), "Listed pricing scenarios");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Saves a copy of one of the owner's pricing records under `new_id`.
    ///
    /// ## Errors
    /// `DbError::NotFound` when `source_id` is not one of the owner's records.
    pub async fn copy_pricing(
        &self,
        owner_id: &str,
        source_id: &str,
        new_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<PricingScenarioRecord> {
        let source = self
            .get_pricing(owner_id, source_id)
            .await?
            .ok_or_else(|| DbError::not_found("pricing scenario", source_id))?;

        let copy = source.copy_of(new_id, now);
        self.insert_pricing(&copy).await?;
        Ok(copy)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use bizlens_core::breakeven::BreakEvenDraft;
    use chrono::{Duration, TimeZone};

    async fn repo() -> ScenarioRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().scenarios()
    }

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn record(id: &str, owner_id: &str, created_at: DateTime<Utc>) -> PricingScenarioRecord {
        PricingScenarioRecord {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            product_name: "Widget".to_string(),
            new_price: 22.0,
            variable_cost: 8.0,
            fixed_cost_per_unit: 4.0,
            total_revenue: 2200.0,
            total_profit: 1000.0,
            profit_per_unit: 10.0,
            profit_margin: 45.45,
            source_scenario_id: None,
            created_at,
        }
    }

    #[tokio::test]
    async fn test_pricing_insert_get_roundtrip() {
        let repo = repo().await;
        let saved = record("p-1", "owner-1", at(0));
        repo.insert_pricing(&saved).await.unwrap();

        let loaded = repo.get_pricing("owner-1", "p-1").await.unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert!(repo.get_pricing("owner-2", "p-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pricing_list_newest_first() {
        let repo = repo().await;
        repo.insert_pricing(&record("old", "owner-1", at(0))).await.unwrap();
        repo.insert_pricing(&record("new", "owner-1", at(5))).await.unwrap();
        repo.insert_pricing(&record("other", "owner-2", at(9))).await.unwrap();

        let ids: Vec<String> = repo
            .list_pricing("owner-1")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let repo = repo().await;
        repo.insert_pricing(&record("p-1", "owner-1", at(0))).await.unwrap();
        let err = repo
            .insert_pricing(&record("p-1", "owner-1", at(1)))
            .await
            .unwrap_err();
        assert!(
            matches!(err, DbError::Duplicate { ref constraint } if constraint == "pricing_scenarios.id")
        );
    }

    #[tokio::test]
    async fn test_copy_pricing() {
        let repo = repo().await;
        repo.insert_pricing(&record("p-1", "owner-1", at(0))).await.unwrap();

        let copy = repo
            .copy_pricing("owner-1", "p-1", "p-2", at(3))
            .await
            .unwrap();
        assert_eq!(copy.source_scenario_id.as_deref(), Some("p-1"));
        assert_eq!(copy.profit_margin, 45.45);

        let listed = repo.list_pricing("owner-1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "p-2");
    }

    #[tokio::test]
    async fn test_copy_of_foreign_scenario_is_not_found() {
        let repo = repo().await;
        repo.insert_pricing(&record("p-1", "owner-1", at(0))).await.unwrap();

        let err = repo
            .copy_pricing("owner-2", "p-1", "p-2", at(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_break_even_lifecycle() {
        let repo = repo().await;
        let scenario = BreakEvenDraft {
            product_name: "Widget".into(),
            fixed_cost: 1200.0,
            variable_cost_per_unit: 8.0,
            price_per_unit: 20.0,
            ..BreakEvenDraft::default()
        }
        .into_scenario("be-1", "owner-1", at(0))
        .unwrap();

        repo.insert_break_even(&scenario).await.unwrap();

        let listed = repo.list_break_even("owner-1").await.unwrap();
        assert_eq!(listed, vec![scenario.clone()]);
        assert_eq!(
            repo.get_break_even("owner-1", "be-1").await.unwrap(),
            Some(scenario)
        );

        assert!(!repo.delete_break_even("owner-2", "be-1").await.unwrap());
        assert!(repo.delete_break_even("owner-1", "be-1").await.unwrap());
        assert!(repo.list_break_even("owner-1").await.unwrap().is_empty());
    }
}

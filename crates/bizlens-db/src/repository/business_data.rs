//! # Business Data Repository
//!
//! Stores the one uploaded [`BusinessDataset`] each owner has.
//!
//! The dataset is kept as a JSON document: it is always read and replaced
//! whole, never queried by field.

use bizlens_core::BusinessDataset;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

/// A dataset as stored for an owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDataset {
    pub owner_id: String,
    pub business_name: Option<String>,
    pub dataset: BusinessDataset,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct BusinessDataRow {
    owner_id: String,
    business_name: Option<String>,
    dataset_json: String,
    uploaded_at: DateTime<Utc>,
}

impl TryFrom<BusinessDataRow> for StoredDataset {
    type Error = DbError;

    fn try_from(row: BusinessDataRow) -> DbResult<Self> {
        let dataset = serde_json::from_str(&row.dataset_json)
            .map_err(|e| DbError::corrupt("business_data", e))?;
        Ok(StoredDataset {
            owner_id: row.owner_id,
            business_name: row.business_name,
            dataset,
            uploaded_at: row.uploaded_at,
        })
    }
}

/// Repository for uploaded datasets.
#[derive(Debug, Clone)]
pub struct BusinessDataRepository {
    pool: SqlitePool,
}

impl BusinessDataRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BusinessDataRepository { pool }
    }

    /// Stores `dataset` for `owner_id`, replacing any previous upload.
    ///
    /// A `None` business name keeps the name from the previous upload.
    pub async fn upsert(
        &self,
        owner_id: &str,
        business_name: Option<&str>,
        dataset: &BusinessDataset,
        uploaded_at: DateTime<Utc>,
    ) -> DbResult<StoredDataset> {
        let json = serde_json::to_string(dataset)
            .map_err(|e| DbError::corrupt("business_data", e))?;

        sqlx::query(
            r#"
            INSERT INTO business_data (owner_id, business_name, dataset_json, product_count, uploaded_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (owner_id) DO UPDATE SET
                business_name = COALESCE(excluded.business_name, business_data.business_name),
                dataset_json  = excluded.dataset_json,
                product_count = excluded.product_count,
                uploaded_at   = excluded.uploaded_at
            "#,
        )
        .bind(owner_id)
        .bind(business_name)
        .bind(&json)
        .bind(dataset.products.len() as i64)
        .bind(uploaded_at)
        .execute(&self.pool)
        .await?;

        info!(
            owner_id = %owner_id,
            products = dataset.products.len(),
            cash_flow_rows = dataset.cash_flow.len(),
            "Business data stored"
        );

        self.get(owner_id)
            .await?
            .ok_or_else(|| DbError::not_found("business_data", owner_id))
    }

    /// Loads the owner's dataset, if one was ever uploaded.
    pub async fn get(&self, owner_id: &str) -> DbResult<Option<StoredDataset>> {
        debug!(owner_id = %owner_id, "Loading business data");

        let row = sqlx::query_as::<_, BusinessDataRow>(
            r#"
            SELECT owner_id, business_name, dataset_json, uploaded_at
            FROM business_data
            WHERE owner_id = ?1
            "#,
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(StoredDataset::try_from).transpose()
    }

    /// Removes the owner's dataset. Returns whether a row was deleted.
    pub async fn delete(&self, owner_id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM business_data WHERE owner_id = ?1")
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use bizlens_core::Product;

    async fn repo() -> BusinessDataRepository {
        Database::new(DbConfig::in_memory())
            .await
            .unwrap()
            .business_data()
    }

    fn dataset(fixed_cost: f64) -> BusinessDataset {
        BusinessDataset {
            fixed_cost,
            products: vec![Product::priced("Widget", 20.0, 8.0)],
            ..BusinessDataset::default()
        }
    }

    #[tokio::test]
    async fn test_get_missing_owner() {
        assert!(repo().await.get("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_then_get() {
        let repo = repo().await;
        let stored = repo
            .upsert("owner-1", Some("Corner Cafe"), &dataset(1200.0), Utc::now())
            .await
            .unwrap();

        assert_eq!(stored.business_name.as_deref(), Some("Corner Cafe"));
        assert_eq!(stored.dataset, dataset(1200.0));
    }

    #[tokio::test]
    async fn test_upload_replaces_previous_dataset() {
        let repo = repo().await;
        repo.upsert("owner-1", Some("Corner Cafe"), &dataset(1200.0), Utc::now())
            .await
            .unwrap();
        let stored = repo
            .upsert("owner-1", None, &dataset(900.0), Utc::now())
            .await
            .unwrap();

        assert_eq!(stored.dataset.fixed_cost, 900.0);
        assert_eq!(stored.business_name.as_deref(), Some("Corner Cafe"));
    }

    #[tokio::test]
    async fn test_owners_are_isolated() {
        let repo = repo().await;
        repo.upsert("owner-1", None, &dataset(1.0), Utc::now())
            .await
            .unwrap();

        assert!(repo.get("owner-2").await.unwrap().is_none());
        assert!(!repo.delete("owner-2").await.unwrap());
        assert!(repo.delete("owner-1").await.unwrap());
        assert!(repo.get("owner-1").await.unwrap().is_none());
    }
}

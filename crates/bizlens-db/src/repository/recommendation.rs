//! # Recommendation Repository
//!
//! Advisor recommendations attached to an owner's scenarios.

use bizlens_core::AdvisorRecommendation;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

#[derive(Debug, sqlx::FromRow)]
struct RecommendationRow {
    id: String,
    advisor_id: String,
    owner_id: String,
    scenario_id: String,
    text: String,
    created_at: DateTime<Utc>,
}

impl From<RecommendationRow> for AdvisorRecommendation {
    fn from(row: RecommendationRow) -> Self {
        AdvisorRecommendation {
            id: row.id,
            advisor_id: row.advisor_id,
            owner_id: row.owner_id,
            scenario_id: row.scenario_id,
            text: row.text,
            created_at: row.created_at,
        }
    }
}

/// Repository for advisor recommendations.
#[derive(Debug, Clone)]
pub struct RecommendationRepository {
    pool: SqlitePool,
}

impl RecommendationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        RecommendationRepository { pool }
    }

    pub async fn insert(&self, rec: &AdvisorRecommendation) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO scenario_recommendations (id, advisor_id, owner_id, scenario_id, text, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&rec.id)
        .bind(&rec.advisor_id)
        .bind(&rec.owner_id)
        .bind(&rec.scenario_id)
        .bind(&rec.text)
        .bind(rec.created_at)
        .execute(&self.pool)
        .await?;

        info!(
            id = %rec.id,
            advisor_id = %rec.advisor_id,
            scenario_id = %rec.scenario_id,
            "Recommendation saved"
        );
        Ok(())
    }

    /// Recommendations on one scenario, oldest first (reading order).
    pub async fn list_by_scenario(&self, scenario_id: &str) -> DbResult<Vec<AdvisorRecommendation>> {
        let rows = sqlx::query_as::<_, RecommendationRow>(
            r#"
            SELECT id, advisor_id, owner_id, scenario_id, text, created_at
            FROM scenario_recommendations
            WHERE scenario_id = ?1
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(scenario_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Every recommendation an owner has received, newest first.
    pub async fn list_by_owner(&self, owner_id: &str) -> DbResult<Vec<AdvisorRecommendation>> {
        let rows = sqlx::query_as::<_, RecommendationRow>(
            r#"
            SELECT id, advisor_id, owner_id, scenario_id, text, created_at
            FROM scenario_recommendations
            WHERE owner_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::{Duration, TimeZone};

    fn rec(id: &str, scenario_id: &str, minutes: i64) -> AdvisorRecommendation {
        AdvisorRecommendation {
            id: id.to_string(),
            advisor_id: "advisor-1".to_string(),
            owner_id: "owner-1".to_string(),
            scenario_id: scenario_id.to_string(),
            text: format!("Advice {}", id),
            created_at: Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
    }

    #[tokio::test]
    async fn test_list_by_scenario_in_reading_order() {
        let repo = Database::new(DbConfig::in_memory())
            .await
            .unwrap()
            .recommendations();

        repo.insert(&rec("r-2", "s-1", 5)).await.unwrap();
        repo.insert(&rec("r-1", "s-1", 0)).await.unwrap();
        repo.insert(&rec("r-3", "s-2", 9)).await.unwrap();

        let on_s1 = repo.list_by_scenario("s-1").await.unwrap();
        let ids: Vec<&str> = on_s1.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r-1", "r-2"]);
        assert_eq!(on_s1[0].text, "Advice r-1");
    }

    #[tokio::test]
    async fn test_list_by_owner_newest_first() {
        let repo = Database::new(DbConfig::in_memory())
            .await
            .unwrap()
            .recommendations();

        repo.insert(&rec("r-1", "s-1", 0)).await.unwrap();
        repo.insert(&rec("r-2", "s-2", 5)).await.unwrap();

        let all = repo.list_by_owner("owner-1").await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "r-2");
        assert!(repo.list_by_owner("owner-9").await.unwrap().is_empty());
    }
}

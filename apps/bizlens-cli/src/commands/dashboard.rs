//! # Dashboard Commands
//!
//! Insights for an owner's uploaded dataset, and their CSV export.
//!
//! Insights are never stored: they are recomputed from the dataset on every
//! call, so they always reflect the latest upload.

use bizlens_core::export::export_csv;
use bizlens_core::{generate_insights, CoreError, Insights, Session};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::state::DbState;

/// Owner dashboard payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub owner_id: String,
    pub business_name: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub insights: Insights,
}

/// Loads the owner's dataset and computes its insights.
///
/// ## Returns
/// `NOT_FOUND` when the owner has never uploaded a workbook.
pub async fn get_dashboard(
    db: &DbState,
    session: &Session,
    owner: Option<&str>,
) -> ApiResult<Dashboard> {
    let owner_id = session.owner_scope(owner)?;
    debug!(owner_id = %owner_id, "get_dashboard command");

    let stored = db
        .inner()
        .business_data()
        .get(&owner_id)
        .await?
        .ok_or_else(|| CoreError::DatasetNotFound(owner_id.clone()))?;

    let insights = generate_insights(&stored.dataset);
    info!(
        owner_id = %owner_id,
        health_score = insights.health_score,
        recommendations = insights.recommendations.len(),
        "Insights generated"
    );

    Ok(Dashboard {
        owner_id: stored.owner_id,
        business_name: stored.business_name,
        uploaded_at: stored.uploaded_at,
        insights,
    })
}

/// Dashboard insights as a `Metric,Value` CSV document.
pub async fn export_insights_csv(
    db: &DbState,
    session: &Session,
    owner: Option<&str>,
) -> ApiResult<String> {
    let dashboard = get_dashboard(db, session, owner).await?;
    Ok(export_csv(&dashboard.insights)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{memory_db, owner, sample_workbook};
    use crate::commands::upload::upload_parsed_workbook;
    use crate::error::ErrorCode;
    use bizlens_core::Role;

    #[tokio::test]
    async fn test_dashboard_without_upload_is_not_found() {
        let db = memory_db().await;
        let err = get_dashboard(&db, &owner(), None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_dashboard_insights_for_sample() {
        let db = memory_db().await;
        upload_parsed_workbook(&db, &owner(), &sample_workbook(), None, Some("Cafe"))
            .await
            .unwrap();

        let dashboard = get_dashboard(&db, &owner(), None).await.unwrap();
        let insights = &dashboard.insights;

        assert_eq!(dashboard.business_name.as_deref(), Some("Cafe"));
        assert_eq!(insights.bep_insights.len(), 3);
        assert_eq!(insights.bep_insights[0].break_even_units, Some(93));
        assert_eq!(insights.bep_insights[1].break_even_units, Some(400));
        assert!(insights.bep_insights[2].issue);

        assert_eq!(insights.cash_insights.danger_months, 1);
        assert_eq!(insights.cash_insights.real_burn_rate, 500.0);
        assert_eq!(insights.health_score, 25);

        assert_eq!(insights.recommendations.len(), 4);
        assert!(insights.recommendations[0].starts_with("Cash reserves may become negative"));
        assert_eq!(
            insights.recommendations[3],
            "Review cost structure of Loss Leader. It cannot break even."
        );
    }

    #[tokio::test]
    async fn test_advisor_reads_owner_dashboard() {
        let db = memory_db().await;
        upload_parsed_workbook(&db, &owner(), &sample_workbook(), None, None)
            .await
            .unwrap();

        let advisor = Session::new("advisor-1", Role::Advisor);
        let dashboard = get_dashboard(&db, &advisor, Some("owner-1")).await.unwrap();
        assert_eq!(dashboard.owner_id, "owner-1");
    }

    #[tokio::test]
    async fn test_export_csv() {
        let db = memory_db().await;
        upload_parsed_workbook(&db, &owner(), &sample_workbook(), None, None)
            .await
            .unwrap();

        let csv = export_insights_csv(&db, &owner(), None).await.unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Metric,Value");
        assert_eq!(lines[1], "Health Score,25");
        assert!(lines.contains(&"BEP - Widget,93 units"));
        assert!(lines.contains(&"BEP - Loss Leader,Not profitable"));
        assert!(lines.contains(&"Margin - Gadget,20.0%"));
    }
}

//! # Recommendation Commands
//!
//! Advisors attach free-text advice to an owner's saved scenarios.

use bizlens_core::validation::validate_recommendation_text;
use bizlens_core::{AdvisorRecommendation, CoreError, Role, Session, ValidationError};
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::commands::scenario::find_scenario;
use crate::error::ApiResult;
use crate::state::DbState;

/// Saves an advisor's recommendation on one of the owner's scenarios.
///
/// ## Rules
/// - Only advisor sessions write recommendations
/// - The scenario must belong to the owner (either scenario table)
/// - Text is trimmed, required, at most 2000 characters
pub async fn add_recommendation(
    db: &DbState,
    session: &Session,
    owner: Option<&str>,
    scenario_id: &str,
    text: &str,
) -> ApiResult<AdvisorRecommendation> {
    if session.role != Role::Advisor {
        return Err(CoreError::from(ValidationError::NotAllowed {
            field: "role".to_string(),
            allowed: vec![Role::Advisor.to_string()],
        })
        .into());
    }

    let owner_id = session.owner_scope(owner)?;
    let text = validate_recommendation_text(text).map_err(CoreError::from)?;
    let scenario = find_scenario(db, &owner_id, scenario_id).await?;

    let rec = AdvisorRecommendation {
        id: Uuid::new_v4().to_string(),
        advisor_id: session.user_id.clone(),
        owner_id,
        scenario_id: scenario.id,
        text,
        created_at: Utc::now(),
    };
    db.inner().recommendations().insert(&rec).await?;
    Ok(rec)
}

/// The owner's recommendations.
///
/// With a scenario id, only the notes on that scenario in reading order
/// (oldest first). Without one, everything the owner received, newest first.
pub async fn list_recommendations(
    db: &DbState,
    session: &Session,
    owner: Option<&str>,
    scenario_id: Option<&str>,
) -> ApiResult<Vec<AdvisorRecommendation>> {
    let owner_id = session.owner_scope(owner)?;
    debug!(owner_id = %owner_id, scenario_id = ?scenario_id, "list_recommendations command");

    let repo = db.inner().recommendations();
    match scenario_id {
        Some(id) => {
            let scenario = find_scenario(db, &owner_id, id).await?;
            Ok(repo.list_by_scenario(&scenario.id).await?)
        }
        None => Ok(repo.list_by_owner(&owner_id).await?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::scenario::{list_scenarios, save_break_even};
    use crate::commands::test_support::{memory_db, owner};
    use crate::error::ErrorCode;
    use bizlens_core::breakeven::BreakEvenDraft;

    fn advisor() -> Session {
        Session::new("advisor-1", Role::Advisor)
    }

    async fn saved_scenario(db: &DbState) -> String {
        let draft = BreakEvenDraft {
            product_name: "Widget".into(),
            fixed_cost: 1200.0,
            variable_cost_per_unit: 8.0,
            price_per_unit: 20.0,
            ..BreakEvenDraft::default()
        };
        save_break_even(db, &owner(), None, draft).await.unwrap().id
    }

    #[tokio::test]
    async fn test_advisor_adds_recommendation() {
        let db = memory_db().await;
        let scenario_id = saved_scenario(&db).await;

        let rec = add_recommendation(
            &db,
            &advisor(),
            Some("owner-1"),
            &scenario_id,
            "  Raise the price to 22.  ",
        )
        .await
        .unwrap();

        assert_eq!(rec.text, "Raise the price to 22.");
        assert_eq!(rec.advisor_id, "advisor-1");
        assert_eq!(rec.owner_id, "owner-1");

        let views = list_scenarios(&db, &owner(), None).await.unwrap();
        assert_eq!(views[0].recommendations.len(), 1);
        assert_eq!(views[0].recommendations[0].id, rec.id);

        let all = list_recommendations(&db, &owner(), None, None).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_list_for_one_scenario() {
        let db = memory_db().await;
        let first = saved_scenario(&db).await;
        let second = saved_scenario(&db).await;

        let notes = [(&first, "Cut costs"), (&second, "Hold"), (&first, "Then raise")];
        for (scenario_id, text) in notes {
            add_recommendation(&db, &advisor(), Some("owner-1"), scenario_id, text)
                .await
                .unwrap();
        }

        let on_first = list_recommendations(&db, &owner(), None, Some(first.as_str()))
            .await
            .unwrap();
        let texts: Vec<&str> = on_first.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["Cut costs", "Then raise"]);

        let err = list_recommendations(&db, &advisor(), Some("owner-2"), Some(first.as_str()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_owner_cannot_recommend() {
        let db = memory_db().await;
        let scenario_id = saved_scenario(&db).await;

        let err = add_recommendation(&db, &owner(), None, &scenario_id, "Self advice")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let db = memory_db().await;
        let scenario_id = saved_scenario(&db).await;

        let err = add_recommendation(&db, &advisor(), Some("owner-1"), &scenario_id, "   ")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_scenario_must_belong_to_owner() {
        let db = memory_db().await;
        let scenario_id = saved_scenario(&db).await;

        let err = add_recommendation(&db, &advisor(), Some("owner-2"), &scenario_id, "Advice")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}

//! # Upload Command
//!
//! Turns an uploaded workbook into the owner's stored `BusinessDataset`.
//!
//! ## Upload Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Workbook Upload Flow                                 │
//! │                                                                         │
//! │  bizlens upload q3.xlsx                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Session::owner_scope ─── advisor without --owner ──► VALIDATION_ERROR │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  check_upload_size ─── over max_upload_bytes ───────► INVALID_WORKBOOK │
//! │       │                                                                 │
//! │       ▼  (spawn_blocking)                                               │
//! │  read_workbook (calamine) → parse_workbook                              │
//! │       │        └── missing sheets/columns ──────────► INVALID_WORKBOOK │
//! │       ▼                                                    + issues[]   │
//! │  business_data().upsert()  ← replaces any previous upload               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UploadSummary                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bizlens_core::ingest::{check_upload_size, parse_workbook};
use bizlens_core::validation::{validate_required_text, MAX_NAME_LENGTH};
use bizlens_core::xlsx::read_workbook;
use bizlens_core::{BusinessDataset, Session, Workbook};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::state::{AppConfig, DbState};

/// What the caller sees after a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub owner_id: String,
    pub business_name: Option<String>,
    pub product_count: usize,
    pub cash_flow_rows: usize,
    pub pricing_scenarios: usize,
    pub uploaded_at: DateTime<Utc>,
}

/// Decodes, validates and stores a spreadsheet file for the session's owner.
///
/// ## Arguments
/// * `bytes` - Raw `.xlsx` / `.xls` / `.ods` contents
/// * `owner` - Owner to upload for (advisors and managers only)
/// * `business_name` - Optional display name; `None` keeps the previous one
pub async fn upload_workbook(
    db: &DbState,
    config: &AppConfig,
    session: &Session,
    bytes: Vec<u8>,
    owner: Option<&str>,
    business_name: Option<&str>,
) -> ApiResult<UploadSummary> {
    let owner_id = session.owner_scope(owner)?;
    check_upload_size(bytes.len(), config.max_upload_bytes)?;

    debug!(owner_id = %owner_id, size = bytes.len(), "upload_workbook command");

    let dataset = tokio::task::spawn_blocking(move || {
        let workbook = read_workbook(&bytes)?;
        parse_workbook(&workbook)
    })
    .await
    .map_err(|e| ApiError::internal(format!("Workbook parsing task failed: {}", e)))??;

    store_dataset(db, &owner_id, business_name, dataset).await
}

/// Validates and stores an already decoded workbook.
pub async fn upload_parsed_workbook(
    db: &DbState,
    session: &Session,
    workbook: &Workbook,
    owner: Option<&str>,
    business_name: Option<&str>,
) -> ApiResult<UploadSummary> {
    let owner_id = session.owner_scope(owner)?;
    let dataset = parse_workbook(workbook)?;
    store_dataset(db, &owner_id, business_name, dataset).await
}

async fn store_dataset(
    db: &DbState,
    owner_id: &str,
    business_name: Option<&str>,
    dataset: BusinessDataset,
) -> ApiResult<UploadSummary> {
    let business_name = business_name
        .map(|name| validate_required_text("business_name", name, MAX_NAME_LENGTH))
        .transpose()
        .map_err(bizlens_core::CoreError::from)?;

    let stored = db
        .inner()
        .business_data()
        .upsert(owner_id, business_name.as_deref(), &dataset, Utc::now())
        .await?;

    info!(
        owner_id = %owner_id,
        products = stored.dataset.products.len(),
        "Workbook uploaded"
    );

    Ok(UploadSummary {
        owner_id: stored.owner_id,
        business_name: stored.business_name,
        product_count: stored.dataset.products.len(),
        cash_flow_rows: stored.dataset.cash_flow.len(),
        pricing_scenarios: stored.dataset.pricing_scenarios.len(),
        uploaded_at: stored.uploaded_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{memory_db, owner, sample_workbook};
    use crate::error::ErrorCode;
    use bizlens_core::{Role, Sheet, CASH_FLOW_SHEET};

    #[tokio::test]
    async fn test_upload_stores_dataset() {
        let db = memory_db().await;
        let summary = upload_parsed_workbook(&db, &owner(), &sample_workbook(), None, Some("Cafe"))
            .await
            .unwrap();

        assert_eq!(summary.owner_id, "owner-1");
        assert_eq!(summary.business_name.as_deref(), Some("Cafe"));
        assert_eq!(summary.product_count, 3);
        assert_eq!(summary.cash_flow_rows, 2);
        assert_eq!(summary.pricing_scenarios, 1);

        let stored = db.inner().business_data().get("owner-1").await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn test_invalid_workbook_reports_issues_and_stores_nothing() {
        let db = memory_db().await;
        let workbook = Workbook::new(vec![Sheet::new(CASH_FLOW_SHEET, vec![])]);

        let err = upload_parsed_workbook(&db, &owner(), &workbook, None, None)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidWorkbook);
        assert_eq!(err.issues.len(), 2);
        assert!(db.inner().business_data().get("owner-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_advisor_uploads_for_named_owner() {
        let db = memory_db().await;
        let advisor = Session::new("advisor-1", Role::Advisor);

        let err = upload_parsed_workbook(&db, &advisor, &sample_workbook(), None, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let summary =
            upload_parsed_workbook(&db, &advisor, &sample_workbook(), Some("owner-7"), None)
                .await
                .unwrap();
        assert_eq!(summary.owner_id, "owner-7");
    }

    #[tokio::test]
    async fn test_blank_business_name_rejected() {
        let db = memory_db().await;
        let err = upload_parsed_workbook(&db, &owner(), &sample_workbook(), None, Some("  "))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_oversized_bytes_rejected_before_parsing() {
        let db = memory_db().await;
        let config = AppConfig {
            max_upload_bytes: 4,
            ..AppConfig::with_db_path(":memory:")
        };

        let err = upload_workbook(&db, &config, &owner(), vec![0u8; 5], None, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidWorkbook);
        assert!(err.message.contains("byte limit"));
    }

    #[tokio::test]
    async fn test_unreadable_bytes() {
        let db = memory_db().await;
        let config = AppConfig::with_db_path(":memory:");

        let err = upload_workbook(&db, &config, &owner(), b"not a spreadsheet".to_vec(), None, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidWorkbook);
        assert!(err.issues.is_empty());
    }
}

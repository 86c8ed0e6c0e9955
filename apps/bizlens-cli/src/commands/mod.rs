//! # Commands Module
//!
//! Every operation the CLI exposes.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs            ◄─── You are here (exports)
//! ├── upload.rs         ◄─── Workbook upload
//! ├── dashboard.rs      ◄─── Insights and CSV export
//! ├── scenario.rs       ◄─── Save, list, copy, assess, compare
//! └── recommendation.rs ◄─── Advisor recommendations
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  bizlens --user owner-1 --role owner insights                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  main.rs builds Session + DbState, dispatches                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  pub async fn get_dashboard(                                           │
//! │      db: &DbState,          ◄── Opened once per run                    │
//! │      session: &Session,     ◄── --user / --role                        │
//! │      owner: Option<&str>,   ◄── --owner (advisors, managers)           │
//! │  ) -> ApiResult<Dashboard>                                             │
//! │         │                                                               │
//! │         │ (JSON serialization)                                          │
//! │         ▼                                                               │
//! │  stdout: pretty JSON        stderr: ApiError JSON                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod dashboard;
pub mod recommendation;
pub mod scenario;
pub mod upload;

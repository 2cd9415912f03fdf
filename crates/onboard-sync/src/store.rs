use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use onboard_core::checklist::Priority;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Row types — the remote store's schema, field for field
// ---------------------------------------------------------------------------

/// Parent row in `onboarding_checklists`. `user_id` carries a uniqueness
/// constraint: at most one checklist per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistRow {
    pub id: Uuid,
    pub user_id: String,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Child row in `checklist_items`, referencing its parent by `checklist_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItemRow {
    pub id: String,
    pub checklist_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Priority,
    pub estimated_time: u32,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Single flat row in `preboarding_checklists`. `user_id` is the upsert
/// conflict target; `id` and `created_at` belong to the first insert and
/// survive later upserts unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreboardingRow {
    pub id: Uuid,
    pub user_id: String,
    pub offer_letter: bool,
    pub background_verification: bool,
    pub identity_proof: bool,
    pub bank_details: bool,
    pub emergency_contacts: bool,
    pub equipment_shipped: bool,
    pub welcome_email: bool,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// RemoteRows
// ---------------------------------------------------------------------------

/// Row-level operations the remote store must provide.
///
/// `replace_checklist` swaps the parent row and its *entire* item set in one
/// transactional operation. Splitting it into a delete followed by an insert
/// is not an acceptable implementation: a crash between the two leaves the
/// user with an empty checklist.
#[async_trait]
pub trait RemoteRows: Send + Sync {
    /// Fetch a user's checklist with its items in insertion order, or
    /// `Ok(None)` when the user has no checklist yet.
    async fn fetch_checklist(
        &self,
        user_id: &str,
    ) -> Result<Option<(ChecklistRow, Vec<ChecklistItemRow>)>>;

    /// Upsert the parent row (keyed by `id`, unique per `user_id`) and
    /// replace its full item set, atomically.
    async fn replace_checklist(
        &self,
        row: ChecklistRow,
        items: Vec<ChecklistItemRow>,
    ) -> Result<()>;

    /// Fetch a user's preboarding row, or `Ok(None)` when absent.
    async fn fetch_preboarding(&self, user_id: &str) -> Result<Option<PreboardingRow>>;

    /// Upsert the preboarding row with conflict target `user_id`. On
    /// conflict the stored `id` and `created_at` win over the incoming
    /// row's values.
    async fn upsert_preboarding(&self, row: PreboardingRow) -> Result<()>;
}

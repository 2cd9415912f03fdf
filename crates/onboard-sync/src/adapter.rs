use crate::error::Result;
use crate::store::{ChecklistItemRow, ChecklistRow, PreboardingRow, RemoteRows};
use async_trait::async_trait;
use chrono::Utc;
use onboard_core::checklist::{ChecklistItem, OnboardingChecklist};
use onboard_core::preboard::PreboardingFlags;
use std::sync::Arc;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ChecklistStore
// ---------------------------------------------------------------------------

/// Aggregate-level persistence seam used by the reconciliation engine.
///
/// `load` returns `Ok(None)` when the user has no stored aggregate; errors
/// mean the store itself failed, and the two cases take different fallback
/// paths during reconciliation.
#[async_trait]
pub trait ChecklistStore<A>: Send + Sync {
    async fn load(&self, user_id: &str) -> Result<Option<A>>;
    async fn save(&self, user_id: &str, aggregate: &A) -> Result<()>;
}

// ---------------------------------------------------------------------------
// OnboardingStore — aggregate <-> parent row + child item rows
// ---------------------------------------------------------------------------

/// Splits the onboarding aggregate into one `onboarding_checklists` row and
/// a full set of `checklist_items` rows, and reassembles it on load. Field
/// mapping is total: absent optional columns come back as empty strings or
/// `None`, never as a decode failure.
pub struct OnboardingStore<R> {
    rows: Arc<R>,
}

impl<R: RemoteRows> OnboardingStore<R> {
    pub fn new(rows: Arc<R>) -> Self {
        Self { rows }
    }
}

fn item_from_row(row: ChecklistItemRow) -> ChecklistItem {
    ChecklistItem {
        id: row.id,
        title: row.title,
        description: row.description.unwrap_or_default(),
        category: row.category.unwrap_or_default(),
        priority: row.priority,
        estimated_time: row.estimated_time,
        completed: row.completed,
        due_date: row.due_date,
    }
}

#[async_trait]
impl<R: RemoteRows> ChecklistStore<OnboardingChecklist> for OnboardingStore<R> {
    async fn load(&self, user_id: &str) -> Result<Option<OnboardingChecklist>> {
        let Some((parent, items)) = self.rows.fetch_checklist(user_id).await? else {
            return Ok(None);
        };
        Ok(Some(OnboardingChecklist {
            id: parent.id,
            items: items.into_iter().map(item_from_row).collect(),
            progress: parent.progress,
            created_at: parent.created_at,
            updated_at: parent.updated_at,
        }))
    }

    async fn save(&self, user_id: &str, aggregate: &OnboardingChecklist) -> Result<()> {
        let now = Utc::now();
        let parent = ChecklistRow {
            id: aggregate.id,
            user_id: user_id.to_string(),
            progress: aggregate.progress,
            created_at: aggregate.created_at,
            updated_at: now,
        };
        let items = aggregate
            .items
            .iter()
            .map(|item| ChecklistItemRow {
                id: item.id.clone(),
                checklist_id: aggregate.id,
                title: item.title.clone(),
                description: (!item.description.is_empty()).then(|| item.description.clone()),
                category: (!item.category.is_empty()).then(|| item.category.clone()),
                priority: item.priority,
                estimated_time: item.estimated_time,
                completed: item.completed,
                due_date: item.due_date,
                created_at: aggregate.created_at,
                updated_at: now,
            })
            .collect();
        self.rows.replace_checklist(parent, items).await
    }
}

// ---------------------------------------------------------------------------
// PreboardingStore — flags <-> one flat row
// ---------------------------------------------------------------------------

/// Flattens the preboarding flag record to a single row upserted on
/// `user_id`. Progress is derived right before the write so the stored
/// value always matches the flags.
pub struct PreboardingStore<R> {
    rows: Arc<R>,
}

impl<R: RemoteRows> PreboardingStore<R> {
    pub fn new(rows: Arc<R>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl<R: RemoteRows> ChecklistStore<PreboardingFlags> for PreboardingStore<R> {
    async fn load(&self, user_id: &str) -> Result<Option<PreboardingFlags>> {
        let Some(row) = self.rows.fetch_preboarding(user_id).await? else {
            return Ok(None);
        };
        Ok(Some(PreboardingFlags {
            offer_letter: row.offer_letter,
            background_verification: row.background_verification,
            identity_proof: row.identity_proof,
            bank_details: row.bank_details,
            emergency_contacts: row.emergency_contacts,
            equipment_shipped: row.equipment_shipped,
            welcome_email: row.welcome_email,
        }))
    }

    async fn save(&self, user_id: &str, flags: &PreboardingFlags) -> Result<()> {
        // id/created_at only matter on the first insert; the upsert keeps
        // the stored values on conflict.
        self.rows
            .upsert_preboarding(PreboardingRow {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                offer_letter: flags.offer_letter,
                background_verification: flags.background_verification,
                identity_proof: flags.identity_proof,
                bank_details: flags.bank_details,
                emergency_contacts: flags.emergency_contacts,
                equipment_shipped: flags.equipment_shipped,
                welcome_email: flags.welcome_email,
                progress: flags.progress(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

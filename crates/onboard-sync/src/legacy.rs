use crate::error::Result;
use chrono::{DateTime, Utc};
use onboard_core::checklist::{ChecklistItem, OnboardingChecklist, Priority};
use serde::Deserialize;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Legacy on-device shapes
// ---------------------------------------------------------------------------

/// Flat checklist blob written by pre-split builds of the portal. The id is
/// an arbitrary string (`checklist_<userId>`), not an aggregate uuid, and a
/// `userId` rides along inside the payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyChecklist {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub items: Vec<LegacyItem>,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub priority: Priority,
    pub estimated_time: u32,
    pub completed: bool,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Migration
// ---------------------------------------------------------------------------

/// One-way migration from the legacy flat shape.
///
/// Every item field maps 1:1; progress and both timestamps carry over
/// unchanged; the aggregate gets a fresh id because legacy data had none.
pub fn migrate(legacy: LegacyChecklist) -> OnboardingChecklist {
    OnboardingChecklist {
        id: Uuid::new_v4(),
        items: legacy
            .items
            .into_iter()
            .map(|item| ChecklistItem {
                id: item.id,
                title: item.title,
                description: item.description,
                category: item.category,
                priority: item.priority,
                estimated_time: item.estimated_time,
                completed: item.completed,
                due_date: item.due_date,
            })
            .collect(),
        progress: legacy.progress,
        created_at: legacy.created_at,
        updated_at: legacy.updated_at,
    }
}

/// Decode a cached checklist blob: current aggregate shape first, then the
/// legacy shape (migrating it). Callers treat the error as "this key is
/// bad" and keep scanning the remaining candidates.
pub fn decode_checklist(raw: &str) -> Result<OnboardingChecklist> {
    if let Ok(current) = serde_json::from_str::<OnboardingChecklist>(raw) {
        return Ok(current);
    }
    let legacy: LegacyChecklist = serde_json::from_str(raw)?;
    Ok(migrate(legacy))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

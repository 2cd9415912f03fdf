use crate::error::{OnboardError, Result};
use crate::progress;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ChecklistItem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One onboarding task. Identity is the stable `id` string, unique within a
/// checklist; the only mutation after creation is flipping `completed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: Priority,
    /// Estimated effort in minutes.
    pub estimated_time: u32,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// OnboardingChecklist
// ---------------------------------------------------------------------------

/// The persisted onboarding aggregate: one per user.
///
/// Invariant: whenever this value is handed to a store adapter, `progress`
/// equals `progress::percentage(completed_count, items.len())`. Mutation
/// helpers below maintain that and bump `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingChecklist {
    pub id: Uuid,
    pub items: Vec<ChecklistItem>,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OnboardingChecklist {
    pub fn new(items: Vec<ChecklistItem>) -> Self {
        let now = Utc::now();
        let mut checklist = Self {
            id: Uuid::new_v4(),
            items,
            progress: 0,
            created_at: now,
            updated_at: now,
        };
        checklist.refresh_progress();
        checklist
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|i| i.completed).count()
    }

    pub fn total_count(&self) -> usize {
        self.items.len()
    }

    /// Recompute `progress` from the current item set.
    pub fn refresh_progress(&mut self) {
        self.progress = progress::percentage(self.completed_count(), self.items.len());
    }

    /// Flip one item's `completed` flag, recompute progress, and bump
    /// `updated_at`. Returns the item's new completion state.
    pub fn toggle_item(&mut self, item_id: &str) -> Result<bool> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| OnboardError::ItemNotFound(item_id.to_string()))?;
        item.completed = !item.completed;
        let completed = item.completed;
        self.refresh_progress();
        self.updated_at = Utc::now();
        Ok(completed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use crate::error::Result;
use crate::store::{ChecklistItemRow, ChecklistRow, PreboardingRow, RemoteRows};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// MemoryRows
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Tables {
    checklists: HashMap<String, (ChecklistRow, Vec<ChecklistItemRow>)>,
    preboarding: HashMap<String, PreboardingRow>,
}

/// In-memory [`RemoteRows`] backend, keyed by `user_id`.
///
/// Used in tests and anywhere a real remote store is unavailable. The
/// replace operation is atomic by construction: the whole (parent, items)
/// pair is swapped under one lock.
#[derive(Default)]
pub struct MemoryRows {
    tables: Mutex<Tables>,
}

impl MemoryRows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored checklists, across all users.
    pub fn checklist_count(&self) -> usize {
        self.tables.lock().expect("rows lock").checklists.len()
    }
}

#[async_trait]
impl RemoteRows for MemoryRows {
    async fn fetch_checklist(
        &self,
        user_id: &str,
    ) -> Result<Option<(ChecklistRow, Vec<ChecklistItemRow>)>> {
        let tables = self.tables.lock().expect("rows lock");
        Ok(tables.checklists.get(user_id).cloned())
    }

    async fn replace_checklist(
        &self,
        row: ChecklistRow,
        items: Vec<ChecklistItemRow>,
    ) -> Result<()> {
        let mut tables = self.tables.lock().expect("rows lock");
        tables.checklists.insert(row.user_id.clone(), (row, items));
        Ok(())
    }

    async fn fetch_preboarding(&self, user_id: &str) -> Result<Option<PreboardingRow>> {
        let tables = self.tables.lock().expect("rows lock");
        Ok(tables.preboarding.get(user_id).cloned())
    }

    async fn upsert_preboarding(&self, mut row: PreboardingRow) -> Result<()> {
        let mut tables = self.tables.lock().expect("rows lock");
        // Conflict on user_id: the first insert owns id and created_at.
        if let Some(existing) = tables.preboarding.get(&row.user_id) {
            row.id = existing.id;
            row.created_at = existing.created_at;
        }
        tables.preboarding.insert(row.user_id.clone(), row);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

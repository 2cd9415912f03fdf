//! End-to-end reconciliation scenarios: source precedence, one-way
//! migration, offline fallbacks, and persist ordering.

use async_trait::async_trait;
use onboard_core::preboard::PreboardFlag;
use onboard_core::User;
use onboard_sync::cache::keys;
use onboard_sync::memory::MemoryRows;
use onboard_sync::store::{ChecklistItemRow, ChecklistRow, PreboardingRow, RemoteRows};
use onboard_sync::{
    LocalCache, MemoryCache, OnboardingProfile, OnboardingStore, PreboardingProfile,
    PreboardingStore, Result, Source, SyncConfig, SyncEngine, SyncError,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Test store: MemoryRows plus failure injection and save counting
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FlakyRows {
    inner: MemoryRows,
    fail_saves: AtomicBool,
    fail_fetches: AtomicBool,
    saves: AtomicUsize,
}

impl FlakyRows {
    fn new() -> Self {
        Self::default()
    }

    fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn outage(&self) -> Result<()> {
        Err(SyncError::Store("injected outage".to_string()))
    }
}

#[async_trait]
impl RemoteRows for FlakyRows {
    async fn fetch_checklist(
        &self,
        user_id: &str,
    ) -> Result<Option<(ChecklistRow, Vec<ChecklistItemRow>)>> {
        if self.fail_fetches.load(Ordering::SeqCst) {
            self.outage()?;
        }
        self.inner.fetch_checklist(user_id).await
    }

    async fn replace_checklist(
        &self,
        row: ChecklistRow,
        items: Vec<ChecklistItemRow>,
    ) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            self.outage()?;
        }
        self.inner.replace_checklist(row, items).await
    }

    async fn fetch_preboarding(&self, user_id: &str) -> Result<Option<PreboardingRow>> {
        if self.fail_fetches.load(Ordering::SeqCst) {
            self.outage()?;
        }
        self.inner.fetch_preboarding(user_id).await
    }

    async fn upsert_preboarding(&self, row: PreboardingRow) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            self.outage()?;
        }
        self.inner.upsert_preboarding(row).await
    }
}

/// A remote store that hangs forever on every call.
struct StalledRows;

async fn stall<T>() -> Result<T> {
    tokio::time::sleep(Duration::from_secs(3600)).await;
    unreachable!("the bounded wait must fire first")
}

#[async_trait]
impl RemoteRows for StalledRows {
    async fn fetch_checklist(
        &self,
        _user_id: &str,
    ) -> Result<Option<(ChecklistRow, Vec<ChecklistItemRow>)>> {
        stall().await
    }

    async fn replace_checklist(
        &self,
        _row: ChecklistRow,
        _items: Vec<ChecklistItemRow>,
    ) -> Result<()> {
        stall().await
    }

    async fn fetch_preboarding(&self, _user_id: &str) -> Result<Option<PreboardingRow>> {
        stall().await
    }

    async fn upsert_preboarding(&self, _row: PreboardingRow) -> Result<()> {
        stall().await
    }
}

// ---------------------------------------------------------------------------
// Fixture helpers
// ---------------------------------------------------------------------------

fn user() -> User {
    User::new("u1", "Alex Dev", "alex.dev@example.com")
}

fn onboarding_engine(
    rows: Arc<FlakyRows>,
    cache: Arc<MemoryCache>,
) -> SyncEngine<OnboardingProfile> {
    SyncEngine::new(
        OnboardingProfile,
        Arc::new(OnboardingStore::new(rows)),
        cache,
        SyncConfig::default(),
    )
}

fn preboarding_engine(
    rows: Arc<FlakyRows>,
    cache: Arc<MemoryCache>,
) -> SyncEngine<PreboardingProfile> {
    SyncEngine::new(
        PreboardingProfile,
        Arc::new(PreboardingStore::new(rows)),
        cache,
        SyncConfig::default(),
    )
}

const LEGACY_BLOB: &str = r#"{
    "id": "checklist_u1",
    "userId": "u1",
    "items": [
        {"id": "u1_task_0", "title": "Attend orientation session",
         "priority": "high", "estimatedTime": 60, "completed": true},
        {"id": "u1_task_1", "title": "Meet the team",
         "priority": "medium", "estimatedTime": 45, "completed": false}
    ],
    "progress": 50,
    "createdAt": "2025-07-01T08:00:00Z",
    "updatedAt": "2025-07-02T09:30:00Z"
}"#;

// ---------------------------------------------------------------------------
// Resolution precedence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remote_wins_over_legacy_cache() {
    let rows = Arc::new(FlakyRows::new());
    let cache = Arc::new(MemoryCache::new());

    // Seed the remote store through a first session.
    let seed = onboarding_engine(Arc::clone(&rows), Arc::new(MemoryCache::new()));
    let seeded = seed.mount(&user()).await;
    assert_eq!(seeded.source, Source::Generated);
    let saves_after_seed = rows.save_count();

    // A legacy blob also exists locally.
    cache.set(&keys::onboarding("u1"), LEGACY_BLOB).unwrap();

    let engine = onboarding_engine(Arc::clone(&rows), Arc::clone(&cache));
    let loaded = engine.mount(&user()).await;

    assert_eq!(loaded.source, Source::Remote);
    assert_eq!(loaded.aggregate.id, seeded.aggregate.id);
    // No migration happened: no extra save, legacy key untouched.
    assert_eq!(rows.save_count(), saves_after_seed);
    assert!(cache.get(&keys::onboarding("u1")).is_some());
}

#[tokio::test]
async fn fresh_generation_when_nothing_exists() {
    let rows = Arc::new(FlakyRows::new());
    let engine = onboarding_engine(Arc::clone(&rows), Arc::new(MemoryCache::new()));

    let loaded = engine.mount(&user()).await;

    assert_eq!(loaded.source, Source::Generated);
    assert!(!loaded.degraded);
    assert_eq!(loaded.aggregate.progress, 0);
    assert_eq!(loaded.aggregate.items.len(), 10);
    // The generated checklist was persisted.
    assert_eq!(rows.save_count(), 1);
    assert_eq!(rows.inner.checklist_count(), 1);
}

// ---------------------------------------------------------------------------
// Migration: one-way and exactly once
// ---------------------------------------------------------------------------

#[tokio::test]
async fn successful_migration_consumes_the_legacy_key() {
    let rows = Arc::new(FlakyRows::new());
    let cache = Arc::new(MemoryCache::new());
    cache.set(&keys::onboarding("u1"), LEGACY_BLOB).unwrap();

    let engine = onboarding_engine(Arc::clone(&rows), Arc::clone(&cache));
    let loaded = engine.mount(&user()).await;

    assert_eq!(loaded.source, Source::Migrated);
    assert!(!loaded.degraded);
    assert_eq!(loaded.aggregate.progress, 50);
    assert!(loaded.aggregate.items[0].completed);
    // Persisted once, legacy key gone.
    assert_eq!(rows.save_count(), 1);
    assert!(cache.get(&keys::onboarding("u1")).is_none());
}

#[tokio::test]
async fn failed_migration_persist_keeps_the_legacy_key() {
    let rows = Arc::new(FlakyRows::new());
    rows.fail_saves.store(true, Ordering::SeqCst);
    let cache = Arc::new(MemoryCache::new());
    let email_key = keys::onboarding_by_email("alex.dev@example.com");
    cache.set(&email_key, LEGACY_BLOB).unwrap();

    let engine = onboarding_engine(Arc::clone(&rows), Arc::clone(&cache));
    let loaded = engine.mount(&user()).await;

    assert_eq!(loaded.source, Source::Migrated);
    assert!(loaded.degraded);
    assert_eq!(loaded.aggregate.progress, 50);
    // Retry-safe: the consumed key survives, and the migrated data is
    // mirrored under the canonical key.
    assert!(cache.get(&email_key).is_some());
    assert!(cache.get(&keys::onboarding("u1")).is_some());
}

#[tokio::test]
async fn unparseable_key_does_not_abort_the_scan() {
    let rows = Arc::new(FlakyRows::new());
    let cache = Arc::new(MemoryCache::new());
    cache.set(&keys::onboarding("u1"), "{corrupt").unwrap();
    cache
        .set(&keys::onboarding_by_email("alex.dev@example.com"), LEGACY_BLOB)
        .unwrap();

    let engine = onboarding_engine(Arc::clone(&rows), Arc::clone(&cache));
    let loaded = engine.mount(&user()).await;

    assert_eq!(loaded.source, Source::Migrated);
    assert_eq!(loaded.aggregate.items.len(), 2);
    // Only the consumed (email) key is removed.
    assert!(cache.get(&keys::onboarding("u1")).is_some());
    assert!(cache
        .get(&keys::onboarding_by_email("alex.dev@example.com"))
        .is_none());
}

// ---------------------------------------------------------------------------
// Offline behavior
// ---------------------------------------------------------------------------

#[tokio::test]
async fn offline_with_empty_cache_generates_and_caches() {
    let rows = Arc::new(FlakyRows::new());
    rows.fail_fetches.store(true, Ordering::SeqCst);
    let cache = Arc::new(MemoryCache::new());

    let engine = onboarding_engine(Arc::clone(&rows), Arc::clone(&cache));
    let loaded = engine.mount(&user()).await;

    assert_eq!(loaded.source, Source::Generated);
    assert!(loaded.degraded);
    assert_eq!(loaded.aggregate.progress, 0);
    assert!(cache.get(&keys::onboarding("u1")).is_some());
    // The store was never asked to save while unreachable.
    assert_eq!(rows.save_count(), 0);
}

#[tokio::test]
async fn offline_prefers_canonical_cache_over_generation() {
    let rows = Arc::new(FlakyRows::new());
    rows.fail_fetches.store(true, Ordering::SeqCst);
    let cache = Arc::new(MemoryCache::new());
    cache.set(&keys::onboarding("u1"), LEGACY_BLOB).unwrap();
    // Email-keyed data must be ignored on the offline path.
    let engine = onboarding_engine(Arc::clone(&rows), Arc::clone(&cache));
    let loaded = engine.mount(&user()).await;

    assert_eq!(loaded.source, Source::Cached);
    assert!(loaded.degraded);
    assert_eq!(loaded.aggregate.progress, 50);
}

#[tokio::test(start_paused = true)]
async fn stalled_remote_load_degrades_to_the_offline_chain() {
    let cache = Arc::new(MemoryCache::new());
    cache.set(&keys::onboarding("u1"), LEGACY_BLOB).unwrap();

    let engine: SyncEngine<OnboardingProfile> = SyncEngine::new(
        OnboardingProfile,
        Arc::new(OnboardingStore::new(Arc::new(StalledRows))),
        cache.clone(),
        SyncConfig::default(),
    );
    let loaded = engine.mount(&user()).await;

    // The timed-out load counts as a remote failure: canonical cache wins,
    // no migration is attempted against the unreachable store.
    assert_eq!(loaded.source, Source::Cached);
    assert!(loaded.degraded);
    assert_eq!(loaded.aggregate.progress, 50);
    assert!(cache.get(&keys::onboarding("u1")).is_some());
}

#[tokio::test(start_paused = true)]
async fn stalled_remote_with_empty_cache_still_reaches_ready() {
    let cache = Arc::new(MemoryCache::new());
    let engine: SyncEngine<OnboardingProfile> = SyncEngine::new(
        OnboardingProfile,
        Arc::new(OnboardingStore::new(Arc::new(StalledRows))),
        cache.clone(),
        SyncConfig::default(),
    );
    let loaded = engine.mount(&user()).await;

    assert_eq!(loaded.source, Source::Generated);
    assert!(loaded.degraded);
    assert!(cache.get(&keys::onboarding("u1")).is_some());
}

#[tokio::test]
async fn later_remote_data_stops_regeneration() {
    let rows = Arc::new(FlakyRows::new());
    let cache = Arc::new(MemoryCache::new());

    // First mount offline: generated, cached locally only.
    rows.fail_fetches.store(true, Ordering::SeqCst);
    let engine = onboarding_engine(Arc::clone(&rows), Arc::clone(&cache));
    engine.mount(&user()).await;

    // The remote row appears (say, written from another device).
    rows.fail_fetches.store(false, Ordering::SeqCst);
    let other = onboarding_engine(Arc::clone(&rows), Arc::new(MemoryCache::new()));
    let remote = other.mount(&user()).await;
    assert_eq!(remote.source, Source::Generated);

    // A later mount adopts the remote aggregate instead of regenerating.
    let engine = onboarding_engine(Arc::clone(&rows), Arc::clone(&cache));
    let loaded = engine.mount(&user()).await;
    assert_eq!(loaded.source, Source::Remote);
    assert_eq!(loaded.aggregate.id, remote.aggregate.id);
}

// ---------------------------------------------------------------------------
// Toggle / persist path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn each_toggle_persists_exactly_once() {
    let rows = Arc::new(FlakyRows::new());
    let engine = onboarding_engine(Arc::clone(&rows), Arc::new(MemoryCache::new()));
    engine.mount(&user()).await;
    let after_mount = rows.save_count();

    let progress = engine
        .mutate(|c| {
            c.toggle_item("u1_task_3").unwrap();
        })
        .await;
    assert_eq!(progress, Some(10));
    assert_eq!(rows.save_count(), after_mount + 1);

    let progress = engine
        .mutate(|c| {
            c.toggle_item("u1_task_3").unwrap();
        })
        .await;
    assert_eq!(progress, Some(0));
    assert_eq!(rows.save_count(), after_mount + 2);

    // The stored aggregate carries the final state.
    let (parent, items) = rows.inner.fetch_checklist("u1").await.unwrap().unwrap();
    assert_eq!(parent.progress, 0);
    assert!(items.iter().all(|i| !i.completed));
}

#[tokio::test]
async fn failed_autosave_keeps_optimistic_state_and_mirrors_cache() {
    let rows = Arc::new(FlakyRows::new());
    let cache = Arc::new(MemoryCache::new());
    let engine = onboarding_engine(Arc::clone(&rows), Arc::clone(&cache));
    engine.mount(&user()).await;

    rows.fail_saves.store(true, Ordering::SeqCst);
    let progress = engine
        .mutate(|c| {
            c.toggle_item("u1_task_0").unwrap();
        })
        .await;

    // No rollback.
    assert_eq!(progress, Some(10));
    let state = engine.state();
    assert_eq!(state.loaded.unwrap().aggregate.progress, 10);

    // Every backup key mirrors the optimistic state.
    for key in [
        keys::onboarding("u1"),
        keys::onboarding_by_email("alex.dev@example.com"),
        keys::CURRENT_USER.to_string(),
    ] {
        let raw = cache.get(&key).expect("backup key written");
        assert!(raw.contains("\"progress\":10"), "stale mirror under {key}");
    }

    // The explicit submit path surfaces the failure.
    assert!(engine.submit().await.is_err());
}

// ---------------------------------------------------------------------------
// Preboarding flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn preboarding_defaults_then_tracks_flags() {
    let rows = Arc::new(FlakyRows::new());
    let engine = preboarding_engine(Arc::clone(&rows), Arc::new(MemoryCache::new()));

    let loaded = engine.mount(&user()).await;
    assert_eq!(loaded.source, Source::Generated);
    assert_eq!(loaded.aggregate.completed_count(), 0);

    for flag in PreboardFlag::ALL {
        engine
            .mutate(|flags| {
                flags.set(flag, true);
            })
            .await;
    }

    let row = rows.inner.fetch_preboarding("u1").await.unwrap().unwrap();
    assert_eq!(row.progress, 100);
    assert!(row.welcome_email);
}

#[tokio::test]
async fn preboarding_subset_progress() {
    let rows = Arc::new(FlakyRows::new());
    let engine = preboarding_engine(Arc::clone(&rows), Arc::new(MemoryCache::new()));
    engine.mount(&user()).await;

    let progress = engine
        .mutate(|flags| {
            flags.set(PreboardFlag::OfferLetter, true);
            flags.set(PreboardFlag::IdentityProof, true);
            flags.set(PreboardFlag::BankDetails, true);
        })
        .await;

    assert_eq!(progress, Some(43));
    let row = rows.inner.fetch_preboarding("u1").await.unwrap().unwrap();
    assert_eq!(row.progress, 43);
}

#[tokio::test]
async fn preboarding_remote_row_wins_on_remount() {
    let rows = Arc::new(FlakyRows::new());
    let engine = preboarding_engine(Arc::clone(&rows), Arc::new(MemoryCache::new()));
    engine.mount(&user()).await;
    engine
        .mutate(|flags| {
            flags.set(PreboardFlag::EquipmentShipped, true);
        })
        .await;

    let fresh = preboarding_engine(Arc::clone(&rows), Arc::new(MemoryCache::new()));
    let loaded = fresh.mount(&user()).await;
    assert_eq!(loaded.source, Source::Remote);
    assert!(loaded.aggregate.equipment_shipped);
}

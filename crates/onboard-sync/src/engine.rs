use crate::adapter::ChecklistStore;
use crate::cache::LocalCache;
use crate::error::{Result, SyncError};
use crate::profile::SyncProfile;
use onboard_core::User;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Config / state types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Bounded wait applied to every remote call; past it the call counts
    /// as failed and the fallback chain takes over.
    pub remote_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            remote_timeout: Duration::from_secs(5),
        }
    }
}

/// Which source won the reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Remote,
    Migrated,
    Cached,
    Generated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Uninitialized,
    Loading,
    Ready,
}

/// A reconciled aggregate plus how it was obtained. `degraded` marks
/// best-effort results adopted after a remote failure.
#[derive(Debug, Clone)]
pub struct Loaded<A> {
    pub aggregate: A,
    pub source: Source,
    pub degraded: bool,
}

#[derive(Debug, Clone)]
pub struct EngineState<A> {
    pub phase: SyncPhase,
    pub user: Option<User>,
    pub loaded: Option<Loaded<A>>,
}

impl<A> EngineState<A> {
    fn uninitialized() -> Self {
        Self {
            phase: SyncPhase::Uninitialized,
            user: None,
            loaded: None,
        }
    }
}

// ---------------------------------------------------------------------------
// SyncEngine
// ---------------------------------------------------------------------------

/// Generic reconciliation controller over one (generator, store, cache)
/// profile. One instance per checklist kind per signed-in session.
///
/// The load sequence is strictly sequential — each fallback is attempted
/// only after the previous source settles — and always terminates in
/// `Ready` with *some* aggregate, even fully offline. Persists are
/// serialized through a FIFO lock so overlapping saves land in the order
/// the mutations happened.
pub struct SyncEngine<P: SyncProfile> {
    profile: P,
    store: Arc<dyn ChecklistStore<P::Aggregate>>,
    cache: Arc<dyn LocalCache>,
    config: SyncConfig,
    persist_lock: Mutex<()>,
    state: watch::Sender<EngineState<P::Aggregate>>,
}

impl<P: SyncProfile> SyncEngine<P> {
    pub fn new(
        profile: P,
        store: Arc<dyn ChecklistStore<P::Aggregate>>,
        cache: Arc<dyn LocalCache>,
        config: SyncConfig,
    ) -> Self {
        let (state, _) = watch::channel(EngineState::uninitialized());
        Self {
            profile,
            store,
            cache,
            config,
            persist_lock: Mutex::new(()),
            state,
        }
    }

    /// Observe state transitions (used by the chat context bridge).
    pub fn subscribe(&self) -> watch::Receiver<EngineState<P::Aggregate>> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> EngineState<P::Aggregate> {
        self.state.borrow().clone()
    }

    // -----------------------------------------------------------------------
    // Mount / resolution
    // -----------------------------------------------------------------------

    /// Reconcile the user's checklist on mount: remote store first, then
    /// the legacy cache scan (migrating what it finds), then fresh
    /// generation. Remote *errors* (as opposed to "no row") short-circuit
    /// to the offline chain: canonical cache key, then generation.
    pub async fn mount(&self, user: &User) -> Loaded<P::Aggregate> {
        self.state.send_modify(|s| {
            s.phase = SyncPhase::Loading;
            s.user = Some(user.clone());
            s.loaded = None;
        });

        let loaded = match self.bounded(self.store.load(&user.id)).await {
            Ok(Some(aggregate)) => {
                debug!(user = %user.id, "adopted remote checklist");
                Loaded {
                    aggregate,
                    source: Source::Remote,
                    degraded: false,
                }
            }
            Ok(None) => self.resolve_local(user).await,
            Err(err) => {
                warn!(user = %user.id, %err, "remote load failed, degrading to local data");
                self.resolve_offline(user).await
            }
        };

        self.state.send_modify(|s| {
            s.phase = SyncPhase::Ready;
            s.loaded = Some(loaded.clone());
        });
        loaded
    }

    /// No remote row: scan the legacy cache keys in order, migrating the
    /// first parseable hit; otherwise generate a default checklist.
    async fn resolve_local(&self, user: &User) -> Loaded<P::Aggregate> {
        for key in self.profile.scan_keys(user) {
            let Some(raw) = self.cache.get(&key) else {
                continue;
            };
            match self.profile.decode(&raw) {
                Ok(aggregate) => {
                    debug!(user = %user.id, key = %key, "migrating cached checklist");
                    return match self.bounded(self.store.save(&user.id, &aggregate)).await {
                        Ok(()) => {
                            // Migration is one-way: drop the consumed key so
                            // it cannot run twice.
                            if let Err(err) = self.cache.remove(&key) {
                                warn!(key = %key, %err, "could not clear consumed legacy key");
                            }
                            Loaded {
                                aggregate,
                                source: Source::Migrated,
                                degraded: false,
                            }
                        }
                        Err(err) => {
                            // Keep the legacy key so the next mount can
                            // retry; mirror under the canonical key.
                            warn!(user = %user.id, %err, "migration persist failed, keeping legacy key");
                            self.write_cache(&[self.profile.canonical_key(user)], &aggregate);
                            Loaded {
                                aggregate,
                                source: Source::Migrated,
                                degraded: true,
                            }
                        }
                    };
                }
                Err(err) => {
                    // One bad key must not abort the scan.
                    warn!(key = %key, %err, "skipping unparseable cache entry");
                }
            }
        }

        let aggregate = self.profile.generate(user);
        debug!(user = %user.id, "no stored checklist anywhere, generated default");
        match self.bounded(self.store.save(&user.id, &aggregate)).await {
            Ok(()) => Loaded {
                aggregate,
                source: Source::Generated,
                degraded: false,
            },
            Err(err) => {
                warn!(user = %user.id, %err, "persist of generated checklist failed, caching locally");
                self.write_cache(&[self.profile.canonical_key(user)], &aggregate);
                Loaded {
                    aggregate,
                    source: Source::Generated,
                    degraded: true,
                }
            }
        }
    }

    /// Remote store is unreachable: canonical cache key only, then
    /// generation. No save attempt — the store already failed.
    async fn resolve_offline(&self, user: &User) -> Loaded<P::Aggregate> {
        let key = self.profile.canonical_key(user);
        if let Some(raw) = self.cache.get(&key) {
            match self.profile.decode(&raw) {
                Ok(aggregate) => {
                    return Loaded {
                        aggregate,
                        source: Source::Cached,
                        degraded: true,
                    };
                }
                Err(err) => warn!(key = %key, %err, "offline cache entry unparseable"),
            }
        }
        let aggregate = self.profile.generate(user);
        self.write_cache(&[key], &aggregate);
        Loaded {
            aggregate,
            source: Source::Generated,
            degraded: true,
        }
    }

    // -----------------------------------------------------------------------
    // Mutation / persistence
    // -----------------------------------------------------------------------

    /// Apply an optimistic mutation: update in-memory state synchronously,
    /// recompute progress, then persist in the background order. A failed
    /// persist is logged and mirrored to the local cache, never rolled
    /// back and never surfaced. Returns the new progress, or `None` when
    /// nothing is mounted yet.
    pub async fn mutate<F>(&self, apply: F) -> Option<u8>
    where
        F: FnOnce(&mut P::Aggregate),
    {
        let mut progress = None;
        self.state.send_modify(|s| {
            if let Some(loaded) = s.loaded.as_mut() {
                apply(&mut loaded.aggregate);
                self.profile.refresh_progress(&mut loaded.aggregate);
                progress = Some(self.profile.progress(&loaded.aggregate));
            }
        });
        progress?;

        if let Err(err) = self.persist_latest().await {
            warn!(%err, "autosave failed, local cache holds the latest state");
        }
        progress
    }

    /// Explicit manual save. Same serialized persist path as `mutate`, but
    /// the failure is returned so the caller can show a notice.
    pub async fn submit(&self) -> Result<()> {
        self.persist_latest().await
    }

    /// Persist the latest mounted aggregate. The FIFO lock serializes
    /// overlapping calls; the aggregate is snapshotted *after* the lock is
    /// acquired, so the last write deterministically carries the newest
    /// state rather than whichever response the network returns last.
    async fn persist_latest(&self) -> Result<()> {
        let _guard = self.persist_lock.lock().await;

        let (user, aggregate) = {
            let state = self.state.borrow();
            let Some(user) = state.user.clone() else {
                return Ok(());
            };
            let Some(loaded) = state.loaded.as_ref() else {
                return Ok(());
            };
            (user, loaded.aggregate.clone())
        };

        let result = self.bounded(self.store.save(&user.id, &aggregate)).await;
        // The cache mirrors the last in-memory state whether or not the
        // remote write landed, so a reload never loses the user's work.
        self.write_cache(&self.profile.backup_keys(&user), &aggregate);
        result
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn bounded<T, Fut>(&self, fut: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.config.remote_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::Timeout(self.config.remote_timeout)),
        }
    }

    fn write_cache(&self, keys: &[String], aggregate: &P::Aggregate) {
        let raw = match self.profile.encode(aggregate) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%err, "could not encode aggregate for local cache");
                return;
            }
        };
        for key in keys {
            if let Err(err) = self.cache.set(key, &raw) {
                warn!(key = %key, %err, "local cache write failed");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

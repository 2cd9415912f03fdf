//! Checklist state synchronization for the onboarding portal.
//!
//! The subsystem reconciles a user's checklist across three tiers — the
//! remote row store, the on-device cache (several historical key shapes),
//! and freshly generated defaults — and keeps all of them as close to the
//! in-memory state as each tier allows.
//!
//! ```text
//! User signs in
//!     │
//!     ▼
//! SyncEngine::mount ── remote row store ──────── adopted as-is
//!     │ (no row)
//!     ├── legacy cache scan ── one-way migration, persisted exactly once
//!     │ (nothing cached)
//!     └── generator defaults ─ persisted, or cached when offline
//! ```
//!
//! Onboarding (structured task items) and preboarding (seven flags) are the
//! two [`profile::SyncProfile`] instances of the same engine.

pub mod adapter;
pub mod auth;
pub mod bridge;
pub mod cache;
pub mod engine;
pub mod error;
pub mod legacy;
pub mod memory;
pub mod profile;
pub mod store;

pub use adapter::{ChecklistStore, OnboardingStore, PreboardingStore};
pub use bridge::{ChatBridge, ChatSnapshot};
pub use cache::{DirCache, LocalCache, MemoryCache};
pub use engine::{EngineState, Loaded, Source, SyncConfig, SyncEngine, SyncPhase};
pub use error::{Result, SyncError};
pub use profile::{OnboardingProfile, PreboardingProfile, SyncProfile};
pub use store::RemoteRows;

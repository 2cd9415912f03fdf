use crate::cache::{keys, LocalCache};
use crate::error::Result;
use crate::legacy;
use onboard_core::checklist::OnboardingChecklist;
use onboard_core::preboard::PreboardingFlags;
use onboard_core::{generator, User};
use tracing::warn;

// ---------------------------------------------------------------------------
// SyncProfile
// ---------------------------------------------------------------------------

/// The pluggable bundle that turns the generic engine into a concrete
/// checklist flow: default generation, cache blob codec, cache key scheme,
/// and progress derivation. Onboarding and preboarding are the two
/// instances; they share every line of reconciliation logic.
pub trait SyncProfile: Send + Sync + 'static {
    type Aggregate: Clone + Send + Sync + 'static;

    /// Default aggregate for a user with no stored data.
    fn generate(&self, user: &User) -> Self::Aggregate;

    fn encode(&self, aggregate: &Self::Aggregate) -> Result<String>;

    /// Decode a cached blob, accepting legacy shapes where they exist.
    fn decode(&self, raw: &str) -> Result<Self::Aggregate>;

    /// The id-derived key used for offline fallback reads and generated
    /// backups.
    fn canonical_key(&self, user: &User) -> String;

    /// Probe order for the legacy cache scan.
    fn scan_keys(&self, user: &User) -> Vec<String>;

    /// Keys mirrored on every persist, success or not.
    fn backup_keys(&self, user: &User) -> Vec<String>;

    fn refresh_progress(&self, aggregate: &mut Self::Aggregate);

    fn progress(&self, aggregate: &Self::Aggregate) -> u8;
}

// ---------------------------------------------------------------------------
// OnboardingProfile
// ---------------------------------------------------------------------------

pub struct OnboardingProfile;

impl SyncProfile for OnboardingProfile {
    type Aggregate = OnboardingChecklist;

    fn generate(&self, user: &User) -> OnboardingChecklist {
        generator::generate(user)
    }

    fn encode(&self, aggregate: &OnboardingChecklist) -> Result<String> {
        Ok(serde_json::to_string(aggregate)?)
    }

    fn decode(&self, raw: &str) -> Result<OnboardingChecklist> {
        legacy::decode_checklist(raw)
    }

    fn canonical_key(&self, user: &User) -> String {
        keys::onboarding(&user.id)
    }

    fn scan_keys(&self, user: &User) -> Vec<String> {
        keys::onboarding_scan_order(user)
    }

    fn backup_keys(&self, user: &User) -> Vec<String> {
        keys::onboarding_scan_order(user)
    }

    fn refresh_progress(&self, aggregate: &mut OnboardingChecklist) {
        aggregate.refresh_progress();
    }

    fn progress(&self, aggregate: &OnboardingChecklist) -> u8 {
        aggregate.progress
    }
}

// ---------------------------------------------------------------------------
// PreboardingProfile
// ---------------------------------------------------------------------------

pub struct PreboardingProfile;

impl SyncProfile for PreboardingProfile {
    type Aggregate = PreboardingFlags;

    fn generate(&self, _user: &User) -> PreboardingFlags {
        PreboardingFlags::default()
    }

    fn encode(&self, flags: &PreboardingFlags) -> Result<String> {
        Ok(serde_json::to_string(flags)?)
    }

    fn decode(&self, raw: &str) -> Result<PreboardingFlags> {
        Ok(serde_json::from_str(raw)?)
    }

    fn canonical_key(&self, user: &User) -> String {
        keys::preboarding(&user.id)
    }

    // Preboarding blobs were only ever keyed by user id; there is no
    // email-keyed legacy data to scan for.
    fn scan_keys(&self, user: &User) -> Vec<String> {
        vec![keys::preboarding(&user.id)]
    }

    fn backup_keys(&self, user: &User) -> Vec<String> {
        vec![keys::preboarding(&user.id)]
    }

    fn refresh_progress(&self, _flags: &mut PreboardingFlags) {
        // Progress is derived on demand; nothing stored to refresh.
    }

    fn progress(&self, flags: &PreboardingFlags) -> u8 {
        flags.progress()
    }
}

// ---------------------------------------------------------------------------
// Guest path (unauthenticated preboarding)
// ---------------------------------------------------------------------------

/// Read the guest preboarding flags, defaulting on a missing or
/// unparseable blob.
pub fn load_guest_flags(cache: &dyn LocalCache) -> PreboardingFlags {
    match cache.get(keys::PREBOARD_GUEST) {
        Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(%err, "discarding unparseable guest preboarding blob");
            PreboardingFlags::default()
        }),
        None => PreboardingFlags::default(),
    }
}

/// Persist guest preboarding flags locally; there is no remote row until
/// the visitor signs up.
pub fn store_guest_flags(cache: &dyn LocalCache, flags: &PreboardingFlags) -> Result<()> {
    cache.set(keys::PREBOARD_GUEST, &serde_json::to_string(flags)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

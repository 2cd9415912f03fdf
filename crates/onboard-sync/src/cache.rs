use crate::error::{Result, SyncError};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Key scheme
// ---------------------------------------------------------------------------

/// Cache keys for on-device checklist blobs (string key -> JSON value).
pub mod keys {
    use onboard_core::User;

    pub const CURRENT_USER: &str = "checklist_current_user";
    pub const PREBOARD_GUEST: &str = "preboard_checklist_guest";
    pub const CURRENT_PROFILE: &str = "current_user";

    pub fn onboarding(user_id: &str) -> String {
        format!("checklist_{user_id}")
    }

    pub fn onboarding_by_email(email: &str) -> String {
        format!("checklist_{email}")
    }

    pub fn preboarding(user_id: &str) -> String {
        format!("preboard_checklist_{user_id}")
    }

    /// Probe order for the legacy scan: id-keyed, then email-keyed (data
    /// written before an id change), then the generic current-user key.
    pub fn onboarding_scan_order(user: &User) -> Vec<String> {
        vec![
            onboarding(&user.id),
            onboarding_by_email(&user.email),
            CURRENT_USER.to_string(),
        ]
    }
}

// ---------------------------------------------------------------------------
// LocalCache
// ---------------------------------------------------------------------------

/// Best-effort key/value blob store on the local device.
///
/// The engine keeps this as a mirror of the last in-memory state regardless
/// of remote success, so reads must tolerate anything a previous build left
/// behind; decoding is the caller's problem, per key.
pub trait LocalCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// MemoryCache
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().expect("cache lock").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .expect("cache lock")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().expect("cache lock").remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DirCache
// ---------------------------------------------------------------------------

/// Disk-backed cache: one `<key>.json` file per key under a cache
/// directory, written atomically via a tempfile in the same directory so a
/// crash never leaves a truncated blob.
pub struct DirCache {
    dir: PathBuf,
}

impl DirCache {
    /// Create a `DirCache` rooted at `dir`. The directory is created lazily
    /// on the first `set`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        // Keys may hold an email address; keep the file name flat.
        self.dir.join(format!("{}.json", key.replace(['/', '\\'], "_")))
    }

    fn write_atomic(path: &Path, value: &str) -> std::io::Result<()> {
        let dir = path.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl LocalCache for DirCache {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::write_atomic(&self.path(key), value)
            .map_err(|err| SyncError::Cache(format!("write {key}: {err}")))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path(key);
        if path.exists() {
            std::fs::remove_file(&path)
                .map_err(|err| SyncError::Cache(format!("remove {key}: {err}")))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn scan_order_is_id_then_email_then_generic() {
        let user = onboard_core::User::new("u9", "A", "a@example.com");
        assert_eq!(
            keys::onboarding_scan_order(&user),
            vec![
                "checklist_u9".to_string(),
                "checklist_a@example.com".to_string(),
                "checklist_current_user".to_string(),
            ]
        );
    }

    #[test]
    fn memory_cache_roundtrip() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("k"), None);
        cache.set("k", "{\"a\":1}").unwrap();
        assert_eq!(cache.get("k").as_deref(), Some("{\"a\":1}"));
        cache.remove("k").unwrap();
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn dir_cache_roundtrip() {
        let dir = TempDir::new().unwrap();
        let cache = DirCache::new(dir.path());
        cache.set("checklist_u1", "[1,2]").unwrap();
        assert_eq!(cache.get("checklist_u1").as_deref(), Some("[1,2]"));
        cache.remove("checklist_u1").unwrap();
        assert_eq!(cache.get("checklist_u1"), None);
    }

    #[test]
    fn dir_cache_remove_missing_is_noop() {
        let dir = TempDir::new().unwrap();
        let cache = DirCache::new(dir.path());
        cache.remove("never_written").unwrap();
    }

    #[test]
    fn dir_cache_handles_email_keys() {
        let dir = TempDir::new().unwrap();
        let cache = DirCache::new(dir.path());
        let key = keys::onboarding_by_email("alex.dev@example.com");
        cache.set(&key, "{}").unwrap();
        assert_eq!(cache.get(&key).as_deref(), Some("{}"));
    }
}

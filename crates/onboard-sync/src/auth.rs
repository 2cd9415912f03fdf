use crate::cache::{keys, LocalCache};
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use onboard_core::User;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::warn;

// ---------------------------------------------------------------------------
// Auth surface (consumed, not owned)
// ---------------------------------------------------------------------------

/// An authenticated session as reported by the auth provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// The slice of the external auth service this portal consumes.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn get_session(&self) -> Result<Option<Session>>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session>;
    async fn sign_out(&self) -> Result<()>;
    async fn update_password(&self, new_password: &str) -> Result<()>;

    /// Auth-state change feed: `Some(session)` on sign-in, `None` on
    /// sign-out.
    fn auth_state(&self) -> watch::Receiver<Option<Session>>;
}

// ---------------------------------------------------------------------------
// User directory
// ---------------------------------------------------------------------------

/// Row in the remote `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub department: String,
    pub level: String,
    pub start_date: DateTime<Utc>,
    pub avatar: Option<String>,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch a user's profile row, `Ok(None)` when no profile exists yet.
    async fn fetch_user(&self, user_id: &str) -> Result<Option<UserRow>>;
}

fn user_from_row(row: UserRow) -> User {
    User {
        id: row.id,
        name: row.name,
        email: row.email,
        role: row.role,
        department: row.department,
        level: row.level,
        start_date: row.start_date,
        avatar: row.avatar,
    }
}

// ---------------------------------------------------------------------------
// ProfileService
// ---------------------------------------------------------------------------

/// Loads the signed-in user's profile with a bounded wait.
///
/// A slow or failing directory never blocks sign-in: past the timeout the
/// session itself is enough to synthesize a usable profile, and the local
/// cache keeps the last good one for fully-offline starts.
pub struct ProfileService {
    directory: Arc<dyn UserDirectory>,
    cache: Arc<dyn LocalCache>,
    timeout: Duration,
}

impl ProfileService {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        cache: Arc<dyn LocalCache>,
        timeout: Duration,
    ) -> Self {
        Self {
            directory,
            cache,
            timeout,
        }
    }

    pub async fn load_profile(&self, session: &Session) -> User {
        let fetch = self.directory.fetch_user(&session.user_id);
        let fetched = match tokio::time::timeout(self.timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::Timeout(self.timeout)),
        };

        let user = match fetched {
            Ok(Some(row)) => user_from_row(row),
            Ok(None) => Self::basic_user(session),
            Err(err) => {
                warn!(user = %session.user_id, %err, "profile fetch failed");
                match self.cached_profile(&session.user_id) {
                    Some(user) => user,
                    None => Self::basic_user(session),
                }
            }
        };

        self.remember(&user);
        user
    }

    /// Minimal profile derived from the session alone, used until the
    /// directory row exists or becomes reachable.
    fn basic_user(session: &Session) -> User {
        let name = session
            .display_name
            .clone()
            .or_else(|| session.email.split('@').next().map(str::to_string))
            .unwrap_or_else(|| "User".to_string());
        User::new(session.user_id.clone(), name, session.email.clone())
    }

    fn cached_profile(&self, user_id: &str) -> Option<User> {
        let raw = self.cache.get(keys::CURRENT_PROFILE)?;
        let user: User = serde_json::from_str(&raw).ok()?;
        (user.id == user_id).then_some(user)
    }

    fn remember(&self, user: &User) {
        match serde_json::to_string(user) {
            Ok(raw) => {
                let _ = self.cache.set(keys::CURRENT_PROFILE, &raw);
            }
            Err(err) => warn!(%err, "could not encode profile for local cache"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Portal user as consumed from the directory service.
///
/// The checklist subsystem treats `id` as the only durable key; `email`
/// survives only as a secondary lookup key for data written by older
/// builds (see the legacy cache scan in `onboard-sync`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub department: String,
    pub level: String,
    pub start_date: DateTime<Utc>,
    pub avatar: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role: "intern".to_string(),
            department: "engineering".to_string(),
            level: "junior".to_string(),
            start_date: Utc::now(),
            avatar: None,
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Local mirror of an identity-provider account. Rows are materialized on a
/// caller's first authoring action; the lockout fields back the share
/// redemption check and are never flipped by this service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserAccount {
    pub id: String,
    pub display_name: Option<String>,
    pub lockout_enabled: bool,
    pub lockout_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            lockout_enabled: true,
            lockout_until: None,
            created_at: now,
        }
    }

    pub fn is_locked_out(&self, now: DateTime<Utc>) -> bool {
        self.lockout_enabled && self.lockout_until.map_or(false, |until| until > now)
    }
}

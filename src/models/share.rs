use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Capability grant for one (owner, test) pair. The token itself is the
/// identity: 128 random bits, hex encoded. At most one grant exists per test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ShareGrant {
    pub token: String,
    pub owner_id: String,
    pub test_id: i64,
    pub enabled: bool,
    pub created: DateTime<Utc>,
}

/// One user's redemption of a grant. Removed together with the grant when
/// the parent test is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ShareRedemption {
    pub id: Uuid,
    pub token: String,
    pub user_id: String,
    pub redeemed_at: DateTime<Utc>,
}

impl ShareRedemption {
    pub fn new(token: impl Into<String>, user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            token: token.into(),
            user_id: user_id.into(),
            redeemed_at: now,
        }
    }
}

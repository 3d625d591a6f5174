use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Test metadata. The question list is derived by querying questions whose
/// `test_id` points here, so there is no collection to keep in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Test {
    #[serde(default)]
    pub id: i64,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub created: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub version: i64,
}

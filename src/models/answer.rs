use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One test-taker's response to one question. Free text for free-form
/// questions, the chosen key for multiple choice. Grading never happens
/// server side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserAnswer {
    pub id: Uuid,
    pub question_id: i64,
    pub user_id: String,
    pub answer: String,
    pub answered_at: DateTime<Utc>,
    #[serde(default)]
    pub version: i64,
}

impl UserAnswer {
    /// Placeholder for a question the user has not answered yet, so one
    /// fetch can populate an entire test form.
    pub fn blank(question_id: i64, user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::nil(),
            question_id,
            user_id: user_id.into(),
            answer: String::new(),
            answered_at: now,
            version: 0,
        }
    }
}

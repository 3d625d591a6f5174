use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAnswerPayload {
    /// Must be absent; the server assigns answer ids.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub question_id: i64,
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateAnswerPayload {
    pub id: Uuid,
    #[serde(default)]
    pub answer: String,
}

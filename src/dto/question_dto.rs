use crate::models::question::QuestionDetails;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuestionPayload {
    #[validate(length(min = 1))]
    pub prompt: String,
    #[serde(default)]
    pub total_points: i32,
    #[serde(flatten)]
    pub details: QuestionDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateQuestionPayload {
    pub question_id: i64,
    #[validate(length(min = 1))]
    pub prompt: String,
    #[serde(default)]
    pub total_points: i32,
    #[serde(flatten)]
    pub details: QuestionDetails,
}

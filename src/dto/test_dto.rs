use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::question::{Question, QuestionDetails};
use crate::models::test::Test;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTestPayload {
    #[validate(length(min = 1))]
    pub title: String,
    pub description: Option<String>,
}

/// One entry of the desired question set submitted with a test update.
/// An id of zero (or one outside the caller's pool) is never attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesiredQuestion {
    #[serde(default)]
    pub id: i64,
    pub prompt: String,
    #[serde(default)]
    pub total_points: i32,
    #[serde(flatten)]
    pub details: QuestionDetails,
}

/// Full desired state of a test. The question list is authoritative: a
/// persisted question missing from it gets unassigned, one present gets
/// assigned to this test and refreshed.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateTestPayload {
    pub test_id: i64,
    #[validate(length(min = 1))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<DesiredQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResponse {
    pub test_id: i64,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub created: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub questions: Vec<Question>,
}

impl From<(Test, Vec<Question>)> for TestResponse {
    fn from((test, questions): (Test, Vec<Question>)) -> Self {
        Self {
            test_id: test.id,
            owner_id: test.owner_id,
            title: test.title,
            description: test.description,
            created: test.created,
            last_updated: test.last_updated,
            questions,
        }
    }
}

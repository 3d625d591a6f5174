use serde::{Deserialize, Serialize};

/// A question owned by its creator and assigned to at most one test.
/// `test_id` is the source of truth for test membership; tests never hold
/// their own question list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub id: i64,
    pub created_by: String,
    pub prompt: String,
    #[serde(default = "default_points")]
    pub total_points: i32,
    #[serde(flatten)]
    pub details: QuestionDetails,
    pub test_id: Option<i64>,
    #[serde(default)]
    pub version: i64,
}

fn default_points() -> i32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionDetails {
    MultipleChoice(MultipleChoiceDetails),
    FreeForm(FreeFormDetails),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultipleChoiceDetails {
    pub answer: char,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub key: char,
    pub description: String,
    #[serde(default)]
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeFormDetails {
    pub answer: Option<String>,
}

impl Question {
    pub fn is_assigned(&self) -> bool {
        self.test_id.is_some()
    }
}

use serde::{Deserialize, Serialize};

use crate::models::question::{Question, QuestionDetails};
use crate::models::test::Test;

/// Test shape exposed to a test taker. Authoring data never crosses this
/// boundary: no owner or creator ids, no reference answers, no answer keys,
/// no per-choice point values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakerTest {
    pub test_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<TakerQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakerQuestion {
    pub id: i64,
    pub prompt: String,
    pub total_points: i32,
    #[serde(flatten)]
    pub details: TakerQuestionDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TakerQuestionDetails {
    MultipleChoice { choices: Vec<TakerChoice> },
    FreeForm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakerChoice {
    pub key: char,
    pub description: String,
}

impl TakerTest {
    pub fn build(test: &Test, questions: &[Question]) -> Self {
        Self {
            test_id: test.id,
            title: test.title.clone(),
            description: test.description.clone(),
            questions: questions.iter().map(TakerQuestion::from).collect(),
        }
    }
}

impl From<&Question> for TakerQuestion {
    fn from(question: &Question) -> Self {
        let details = match &question.details {
            QuestionDetails::MultipleChoice(mc) => TakerQuestionDetails::MultipleChoice {
                choices: mc
                    .choices
                    .iter()
                    .map(|c| TakerChoice {
                        key: c.key,
                        description: c.description.clone(),
                    })
                    .collect(),
            },
            QuestionDetails::FreeForm(_) => TakerQuestionDetails::FreeForm,
        };
        Self {
            id: question.id,
            prompt: question.prompt.clone(),
            total_points: question.total_points,
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{Choice, FreeFormDetails, MultipleChoiceDetails};
    use chrono::Utc;

    fn sample_test() -> Test {
        Test {
            id: 3,
            owner_id: "alice".to_string(),
            title: "Midterm".to_string(),
            description: None,
            created: Utc::now(),
            last_updated: Utc::now(),
            version: 1,
        }
    }

    #[test]
    fn taker_view_strips_authoring_fields() {
        let questions = vec![
            Question {
                id: 1,
                created_by: "alice".to_string(),
                prompt: "2 + 2?".to_string(),
                total_points: 5,
                details: QuestionDetails::MultipleChoice(MultipleChoiceDetails {
                    answer: 'b',
                    choices: vec![
                        Choice {
                            key: 'a',
                            description: "3".to_string(),
                            points: 0,
                        },
                        Choice {
                            key: 'b',
                            description: "4".to_string(),
                            points: 5,
                        },
                    ],
                }),
                test_id: Some(3),
                version: 1,
            },
            Question {
                id: 2,
                created_by: "alice".to_string(),
                prompt: "Explain ownership.".to_string(),
                total_points: 10,
                details: QuestionDetails::FreeForm(FreeFormDetails {
                    answer: Some("moves and borrows".to_string()),
                }),
                test_id: Some(3),
                version: 1,
            },
        ];

        let view = TakerTest::build(&sample_test(), &questions);
        let json = serde_json::to_string(&view).unwrap();

        assert!(!json.contains("answer"));
        assert!(!json.contains("created_by"));
        assert!(!json.contains("owner_id"));
        assert!(!json.contains("\"points\""));
        assert!(json.contains("2 + 2?"));
        assert!(json.contains("Explain ownership."));
    }
}

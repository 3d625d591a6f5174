use std::sync::Arc;

use uuid::Uuid;

use crate::dto::answer_dto::{CreateAnswerPayload, UpdateAnswerPayload};
use crate::error::{Error, Result};
use crate::models::answer::UserAnswer;
use crate::services::share_service::ShareService;
use crate::store::{ExamStore, StoreError};
use crate::utils::time;

/// Answer capture for test takers. Answers are private to the user who
/// wrote them; nothing here grades or scores.
#[derive(Clone)]
pub struct AnswerService {
    store: Arc<dyn ExamStore>,
    shares: ShareService,
}

impl AnswerService {
    pub fn new(store: Arc<dyn ExamStore>) -> Self {
        let shares = ShareService::new(store.clone());
        Self { store, shares }
    }

    pub async fn create(&self, payload: CreateAnswerPayload, caller_id: &str) -> Result<UserAnswer> {
        if payload.id.is_some() || payload.question_id == 0 {
            return Err(Error::BadRequest(
                "Answer ids are assigned by the server".to_string(),
            ));
        }
        let answer = UserAnswer {
            id: Uuid::new_v4(),
            question_id: payload.question_id,
            user_id: caller_id.to_string(),
            answer: payload.answer,
            answered_at: time::now(),
            version: 1,
        };
        self.store.insert_answer(answer.clone()).await?;
        Ok(answer)
    }

    pub async fn get(&self, id: Uuid, caller_id: &str) -> Result<UserAnswer> {
        match self.store.find_answer(id).await? {
            Some(answer) if answer.user_id == caller_id => Ok(answer),
            _ => Err(Error::not_found()),
        }
    }

    pub async fn list(&self, caller_id: &str) -> Result<Vec<UserAnswer>> {
        Ok(self.store.answers_by_user(caller_id).await?)
    }

    /// One entry per question of a readable test: the caller's stored
    /// answer where one exists, a blank placeholder where none does, so a
    /// single call can fill out an entire test form.
    pub async fn answers_for_test(&self, test_id: i64, caller_id: &str) -> Result<Vec<UserAnswer>> {
        let readable = match super::owned_test(self.store.as_ref(), test_id, caller_id).await {
            Ok(test) => Some(test),
            Err(Error::NotFound(_)) => self
                .shares
                .shared_test(test_id, caller_id)
                .await?
                .map(|(test, _)| test),
            Err(err) => return Err(err),
        };
        let Some(test) = readable else {
            return Err(Error::not_found());
        };

        let now = time::now();
        let mut answers = Vec::new();
        for question in self.store.questions_by_test(test.id).await? {
            let answer = self
                .store
                .find_answer_for_question(question.id, caller_id)
                .await?
                .unwrap_or_else(|| UserAnswer::blank(question.id, caller_id, now));
            answers.push(answer);
        }
        Ok(answers)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateAnswerPayload, caller_id: &str) -> Result<()> {
        if id.is_nil() || id != payload.id {
            return Err(Error::BadRequest(
                "Path and payload ids disagree".to_string(),
            ));
        }

        let mut answer = self.get(id, caller_id).await?;
        answer.answer = payload.answer;
        answer.answered_at = time::now();

        match self.store.save_answer(&answer).await {
            Ok(()) => Ok(()),
            Err(StoreError::StaleVersion) => match self.store.find_answer(id).await? {
                Some(current) if current.user_id == caller_id => Err(Error::Conflict(
                    "The answer was modified concurrently".to_string(),
                )),
                _ => Err(Error::not_found()),
            },
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::question_dto::CreateQuestionPayload;
    use crate::dto::test_dto::{CreateTestPayload, DesiredQuestion, UpdateTestPayload};
    use crate::models::question::{FreeFormDetails, QuestionDetails};
    use crate::services::question_service::QuestionService;
    use crate::services::test_service::TestService;
    use crate::store::memory::MemExamStore;

    struct Fixture {
        answers: AnswerService,
        questions: QuestionService,
        tests: TestService,
        shares: ShareService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemExamStore::new());
        Fixture {
            answers: AnswerService::new(store.clone()),
            questions: QuestionService::new(store.clone()),
            tests: TestService::new(store.clone()),
            shares: ShareService::new(store),
        }
    }

    fn free_form(prompt: &str) -> CreateQuestionPayload {
        CreateQuestionPayload {
            prompt: prompt.to_string(),
            total_points: 2,
            details: QuestionDetails::FreeForm(FreeFormDetails { answer: None }),
        }
    }

    async fn shared_test_with_questions(fx: &Fixture) -> (i64, Vec<i64>) {
        let test = fx
            .tests
            .create(
                CreateTestPayload {
                    title: "T1".to_string(),
                    description: None,
                },
                "alice",
            )
            .await
            .unwrap();
        let q1 = fx.questions.create(free_form("q1"), "alice").await.unwrap();
        let q2 = fx.questions.create(free_form("q2"), "alice").await.unwrap();
        fx.tests
            .update(
                test.id,
                UpdateTestPayload {
                    test_id: test.id,
                    title: test.title.clone(),
                    description: None,
                    questions: vec![
                        DesiredQuestion {
                            id: q1.id,
                            prompt: q1.prompt.clone(),
                            total_points: q1.total_points,
                            details: q1.details.clone(),
                        },
                        DesiredQuestion {
                            id: q2.id,
                            prompt: q2.prompt.clone(),
                            total_points: q2.total_points,
                            details: q2.details.clone(),
                        },
                    ],
                },
                "alice",
            )
            .await
            .unwrap();
        let grant = fx.shares.create_share(test.id, "alice").await.unwrap();
        fx.shares
            .redeem("alice", test.id, &grant.token, "carol")
            .await
            .unwrap();
        (test.id, vec![q1.id, q2.id])
    }

    #[tokio::test]
    async fn create_rejects_preset_ids_and_default_question() {
        let fx = fixture();
        let err = fx
            .answers
            .create(
                CreateAnswerPayload {
                    id: Some(Uuid::new_v4()),
                    question_id: 1,
                    answer: "x".to_string(),
                },
                "carol",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));

        let err = fx
            .answers
            .create(
                CreateAnswerPayload {
                    id: None,
                    question_id: 0,
                    answer: "x".to_string(),
                },
                "carol",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn answers_are_private_to_their_author() {
        let fx = fixture();
        let answer = fx
            .answers
            .create(
                CreateAnswerPayload {
                    id: None,
                    question_id: 4,
                    answer: "mine".to_string(),
                },
                "carol",
            )
            .await
            .unwrap();

        assert_eq!(fx.answers.get(answer.id, "carol").await.unwrap().id, answer.id);
        let err = fx.answers.get(answer.id, "dave").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn answers_for_test_fills_blanks_for_unanswered_questions() {
        let fx = fixture();
        let (test_id, question_ids) = shared_test_with_questions(&fx).await;

        fx.answers
            .create(
                CreateAnswerPayload {
                    id: None,
                    question_id: question_ids[0],
                    answer: "done".to_string(),
                },
                "carol",
            )
            .await
            .unwrap();

        let sheet = fx.answers.answers_for_test(test_id, "carol").await.unwrap();
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet[0].answer, "done");
        assert!(!sheet[0].id.is_nil());
        assert!(sheet[1].answer.is_empty());
        assert!(sheet[1].id.is_nil());
    }

    #[tokio::test]
    async fn answers_for_test_requires_a_readable_test() {
        let fx = fixture();
        let (test_id, _) = shared_test_with_questions(&fx).await;

        // dave never redeemed the grant
        let err = fx
            .answers
            .answers_for_test(test_id, "dave")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        // the owner reads it without any redemption
        assert_eq!(
            fx.answers
                .answers_for_test(test_id, "alice")
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn update_overwrites_only_the_callers_answer() {
        let fx = fixture();
        let answer = fx
            .answers
            .create(
                CreateAnswerPayload {
                    id: None,
                    question_id: 4,
                    answer: "first".to_string(),
                },
                "carol",
            )
            .await
            .unwrap();

        let err = fx
            .answers
            .update(
                answer.id,
                UpdateAnswerPayload {
                    id: answer.id,
                    answer: "stolen".to_string(),
                },
                "dave",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        fx.answers
            .update(
                answer.id,
                UpdateAnswerPayload {
                    id: answer.id,
                    answer: "second".to_string(),
                },
                "carol",
            )
            .await
            .unwrap();
        assert_eq!(
            fx.answers.get(answer.id, "carol").await.unwrap().answer,
            "second"
        );
    }
}

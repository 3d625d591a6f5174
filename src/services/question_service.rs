use std::sync::Arc;

use tracing::info;

use crate::dto::question_dto::{CreateQuestionPayload, UpdateQuestionPayload};
use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::models::user::UserAccount;
use crate::store::{ExamStore, StoreError};
use crate::utils::time;

/// Question pool operations. Every read and write is scoped to the caller
/// as creator; the creator id itself is immutable for the life of the row.
#[derive(Clone)]
pub struct QuestionService {
    store: Arc<dyn ExamStore>,
}

impl QuestionService {
    pub fn new(store: Arc<dyn ExamStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        payload: CreateQuestionPayload,
        caller_id: &str,
    ) -> Result<Question> {
        self.store
            .ensure_user(UserAccount::new(caller_id, time::now()))
            .await?;

        let question = Question {
            id: 0,
            created_by: caller_id.to_string(),
            prompt: payload.prompt,
            total_points: payload.total_points,
            details: payload.details,
            test_id: None,
            version: 0,
        };
        let created = self.store.insert_question(question).await?;
        info!(question_id = created.id, "question created");
        Ok(created)
    }

    pub async fn get(&self, id: i64, caller_id: &str) -> Result<Question> {
        super::owned_question(self.store.as_ref(), id, caller_id).await
    }

    pub async fn list(&self, caller_id: &str) -> Result<Vec<Question>> {
        Ok(self.store.questions_by_owner(caller_id).await?)
    }

    pub async fn list_unassigned(&self, caller_id: &str) -> Result<Vec<Question>> {
        let questions = self.store.questions_by_owner(caller_id).await?;
        Ok(questions.into_iter().filter(|q| !q.is_assigned()).collect())
    }

    /// Overwrites the mutable fields of an owned question. The creator id
    /// and the test assignment are not touched here; assignment changes go
    /// through test reconciliation.
    pub async fn update(
        &self,
        id: i64,
        payload: UpdateQuestionPayload,
        caller_id: &str,
    ) -> Result<()> {
        if id != payload.question_id {
            return Err(Error::BadRequest(
                "Path and payload ids disagree".to_string(),
            ));
        }
        if id == 0 {
            return Err(Error::not_found());
        }

        let mut question = super::owned_question(self.store.as_ref(), id, caller_id).await?;
        question.prompt = payload.prompt;
        question.total_points = payload.total_points;
        question.details = payload.details;

        match self.store.save_question(&question).await {
            Ok(()) => Ok(()),
            Err(StoreError::StaleVersion) => match self.store.find_question(id).await? {
                Some(current) if current.created_by == caller_id => Err(Error::Conflict(
                    "The question was modified concurrently".to_string(),
                )),
                _ => Err(Error::not_found()),
            },
            Err(err) => Err(err.into()),
        }
    }

    /// Removes the row outright. Assignment does not protect a question;
    /// its slot in any test simply disappears on the next read.
    pub async fn delete(&self, id: i64, caller_id: &str) -> Result<()> {
        let question = super::owned_question(self.store.as_ref(), id, caller_id).await?;
        self.store.delete_question(question.id).await?;
        info!(question_id = id, "question deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{Choice, MultipleChoiceDetails, QuestionDetails};
    use crate::store::memory::MemExamStore;

    fn service() -> QuestionService {
        QuestionService::new(Arc::new(MemExamStore::new()))
    }

    fn multiple_choice(prompt: &str) -> CreateQuestionPayload {
        CreateQuestionPayload {
            prompt: prompt.to_string(),
            total_points: 4,
            details: QuestionDetails::MultipleChoice(MultipleChoiceDetails {
                answer: 'a',
                choices: vec![Choice {
                    key: 'a',
                    description: "yes".to_string(),
                    points: 4,
                }],
            }),
        }
    }

    #[tokio::test]
    async fn create_assigns_creator_and_id() {
        let svc = service();
        let created = svc.create(multiple_choice("q1"), "alice").await.unwrap();
        assert_eq!(created.created_by, "alice");
        assert!(created.id > 0);
        assert!(created.test_id.is_none());
    }

    #[tokio::test]
    async fn foreign_question_reads_as_not_found() {
        let svc = service();
        let created = svc.create(multiple_choice("q1"), "alice").await.unwrap();

        let err = svc.get(created.id, "bob").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        // and the owner still sees it
        assert_eq!(svc.get(created.id, "alice").await.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn list_is_scoped_to_the_caller() {
        let svc = service();
        svc.create(multiple_choice("q1"), "alice").await.unwrap();
        svc.create(multiple_choice("q2"), "alice").await.unwrap();
        svc.create(multiple_choice("q3"), "bob").await.unwrap();

        assert_eq!(svc.list("alice").await.unwrap().len(), 2);
        assert_eq!(svc.list("bob").await.unwrap().len(), 1);
        assert!(svc.list("carol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_rejects_mismatched_and_default_ids() {
        let svc = service();
        let created = svc.create(multiple_choice("q1"), "alice").await.unwrap();

        let payload = UpdateQuestionPayload {
            question_id: created.id + 1,
            prompt: "changed".to_string(),
            total_points: 1,
            details: created.details.clone(),
        };
        let err = svc.update(created.id, payload, "alice").await.unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));

        let payload = UpdateQuestionPayload {
            question_id: 0,
            prompt: "changed".to_string(),
            total_points: 1,
            details: created.details.clone(),
        };
        let err = svc.update(0, payload, "alice").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn update_never_touches_the_creator() {
        let svc = service();
        let created = svc.create(multiple_choice("q1"), "alice").await.unwrap();

        let payload = UpdateQuestionPayload {
            question_id: created.id,
            prompt: "changed".to_string(),
            total_points: 9,
            details: created.details.clone(),
        };
        svc.update(created.id, payload, "alice").await.unwrap();

        let current = svc.get(created.id, "alice").await.unwrap();
        assert_eq!(current.created_by, "alice");
        assert_eq!(current.prompt, "changed");
        assert_eq!(current.total_points, 9);
    }

    #[tokio::test]
    async fn update_by_non_owner_is_not_found() {
        let svc = service();
        let created = svc.create(multiple_choice("q1"), "alice").await.unwrap();

        let payload = UpdateQuestionPayload {
            question_id: created.id,
            prompt: "hijack".to_string(),
            total_points: 1,
            details: created.details.clone(),
        };
        let err = svc.update(created.id, payload, "bob").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(svc.get(created.id, "alice").await.unwrap().prompt, "q1");
    }

    #[tokio::test]
    async fn delete_by_non_owner_is_not_found() {
        let svc = service();
        let created = svc.create(multiple_choice("q1"), "alice").await.unwrap();

        let err = svc.delete(created.id, "bob").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        svc.delete(created.id, "alice").await.unwrap();
        assert!(svc.list("alice").await.unwrap().is_empty());
    }
}

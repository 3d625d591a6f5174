use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::answer::UserAnswer;
use crate::models::question::Question;
use crate::models::share::{ShareGrant, ShareRedemption};
use crate::models::test::Test;
use crate::models::user::UserAccount;

use super::{ExamStore, StoreError, StoreResult};

#[derive(Default)]
struct MemState {
    users: HashMap<String, UserAccount>,
    questions: HashMap<i64, Question>,
    tests: HashMap<i64, Test>,
    grants: Vec<ShareGrant>,
    redemptions: Vec<ShareRedemption>,
    answers: HashMap<Uuid, UserAnswer>,
    next_question_id: i64,
    next_test_id: i64,
}

/// In-process store with the same versioned-save contract as the Postgres
/// backend. Used by the test suites; a single lock serializes operations.
pub struct MemExamStore {
    state: RwLock<MemState>,
}

impl MemExamStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemState::default()),
        }
    }
}

impl Default for MemExamStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExamStore for MemExamStore {
    async fn ensure_user(&self, user: UserAccount) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.users.entry(user.id.clone()).or_insert(user);
        Ok(())
    }

    async fn find_user(&self, user_id: &str) -> StoreResult<Option<UserAccount>> {
        Ok(self.state.read().await.users.get(user_id).cloned())
    }

    async fn insert_question(&self, mut question: Question) -> StoreResult<Question> {
        let mut state = self.state.write().await;
        state.next_question_id += 1;
        question.id = state.next_question_id;
        question.version = 1;
        state.questions.insert(question.id, question.clone());
        Ok(question)
    }

    async fn find_question(&self, id: i64) -> StoreResult<Option<Question>> {
        Ok(self.state.read().await.questions.get(&id).cloned())
    }

    async fn questions_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Question>> {
        let state = self.state.read().await;
        let mut questions: Vec<Question> = state
            .questions
            .values()
            .filter(|q| q.created_by == owner_id)
            .cloned()
            .collect();
        questions.sort_by_key(|q| q.id);
        Ok(questions)
    }

    async fn questions_by_test(&self, test_id: i64) -> StoreResult<Vec<Question>> {
        let state = self.state.read().await;
        let mut questions: Vec<Question> = state
            .questions
            .values()
            .filter(|q| q.test_id == Some(test_id))
            .cloned()
            .collect();
        questions.sort_by_key(|q| q.id);
        Ok(questions)
    }

    async fn save_question(&self, question: &Question) -> StoreResult<()> {
        let mut state = self.state.write().await;
        match state.questions.get_mut(&question.id) {
            Some(stored) if stored.version == question.version => {
                *stored = question.clone();
                stored.version += 1;
                Ok(())
            }
            _ => Err(StoreError::StaleVersion),
        }
    }

    async fn delete_question(&self, id: i64) -> StoreResult<()> {
        self.state.write().await.questions.remove(&id);
        Ok(())
    }

    async fn insert_test(&self, mut test: Test) -> StoreResult<Test> {
        let mut state = self.state.write().await;
        state.next_test_id += 1;
        test.id = state.next_test_id;
        test.version = 1;
        state.tests.insert(test.id, test.clone());
        Ok(test)
    }

    async fn find_test(&self, id: i64) -> StoreResult<Option<Test>> {
        Ok(self.state.read().await.tests.get(&id).cloned())
    }

    async fn tests_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Test>> {
        let state = self.state.read().await;
        let mut tests: Vec<Test> = state
            .tests
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        tests.sort_by_key(|t| t.id);
        Ok(tests)
    }

    async fn save_test(&self, test: &Test) -> StoreResult<()> {
        let mut state = self.state.write().await;
        match state.tests.get_mut(&test.id) {
            Some(stored) if stored.version == test.version => {
                *stored = test.clone();
                stored.version += 1;
                Ok(())
            }
            _ => Err(StoreError::StaleVersion),
        }
    }

    async fn delete_test(&self, id: i64) -> StoreResult<()> {
        self.state.write().await.tests.remove(&id);
        Ok(())
    }

    async fn insert_grant(&self, grant: ShareGrant) -> StoreResult<()> {
        self.state.write().await.grants.push(grant);
        Ok(())
    }

    async fn find_grant_by_test(&self, test_id: i64) -> StoreResult<Option<ShareGrant>> {
        let state = self.state.read().await;
        Ok(state.grants.iter().find(|g| g.test_id == test_id).cloned())
    }

    async fn find_grant_by_token(&self, token: &str) -> StoreResult<Option<ShareGrant>> {
        let state = self.state.read().await;
        Ok(state.grants.iter().find(|g| g.token == token).cloned())
    }

    async fn delete_grants_for_test(&self, test_id: i64) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let removed: Vec<String> = state
            .grants
            .iter()
            .filter(|g| g.test_id == test_id)
            .map(|g| g.token.clone())
            .collect();
        state.grants.retain(|g| g.test_id != test_id);
        state.redemptions.retain(|r| !removed.contains(&r.token));
        Ok(())
    }

    async fn insert_redemption(&self, redemption: ShareRedemption) -> StoreResult<()> {
        self.state.write().await.redemptions.push(redemption);
        Ok(())
    }

    async fn find_redemption(
        &self,
        token: &str,
        user_id: &str,
    ) -> StoreResult<Option<ShareRedemption>> {
        let state = self.state.read().await;
        Ok(state
            .redemptions
            .iter()
            .find(|r| r.token == token && r.user_id == user_id)
            .cloned())
    }

    async fn redemptions_by_user(&self, user_id: &str) -> StoreResult<Vec<ShareRedemption>> {
        let state = self.state.read().await;
        Ok(state
            .redemptions
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_answer(&self, answer: UserAnswer) -> StoreResult<()> {
        self.state.write().await.answers.insert(answer.id, answer);
        Ok(())
    }

    async fn find_answer(&self, id: Uuid) -> StoreResult<Option<UserAnswer>> {
        Ok(self.state.read().await.answers.get(&id).cloned())
    }

    async fn answers_by_user(&self, user_id: &str) -> StoreResult<Vec<UserAnswer>> {
        let state = self.state.read().await;
        let mut answers: Vec<UserAnswer> = state
            .answers
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        answers.sort_by_key(|a| a.answered_at);
        Ok(answers)
    }

    async fn find_answer_for_question(
        &self,
        question_id: i64,
        user_id: &str,
    ) -> StoreResult<Option<UserAnswer>> {
        let state = self.state.read().await;
        Ok(state
            .answers
            .values()
            .find(|a| a.question_id == question_id && a.user_id == user_id)
            .cloned())
    }

    async fn save_answer(&self, answer: &UserAnswer) -> StoreResult<()> {
        let mut state = self.state.write().await;
        match state.answers.get_mut(&answer.id) {
            Some(stored) if stored.version == answer.version => {
                *stored = answer.clone();
                stored.version += 1;
                Ok(())
            }
            _ => Err(StoreError::StaleVersion),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{FreeFormDetails, QuestionDetails};
    use chrono::Utc;

    fn question(owner: &str) -> Question {
        Question {
            id: 0,
            created_by: owner.to_string(),
            prompt: "prompt".to_string(),
            total_points: 5,
            details: QuestionDetails::FreeForm(FreeFormDetails { answer: None }),
            test_id: None,
            version: 0,
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids_and_version_one() {
        let store = MemExamStore::new();
        let first = store.insert_question(question("u1")).await.unwrap();
        let second = store.insert_question(question("u1")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.version, 1);
    }

    #[tokio::test]
    async fn save_rejects_stale_version() {
        let store = MemExamStore::new();
        let stored = store.insert_question(question("u1")).await.unwrap();

        let mut fresh = stored.clone();
        fresh.prompt = "updated".to_string();
        store.save_question(&fresh).await.unwrap();

        // second write with the original snapshot must fail
        let mut stale = stored;
        stale.prompt = "clobber".to_string();
        let err = store.save_question(&stale).await.unwrap_err();
        assert!(matches!(err, StoreError::StaleVersion));

        let current = store.find_question(fresh.id).await.unwrap().unwrap();
        assert_eq!(current.prompt, "updated");
        assert_eq!(current.version, 2);
    }

    #[tokio::test]
    async fn save_of_removed_row_is_stale() {
        let store = MemExamStore::new();
        let stored = store.insert_question(question("u1")).await.unwrap();
        store.delete_question(stored.id).await.unwrap();
        let err = store.save_question(&stored).await.unwrap_err();
        assert!(matches!(err, StoreError::StaleVersion));
    }

    #[tokio::test]
    async fn grant_cascade_removes_redemptions() {
        let store = MemExamStore::new();
        let now = Utc::now();
        store
            .insert_grant(ShareGrant {
                token: "aaaa".to_string(),
                owner_id: "u1".to_string(),
                test_id: 7,
                enabled: true,
                created: now,
            })
            .await
            .unwrap();
        store
            .insert_redemption(ShareRedemption::new("aaaa", "u2", now))
            .await
            .unwrap();

        store.delete_grants_for_test(7).await.unwrap();

        assert!(store.find_grant_by_test(7).await.unwrap().is_none());
        assert!(store.find_redemption("aaaa", "u2").await.unwrap().is_none());
    }
}

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use crate::dto::test_dto::{CreateTestPayload, UpdateTestPayload};
use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::models::test::Test;
use crate::models::user::UserAccount;
use crate::services::share_service::ShareService;
use crate::store::{ExamStore, StoreError};
use crate::utils::time;

/// Test aggregate operations. `update` is the reconciliation engine: it
/// moves the persisted question set to the caller-submitted desired set by
/// detaching, attaching, and refreshing live question rows.
#[derive(Clone)]
pub struct TestService {
    store: Arc<dyn ExamStore>,
    shares: ShareService,
}

impl TestService {
    pub fn new(store: Arc<dyn ExamStore>) -> Self {
        let shares = ShareService::new(store.clone());
        Self { store, shares }
    }

    pub async fn create(&self, payload: CreateTestPayload, caller_id: &str) -> Result<Test> {
        self.store
            .ensure_user(UserAccount::new(caller_id, time::now()))
            .await?;

        let now = time::now();
        let test = Test {
            id: 0,
            owner_id: caller_id.to_string(),
            title: payload.title,
            description: payload.description,
            created: now,
            last_updated: now,
            version: 0,
        };
        let created = self.store.insert_test(test).await?;
        info!(test_id = created.id, "test created");
        Ok(created)
    }

    pub async fn get(&self, id: i64, caller_id: &str) -> Result<(Test, Vec<Question>)> {
        let test = super::owned_test(self.store.as_ref(), id, caller_id).await?;
        let questions = self.store.questions_by_test(test.id).await?;
        Ok((test, questions))
    }

    pub async fn list(&self, caller_id: &str) -> Result<Vec<(Test, Vec<Question>)>> {
        let tests = self.store.tests_by_owner(caller_id).await?;
        let mut result = Vec::with_capacity(tests.len());
        for test in tests {
            let questions = self.store.questions_by_test(test.id).await?;
            result.push((test, questions));
        }
        Ok(result)
    }

    /// Reconciles the persisted test against the submitted desired state.
    ///
    /// Scalar fields are copied over and `last_updated` stamped. Questions
    /// linked to this test but missing from the desired list are detached;
    /// desired questions are refreshed and claimed for this test. Both
    /// passes resolve the live store row first so a concurrent edit to a
    /// question's other fields is not clobbered, and entries outside the
    /// caller's pool never attach. Questions in neither set stay untouched.
    pub async fn update(&self, id: i64, payload: UpdateTestPayload, caller_id: &str) -> Result<()> {
        if id != payload.test_id {
            return Err(Error::BadRequest(
                "Path and payload ids disagree".to_string(),
            ));
        }

        let mut test = super::owned_test(self.store.as_ref(), id, caller_id).await?;
        test.title = payload.title;
        test.description = payload.description;
        test.last_updated = time::now();

        let desired_ids: HashSet<i64> = payload
            .questions
            .iter()
            .map(|q| q.id)
            .filter(|&qid| qid != 0)
            .collect();

        for linked in self.store.questions_by_test(id).await? {
            if desired_ids.contains(&linked.id) {
                continue;
            }
            let Some(mut live) = self.store.find_question(linked.id).await? else {
                continue;
            };
            live.test_id = None;
            self.save_question_checked(&live, id, caller_id).await?;
        }

        for desired in payload.questions {
            if desired.id == 0 {
                continue;
            }
            let Some(mut live) = self.store.find_question(desired.id).await? else {
                continue;
            };
            if live.created_by != caller_id {
                continue;
            }
            live.prompt = desired.prompt;
            live.total_points = desired.total_points;
            live.details = desired.details;
            live.test_id = Some(id);
            self.save_question_checked(&live, id, caller_id).await?;
        }

        match self.store.save_test(&test).await {
            Ok(()) => {
                info!(test_id = id, "test reconciled");
                Ok(())
            }
            Err(StoreError::StaleVersion) => Err(self.stale_outcome(id, caller_id).await),
            Err(err) => Err(err.into()),
        }
    }

    /// Removes the test. Assigned questions survive with their link
    /// cleared, and the share ledger drops the grant and its redemptions as
    /// part of the same logical delete.
    pub async fn delete(&self, id: i64, caller_id: &str) -> Result<()> {
        let test = super::owned_test(self.store.as_ref(), id, caller_id).await?;

        for mut question in self.store.questions_by_test(test.id).await? {
            question.test_id = None;
            match self.store.save_question(&question).await {
                Ok(()) => {}
                Err(StoreError::StaleVersion) => {
                    // the row moved underneath us; detach the fresh copy
                    if let Some(mut fresh) = self.store.find_question(question.id).await? {
                        fresh.test_id = None;
                        self.store.save_question(&fresh).await?;
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }

        self.shares.revoke_for_test(test.id).await?;
        self.store.delete_test(test.id).await?;
        info!(test_id = id, "test deleted");
        Ok(())
    }

    async fn save_question_checked(
        &self,
        question: &Question,
        test_id: i64,
        caller_id: &str,
    ) -> Result<()> {
        match self.store.save_question(question).await {
            Ok(()) => Ok(()),
            Err(StoreError::StaleVersion) => Err(self.stale_outcome(test_id, caller_id).await),
            Err(err) => Err(err.into()),
        }
    }

    /// A detected commit conflict only becomes Conflict when the test still
    /// exists under this owner; otherwise the caller sees the usual
    /// NotFound.
    async fn stale_outcome(&self, test_id: i64, caller_id: &str) -> Error {
        match self.store.find_test(test_id).await {
            Ok(Some(current)) if current.owner_id == caller_id => {
                Error::Conflict("The test was modified concurrently".to_string())
            }
            Ok(_) => Error::not_found(),
            Err(err) => err.into(),
        }
    }
}

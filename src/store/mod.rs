use async_trait::async_trait;
use uuid::Uuid;

use crate::models::answer::UserAnswer;
use crate::models::question::Question;
use crate::models::share::{ShareGrant, ShareRedemption};
use crate::models::test::Test;
use crate::models::user::UserAccount;

pub mod memory;
pub mod postgres;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The row was modified or removed since it was read. Callers decide
    /// whether this becomes NotFound or a retryable conflict.
    #[error("stale version")]
    StaleVersion,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Persistence seam for every aggregate in the system. All reads are plain
/// fetches; ownership scoping happens in the services so that a mismatch is
/// indistinguishable from absence. `save_*` operations are versioned
/// compare-and-bump writes that report `StoreError::StaleVersion` when the
/// persisted row moved underneath the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExamStore: Send + Sync {
    // accounts
    async fn ensure_user(&self, user: UserAccount) -> StoreResult<()>;
    async fn find_user(&self, user_id: &str) -> StoreResult<Option<UserAccount>>;

    // questions
    async fn insert_question(&self, question: Question) -> StoreResult<Question>;
    async fn find_question(&self, id: i64) -> StoreResult<Option<Question>>;
    async fn questions_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Question>>;
    async fn questions_by_test(&self, test_id: i64) -> StoreResult<Vec<Question>>;
    async fn save_question(&self, question: &Question) -> StoreResult<()>;
    async fn delete_question(&self, id: i64) -> StoreResult<()>;

    // tests
    async fn insert_test(&self, test: Test) -> StoreResult<Test>;
    async fn find_test(&self, id: i64) -> StoreResult<Option<Test>>;
    async fn tests_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Test>>;
    async fn save_test(&self, test: &Test) -> StoreResult<()>;
    async fn delete_test(&self, id: i64) -> StoreResult<()>;

    // share grants
    async fn insert_grant(&self, grant: ShareGrant) -> StoreResult<()>;
    async fn find_grant_by_test(&self, test_id: i64) -> StoreResult<Option<ShareGrant>>;
    async fn find_grant_by_token(&self, token: &str) -> StoreResult<Option<ShareGrant>>;
    async fn delete_grants_for_test(&self, test_id: i64) -> StoreResult<()>;

    // share redemptions
    async fn insert_redemption(&self, redemption: ShareRedemption) -> StoreResult<()>;
    async fn find_redemption(&self, token: &str, user_id: &str)
        -> StoreResult<Option<ShareRedemption>>;
    async fn redemptions_by_user(&self, user_id: &str) -> StoreResult<Vec<ShareRedemption>>;

    // user answers
    async fn insert_answer(&self, answer: UserAnswer) -> StoreResult<()>;
    async fn find_answer(&self, id: Uuid) -> StoreResult<Option<UserAnswer>>;
    async fn answers_by_user(&self, user_id: &str) -> StoreResult<Vec<UserAnswer>>;
    async fn find_answer_for_question(&self, question_id: i64, user_id: &str)
        -> StoreResult<Option<UserAnswer>>;
    async fn save_answer(&self, answer: &UserAnswer) -> StoreResult<()>;
}

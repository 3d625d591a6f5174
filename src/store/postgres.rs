use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::answer::UserAnswer;
use crate::models::question::Question;
use crate::models::share::{ShareGrant, ShareRedemption};
use crate::models::test::Test;
use crate::models::user::UserAccount;

use super::{ExamStore, StoreError, StoreResult};

/// Postgres-backed store. Queries are runtime-bound so the schema stays an
/// implementation detail of the `migrations/` directory; question payloads
/// live in a JSONB column keyed by the serde `kind` discriminator.
#[derive(Clone)]
pub struct PgExamStore {
    pool: PgPool,
}

impl PgExamStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn question_from_row(row: &PgRow) -> StoreResult<Question> {
        let details: serde_json::Value = row.try_get("details")?;
        Ok(Question {
            id: row.try_get("id")?,
            created_by: row.try_get("created_by")?,
            prompt: row.try_get("prompt")?,
            total_points: row.try_get("total_points")?,
            details: serde_json::from_value(details)?,
            test_id: row.try_get("test_id")?,
            version: row.try_get("version")?,
        })
    }
}

const QUESTION_COLUMNS: &str = "id, created_by, prompt, total_points, details, test_id, version";
const TEST_COLUMNS: &str = "id, owner_id, title, description, created, last_updated, version";

#[async_trait]
impl ExamStore for PgExamStore {
    async fn ensure_user(&self, user: UserAccount) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, display_name, lockout_enabled, lockout_until, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&user.id)
        .bind(&user.display_name)
        .bind(user.lockout_enabled)
        .bind(user.lockout_until)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_user(&self, user_id: &str) -> StoreResult<Option<UserAccount>> {
        let user = sqlx::query_as::<_, UserAccount>(
            "SELECT id, display_name, lockout_enabled, lockout_until, created_at \
             FROM accounts WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_question(&self, question: Question) -> StoreResult<Question> {
        let details = serde_json::to_value(&question.details)?;
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO test_questions (created_by, prompt, total_points, details, test_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&question.created_by)
        .bind(&question.prompt)
        .bind(question.total_points)
        .bind(details)
        .bind(question.test_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Question {
            id,
            version: 1,
            ..question
        })
    }

    async fn find_question(&self, id: i64) -> StoreResult<Option<Question>> {
        let row = sqlx::query(&format!(
            "SELECT {QUESTION_COLUMNS} FROM test_questions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(Self::question_from_row).transpose()
    }

    async fn questions_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Question>> {
        let rows = sqlx::query(&format!(
            "SELECT {QUESTION_COLUMNS} FROM test_questions WHERE created_by = $1 ORDER BY id"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::question_from_row).collect()
    }

    async fn questions_by_test(&self, test_id: i64) -> StoreResult<Vec<Question>> {
        let rows = sqlx::query(&format!(
            "SELECT {QUESTION_COLUMNS} FROM test_questions WHERE test_id = $1 ORDER BY id"
        ))
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::question_from_row).collect()
    }

    async fn save_question(&self, question: &Question) -> StoreResult<()> {
        let details = serde_json::to_value(&question.details)?;
        let result = sqlx::query(
            r#"
            UPDATE test_questions
            SET prompt = $1, total_points = $2, details = $3, test_id = $4,
                version = version + 1
            WHERE id = $5 AND version = $6
            "#,
        )
        .bind(&question.prompt)
        .bind(question.total_points)
        .bind(details)
        .bind(question.test_id)
        .bind(question.id)
        .bind(question.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::StaleVersion);
        }
        Ok(())
    }

    async fn delete_question(&self, id: i64) -> StoreResult<()> {
        sqlx::query("DELETE FROM test_questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_test(&self, test: Test) -> StoreResult<Test> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO tests (owner_id, title, description, created, last_updated)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&test.owner_id)
        .bind(&test.title)
        .bind(&test.description)
        .bind(test.created)
        .bind(test.last_updated)
        .fetch_one(&self.pool)
        .await?;

        Ok(Test {
            id,
            version: 1,
            ..test
        })
    }

    async fn find_test(&self, id: i64) -> StoreResult<Option<Test>> {
        let test = sqlx::query_as::<_, Test>(&format!(
            "SELECT {TEST_COLUMNS} FROM tests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(test)
    }

    async fn tests_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Test>> {
        let tests = sqlx::query_as::<_, Test>(&format!(
            "SELECT {TEST_COLUMNS} FROM tests WHERE owner_id = $1 ORDER BY id"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tests)
    }

    async fn save_test(&self, test: &Test) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE tests
            SET title = $1, description = $2, last_updated = $3, version = version + 1
            WHERE id = $4 AND version = $5
            "#,
        )
        .bind(&test.title)
        .bind(&test.description)
        .bind(test.last_updated)
        .bind(test.id)
        .bind(test.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::StaleVersion);
        }
        Ok(())
    }

    async fn delete_test(&self, id: i64) -> StoreResult<()> {
        sqlx::query("DELETE FROM tests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_grant(&self, grant: ShareGrant) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO share_grants (token, owner_id, test_id, enabled, created)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&grant.token)
        .bind(&grant.owner_id)
        .bind(grant.test_id)
        .bind(grant.enabled)
        .bind(grant.created)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_grant_by_test(&self, test_id: i64) -> StoreResult<Option<ShareGrant>> {
        let grant = sqlx::query_as::<_, ShareGrant>(
            "SELECT token, owner_id, test_id, enabled, created FROM share_grants \
             WHERE test_id = $1",
        )
        .bind(test_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(grant)
    }

    async fn find_grant_by_token(&self, token: &str) -> StoreResult<Option<ShareGrant>> {
        let grant = sqlx::query_as::<_, ShareGrant>(
            "SELECT token, owner_id, test_id, enabled, created FROM share_grants \
             WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(grant)
    }

    async fn delete_grants_for_test(&self, test_id: i64) -> StoreResult<()> {
        sqlx::query(
            "DELETE FROM share_redemptions WHERE token IN \
             (SELECT token FROM share_grants WHERE test_id = $1)",
        )
        .bind(test_id)
        .execute(&self.pool)
        .await?;
        sqlx::query("DELETE FROM share_grants WHERE test_id = $1")
            .bind(test_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_redemption(&self, redemption: ShareRedemption) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO share_redemptions (id, token, user_id, redeemed_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(redemption.id)
        .bind(&redemption.token)
        .bind(&redemption.user_id)
        .bind(redemption.redeemed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_redemption(
        &self,
        token: &str,
        user_id: &str,
    ) -> StoreResult<Option<ShareRedemption>> {
        let redemption = sqlx::query_as::<_, ShareRedemption>(
            "SELECT id, token, user_id, redeemed_at FROM share_redemptions \
             WHERE token = $1 AND user_id = $2",
        )
        .bind(token)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(redemption)
    }

    async fn redemptions_by_user(&self, user_id: &str) -> StoreResult<Vec<ShareRedemption>> {
        let redemptions = sqlx::query_as::<_, ShareRedemption>(
            "SELECT id, token, user_id, redeemed_at FROM share_redemptions \
             WHERE user_id = $1 ORDER BY redeemed_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(redemptions)
    }

    async fn insert_answer(&self, answer: UserAnswer) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_answers (id, question_id, user_id, answer, answered_at, version)
            VALUES ($1, $2, $3, $4, $5, 1)
            "#,
        )
        .bind(answer.id)
        .bind(answer.question_id)
        .bind(&answer.user_id)
        .bind(&answer.answer)
        .bind(answer.answered_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_answer(&self, id: Uuid) -> StoreResult<Option<UserAnswer>> {
        let answer = sqlx::query_as::<_, UserAnswer>(
            "SELECT id, question_id, user_id, answer, answered_at, version \
             FROM user_answers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(answer)
    }

    async fn answers_by_user(&self, user_id: &str) -> StoreResult<Vec<UserAnswer>> {
        let answers = sqlx::query_as::<_, UserAnswer>(
            "SELECT id, question_id, user_id, answer, answered_at, version \
             FROM user_answers WHERE user_id = $1 ORDER BY answered_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(answers)
    }

    async fn find_answer_for_question(
        &self,
        question_id: i64,
        user_id: &str,
    ) -> StoreResult<Option<UserAnswer>> {
        let answer = sqlx::query_as::<_, UserAnswer>(
            "SELECT id, question_id, user_id, answer, answered_at, version \
             FROM user_answers WHERE question_id = $1 AND user_id = $2",
        )
        .bind(question_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(answer)
    }

    async fn save_answer(&self, answer: &UserAnswer) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE user_answers
            SET answer = $1, answered_at = $2, version = version + 1
            WHERE id = $3 AND version = $4
            "#,
        )
        .bind(&answer.answer)
        .bind(answer.answered_at)
        .bind(answer.id)
        .bind(answer.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::StaleVersion);
        }
        Ok(())
    }
}

pub mod answer_service;
pub mod question_service;
pub mod share_service;
pub mod test_service;

use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::models::test::Test;
use crate::store::ExamStore;

/// Owner-scoped test fetch. A missing row and somebody else's row produce
/// the same NotFound so callers cannot probe for existence.
pub(crate) async fn owned_test(
    store: &dyn ExamStore,
    test_id: i64,
    caller_id: &str,
) -> Result<Test> {
    match store.find_test(test_id).await? {
        Some(test) if test.owner_id == caller_id => Ok(test),
        _ => Err(Error::not_found()),
    }
}

/// Owner-scoped question fetch with the same blindness as [`owned_test`].
pub(crate) async fn owned_question(
    store: &dyn ExamStore,
    question_id: i64,
    caller_id: &str,
) -> Result<Question> {
    match store.find_question(question_id).await? {
        Some(question) if question.created_by == caller_id => Ok(question),
        _ => Err(Error::not_found()),
    }
}

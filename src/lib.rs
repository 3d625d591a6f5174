pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::services::{
    answer_service::AnswerService, question_service::QuestionService,
    share_service::ShareService, test_service::TestService,
};
use crate::store::ExamStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ExamStore>,
    pub question_service: QuestionService,
    pub test_service: TestService,
    pub share_service: ShareService,
    pub answer_service: AnswerService,
}

impl AppState {
    pub fn new(store: Arc<dyn ExamStore>) -> Self {
        let question_service = QuestionService::new(store.clone());
        let test_service = TestService::new(store.clone());
        let share_service = ShareService::new(store.clone());
        let answer_service = AnswerService::new(store.clone());

        Self {
            store,
            question_service,
            test_service,
            share_service,
            answer_service,
        }
    }
}

/// Full application router: an unauthenticated health probe plus the
/// bearer-authenticated API surface.
pub fn app(state: AppState) -> Router {
    let base = Router::new().route("/health", get(routes::health::health));

    let api = Router::new()
        .route(
            "/api/admin/question",
            get(routes::question::list_questions).post(routes::question::create_question),
        )
        .route(
            "/api/admin/question/unassigned",
            get(routes::question::list_unassigned_questions),
        )
        .route(
            "/api/admin/question/:id",
            get(routes::question::get_question)
                .put(routes::question::update_question)
                .delete(routes::question::delete_question),
        )
        .route(
            "/api/admin/test",
            get(routes::test::list_tests).post(routes::test::create_test),
        )
        .route(
            "/api/admin/test/:id",
            get(routes::test::get_test)
                .put(routes::test::update_test)
                .delete(routes::test::delete_test),
        )
        .route(
            "/api/share/shared-with-me",
            get(routes::share::list_shared_with_me),
        )
        .route("/api/share/:test_id", post(routes::share::create_share))
        .route(
            "/api/share/:owner_id/:test_id/:token",
            get(routes::share::redeem_share),
        )
        .route("/api/test", get(routes::taker::list_tests))
        .route("/api/test/:id", get(routes::taker::get_test))
        .route(
            "/api/answer",
            get(routes::answer::list_answers).post(routes::answer::create_answer),
        )
        .route(
            "/api/answer/test/:test_id",
            get(routes::answer::answers_for_test),
        )
        .route(
            "/api/answer/:id",
            get(routes::answer::get_answer).put(routes::answer::update_answer),
        )
        .layer(axum::middleware::from_fn(
            middleware::auth::require_bearer_auth,
        ));

    base.merge(api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

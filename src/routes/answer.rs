use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::answer_dto::{CreateAnswerPayload, UpdateAnswerPayload},
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/answer",
    responses(
        (status = 200, description = "Every answer the caller has recorded")
    )
)]
#[axum::debug_handler]
pub async fn list_answers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let answers = state.answer_service.list(&claims.sub).await?;
    Ok(Json(answers))
}

#[utoipa::path(
    get,
    path = "/api/answer/{id}",
    params(
        ("id" = Uuid, Path, description = "Answer ID")
    ),
    responses(
        (status = 200, description = "Answer found"),
        (status = 404, description = "Answer not found")
    )
)]
#[axum::debug_handler]
pub async fn get_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let answer = state.answer_service.get(id, &claims.sub).await?;
    Ok(Json(answer))
}

#[utoipa::path(
    get,
    path = "/api/answer/test/{test_id}",
    params(
        ("test_id" = i64, Path, description = "Test ID")
    ),
    responses(
        (status = 200, description = "One entry per question of the test, blank where unanswered"),
        (status = 404, description = "Test not readable by the caller")
    )
)]
#[axum::debug_handler]
pub async fn answers_for_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(test_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let answers = state
        .answer_service
        .answers_for_test(test_id, &claims.sub)
        .await?;
    Ok(Json(answers))
}

#[utoipa::path(
    post,
    path = "/api/answer",
    request_body = CreateAnswerPayload,
    responses(
        (status = 201, description = "Answer recorded"),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateAnswerPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let answer = state.answer_service.create(payload, &claims.sub).await?;
    Ok((StatusCode::CREATED, Json(answer)))
}

#[utoipa::path(
    put,
    path = "/api/answer/{id}",
    params(
        ("id" = Uuid, Path, description = "Answer ID")
    ),
    request_body = UpdateAnswerPayload,
    responses(
        (status = 204, description = "Answer updated"),
        (status = 400, description = "Mismatched ids"),
        (status = 404, description = "Answer not found"),
        (status = 409, description = "Concurrent modification")
    )
)]
#[axum::debug_handler]
pub async fn update_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAnswerPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state.answer_service.update(id, payload, &claims.sub).await?;
    Ok(StatusCode::NO_CONTENT)
}

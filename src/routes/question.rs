use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::question_dto::{CreateQuestionPayload, UpdateQuestionPayload},
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/admin/question",
    responses(
        (status = 200, description = "All questions created by the caller")
    )
)]
#[axum::debug_handler]
pub async fn list_questions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let questions = state.question_service.list(&claims.sub).await?;
    Ok(Json(questions))
}

#[utoipa::path(
    get,
    path = "/api/admin/question/unassigned",
    responses(
        (status = 200, description = "The caller's questions not linked to any test")
    )
)]
#[axum::debug_handler]
pub async fn list_unassigned_questions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let questions = state.question_service.list_unassigned(&claims.sub).await?;
    Ok(Json(questions))
}

#[utoipa::path(
    get,
    path = "/api/admin/question/{id}",
    params(
        ("id" = i64, Path, description = "Question ID")
    ),
    responses(
        (status = 200, description = "Question found"),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn get_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let question = state.question_service.get(id, &claims.sub).await?;
    Ok(Json(question))
}

#[utoipa::path(
    post,
    path = "/api/admin/question",
    request_body = CreateQuestionPayload,
    responses(
        (status = 201, description = "Question created"),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuestionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let question = state.question_service.create(payload, &claims.sub).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

#[utoipa::path(
    put,
    path = "/api/admin/question/{id}",
    params(
        ("id" = i64, Path, description = "Question ID")
    ),
    request_body = UpdateQuestionPayload,
    responses(
        (status = 204, description = "Question updated"),
        (status = 400, description = "Mismatched ids"),
        (status = 404, description = "Question not found"),
        (status = 409, description = "Concurrent modification")
    )
)]
#[axum::debug_handler]
pub async fn update_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuestionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state
        .question_service
        .update(id, payload, &claims.sub)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/admin/question/{id}",
    params(
        ("id" = i64, Path, description = "Question ID")
    ),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.question_service.delete(id, &claims.sub).await?;
    Ok(StatusCode::NO_CONTENT)
}

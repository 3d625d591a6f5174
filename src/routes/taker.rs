use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::taker_dto::TakerTest,
    error::{Error, Result},
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/test",
    responses(
        (status = 200, description = "Taker views of the caller's own and shared tests")
    )
)]
#[axum::debug_handler]
pub async fn list_tests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let mut views: Vec<TakerTest> = state
        .test_service
        .list(&claims.sub)
        .await?
        .iter()
        .map(|(test, questions)| TakerTest::build(test, questions))
        .collect();

    for (test, questions) in state.share_service.list_shared_with_me(&claims.sub).await? {
        if views.iter().any(|v| v.test_id == test.id) {
            continue;
        }
        views.push(TakerTest::build(&test, &questions));
    }
    Ok(Json(views))
}

#[utoipa::path(
    get,
    path = "/api/test/{id}",
    params(
        ("id" = i64, Path, description = "Test ID")
    ),
    responses(
        (status = 200, description = "Taker view of the test"),
        (status = 404, description = "Test not owned by nor shared with the caller")
    )
)]
#[axum::debug_handler]
pub async fn get_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    match state.test_service.get(id, &claims.sub).await {
        Ok((test, questions)) => Ok(Json(TakerTest::build(&test, &questions))),
        Err(Error::NotFound(_)) => {
            match state.share_service.shared_test(id, &claims.sub).await? {
                Some((test, questions)) => Ok(Json(TakerTest::build(&test, &questions))),
                None => Err(Error::not_found()),
            }
        }
        Err(err) => Err(err),
    }
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::share_dto::ShareLinkResponse, dto::taker_dto::TakerTest, error::Result,
    middleware::auth::Claims, AppState,
};

#[utoipa::path(
    post,
    path = "/api/share/{test_id}",
    params(
        ("test_id" = i64, Path, description = "Test ID")
    ),
    responses(
        (status = 200, description = "Share link for the test; repeated calls return the same token"),
        (status = 404, description = "Test not found")
    )
)]
#[axum::debug_handler]
pub async fn create_share(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(test_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let grant = state
        .share_service
        .create_share(test_id, &claims.sub)
        .await?;
    Ok(Json(ShareLinkResponse::from(grant)))
}

#[utoipa::path(
    get,
    path = "/api/share/{owner_id}/{test_id}/{token}",
    params(
        ("owner_id" = String, Path, description = "Claimed owner of the shared test"),
        ("test_id" = i64, Path, description = "Test ID"),
        ("token" = String, Path, description = "Share token")
    ),
    responses(
        (status = 204, description = "Share redeemed; the test is now listed for the caller"),
        (status = 404, description = "Owner, test, and token did not resolve to one grant")
    )
)]
#[axum::debug_handler]
pub async fn redeem_share(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((owner_id, test_id, token)): Path<(String, i64, String)>,
) -> Result<impl IntoResponse> {
    state
        .share_service
        .redeem(&owner_id, test_id, &token, &claims.sub)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/share/shared-with-me",
    responses(
        (status = 200, description = "Tests shared with the caller, in taker form")
    )
)]
#[axum::debug_handler]
pub async fn list_shared_with_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let shared = state.share_service.list_shared_with_me(&claims.sub).await?;
    let views: Vec<TakerTest> = shared
        .iter()
        .map(|(test, questions)| TakerTest::build(test, questions))
        .collect();
    Ok(Json(views))
}

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{FriendRequest, FriendResponse},
    services,
};
use crate::{
    auth::AuthUser,
    dates,
    error::AppError,
    extract::{AppJson, AppPath},
    state::AppState,
};

pub fn friend_routes() -> Router<AppState> {
    Router::new()
        .route("/friends", get(list_friends).post(create_friend))
        .route("/friends/upcoming", get(list_upcoming))
        .route("/friends/:id", put(update_friend).delete(delete_friend))
}

#[instrument(skip_all, fields(user_id = %auth.id))]
pub async fn create_friend(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(payload): AppJson<FriendRequest>,
) -> Result<Json<FriendResponse>, AppError> {
    let friend =
        services::create_friend(state.store.as_ref(), auth.id, payload, dates::today()).await?;
    Ok(Json(friend))
}

#[instrument(skip_all, fields(user_id = %auth.id))]
pub async fn list_friends(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<FriendResponse>>, AppError> {
    let friends = services::list_friends(state.store.as_ref(), auth.id, dates::today()).await?;
    Ok(Json(friends))
}

#[instrument(skip_all, fields(user_id = %auth.id))]
pub async fn list_upcoming(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<FriendResponse>>, AppError> {
    let friends = services::list_upcoming(state.store.as_ref(), auth.id, dates::today()).await?;
    Ok(Json(friends))
}

#[instrument(skip_all, fields(user_id = %auth.id, %friend_id))]
pub async fn update_friend(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(friend_id): AppPath<Uuid>,
    AppJson(payload): AppJson<FriendRequest>,
) -> Result<Json<FriendResponse>, AppError> {
    let friend = services::update_friend(
        state.store.as_ref(),
        auth.id,
        friend_id,
        payload,
        dates::today(),
    )
    .await?;
    Ok(Json(friend))
}

#[instrument(skip_all, fields(user_id = %auth.id, %friend_id))]
pub async fn delete_friend(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(friend_id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    services::delete_friend(state.store.as_ref(), auth.id, friend_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{ChangePasswordRequest, MessageResponse, ProfileRequest, ProfileResponse},
    services,
};
use crate::{auth::AuthUser, dates, error::AppError, extract::AppJson, state::AppState};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/me",
            get(get_profile).put(update_profile).delete(delete_profile),
        )
        .route("/me/password", patch(change_password))
}

#[instrument(skip_all, fields(user_id = %auth.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = services::get_profile(state.store.as_ref(), auth.id).await?;
    Ok(Json(profile))
}

#[instrument(skip_all, fields(user_id = %auth.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(payload): AppJson<ProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile =
        services::update_profile(state.store.as_ref(), auth.id, payload, dates::today()).await?;
    Ok(Json(profile))
}

#[instrument(skip_all, fields(user_id = %auth.id))]
pub async fn delete_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<StatusCode, AppError> {
    services::delete_profile(state.store.as_ref(), auth.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, fields(user_id = %auth.id))]
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    services::change_password(state.store.as_ref(), auth.id, payload).await?;
    Ok(Json(MessageResponse {
        message: "Password changed successfully".into(),
    }))
}

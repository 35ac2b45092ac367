use time::Date;
use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{ChangePasswordRequest, ProfileRequest, ProfileResponse};
use crate::{
    auth::password::{hash_password, verify_password},
    error::AppError,
    store::{Store, User, UserStore},
};

async fn find_user(store: &dyn Store, user_id: Uuid) -> Result<User, AppError> {
    store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

pub async fn get_profile(store: &dyn Store, user_id: Uuid) -> Result<ProfileResponse, AppError> {
    Ok(find_user(store, user_id).await?.into())
}

/// Uniqueness is not pre-checked here; a clash is still reported as a
/// conflict by the store's unique constraints.
pub async fn update_profile(
    store: &dyn Store,
    user_id: Uuid,
    mut req: ProfileRequest,
    today: Date,
) -> Result<ProfileResponse, AppError> {
    req.normalize();
    req.validate(today)?;

    let mut user = find_user(store, user_id).await?;
    user.username = req.username;
    user.email = req.email;
    user.first_name = req.first_name;
    user.last_name = req.last_name;
    user.birth_date = req.birth_date;

    let user = store.update_user(&user).await?;
    info!(user_id = %user.id, "profile updated");
    Ok(user.into())
}

pub async fn delete_profile(store: &dyn Store, user_id: Uuid) -> Result<(), AppError> {
    let user = find_user(store, user_id).await?;
    store.delete_user(user.id).await?;
    info!(user_id = %user.id, "profile deleted");
    Ok(())
}

pub async fn change_password(
    store: &dyn Store,
    user_id: Uuid,
    req: ChangePasswordRequest,
) -> Result<(), AppError> {
    req.validate()?;

    let user = find_user(store, user_id).await?;
    if !verify_password(&req.old_password, &user.password_hash)? {
        warn!(user_id = %user.id, "change password with wrong old password");
        return Err(AppError::Unauthorized("Invalid old password".into()));
    }

    let password_hash = hash_password(&req.new_password)?;
    store.update_password(user.id, &password_hash).await?;
    info!(user_id = %user.id, "password changed");
    Ok(())
}

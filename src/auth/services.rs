use time::Date;
use tracing::{info, warn};

use super::{
    dto::{AuthResponse, LoginRequest, RegisterRequest},
    jwt::JwtKeys,
    password::{hash_password, verify_password},
};
use crate::{
    error::AppError,
    store::{NewUser, Store, User, UserStore, DEFAULT_ROLE},
};

pub async fn register(
    store: &dyn Store,
    keys: &JwtKeys,
    mut req: RegisterRequest,
    today: Date,
) -> Result<AuthResponse, AppError> {
    req.normalize();
    req.validate(today)?;

    if store.username_exists(&req.username).await? {
        warn!(username = %req.username, "username already registered");
        return Err(AppError::Conflict("Username already exists".into()));
    }
    if store.email_exists(&req.email).await? {
        warn!(email = %req.email, "email already registered");
        return Err(AppError::Conflict("Email already exists".into()));
    }

    let password_hash = hash_password(&req.password)?;
    let user = store
        .insert_user(&NewUser {
            username: req.username,
            email: req.email,
            password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
            birth_date: req.birth_date,
            role: DEFAULT_ROLE.to_string(),
        })
        .await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    credential(keys, user)
}

pub async fn login(
    store: &dyn Store,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<AuthResponse, AppError> {
    req.validate()?;

    let Some(user) = store.find_user_by_username(req.username.trim()).await? else {
        warn!(username = %req.username, "login unknown username");
        return Err(AppError::invalid_credentials());
    };

    if !verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::invalid_credentials());
    }

    info!(user_id = %user.id, username = %user.username, "user logged in");
    credential(keys, user)
}

fn credential(keys: &JwtKeys, user: User) -> Result<AuthResponse, AppError> {
    let token = keys.sign(&user)?;
    Ok(AuthResponse {
        token,
        user_id: user.id,
        username: user.username,
    })
}

use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Role given to every account created through registration.
pub const DEFAULT_ROLE: &str = "user";

/// User record in the database.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String, // Argon2 PHC string
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<Date>,
    pub role: String, // comma separated when several
    pub created_at: OffsetDateTime,
}

/// Friend record; `user_id` is the owner and never changes.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Friend {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Date,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<Date>,
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct NewFriend {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Date,
}

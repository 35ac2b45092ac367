//! Persistence seam. Services only talk to the traits below; `PgStore` is the
//! production backend and every write it performs runs inside one transaction.

use async_trait::async_trait;
use uuid::Uuid;

#[cfg(test)]
pub mod memory;
pub mod postgres;
mod types;

pub use postgres::PgStore;
pub use types::{Friend, NewFriend, NewUser, User, DEFAULT_ROLE};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique column already holds this value; carries the column name.
    #[error("duplicate value for {0}")]
    Duplicate(String),
    /// The row disappeared between lookup and write.
    #[error("record not found")]
    Missing,
    #[error(transparent)]
    Database(sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let field = match db_err.constraint() {
                    Some(c) if c.contains("username") => "username",
                    Some(c) if c.contains("email") => "email",
                    Some(c) => c,
                    None => "value",
                };
                return StoreError::Duplicate(field.to_string());
            }
        }
        StoreError::Database(err)
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn username_exists(&self, username: &str) -> StoreResult<bool>;
    async fn email_exists(&self, email: &str) -> StoreResult<bool>;
    async fn insert_user(&self, user: &NewUser) -> StoreResult<User>;
    /// Overwrites username, email, names and birth date.
    async fn update_user(&self, user: &User) -> StoreResult<User>;
    async fn update_password(&self, id: Uuid, password_hash: &str) -> StoreResult<()>;
    /// Removes the user together with every friend it owns.
    async fn delete_user(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait FriendStore: Send + Sync {
    async fn find_friend(&self, id: Uuid) -> StoreResult<Option<Friend>>;
    /// Oldest first.
    async fn list_friends_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Friend>>;
    async fn insert_friend(&self, friend: &NewFriend) -> StoreResult<Friend>;
    /// Overwrites names and birth date; the owner is left untouched.
    async fn update_friend(&self, friend: &Friend) -> StoreResult<Friend>;
    async fn delete_friend(&self, id: Uuid) -> StoreResult<()>;
}

pub trait Store: UserStore + FriendStore {}

impl<T: UserStore + FriendStore> Store for T {}

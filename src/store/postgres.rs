use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{Friend, FriendStore, NewFriend, NewUser, StoreError, StoreResult, User, UserStore};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, first_name, last_name, birth_date, role, created_at";
const FRIEND_COLUMNS: &str = "id, user_id, first_name, last_name, birth_date, created_at";

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn username_exists(&self, username: &str) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)",
        )
        .bind(username)
        .fetch_one(&self.db)
        .await?;
        Ok(exists)
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.db)
                .await?;
        Ok(exists)
    }

    async fn insert_user(&self, new: &NewUser) -> StoreResult<User> {
        let mut tx = self.db.begin().await?;
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name, birth_date, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.birth_date)
        .bind(&new.role)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        debug!(user_id = %user.id, "user row inserted");
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> StoreResult<User> {
        let mut tx = self.db.begin().await?;
        let updated = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET username = $2, email = $3, first_name = $4, last_name = $5, birth_date = $6
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.birth_date)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::Missing)?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> StoreResult<()> {
        let mut tx = self.db.begin().await?;
        let done = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::Missing);
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        let mut tx = self.db.begin().await?;
        let friends = sqlx::query("DELETE FROM friends WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let done = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::Missing);
        }
        tx.commit().await?;
        debug!(user_id = %id, friends_removed = friends.rows_affected(), "user row deleted");
        Ok(())
    }
}

#[async_trait]
impl FriendStore for PgStore {
    async fn find_friend(&self, id: Uuid) -> StoreResult<Option<Friend>> {
        let friend = sqlx::query_as::<_, Friend>(&format!(
            "SELECT {FRIEND_COLUMNS} FROM friends WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(friend)
    }

    async fn list_friends_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Friend>> {
        let rows = sqlx::query_as::<_, Friend>(&format!(
            r#"
            SELECT {FRIEND_COLUMNS}
              FROM friends
             WHERE user_id = $1
             ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn insert_friend(&self, new: &NewFriend) -> StoreResult<Friend> {
        let mut tx = self.db.begin().await?;
        let friend = sqlx::query_as::<_, Friend>(&format!(
            r#"
            INSERT INTO friends (user_id, first_name, last_name, birth_date)
            VALUES ($1, $2, $3, $4)
            RETURNING {FRIEND_COLUMNS}
            "#
        ))
        .bind(new.user_id)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.birth_date)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(friend)
    }

    async fn update_friend(&self, friend: &Friend) -> StoreResult<Friend> {
        let mut tx = self.db.begin().await?;
        let updated = sqlx::query_as::<_, Friend>(&format!(
            r#"
            UPDATE friends
               SET first_name = $2, last_name = $3, birth_date = $4
             WHERE id = $1
            RETURNING {FRIEND_COLUMNS}
            "#
        ))
        .bind(friend.id)
        .bind(&friend.first_name)
        .bind(&friend.last_name)
        .bind(friend.birth_date)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::Missing)?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_friend(&self, id: Uuid) -> StoreResult<()> {
        let mut tx = self.db.begin().await?;
        let done = sqlx::query("DELETE FROM friends WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::Missing);
        }
        tx.commit().await?;
        Ok(())
    }
}

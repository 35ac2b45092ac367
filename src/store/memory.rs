use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{Friend, FriendStore, NewFriend, NewUser, StoreError, StoreResult, User, UserStore};

/// In-process backend used by unit and router tests. Every operation holds
/// the lock for its whole duration, so writes are all-or-nothing.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    friends: Vec<Friend>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Other(anyhow::anyhow!("memory store lock poisoned")))
    }

    pub fn friend_count(&self) -> usize {
        self.tables().map(|t| t.friends.len()).unwrap_or(0)
    }
}

impl Tables {
    fn ensure_unique(&self, id: Option<Uuid>, username: &str, email: &str) -> StoreResult<()> {
        let others = self.users.iter().filter(|u| Some(u.id) != id);
        for u in others {
            if u.username == username {
                return Err(StoreError::Duplicate("username".into()));
            }
            if u.email == email {
                return Err(StoreError::Duplicate("email".into()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables()?
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn username_exists(&self, username: &str) -> StoreResult<bool> {
        Ok(self.tables()?.users.iter().any(|u| u.username == username))
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        Ok(self.tables()?.users.iter().any(|u| u.email == email))
    }

    async fn insert_user(&self, new: &NewUser) -> StoreResult<User> {
        let mut tables = self.tables()?;
        tables.ensure_unique(None, &new.username, &new.email)?;
        let user = User {
            id: Uuid::new_v4(),
            username: new.username.clone(),
            email: new.email.clone(),
            password_hash: new.password_hash.clone(),
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            birth_date: new.birth_date,
            role: new.role.clone(),
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> StoreResult<User> {
        let mut tables = self.tables()?;
        tables.ensure_unique(Some(user.id), &user.username, &user.email)?;
        let row = tables
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(StoreError::Missing)?;
        row.username = user.username.clone();
        row.email = user.email.clone();
        row.first_name = user.first_name.clone();
        row.last_name = user.last_name.clone();
        row.birth_date = user.birth_date;
        Ok(row.clone())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> StoreResult<()> {
        let mut tables = self.tables()?;
        let row = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::Missing)?;
        row.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables()?;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Err(StoreError::Missing);
        }
        tables.friends.retain(|f| f.user_id != id);
        Ok(())
    }
}

#[async_trait]
impl FriendStore for MemoryStore {
    async fn find_friend(&self, id: Uuid) -> StoreResult<Option<Friend>> {
        Ok(self.tables()?.friends.iter().find(|f| f.id == id).cloned())
    }

    async fn list_friends_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Friend>> {
        Ok(self
            .tables()?
            .friends
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_friend(&self, new: &NewFriend) -> StoreResult<Friend> {
        let mut tables = self.tables()?;
        if !tables.users.iter().any(|u| u.id == new.user_id) {
            return Err(StoreError::Other(anyhow::anyhow!(
                "friends.user_id references a missing user"
            )));
        }
        let friend = Friend {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            birth_date: new.birth_date,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.friends.push(friend.clone());
        Ok(friend)
    }

    async fn update_friend(&self, friend: &Friend) -> StoreResult<Friend> {
        let mut tables = self.tables()?;
        let row = tables
            .friends
            .iter_mut()
            .find(|f| f.id == friend.id)
            .ok_or(StoreError::Missing)?;
        row.first_name = friend.first_name.clone();
        row.last_name = friend.last_name.clone();
        row.birth_date = friend.birth_date;
        Ok(row.clone())
    }

    async fn delete_friend(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables()?;
        let before = tables.friends.len();
        tables.friends.retain(|f| f.id != id);
        if tables.friends.len() == before {
            return Err(StoreError::Missing);
        }
        Ok(())
    }
}

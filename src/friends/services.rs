use time::Date;
use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{FriendRequest, FriendResponse};
use crate::{
    error::AppError,
    store::{Friend, FriendStore, NewFriend, Store, UserStore},
};

/// Looks the friend up by id alone, then checks the owner, so an existing
/// friend of someone else is `Forbidden` rather than `NotFound`.
async fn find_owned_friend(
    store: &dyn Store,
    user_id: Uuid,
    friend_id: Uuid,
) -> Result<Friend, AppError> {
    let friend = store
        .find_friend(friend_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Friend not found".into()))?;

    if friend.user_id != user_id {
        warn!(%user_id, %friend_id, owner_id = %friend.user_id, "friend owned by another user");
        return Err(AppError::Forbidden(
            "You are not allowed to access this friend".into(),
        ));
    }
    Ok(friend)
}

pub async fn create_friend(
    store: &dyn Store,
    user_id: Uuid,
    req: FriendRequest,
    today: Date,
) -> Result<FriendResponse, AppError> {
    req.validate(today)?;
    let Some(birth_date) = req.birth_date else {
        return Err(AppError::Internal(anyhow::anyhow!(
            "validated friend request without birth date"
        )));
    };

    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let friend = store
        .insert_friend(&NewFriend {
            user_id: user.id,
            first_name: req.first_name,
            last_name: req.last_name,
            birth_date,
        })
        .await?;

    info!(%user_id, friend_id = %friend.id, "friend created");
    Ok(FriendResponse::new(friend, today))
}

pub async fn list_friends(
    store: &dyn Store,
    user_id: Uuid,
    today: Date,
) -> Result<Vec<FriendResponse>, AppError> {
    let friends = store.list_friends_by_user(user_id).await?;
    Ok(friends
        .into_iter()
        .map(|f| FriendResponse::new(f, today))
        .collect())
}

/// Same as [`list_friends`], soonest birthday first. Ties keep listing order.
pub async fn list_upcoming(
    store: &dyn Store,
    user_id: Uuid,
    today: Date,
) -> Result<Vec<FriendResponse>, AppError> {
    let mut friends = list_friends(store, user_id, today).await?;
    friends.sort_by_key(|f| f.days_until_birthday);
    Ok(friends)
}

pub async fn update_friend(
    store: &dyn Store,
    user_id: Uuid,
    friend_id: Uuid,
    req: FriendRequest,
    today: Date,
) -> Result<FriendResponse, AppError> {
    req.validate(today)?;

    let mut friend = find_owned_friend(store, user_id, friend_id).await?;
    friend.first_name = req.first_name;
    friend.last_name = req.last_name;
    if let Some(birth_date) = req.birth_date {
        friend.birth_date = birth_date;
    }

    let friend = store.update_friend(&friend).await?;
    info!(%user_id, %friend_id, "friend updated");
    Ok(FriendResponse::new(friend, today))
}

pub async fn delete_friend(
    store: &dyn Store,
    user_id: Uuid,
    friend_id: Uuid,
) -> Result<(), AppError> {
    let friend = find_owned_friend(store, user_id, friend_id).await?;
    store.delete_friend(friend.id).await?;
    info!(%user_id, %friend_id, "friend deleted");
    Ok(())
}

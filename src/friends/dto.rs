use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use super::birthday::next_occurrence;
use crate::{dates::iso_date, error::AppError, store::Friend, validation::Validator};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, with = "iso_date::option")]
    pub birth_date: Option<Date>,
}

impl FriendRequest {
    pub fn validate(&self, today: Date) -> Result<(), AppError> {
        Validator::new()
            .name("firstName", &self.first_name, "First name is required")
            .name("lastName", &self.last_name, "Last name is required")
            .past_date("birthDate", self.birth_date, today)
            .finish()
    }
}

/// A friend together with where their next birthday falls.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "iso_date")]
    pub birth_date: Date,
    pub days_until_birthday: i64,
    #[serde(with = "iso_date")]
    pub next_birthday: Date,
    pub is_birthday_today: bool,
}

impl FriendResponse {
    pub fn new(friend: Friend, today: Date) -> Self {
        let next = next_occurrence(friend.birth_date, today);
        Self {
            id: friend.id,
            first_name: friend.first_name,
            last_name: friend.last_name,
            birth_date: friend.birth_date,
            days_until_birthday: next.days_until,
            next_birthday: next.date,
            is_birthday_today: next.is_today,
        }
    }
}

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::{dates::iso_date, error::AppError, store::User, validation::Validator};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "iso_date::option")]
    pub birth_date: Option<Date>,
}

impl From<User> for ProfileResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            birth_date: u.birth_date,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, with = "iso_date::option")]
    pub birth_date: Option<Date>,
}

impl ProfileRequest {
    pub fn normalize(&mut self) {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_lowercase();
    }

    pub fn validate(&self, today: Date) -> Result<(), AppError> {
        Validator::new()
            .required("username", &self.username, "Username is required")
            .email("email", &self.email)
            .name("firstName", &self.first_name, "First name is required")
            .name("lastName", &self.last_name, "Last name is required")
            .past_date("birthDate", self.birth_date, today)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_new_password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .required("oldPassword", &self.old_password, "Old password is required")
            .new_password("newPassword", &self.new_password, "New password is required")
            .required(
                "confirmNewPassword",
                &self.confirm_new_password,
                "Confirm password is required",
            )
            .check(
                self.new_password == self.confirm_new_password,
                "confirmNewPassword",
                "New password and confirmation do not match",
            )
            .check(
                self.old_password.is_empty() || self.old_password != self.new_password,
                "newPassword",
                "New password must be different from old password",
            )
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

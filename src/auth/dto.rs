use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::{dates::iso_date, error::AppError, validation::Validator};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, with = "iso_date::option")]
    pub birth_date: Option<Date>,
}

impl RegisterRequest {
    pub fn normalize(&mut self) {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_lowercase();
    }

    pub fn validate(&self, today: Date) -> Result<(), AppError> {
        Validator::new()
            .required("username", &self.username, "Username is required")
            .email("email", &self.email)
            .new_password("password", &self.password, "Password is required")
            .name("firstName", &self.first_name, "First name is required")
            .name("lastName", &self.last_name, "Last name is required")
            .past_date("birthDate", self.birth_date, today)
            .finish()
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .required("username", &self.username, "Username is required")
            .required("password", &self.password, "Password is required")
            .finish()
    }
}

/// Session credential returned by register and login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user_id: Uuid,
    pub username: String,
}

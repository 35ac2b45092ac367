use lazy_static::lazy_static;
use regex::Regex;
use time::Date;

use crate::error::{AppError, FieldErrors};

pub const MAX_NAME_LEN: usize = 255;
pub const MIN_PASSWORD_LEN: usize = 8;
const PASSWORD_SYMBOLS: &str = "@$!%*?&";

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// At least one lowercase, uppercase, digit and symbol, nothing else allowed.
pub fn is_strong_password(password: &str) -> bool {
    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(c));
    allowed
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c))
}

/// Collects field errors; only the first message recorded for a field is kept.
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.errors
                .entry(field.to_string())
                .or_insert_with(|| message.to_string());
        }
        self
    }

    pub fn required(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        self.check(!value.trim().is_empty(), field, message)
    }

    pub fn name(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        self.required(field, value, message).check(
            value.chars().count() <= MAX_NAME_LEN,
            field,
            "Must be at most 255 characters long",
        )
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        self.required(field, value, "Email is required")
            .check(is_valid_email(value), field, "Email must be valid")
    }

    pub fn new_password(&mut self, field: &str, value: &str, required: &str) -> &mut Self {
        self.required(field, value, required)
            .check(
                value.chars().count() >= MIN_PASSWORD_LEN,
                field,
                "Password must be at least 8 characters long",
            )
            .check(
                is_strong_password(value),
                field,
                "Password must contain at least one uppercase letter, one lowercase letter, one digit, and one special character",
            )
    }

    pub fn past_date(&mut self, field: &str, value: Option<Date>, today: Date) -> &mut Self {
        match value {
            None => self.check(false, field, "Birth date is required"),
            Some(d) => self.check(d < today, field, "Birth date must be in the past"),
        }
    }

    pub fn finish(&mut self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}

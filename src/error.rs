use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{error, warn};

use crate::store::StoreError;

/// Field name → human readable message.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(FieldErrors),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub status: u16,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn invalid_credentials() -> Self {
        AppError::Unauthorized("Invalid credentials".into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, errors) = match self {
            AppError::Validation(fields) => ("Validation failed".to_string(), Some(fields)),
            AppError::Internal(e) => {
                error!(error = ?e, "unhandled error");
                ("An unexpected error occurred".to_string(), None)
            }
            other => (other.to_string(), None),
        };
        let body = ErrorResponse {
            message,
            status: status.as_u16(),
            timestamp: OffsetDateTime::now_utc(),
            errors,
        };
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(field) => {
                warn!(%field, "unique constraint rejected write");
                AppError::Conflict(duplicate_message(&field))
            }
            StoreError::Missing => AppError::NotFound("Record not found".into()),
            other => AppError::Internal(other.into()),
        }
    }
}

/// Well-formed JSON with a field of the wrong shape is reported against that
/// field; anything else about the body is a plain bad request.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if let JsonRejection::JsonDataError(err) = &rejection {
            if let Some((field, message)) = invalid_field(err) {
                warn!(%field, "request body field rejected");
                return AppError::Validation(FieldErrors::from([(field, message.to_string())]));
            }
        }
        AppError::BadRequest(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(err) => {
                AppError::BadRequest(err.body_text())
            }
            other => AppError::Internal(anyhow::anyhow!(other.body_text())),
        }
    }
}

type PathError = serde_path_to_error::Error<serde_json::Error>;

fn invalid_field(err: &dyn std::error::Error) -> Option<(String, &'static str)> {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(path_err) = cause.downcast_ref::<PathError>() {
            let field = match path_err.path().iter().last()? {
                serde_path_to_error::Segment::Map { key } => key.clone(),
                serde_path_to_error::Segment::Seq { index } => index.to_string(),
                _ => return None,
            };
            return Some((field, field_message(path_err.inner())));
        }
        source = cause.source();
    }
    None
}

/// Serde's own type errors mean a wrong value; custom errors come from the
/// date formats.
fn field_message(err: &serde_json::Error) -> &'static str {
    const TYPE_ERRORS: [&str; 4] = [
        "invalid type",
        "invalid value",
        "invalid length",
        "unknown variant",
    ];
    let text = err.to_string();
    if TYPE_ERRORS.iter().any(|p| text.starts_with(p)) {
        "Invalid value"
    } else {
        "Invalid format: date expected as YYYY-MM-DD"
    }
}

fn duplicate_message(field: &str) -> String {
    match field {
        "username" => "Username already exists".into(),
        "email" => "Email already exists".into(),
        other => format!("{} already exists", other),
    }
}

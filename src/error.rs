use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Stable, caller-visible classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    Forbidden,
    BadRequest,
    Conflict,
    NotFound,
    Internal,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

#[derive(Debug, Display, PartialEq, Eq)]
pub enum AppError {
    #[display(fmt = "{}", _0)]
    Unauthorized(&'static str),

    #[display(fmt = "{}", _0)]
    Forbidden(&'static str),

    #[display(fmt = "Employee account is not linked to an employee profile")]
    UnlinkedAccount,

    #[display(fmt = "Employee not found")]
    EmployeeNotFound,

    #[display(fmt = "Employee is inactive")]
    EmployeeInactive,

    #[display(fmt = "Photo is required")]
    MissingEvidence,

    #[display(fmt = "{}", _0)]
    InvalidInput(String),

    #[display(fmt = "Attendance already submitted for today")]
    AlreadyCheckedIn,

    #[display(fmt = "{}", _0)]
    NotFound(&'static str),

    /// The payload is only written to the log; callers see a fixed message.
    #[display(fmt = "Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Unauthorized(_) => ErrorKind::Unauthorized,
            AppError::Forbidden(_)
            | AppError::UnlinkedAccount
            | AppError::EmployeeNotFound
            | AppError::EmployeeInactive => ErrorKind::Forbidden,
            AppError::MissingEvidence | AppError::InvalidInput(_) => ErrorKind::BadRequest,
            AppError::AlreadyCheckedIn => ErrorKind::Conflict,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.kind().code(),
            "message": self.to_string(),
        }))
    }
}

impl From<actix_multipart::MultipartError> for AppError {
    fn from(e: actix_multipart::MultipartError) -> Self {
        AppError::InvalidInput(format!("Malformed multipart payload: {}", e))
    }
}

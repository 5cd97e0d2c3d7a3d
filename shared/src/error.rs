use serde::{Serialize, Deserialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ErrorCode {
    #[error("Validation failed")]
    ValidationFailed,
    #[error("Not found")]
    NotFound,
    #[error("Bad request")]
    InvalidState,
    #[error("Internal server error")]
    SystemError,
    #[error("Too many requests")]
    RateLimited,
}

/// Failures raised by poll creation and vote application.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PollError {
    #[error("Please fix the following errors:")]
    Validation(Vec<String>),
    #[error("Poll with ID {0} not found")]
    PollNotFound(u64),
    #[error("Option with ID {0} not found")]
    OptionNotFound(u64),
    #[error("Cannot vote on inactive poll")]
    Inactive,
}

impl PollError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PollError::Validation(_) => ErrorCode::ValidationFailed,
            PollError::PollNotFound(_) | PollError::OptionNotFound(_) => ErrorCode::NotFound,
            PollError::Inactive => ErrorCode::InvalidState,
        }
    }

    pub fn errors(&self) -> Option<&[String]> {
        match self {
            PollError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Body of every failed API response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: code.to_string(),
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_errors(code: ErrorCode, message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            errors: Some(errors),
            ..Self::new(code, message)
        }
    }
}

impl From<&PollError> for ErrorResponse {
    fn from(err: &PollError) -> Self {
        match err.errors() {
            Some(errors) => Self::with_errors(err.code(), err.to_string(), errors.to_vec()),
            None => Self::new(err.code(), err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, PollError>;

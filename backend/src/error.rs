use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use shared::{ErrorCode, ErrorResponse, PollError, ValidationError};
use thiserror::Error;
use tracing::error;

use crate::routes::AppState;
use crate::store::StoreError;

const PRODUCTION_INTERNAL_MESSAGE: &str = "Something went wrong";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Poll(#[from] PollError),
    #[error("{0}")]
    InvalidQuery(#[from] ValidationError),
    #[error("{0}")]
    InvalidItem(ValidationError),
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
    #[error("Poll with ID {0} not found")]
    InvalidId(String),
    #[error("{0}")]
    RateLimited(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Poll(e) => ApiError::Poll(e),
            StoreError::LockFailed(what) => ApiError::Internal(format!("failed to lock {what} store")),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::Poll(e) => match e.code() {
                ErrorCode::NotFound => Status::NotFound,
                ErrorCode::RateLimited => Status::TooManyRequests,
                ErrorCode::SystemError => Status::InternalServerError,
                ErrorCode::ValidationFailed | ErrorCode::InvalidState => Status::BadRequest,
            },
            ApiError::InvalidQuery(_) | ApiError::InvalidItem(_) | ApiError::MalformedBody(_) => Status::BadRequest,
            ApiError::InvalidId(_) => Status::NotFound,
            ApiError::RateLimited(_) => Status::TooManyRequests,
            ApiError::Internal(_) => Status::InternalServerError,
        }
    }

    /// JSON body for this error. Internal details are hidden in production.
    pub fn to_response(&self, production: bool) -> ErrorResponse {
        match self {
            ApiError::Poll(e) => ErrorResponse::from(e),
            ApiError::InvalidQuery(e) => ErrorResponse::with_errors(
                ErrorCode::ValidationFailed,
                "Please fix the following errors:",
                vec![e.to_string()],
            ),
            ApiError::InvalidItem(e) => ErrorResponse::new(ErrorCode::ValidationFailed, e.to_string()),
            ApiError::MalformedBody(detail) => ErrorResponse::with_errors(
                ErrorCode::ValidationFailed,
                "Invalid request body",
                vec![detail.clone()],
            ),
            ApiError::InvalidId(_) => ErrorResponse::new(ErrorCode::NotFound, self.to_string()),
            ApiError::RateLimited(msg) => ErrorResponse::new(ErrorCode::RateLimited, msg.clone()),
            ApiError::Internal(detail) => {
                let message = if production { PRODUCTION_INTERNAL_MESSAGE } else { detail.as_str() };
                ErrorResponse::new(ErrorCode::SystemError, message)
            }
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        if let ApiError::Internal(detail) = &self {
            error!("❌ Internal error on {}: {}", req.uri(), detail);
        }

        let production = req
            .rocket()
            .state::<AppState>()
            .map_or(false, |state| state.config.environment.is_production());

        rocket::Response::build_from(Json(self.to_response(production)).respond_to(req)?)
            .status(self.status())
            .ok()
    }
}

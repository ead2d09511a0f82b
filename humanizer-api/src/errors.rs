use crate::auth::{AuthError, TokenGenerationError};
use crate::humanize::HumanizeError;
use crate::llm::LlmError;
use crate::ToAxumResponse;
use humanizer_core::api_response::ErrorResponse;

use axum::response::{IntoResponse, Response};
use thiserror::Error;

pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";
pub const UPSTREAM_FAILURE: &str = "Failed to humanize text using AI.";

/// Failures that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Error: {0}")]
    ServerError(#[from] hyper::Error),
    #[error("The provided port is not a valid number - {0}")]
    InvalidPort(String),
    #[error("The provided IP is not valid - {0}")]
    InvalidIp(String),
    #[error("failed to read configuration file - {0}")]
    ConfigReadFailed(std::io::Error),
    #[error("failed to deserialize configuration file as yaml - {0}")]
    ConfigDeserializeFailed(serde_yaml::Error),
    #[error("Failed to initialize completion backend - {0}")]
    BackendInitializationError(#[from] LlmError),
}

/// Failures of a single request. Every variant is terminal for that request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Failed to humanize text using AI.")]
    Upstream(#[source] LlmError),
    #[error("Internal server error")]
    Internal(String),
}

impl From<HumanizeError> for ApiError {
    fn from(e: HumanizeError) -> Self {
        match e {
            e @ (HumanizeError::MissingText | HumanizeError::InvalidTemperature) => {
                ApiError::Validation(e.to_string())
            }
            HumanizeError::Upstream(e) => ApiError::Upstream(e),
        }
    }
}

impl From<TokenGenerationError> for ApiError {
    fn from(e: TokenGenerationError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(message) => {
                log::debug!("rejecting request - {message}");
                ErrorResponse::new(message).bad_request()
            }
            ApiError::Auth(e) => e.into_response(),
            ApiError::Upstream(e) => {
                log::error!("upstream completion failed - {e}");
                ErrorResponse::new(UPSTREAM_FAILURE)
                    .with_details(e)
                    .internal_server_error()
            }
            ApiError::Internal(message) => {
                log::error!("internal error - {message}");
                ErrorResponse::new(INTERNAL_SERVER_ERROR)
                    .with_message(message)
                    .internal_server_error()
            }
        }
    }
}

pub use errors::{ApiError, Error};
pub use humanizer_core::api_response::ErrorResponse;

use crate::auth::Keys;
use crate::config::{Config, Provider};
use crate::humanize::Humanizer;
use crate::llm::{LlmBackend, MockBackend, OpenAiBackend};
use crate::rewrite::Rewriter;

use axum::http::StatusCode;
use axum::response::Response;
use serde::Serialize;
use std::ops::Deref;
use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod errors;
pub mod humanize;
pub mod llm;
pub mod rewrite;
pub mod routes;

pub type Result<T> = core::result::Result<T, errors::Error>;

pub struct InnerAppState {
    pub keys: Keys,
    pub humanizer: Humanizer,
}

impl InnerAppState {
    pub fn new(config: &Config, backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            keys: Keys::new(config.jwt_secret.as_bytes()),
            humanizer: Humanizer::new(
                backend,
                config.humanize.clone(),
                Rewriter::new(config.rewrite.clone()),
            ),
        }
    }

    /// Builds the completion backend selected by the configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend: Arc<dyn LlmBackend> = match config.llm.provider {
            Provider::OpenAi => {
                if config.llm.api_key.is_none() {
                    log::warn!("no API key configured, upstream calls will likely be rejected");
                }
                Arc::new(OpenAiBackend::new(
                    &config.llm.base_url,
                    config.llm.api_key.clone(),
                )?)
            }
            Provider::Echo => Arc::new(MockBackend::echo()),
        };
        log::info!("using completion backend {}", backend.id());
        Ok(Self::new(config, backend))
    }
}

#[derive(Clone)]
pub struct SharedAppState(Arc<InnerAppState>);

impl Deref for SharedAppState {
    type Target = InnerAppState;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Arc<InnerAppState>> for SharedAppState {
    fn from(value: Arc<InnerAppState>) -> Self {
        Self(value)
    }
}

impl From<InnerAppState> for SharedAppState {
    fn from(value: InnerAppState) -> Self {
        Self(Arc::new(value))
    }
}

pub trait ToAxumResponse: Sized {
    fn into_response(self, code: StatusCode) -> Response;

    fn ok(self) -> Response {
        self.into_response(StatusCode::OK)
    }

    fn unauthorized(self) -> Response {
        self.into_response(StatusCode::UNAUTHORIZED)
    }

    fn forbidden(self) -> Response {
        self.into_response(StatusCode::FORBIDDEN)
    }

    fn bad_request(self) -> Response {
        self.into_response(StatusCode::BAD_REQUEST)
    }

    fn internal_server_error(self) -> Response {
        self.into_response(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl<T: Serialize> ToAxumResponse for T {
    fn into_response(self, code: StatusCode) -> Response {
        use axum::response::IntoResponse;
        (code, axum::Json(self)).into_response()
    }
}

pub mod auth;
pub mod humanize;

use crate::errors::INTERNAL_SERVER_ERROR;
use crate::{SharedAppState, ToAxumResponse};
use humanizer_core::api_response::ErrorResponse;

use axum::{response::Response, Router};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer};

pub fn router(state: SharedAppState) -> Router {
    Router::new()
        .nest("/auth", auth::router())
        .merge(humanize::router())
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    log::error!("Server error - {message}");
    ErrorResponse::new(INTERNAL_SERVER_ERROR)
        .with_message(message)
        .internal_server_error()
}

use crate::{ApiError, SharedAppState, ToAxumResponse};
use humanizer_core::auth::{Credentials, JsonWebToken};

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    routing, Json, Router,
};

const MISSING_CREDENTIALS: &str = "Email and password are required.";

pub fn router() -> Router<SharedAppState> {
    Router::new()
        .route("/signup", routing::post(signup))
        .route("/login", routing::post(login))
}

async fn signup(
    State(state): State<SharedAppState>,
    credentials: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, ApiError> {
    issue_token(&state, credentials, "signup")
}

// No credential store exists, so login accepts anything signup would.
async fn login(
    State(state): State<SharedAppState>,
    credentials: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, ApiError> {
    issue_token(&state, credentials, "login")
}

fn issue_token(
    state: &SharedAppState,
    credentials: Result<Json<Credentials>, JsonRejection>,
    action: &str,
) -> Result<Response, ApiError> {
    let credentials = match credentials {
        Ok(Json(credentials)) => credentials,
        Err(e) => {
            log::debug!("{action}: unreadable body - {e}");
            Credentials::default()
        }
    };
    if !credentials.is_complete() {
        return Err(ApiError::Validation(MISSING_CREDENTIALS.to_string()));
    }

    let token = state.keys.generate_jwt(credentials.email())?;
    log::info!("{action}: token generated for {}", credentials.email());

    Ok(JsonWebToken { token }.ok())
}

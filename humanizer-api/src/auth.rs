use crate::{SharedAppState, ToAxumResponse};
use humanizer_core::api_response::ErrorResponse;

use axum::{
    async_trait,
    extract::{rejection::TypedHeaderRejectionReason, FromRequestParts, TypedHeader},
    headers::{authorization::Bearer, Authorization},
    http::{header, request::Parts},
    response::{IntoResponse, Response},
    RequestPartsExt,
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::Error as JwtError, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ErrorType;

pub const KEY_VALID_DURATION: i64 = 3600;

#[derive(Debug, ErrorType)]
pub enum AuthError {
    #[error("Access denied. No token provided.")]
    MissingToken,
    #[error("Invalid token.")]
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorResponse::new(self.to_string());
        match self {
            AuthError::MissingToken => body.unauthorized(),
            AuthError::InvalidToken => body.forbidden(),
        }
    }
}

#[derive(Debug, ErrorType)]
pub enum TokenGenerationError {
    #[error("Failed to generate valid timestamp for a authentication token")]
    TimestampGenerationFailed,
    #[error("Failed to encode auth token - {0}")]
    EncodingFailed(#[from] JwtError),
}

#[derive(Debug, ErrorType)]
pub enum InvalidTokenError {
    #[error("Failed to decode auth token - {0}")]
    DecodingFailed(#[from] JwtError),
}

/// Signing material derived from the shared secret, built once at startup.
pub struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Keys {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn generate_jwt(&self, email: &str) -> Result<String, TokenGenerationError> {
        self.generate_jwt_at(email, Utc::now())
    }

    pub fn generate_jwt_at(
        &self,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenGenerationError> {
        let exp = issued_at
            .checked_add_signed(chrono::Duration::seconds(KEY_VALID_DURATION))
            .ok_or(TokenGenerationError::TimestampGenerationFailed)?
            .timestamp();

        let claims = Claims {
            email: email.to_string(),
            iat: issued_at.timestamp() as usize,
            exp: exp as usize,
        };

        let header = Header::new(Algorithm::HS512);
        encode(&header, &claims, &self.encoding).map_err(TokenGenerationError::from)
    }

    /// Accepts a token iff the signature matches and it has not expired.
    pub fn verify(&self, token: &str) -> Result<Claims, InvalidTokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(InvalidTokenError::from)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Claims {
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

#[async_trait]
impl FromRequestParts<SharedAppState> for Claims {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedAppState,
    ) -> Result<Self, Self::Rejection> {
        if !has_credential(parts) {
            log::debug!("request without a token in the Authorization header");
            return Err(AuthError::MissingToken);
        }

        let TypedHeader(Authorization(bearer)) =
            match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
                Ok(bearer) => bearer,
                Err(e) => {
                    return Err(match e.reason() {
                        TypedHeaderRejectionReason::Missing => {
                            log::debug!("request without Authorization header");
                            AuthError::MissingToken
                        }
                        _ => {
                            log::error!("Failed to extract Authorization Bearer header - {e}");
                            AuthError::InvalidToken
                        }
                    });
                }
            };

        match state.keys.verify(bearer.token()) {
            Ok(claims) => {
                log::trace!("authenticated {}", claims.email);
                Ok(claims)
            }
            Err(e) => {
                log::error!("Failed to decode claims from token - {e}");
                Err(AuthError::InvalidToken)
            }
        }
    }
}

/// Whether an `Authorization` header is present with something after its scheme.
/// Values that are not valid strings count as present so they are rejected as
/// invalid rather than missing.
fn has_credential(parts: &Parts) -> bool {
    match parts.headers.get(header::AUTHORIZATION) {
        None => false,
        Some(value) => value
            .to_str()
            .map(|value| value.split_whitespace().nth(1).is_some())
            .unwrap_or(true),
    }
}

pub mod api_response;
pub mod auth;
pub mod humanize;

pub use api_response::ErrorResponse;
pub use auth::{Credentials, JsonWebToken};
pub use humanize::{HumanizeRequest, HumanizeResponse, Temperature};

use serde::{Deserialize, Serialize};

pub type Email = String;
pub type Password = String;

/// Signup and login payload. Missing fields deserialize as empty strings so the
/// server can answer with a validation error instead of a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    email: Email,
    #[serde(default)]
    password: Password,
}

impl Credentials {
    pub fn new(email: impl AsRef<str>, pass: impl AsRef<str>) -> Self {
        Self {
            email: email.as_ref().to_string(),
            password: pass.as_ref().to_string(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_complete(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JsonWebToken {
    pub token: String,
}

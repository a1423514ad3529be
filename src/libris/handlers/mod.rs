pub mod health;
pub use self::health::health;

pub mod register;
pub use self::register::register;

pub mod login;
pub use self::login::login;

pub mod upload_auth;
pub use self::upload_auth::upload_authorization;

// common functions for the handlers
use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

/// Flat success/failure shape returned by the auth endpoints. No structured
/// error codes cross this boundary.
#[derive(ToSchema, Serialize, Debug)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
}

impl AuthResponse {
    #[must_use]
    pub fn new(success: bool, message: &str) -> Self {
        Self {
            success,
            message: message.to_string(),
        }
    }
}

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

pub fn valid_password(password: &str) -> bool {
    // raw passwords from the form, length floor only
    (8..=128).contains(&password.len())
}

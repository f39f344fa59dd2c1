//! Input validation for registration.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::PasswordConfig;
use crate::errors::{Error, Result};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .unwrap_or_else(|e| panic!("invalid email regex: {e}"))
});

const MAX_EMAIL_LENGTH: usize = 254;

pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(Error::BadRequest {
            message: "Email is required".to_string(),
        });
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(Error::BadRequest {
            message: "Email address is too long".to_string(),
        });
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err(Error::BadRequest {
            message: "Invalid email address".to_string(),
        });
    }
    Ok(())
}

pub fn validate_password(password: &str, config: &PasswordConfig) -> Result<()> {
    if password.len() < config.min_length {
        return Err(Error::BadRequest {
            message: format!(
                "Password must be at least {} characters",
                config.min_length
            ),
        });
    }
    if password.len() > config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at most {} characters", config.max_length),
        });
    }
    Ok(())
}

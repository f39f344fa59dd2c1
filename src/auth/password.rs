//! Password hashing with Argon2id.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::errors::{Error, Result};

/// Argon2id work parameters. Follows the OWASP-recommended baseline for
/// interactive logins.
#[derive(Debug, Clone, Copy)]
pub struct Argon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 19456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

fn argon2(params: Argon2Params) -> Result<Argon2<'static>> {
    let params = argon2::Params::new(params.memory_kib, params.iterations, params.parallelism, None)
        .map_err(|e| Error::Internal {
            operation: format!("building argon2 parameters: {e}"),
        })?;

    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

/// Hash a string with explicit parameters.
pub fn hash_string_with_params(input: &str, params: Argon2Params) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2(params)?
        .hash_password(input.as_bytes(), &salt)
        .map_err(|e| Error::Internal {
            operation: format!("hashing password: {e}"),
        })?;

    Ok(hash.to_string())
}

/// Hash a string with the default parameters.
pub fn hash_string(input: &str) -> Result<String> {
    hash_string_with_params(input, Argon2Params::default())
}

/// Verify an input against a stored PHC-format hash.
pub fn verify_string(input: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| Error::Internal {
        operation: format!("parsing stored password hash: {e}"),
    })?;

    Ok(Argon2::default()
        .verify_password(input.as_bytes(), &parsed)
        .is_ok())
}

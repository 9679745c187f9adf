//! Password credentials.
//!
//! Passwords are stored as Argon2id PHC strings; the salt is drawn from the
//! thread RNG and embedded in the hash, so verification needs no extra state.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::Rng;

use crate::{EngineError, ResultEngine};

pub(crate) fn hash_password(password: &str) -> ResultEngine<String> {
    if password.is_empty() {
        return Err(EngineError::InvalidInput(
            "password must not be empty".to_string(),
        ));
    }
    let salt_bytes: [u8; 16] = rand::thread_rng().r#gen();
    let salt = SaltString::encode_b64(&salt_bytes).map_err(hash_failure)?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(hash_failure)
}

/// Hashing can only fail on our side, never because of the password.
fn hash_failure(err: argon2::password_hash::Error) -> EngineError {
    EngineError::Internal(format!("cannot hash password: {err}"))
}

/// `false` for a wrong password and for a stored hash that does not parse.
pub(crate) fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

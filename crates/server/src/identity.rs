//! Bearer tokens.
//!
//! A token is `base64url(user_id:expires_at).base64url(hmac)`, where the MAC
//! is HMAC-SHA256 over the encoded payload. The signing key is fixed when the
//! [`Identity`] is built and never changes for the life of the process.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const GENERATED_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("invalid signing key")]
    InvalidKey,
    #[error("token lifetime must be between 1 and {MAX_TOKEN_TTL_HOURS} hours")]
    InvalidTtl,
    #[error("token expiry out of range")]
    ExpiryOutOfRange,
    #[error("malformed token")]
    Malformed,
    #[error("bad token signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

#[derive(Clone)]
pub struct Identity {
    mac: HmacSha256,
    ttl: Duration,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl Identity {
    /// Build from a configured secret.
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, IdentityError> {
        if secret.is_empty() {
            return Err(IdentityError::InvalidKey);
        }
        if ttl <= Duration::zero() || ttl > Duration::hours(MAX_TOKEN_TTL_HOURS) {
            return Err(IdentityError::InvalidTtl);
        }
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| IdentityError::InvalidKey)?;
        Ok(Self { mac, ttl })
    }

    /// Build with a random secret. Tokens do not survive a restart.
    pub fn generate(ttl: Duration) -> Result<Self, IdentityError> {
        let mut secret = [0u8; GENERATED_SECRET_LEN];
        rand::thread_rng().fill_bytes(&mut secret);
        Self::new(&secret, ttl)
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, IdentityError> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<String, IdentityError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or(IdentityError::ExpiryOutOfRange)?
            .timestamp();
        let payload = URL_SAFE_NO_PAD.encode(format!("{user_id}:{expires_at}"));
        let signature = URL_SAFE_NO_PAD.encode(self.sign(&payload));
        Ok(format!("{payload}.{signature}"))
    }

    pub fn verify(&self, token: &str) -> Result<Uuid, IdentityError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, IdentityError> {
        let (payload, signature) = token.split_once('.').ok_or(IdentityError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| IdentityError::Malformed)?;

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| IdentityError::BadSignature)?;

        let decoded = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| IdentityError::Malformed)?;
        let decoded = String::from_utf8(decoded).map_err(|_| IdentityError::Malformed)?;
        let (user_id, expires_at) = decoded.split_once(':').ok_or(IdentityError::Malformed)?;
        let user_id = Uuid::parse_str(user_id).map_err(|_| IdentityError::Malformed)?;
        let expires_at: i64 = expires_at.parse().map_err(|_| IdentityError::Malformed)?;

        if now.timestamp() >= expires_at {
            return Err(IdentityError::Expired);
        }
        Ok(user_id)
    }

    fn sign(&self, payload: &str) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity::new(b"test-secret", Duration::hours(24)).unwrap()
    }

    #[test]
    fn issued_tokens_verify() {
        let id = identity();
        let user = Uuid::new_v4();
        let token = id.issue(user).unwrap();
        assert_eq!(id.verify(&token), Ok(user));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let id = identity();
        let user = Uuid::new_v4();
        let issued = Utc::now() - Duration::hours(25);
        let token = id.issue_at(user, issued).unwrap();
        assert_eq!(id.verify(&token), Err(IdentityError::Expired));
        assert_eq!(
            id.verify_at(&token, issued + Duration::hours(23)),
            Ok(user)
        );
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let id = identity();
        let token = id.issue(Uuid::new_v4()).unwrap();
        let (_, signature) = token.split_once('.').unwrap();
        let forged_payload = URL_SAFE_NO_PAD.encode(format!("{}:{}", Uuid::new_v4(), i64::MAX));
        let forged = format!("{forged_payload}.{signature}");
        assert_eq!(id.verify(&forged), Err(IdentityError::BadSignature));
    }

    #[test]
    fn tokens_do_not_cross_secrets() {
        let token = identity().issue(Uuid::new_v4()).unwrap();
        let other = Identity::new(b"another-secret", Duration::hours(24)).unwrap();
        assert_eq!(other.verify(&token), Err(IdentityError::BadSignature));

        let generated = Identity::generate(Duration::hours(1)).unwrap();
        assert_eq!(generated.verify(&token), Err(IdentityError::BadSignature));
    }

    #[test]
    fn lifetimes_out_of_range_are_refused() {
        for hours in [0, -1, MAX_TOKEN_TTL_HOURS + 1, 10_000_000_000] {
            assert_eq!(
                Identity::new(b"k", Duration::hours(hours)).unwrap_err(),
                IdentityError::InvalidTtl
            );
        }
        assert!(Identity::new(b"k", Duration::hours(MAX_TOKEN_TTL_HOURS)).is_ok());
    }

    #[test]
    fn expiry_overflow_is_an_error() {
        let id = Identity::new(b"k", Duration::hours(MAX_TOKEN_TTL_HOURS)).unwrap();
        assert_eq!(
            id.issue_at(Uuid::new_v4(), DateTime::<Utc>::MAX_UTC),
            Err(IdentityError::ExpiryOutOfRange)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let id = identity();
        assert_eq!(id.verify("no-dot-here"), Err(IdentityError::Malformed));
        assert_eq!(id.verify("abc.!!!"), Err(IdentityError::Malformed));
        assert!(Identity::new(b"", Duration::hours(1)).is_err());
    }
}

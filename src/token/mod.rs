//! Symmetric bearer tokens.
//!
//! Tokens are PASETO `v4.local`: the JSON payload is encrypted with
//! XChaCha20 and authenticated with a keyed BLAKE2b MAC. The MAC is checked
//! before decryption, so a tampered token is rejected before any claim is
//! read. Every token uses a fresh random nonce.

mod error;
mod payload;

pub use error::Error;
pub use payload::TokenPayload;

use pasetors::keys::SymmetricKey;
use pasetors::token::UntrustedToken;
use pasetors::version4::{LocalToken, V4};
use pasetors::Local;
use time::{Duration, OffsetDateTime};
use tracing::debug;

/// Required symmetric key length in bytes.
pub const KEY_SIZE: usize = 32;

/// Creates and verifies tokens with the single key held by the process.
pub struct TokenCodec {
    key: SymmetricKey<V4>,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Build a codec from raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyConfiguration`] unless the key is exactly
    /// [`KEY_SIZE`] bytes.
    pub fn new(key: &[u8]) -> Result<Self, Error> {
        if key.len() != KEY_SIZE {
            return Err(Error::KeyConfiguration {
                expected: KEY_SIZE,
                len: key.len(),
            });
        }

        let key = SymmetricKey::<V4>::from(key).map_err(|_| Error::KeyConfiguration {
            expected: KEY_SIZE,
            len: key.len(),
        })?;

        Ok(Self { key })
    }

    /// Create a token for `username` that expires after `duration`.
    ///
    /// A negative duration yields a token that is already expired.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if serialization or encryption fails.
    pub fn create(
        &self,
        username: &str,
        duration: Duration,
    ) -> Result<(String, TokenPayload), Error> {
        let payload = TokenPayload::new(username, duration, OffsetDateTime::now_utc());
        let message = serde_json::to_vec(&payload).map_err(|err| Error::Encode(err.to_string()))?;
        let token = LocalToken::encrypt(&self.key, &message, None, None)
            .map_err(|err| Error::Encode(err.to_string()))?;

        Ok((token, payload))
    }

    /// Authenticate, decrypt, and check the expiry of a token.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidToken`] if the token is malformed, was produced with
    ///   another key, or was modified in any way.
    /// - [`Error::ExpiredToken`] if the token is authentic but past its expiry.
    pub fn verify(&self, token: &str) -> Result<TokenPayload, Error> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<TokenPayload, Error> {
        let untrusted = UntrustedToken::<Local, V4>::try_from(token).map_err(|err| {
            debug!("rejecting malformed token: {err}");
            Error::InvalidToken
        })?;

        let trusted = LocalToken::decrypt(&self.key, &untrusted, None, None).map_err(|err| {
            debug!("rejecting unauthenticated token: {err}");
            Error::InvalidToken
        })?;

        let payload: TokenPayload =
            serde_json::from_str(trusted.payload()).map_err(|_| Error::InvalidToken)?;

        if payload.is_expired_at(now) {
            return Err(Error::ExpiredToken);
        }

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};

    const KEY: &[u8; 32] = b"0123456789abcdef0123456789abcdef";

    fn codec() -> Result<TokenCodec> {
        Ok(TokenCodec::new(KEY)?)
    }

    #[test]
    fn rejects_short_and_long_keys() {
        for len in [0, 16, 31, 33, 64] {
            let key = vec![7u8; len];
            match TokenCodec::new(&key) {
                Err(Error::KeyConfiguration { expected, len: got }) => {
                    assert_eq!(expected, KEY_SIZE);
                    assert_eq!(got, len);
                }
                other => panic!("expected key configuration error for {len} bytes, got {other:?}"),
            }
        }
    }

    #[test]
    fn create_then_verify_keeps_subject_and_lifetime() -> Result<()> {
        let codec = codec()?;
        let duration = Duration::minutes(15);
        let (token, created) = codec.create("alice", duration)?;

        assert!(token.starts_with("v4.local."));

        let verified = codec.verify(&token)?;
        assert_eq!(verified.username, "alice");
        assert_eq!(verified.id, created.id);
        assert_eq!(verified.expired_at - verified.issued_at, duration);
        assert_eq!(verified, created);
        Ok(())
    }

    #[test]
    fn verifying_twice_yields_equal_payloads() -> Result<()> {
        let codec = codec()?;
        let (token, _) = codec.create("alice", Duration::minutes(1))?;
        assert_eq!(codec.verify(&token)?, codec.verify(&token)?);
        Ok(())
    }

    #[test]
    fn identical_inputs_produce_distinct_tokens() -> Result<()> {
        let codec = codec()?;
        let (first, _) = codec.create("alice", Duration::minutes(1))?;
        let (second, _) = codec.create("alice", Duration::minutes(1))?;
        assert_ne!(first, second);
        Ok(())
    }

    #[test]
    fn negative_duration_is_expired() -> Result<()> {
        let codec = codec()?;
        let (token, _) = codec.create("alice", -Duration::minutes(1))?;
        assert!(matches!(codec.verify(&token), Err(Error::ExpiredToken)));
        Ok(())
    }

    #[test]
    fn expiry_is_checked_against_the_given_clock() -> Result<()> {
        let codec = codec()?;
        let (token, payload) = codec.create("alice", Duration::minutes(5))?;
        assert!(codec.verify_at(&token, payload.expired_at).is_ok());
        assert!(matches!(
            codec.verify_at(&token, payload.expired_at + Duration::seconds(1)),
            Err(Error::ExpiredToken)
        ));
        Ok(())
    }

    #[test]
    fn tampered_tokens_are_invalid() -> Result<()> {
        let codec = codec()?;
        let (token, _) = codec.create("alice", Duration::minutes(1))?;
        let bytes = token.as_bytes();

        // The final base64 character may carry padding bits that decode to
        // the same bytes, so it is checked separately below.
        for index in 0..bytes.len() - 1 {
            let mut mutated = bytes.to_vec();
            mutated[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
            let mutated = String::from_utf8(mutated)?;
            match codec.verify(&mutated) {
                Err(Error::InvalidToken) => {}
                other => {
                    return Err(anyhow!(
                        "mutation at byte {index} was not rejected as invalid: {other:?}"
                    ))
                }
            }
        }

        let mut truncated = token.clone();
        truncated.pop();
        assert!(matches!(codec.verify(&truncated), Err(Error::InvalidToken)));
        Ok(())
    }

    #[test]
    fn token_from_another_key_is_invalid() -> Result<()> {
        let issuer = codec()?;
        let other = TokenCodec::new(b"fedcba9876543210fedcba9876543210")?;
        let (token, _) = issuer.create("alice", Duration::minutes(1))?;
        assert!(matches!(other.verify(&token), Err(Error::InvalidToken)));
        Ok(())
    }

    #[test]
    fn garbage_is_invalid() -> Result<()> {
        let codec = codec()?;
        for token in ["", "abc.def", "v4.local.", "v4.public.AAAA", "v2.local.AAAA"] {
            assert!(
                matches!(codec.verify(token), Err(Error::InvalidToken)),
                "{token:?} should be invalid"
            );
        }
        Ok(())
    }

    #[test]
    fn debug_does_not_leak_key() -> Result<()> {
        let codec = codec()?;
        let debug = format!("{codec:?}");
        assert!(!debug.contains("0123456789abcdef"));
        Ok(())
    }
}

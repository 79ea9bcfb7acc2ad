//! Bearer token issuance and verification.
//!
//! Tokens are compact HS256 JWTs: `base64url(header).base64url(claims).base64url(mac)`
//! with claims `{sub, iat, exp}`. The signing secret lives in [`TokenIssuer`],
//! built once from configuration.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use notesbe_core::{Error, Result, UserId};

type HmacSha256 = Hmac<Sha256>;

const HEADER: Header<'static> = Header {
    alg: "HS256",
    typ: "JWT",
};

#[derive(Debug, Serialize, Deserialize)]
struct Header<'a> {
    alg: &'a str,
    typ: &'a str,
}

/// Token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user.
    pub sub: UserId,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Reasons a presented token is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("unsupported token algorithm")]
    UnsupportedAlgorithm,
    #[error("invalid token signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

impl From<TokenError> for Error {
    fn from(e: TokenError) -> Self {
        Error::Unauthorized(e.to_string())
    }
}

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: Arc<[u8]>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenIssuer {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user_id` valid from now.
    pub fn issue(&self, user_id: UserId) -> Result<IssuedToken> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if signed at `now`.
    pub fn issue_at(&self, user_id: UserId, now: DateTime<Utc>) -> Result<IssuedToken> {
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| Error::Config(format!("token lifetime out of range: {}", e)))?;
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| Error::Config("token lifetime overflows the clock".to_string()))?;
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let header = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&HEADER)?);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let signing_input = format!("{}.{}", header, payload);
        let signature = URL_SAFE_NO_PAD.encode(self.sign(signing_input.as_bytes())?);

        Ok(IssuedToken {
            token: format!("{}.{}", signing_input, signature),
            expires_at: Utc
                .timestamp_opt(claims.exp, 0)
                .single()
                .unwrap_or(expires_at),
        })
    }

    /// Verify a token and return the user it was issued to.
    pub fn verify(&self, token: &str) -> Result<UserId> {
        Ok(self.verify_at(token, Utc::now())?.sub)
    }

    /// Verify a token against the clock reading `now`.
    pub fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<Claims, TokenError> {
        let mut parts = token.trim().splitn(3, '.');
        let (Some(header), Some(payload), Some(signature)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header_bytes = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| TokenError::Malformed)?;
        let decoded: Header<'_> =
            serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Malformed)?;
        if decoded.alg != HEADER.alg {
            return Err(TokenError::UnsupportedAlgorithm);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::BadSignature)?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;
        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn sign(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| Error::Config(format!("invalid token secret: {}", e)))?;
        mac.update(input);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret", Duration::from_secs(7200))
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = issuer();
        let issued = tokens.issue(42).unwrap();
        assert_eq!(issued.token.matches('.').count(), 2);
        assert_eq!(tokens.verify(&issued.token).unwrap(), 42);
    }

    #[test]
    fn test_claims_carry_two_hour_expiry() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let tokens = issuer();
        let issued = tokens.issue_at(7, now).unwrap();
        let claims = tokens.verify_at(&issued.token, now).unwrap();
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp - claims.iat, 7200);
        assert_eq!(issued.expires_at, now + chrono::Duration::hours(2));
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let tokens = issuer();
        let issued = tokens.issue_at(7, now).unwrap();
        let later = now + chrono::Duration::hours(2);
        assert_eq!(
            tokens.verify_at(&issued.token, later).unwrap_err(),
            TokenError::Expired
        );
    }

    #[test]
    fn test_huge_lifetime_is_config_error() {
        let tokens = TokenIssuer::new("s", Duration::from_secs(10_000_000_000_000));
        let err = tokens.issue(1).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issued = issuer().issue(1).unwrap();
        let other = TokenIssuer::new("another-secret", Duration::from_secs(7200));
        assert_eq!(
            other.verify_at(&issued.token, Utc::now()).unwrap_err(),
            TokenError::BadSignature
        );
    }

    #[test]
    fn test_tampered_claims_rejected() {
        let tokens = issuer();
        let issued = tokens.issue(1).unwrap();
        let parts: Vec<&str> = issued.token.split('.').collect();
        let forged_claims = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&Claims {
                sub: 2,
                iat: 0,
                exp: i64::MAX,
            })
            .unwrap(),
        );
        let forged = format!("{}.{}.{}", parts[0], forged_claims, parts[2]);
        assert_eq!(
            tokens.verify_at(&forged, Utc::now()).unwrap_err(),
            TokenError::BadSignature
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let tokens = issuer();
        for bad in ["", "abc", "a.b", "!!.??.##"] {
            assert_eq!(
                tokens.verify_at(bad, Utc::now()).unwrap_err(),
                TokenError::Malformed,
                "token {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_verify_maps_to_unauthorized() {
        let err = issuer().verify("nope").unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[test]
    fn test_debug_hides_secret() {
        let rendered = format!("{:?}", issuer());
        assert!(!rendered.contains("test-secret"));
    }
}

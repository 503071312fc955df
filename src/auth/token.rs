//! Bearer Token Module
//!
//! Issues and validates compact HS256 JSON Web Tokens. Nothing is recorded
//! server-side: a token is valid if its signature matches the shared secret
//! and the current time falls inside its claimed window.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::config::AuthSecret;
use crate::error::CacheError;

type HmacSha256 = Hmac<Sha256>;

/// Signing algorithm written into and required from every token header.
const ALGORITHM: &str = "HS256";

/// How long a freshly issued token stays valid.
pub const TOKEN_VALIDITY_HOURS: i64 = 24;

// == Token Error ==
/// Reasons a token could not be issued or accepted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("missing Authorization header")]
    MissingHeader,

    #[error("Authorization header does not use the Bearer scheme")]
    WrongScheme,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("signature is invalid")]
    BadSignature,

    #[error("token is expired")]
    Expired,

    #[error("token is not valid yet")]
    NotYetValid,

    #[error("token used before issued")]
    IssuedInFuture,

    #[error("could not sign token: {0}")]
    Signing(String),
}

impl From<TokenError> for CacheError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => CacheError::SigningFailure(msg),
            other => CacheError::Unauthorized(other.to_string()),
        }
    }
}

// == JOSE Header ==
#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

// == Claims ==
/// Registered time claims carried by every token, as Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issued at
    pub iat: i64,
    /// Not before
    pub nbf: i64,
    /// Expires at
    pub exp: i64,
}

impl Claims {
    /// Claims for a token issued at `now` with the standard validity window.
    pub fn issued_at(now: DateTime<Utc>) -> Self {
        let issued = now.timestamp();
        Self {
            iat: issued,
            nbf: issued,
            exp: (now + Duration::hours(TOKEN_VALIDITY_HOURS)).timestamp(),
        }
    }

    /// Checks that `now` lies within `[nbf, exp]` and is not before `iat`.
    pub fn check(&self, now: DateTime<Utc>) -> Result<(), TokenError> {
        let now = now.timestamp();
        if now > self.exp {
            return Err(TokenError::Expired);
        }
        if now < self.iat {
            return Err(TokenError::IssuedInFuture);
        }
        if now < self.nbf {
            return Err(TokenError::NotYetValid);
        }
        Ok(())
    }
}

// == Token Issuer ==
/// Signs and verifies tokens with a single shared secret.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    secret: AuthSecret,
}

impl TokenIssuer {
    /// Creates an issuer for the given secret.
    pub fn new(secret: AuthSecret) -> Self {
        Self { secret }
    }

    /// Issues a token valid from now for [`TOKEN_VALIDITY_HOURS`].
    pub fn issue(&self) -> Result<String, TokenError> {
        self.issue_at(Utc::now())
    }

    /// Issues a token as if the current time were `now`.
    pub fn issue_at(&self, now: DateTime<Utc>) -> Result<String, TokenError> {
        let header = TokenHeader {
            alg: ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        };
        let header = serde_json::to_vec(&header).map_err(|e| TokenError::Signing(e.to_string()))?;
        let claims = serde_json::to_vec(&Claims::issued_at(now))
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(claims)
        );

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
    }

    /// Validates a token against the current time.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Validates a token as if the current time were `now`.
    ///
    /// The signature is checked before the claims are parsed, so a forged
    /// payload is reported as a bad signature.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let (header_segment, claims_segment, signature_segment) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(h), Some(c), Some(s), None) => (h, c, s),
                _ => return Err(TokenError::Malformed("expected three segments".to_string())),
            };

        let header: TokenHeader = decode_segment(header_segment)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }
        if let Some(typ) = &header.typ {
            if !typ.eq_ignore_ascii_case("JWT") {
                return Err(TokenError::Malformed(format!("unexpected type {}", typ)));
            }
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_segment)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;

        // Signing input is the two encoded segments exactly as received
        let signing_input = &token[..header_segment.len() + 1 + claims_segment.len()];
        let mut mac = self.mac().map_err(|_| TokenError::BadSignature)?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: Claims = decode_segment(claims_segment)?;
        claims.check(now)?;

        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        if self.secret.as_bytes().is_empty() {
            return Err(TokenError::Signing("signing secret is empty".to_string()));
        }
        HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::Malformed(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| TokenError::Malformed(e.to_string()))
}

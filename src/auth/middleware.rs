//! Authentication Middleware
//!
//! Issues a fresh bearer token on every safe request and demands a valid one
//! on every mutating request.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use super::token::{Claims, TokenError, TokenIssuer};
use crate::config::AuthSecret;
use crate::error::CacheError;

const BEARER: &str = "Bearer";

// == Method Policy ==
/// Whether a request only reads state or may change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodClass {
    Safe,
    Mutating,
}

/// Splits request methods into safe and mutating.
///
/// Only the listed safe methods are safe; every other method, including ones
/// this server does not route, is treated as mutating.
#[derive(Debug, Clone)]
pub struct MethodPolicy {
    safe: Vec<Method>,
}

impl MethodPolicy {
    /// Policy with an explicit set of safe methods.
    pub fn with_safe_methods(methods: impl IntoIterator<Item = Method>) -> Self {
        Self {
            safe: methods.into_iter().collect(),
        }
    }

    /// Classifies a request method.
    pub fn classify(&self, method: &Method) -> MethodClass {
        if self.safe.contains(method) {
            MethodClass::Safe
        } else {
            MethodClass::Mutating
        }
    }
}

impl Default for MethodPolicy {
    fn default() -> Self {
        Self::with_safe_methods([Method::GET, Method::HEAD, Method::OPTIONS])
    }
}

// == Authenticator ==
/// Shared state of the authentication stage. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Authenticator {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    issuer: TokenIssuer,
    policy: MethodPolicy,
}

impl Authenticator {
    /// Creates an authenticator with the default method policy.
    pub fn new(secret: AuthSecret) -> Self {
        Self::with_policy(secret, MethodPolicy::default())
    }

    /// Creates an authenticator with a custom method policy.
    pub fn with_policy(secret: AuthSecret, policy: MethodPolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                issuer: TokenIssuer::new(secret),
                policy,
            }),
        }
    }

    /// The token issuer backing this authenticator.
    pub fn issuer(&self) -> &TokenIssuer {
        &self.inner.issuer
    }

    /// The method policy in force.
    pub fn policy(&self) -> &MethodPolicy {
        &self.inner.policy
    }

    /// Issues a token and renders it as an `Authorization` header value.
    pub fn issue_header(&self) -> Result<HeaderValue, TokenError> {
        let token = self.inner.issuer.issue()?;
        HeaderValue::from_str(&format!("{} {}", BEARER, token))
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Checks the first `Authorization` header for a valid bearer token.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<Claims, TokenError> {
        let value = headers
            .get(AUTHORIZATION)
            .ok_or(TokenError::MissingHeader)?
            .to_str()
            .map_err(|_| TokenError::WrongScheme)?;

        let token = value
            .strip_prefix(BEARER)
            .ok_or(TokenError::WrongScheme)?
            .trim();

        self.inner.issuer.validate(token)
    }
}

// == Middleware ==
/// Authentication stage of the request pipeline.
///
/// Safe requests always get a newly signed token appended to the response,
/// whatever the downstream outcome. Mutating requests without a valid token
/// are answered with 401 and never reach the handlers.
pub async fn authenticate(
    State(auth): State<Authenticator>,
    request: Request,
    next: Next,
) -> Response {
    match auth.policy().classify(request.method()) {
        MethodClass::Safe => {
            let header = match auth.issue_header() {
                Ok(header) => header,
                Err(e) => {
                    error!("Failed to issue token: {}", e);
                    return CacheError::from(e).into_response();
                }
            };

            let mut response = next.run(request).await;
            response.headers_mut().append(AUTHORIZATION, header);
            response
        }
        MethodClass::Mutating => match auth.authorize(request.headers()) {
            Ok(_) => next.run(request).await,
            Err(e) => {
                debug!(method = %request.method(), uri = %request.uri(), "Rejected request: {}", e);
                CacheError::from(e).into_response()
            }
        },
    }
}

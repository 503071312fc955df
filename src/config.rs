//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::fmt;

use rand::RngCore;

/// Length in bytes of a secret generated at startup.
pub const GENERATED_SECRET_LEN: usize = 32;

// == Auth Secret ==
/// Symmetric key used to sign and verify bearer tokens.
///
/// The bytes never appear in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthSecret(Vec<u8>);

impl AuthSecret {
    /// Wraps raw key bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Draws a fresh random key. Tokens signed with it die with the process.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; GENERATED_SECRET_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for AuthSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthSecret(<redacted>)")
    }
}

// == Config ==
/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Key for signing bearer tokens
    pub auth_secret: AuthSecret,
    /// True when `auth_secret` was generated rather than configured
    pub secret_generated: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `AUTH_SECRET` - token signing secret (default: random, per process)
    pub fn from_env() -> Self {
        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);

        match env::var("AUTH_SECRET").ok().filter(|v| !v.is_empty()) {
            Some(secret) => Self {
                server_port,
                auth_secret: AuthSecret::new(secret),
                secret_generated: false,
            },
            None => Self {
                server_port,
                ..Self::default()
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            auth_secret: AuthSecret::generate(),
            secret_generated: true,
        }
    }
}

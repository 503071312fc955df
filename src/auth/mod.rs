//! Auth Module
//!
//! Stateless bearer-token authentication for the request pipeline.

mod middleware;
mod token;


pub use middleware::{authenticate, Authenticator, MethodClass, MethodPolicy};
pub use token::{Claims, TokenError, TokenIssuer, TOKEN_VALIDITY_HOURS};

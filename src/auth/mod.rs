//! Password login with JWT access and refresh tokens.
//!
//! Dual-token system: short-lived access tokens authorize individual
//! requests, long-lived refresh tokens are exchanged for new access tokens.
//! Both are stateless; there is no server-side token table.

mod credentials;
mod errors;
mod gate;
mod service;
mod types;

pub use credentials::CredentialVerifier;
pub use errors::AuthFailure;
pub use gate::AuthGate;
pub use service::AuthService;
pub use types::{AccessToken, AuthenticatedUser, BEARER, TokenPair};

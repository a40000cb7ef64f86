//! Authentication result types.

use serde::Serialize;

use crate::db::User;
use crate::jwt::Claims;

/// Scheme name returned alongside issued tokens.
pub const BEARER: &str = "bearer";

/// User resolved from a verified access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Claims from the verified token
    pub claims: Claims,
    /// Directory record as of verification time
    pub user: User,
}

impl AuthenticatedUser {
    pub fn subject(&self) -> &str {
        &self.claims.sub
    }
}

/// Tokens issued on a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

/// Token issued by a refresh exchange.
#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
    /// Seconds until the access token expires
    pub expires_in: u64,
}

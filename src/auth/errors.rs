//! Authentication failure taxonomy.

use crate::jwt::DecodeError;

/// Why a login, authorization or refresh was refused.
///
/// Every variant is terminal for the request. The token variants mirror
/// [`DecodeError`] one to one so callers can tell expiry from tampering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// Unknown email or wrong password; deliberately does not say which
    InvalidCredentials,
    TokenExpired,
    TokenBadSignature,
    TokenMalformed,
    /// Token verified but its subject is no longer in the directory
    UnknownSubject,
    /// An access token presented for refresh, or the reverse
    WrongTokenType,
    /// The user directory could not be queried
    DirectoryUnavailable,
    /// Signing a new token failed
    IssuanceFailed,
}

impl AuthFailure {
    /// Stable machine-readable name.
    pub fn code(&self) -> &'static str {
        match self {
            AuthFailure::InvalidCredentials => "invalid_credentials",
            AuthFailure::TokenExpired => "token_expired",
            AuthFailure::TokenBadSignature => "token_bad_signature",
            AuthFailure::TokenMalformed => "token_malformed",
            AuthFailure::UnknownSubject => "unknown_subject",
            AuthFailure::WrongTokenType => "wrong_token_type",
            AuthFailure::DirectoryUnavailable => "directory_unavailable",
            AuthFailure::IssuanceFailed => "issuance_failed",
        }
    }
}

impl From<DecodeError> for AuthFailure {
    fn from(error: DecodeError) -> Self {
        match error {
            DecodeError::Expired => AuthFailure::TokenExpired,
            DecodeError::BadSignature => AuthFailure::TokenBadSignature,
            DecodeError::Malformed => AuthFailure::TokenMalformed,
        }
    }
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            AuthFailure::InvalidCredentials => "Invalid credentials",
            AuthFailure::TokenExpired => "Token has expired",
            AuthFailure::TokenBadSignature => "Token signature is invalid",
            AuthFailure::TokenMalformed => "Token is malformed",
            AuthFailure::UnknownSubject => "User not found",
            AuthFailure::WrongTokenType => "Wrong token type",
            AuthFailure::DirectoryUnavailable => "User directory unavailable",
            AuthFailure::IssuanceFailed => "Failed to issue token",
        };
        f.write_str(message)
    }
}

impl std::error::Error for AuthFailure {}

//! Access and refresh token issuance.

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::AuthConfig;
use crate::jwt::{Claims, EncodeError, JwtCodec, TokenType};

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The JWT token string
    pub token: String,
    /// Issued at timestamp (Unix seconds)
    pub issued_at: u64,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: u64,
    /// Token duration in seconds
    pub duration: u64,
}

/// Builds claim sets with the configured TTLs and signs them.
#[derive(Clone)]
pub struct TokenIssuer {
    codec: JwtCodec,
    clock: Arc<dyn Clock>,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig, codec: JwtCodec, clock: Arc<dyn Clock>) -> Self {
        Self {
            codec,
            clock,
            access_ttl_secs: config.access_ttl_secs(),
            refresh_ttl_secs: config.refresh_ttl_secs(),
        }
    }

    /// Issue a short-lived access token for `subject`.
    pub fn issue_access_token(&self, subject: &str) -> Result<IssuedToken, EncodeError> {
        self.issue(subject, TokenType::Access, self.access_ttl_secs)
    }

    /// Issue a long-lived refresh token for `subject`.
    pub fn issue_refresh_token(&self, subject: &str) -> Result<IssuedToken, EncodeError> {
        self.issue(subject, TokenType::Refresh, self.refresh_ttl_secs)
    }

    fn issue(
        &self,
        subject: &str,
        token_type: TokenType,
        ttl: u64,
    ) -> Result<IssuedToken, EncodeError> {
        let now = self.clock.now();
        let exp = now.saturating_add(ttl);

        let claims = Claims {
            sub: subject.to_string(),
            token_type,
            iat: now,
            exp,
        };

        let token = self.codec.encode(&claims)?;

        Ok(IssuedToken {
            token,
            issued_at: now,
            expires_at: exp,
            duration: ttl,
        })
    }
}

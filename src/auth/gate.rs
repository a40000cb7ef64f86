//! Token verification and the refresh exchange.
//!
//! Every protected operation passes through [`AuthGate::verify`] first. The
//! gate trusts a token only when the signature verifies, the expiry is still
//! ahead of the clock and the subject exists in the directory right now.
//! Nothing is cached; every call re-checks all three.

use std::sync::Arc;

use tracing::{debug, error};

use super::errors::AuthFailure;
use super::types::AuthenticatedUser;
use crate::clock::Clock;
use crate::directory::UserDirectory;
use crate::issuer::{IssuedToken, TokenIssuer};
use crate::jwt::{JwtCodec, TokenType};

pub struct AuthGate<D> {
    codec: JwtCodec,
    issuer: TokenIssuer,
    directory: Arc<D>,
    clock: Arc<dyn Clock>,
}

impl<D: UserDirectory> AuthGate<D> {
    pub fn new(
        codec: JwtCodec,
        issuer: TokenIssuer,
        directory: Arc<D>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            codec,
            issuer,
            directory,
            clock,
        }
    }

    /// Resolve an access token to the user it was issued for.
    pub async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthFailure> {
        self.verify_as(token, TokenType::Access).await
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// No password is involved and no new refresh token is issued; the
    /// presented refresh token stays valid until its own expiry.
    pub async fn refresh(&self, refresh_token: &str) -> Result<IssuedToken, AuthFailure> {
        let authenticated = self.verify_as(refresh_token, TokenType::Refresh).await?;

        self.issuer
            .issue_access_token(authenticated.subject())
            .map_err(|e| {
                error!("Failed to generate access token: {}", e);
                AuthFailure::IssuanceFailed
            })
    }

    async fn verify_as(
        &self,
        token: &str,
        expected: TokenType,
    ) -> Result<AuthenticatedUser, AuthFailure> {
        let claims = self.codec.decode(token, self.clock.now()).map_err(|e| {
            debug!(reason = %e, "Token rejected");
            AuthFailure::from(e)
        })?;

        if claims.token_type != expected {
            debug!(
                subject = %claims.sub,
                expected = expected.as_str(),
                actual = claims.token_type.as_str(),
                "Token rejected: wrong token type"
            );
            return Err(AuthFailure::WrongTokenType);
        }

        let user = self
            .directory
            .find_by_email(&claims.sub)
            .await
            .map_err(|e| {
                error!("Failed to get user: {}", e);
                AuthFailure::DirectoryUnavailable
            })?
            .ok_or_else(|| {
                debug!(subject = %claims.sub, "Token rejected: unknown subject");
                AuthFailure::UnknownSubject
            })?;

        Ok(AuthenticatedUser { claims, user })
    }
}

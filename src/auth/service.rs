//! Login, authorize and refresh, wired from one configuration.

use std::sync::Arc;

use tracing::{error, info};

use super::credentials::CredentialVerifier;
use super::errors::AuthFailure;
use super::gate::AuthGate;
use super::types::{AccessToken, AuthenticatedUser, BEARER, TokenPair};
use crate::clock::Clock;
use crate::config::AuthConfig;
use crate::directory::UserDirectory;
use crate::issuer::TokenIssuer;
use crate::jwt::{EncodeError, JwtCodec};
use crate::password::{HashError, PasswordHasher};

pub struct AuthService<D> {
    verifier: CredentialVerifier<D>,
    issuer: TokenIssuer,
    gate: AuthGate<D>,
}

impl<D: UserDirectory> AuthService<D> {
    pub fn new(
        config: &AuthConfig,
        directory: Arc<D>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, HashError> {
        let codec = JwtCodec::new(config);
        let issuer = TokenIssuer::new(config, codec.clone(), clock.clone());
        let verifier = CredentialVerifier::new(directory.clone(), hasher)?;
        let gate = AuthGate::new(codec, issuer.clone(), directory, clock);

        Ok(Self {
            verifier,
            issuer,
            gate,
        })
    }

    /// Check credentials and issue an access and refresh token pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthFailure> {
        let user = self.verifier.authenticate(email, password).await?;

        let issue_failed = |e: EncodeError| {
            error!("Failed to generate token: {}", e);
            AuthFailure::IssuanceFailed
        };
        let access = self
            .issuer
            .issue_access_token(&user.email)
            .map_err(issue_failed)?;
        let refresh = self
            .issuer
            .issue_refresh_token(&user.email)
            .map_err(issue_failed)?;

        info!(subject = %user.email, "Login succeeded");

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            token_type: BEARER,
        })
    }

    /// Resolve an access token. Call before every protected operation.
    pub async fn authorize(&self, token: &str) -> Result<AuthenticatedUser, AuthFailure> {
        self.gate.verify(token).await
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, AuthFailure> {
        let access = self.gate.refresh(refresh_token).await?;

        Ok(AccessToken {
            access_token: access.token,
            token_type: BEARER,
            expires_in: access.duration,
        })
    }
}

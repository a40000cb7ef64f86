//! Email and password verification against the user directory.

use std::sync::Arc;

use tracing::{debug, error};

use super::errors::AuthFailure;
use crate::db::User;
use crate::directory::UserDirectory;
use crate::password::{HashError, PasswordHasher};

const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-users";

pub struct CredentialVerifier<D> {
    directory: Arc<D>,
    hasher: Arc<dyn PasswordHasher>,
    /// Checked when the email is unknown so both failure paths cost one hash.
    dummy_hash: String,
}

impl<D: UserDirectory> CredentialVerifier<D> {
    pub fn new(directory: Arc<D>, hasher: Arc<dyn PasswordHasher>) -> Result<Self, HashError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        Ok(Self {
            directory,
            hasher,
            dummy_hash,
        })
    }

    /// Return the user if `password` matches the stored hash for `email`.
    ///
    /// An unknown email and a wrong password both fail with
    /// [`AuthFailure::InvalidCredentials`].
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthFailure> {
        let user = self.directory.find_by_email(email).await.map_err(|e| {
            error!("Failed to get user: {}", e);
            AuthFailure::DirectoryUnavailable
        })?;

        let Some(user) = user else {
            let _ = self.hasher.verify(password, &self.dummy_hash);
            debug!(subject = %email, reason = "unknown_user", "Login rejected");
            return Err(AuthFailure::InvalidCredentials);
        };

        match self.hasher.verify(password, &user.password_hash) {
            Ok(true) => Ok(user),
            Ok(false) => {
                debug!(subject = %email, reason = "wrong_password", "Login rejected");
                Err(AuthFailure::InvalidCredentials)
            }
            Err(e) => {
                error!(subject = %email, error = %e, "Stored password hash is unusable");
                Err(AuthFailure::InvalidCredentials)
            }
        }
    }
}

pub mod auth;
pub mod cli;
pub mod clock;
pub mod config;
pub mod db;
pub mod directory;
pub mod issuer;
pub mod jwt;
pub mod password;

pub use auth::{AccessToken, AuthFailure, AuthService, AuthenticatedUser, TokenPair};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AuthConfig, ConfigError};
pub use db::{Database, User};
pub use directory::{MemoryDirectory, UserDirectory};
pub use password::{BcryptHasher, PasswordHasher};

//! Process-wide signing and expiry configuration.
//!
//! Built once at startup and handed to each component. Nothing here changes
//! after construction, and [`AuthConfig::new`] rejects every invalid
//! combination.

use std::str::FromStr;

use jsonwebtoken::Algorithm;

/// Minimum signing secret length in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Immutable signing and TTL settings.
#[derive(Clone)]
pub struct AuthConfig {
    secret: Vec<u8>,
    algorithm: Algorithm,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
}

impl AuthConfig {
    /// Validate and build a configuration.
    ///
    /// `algorithm` is a JOSE identifier such as `"HS256"`. Only the shared-secret
    /// HMAC family is accepted since the key material is a single secret.
    pub fn new(
        secret: impl Into<Vec<u8>>,
        algorithm: &str,
        access_ttl_minutes: i64,
        refresh_ttl_hours: i64,
    ) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::SecretTooShort(secret.len()));
        }

        let algorithm = parse_algorithm(algorithm)?;

        if access_ttl_minutes <= 0 {
            return Err(ConfigError::NonPositiveTtl("access"));
        }
        if refresh_ttl_hours <= 0 {
            return Err(ConfigError::NonPositiveTtl("refresh"));
        }

        let access_ttl_secs = (access_ttl_minutes as u64).saturating_mul(60);
        let refresh_ttl_secs = (refresh_ttl_hours as u64).saturating_mul(60 * 60);

        if refresh_ttl_secs <= access_ttl_secs {
            return Err(ConfigError::RefreshNotLongerThanAccess {
                access_secs: access_ttl_secs,
                refresh_secs: refresh_ttl_secs,
            });
        }

        Ok(Self {
            secret,
            algorithm,
            access_ttl_secs,
            refresh_ttl_secs,
        })
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Access token lifetime in seconds.
    pub fn access_ttl_secs(&self) -> u64 {
        self.access_ttl_secs
    }

    /// Refresh token lifetime in seconds.
    pub fn refresh_ttl_secs(&self) -> u64 {
        self.refresh_ttl_secs
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish()
    }
}

fn parse_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
    let algorithm =
        Algorithm::from_str(name).map_err(|_| ConfigError::UnknownAlgorithm(name.to_string()))?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        _ => Err(ConfigError::UnsupportedAlgorithm(name.to_string())),
    }
}

/// Startup configuration errors. All of these are fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No signing secret was provided
    MissingSecret,
    /// Secret shorter than [`MIN_SECRET_LENGTH`]
    SecretTooShort(usize),
    /// Not a JOSE algorithm name
    UnknownAlgorithm(String),
    /// A real algorithm, but not one a shared secret can drive
    UnsupportedAlgorithm(String),
    /// Zero or negative TTL for the named token kind
    NonPositiveTtl(&'static str),
    RefreshNotLongerThanAccess { access_secs: u64, refresh_secs: u64 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingSecret => write!(f, "Signing secret is required"),
            ConfigError::SecretTooShort(len) => write!(
                f,
                "Signing secret is {} bytes, at least {} are required",
                len, MIN_SECRET_LENGTH
            ),
            ConfigError::UnknownAlgorithm(name) => write!(f, "Unknown signing algorithm: {}", name),
            ConfigError::UnsupportedAlgorithm(name) => write!(
                f,
                "Signing algorithm {} needs a key pair, use HS256, HS384 or HS512",
                name
            ),
            ConfigError::NonPositiveTtl(kind) => {
                write!(f, "The {} token TTL must be greater than zero", kind)
            }
            ConfigError::RefreshNotLongerThanAccess {
                access_secs,
                refresh_secs,
            } => write!(
                f,
                "Refresh token TTL ({}s) must be longer than access token TTL ({}s)",
                refresh_secs, access_secs
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn test_valid_config() {
        let config = AuthConfig::new(SECRET, "HS384", 15, 24).unwrap();
        assert_eq!(config.algorithm(), Algorithm::HS384);
        assert_eq!(config.access_ttl_secs(), 15 * 60);
        assert_eq!(config.refresh_ttl_secs(), 24 * 60 * 60);
        assert_eq!(config.secret(), SECRET);
    }

    #[test]
    fn test_missing_secret() {
        let result = AuthConfig::new(Vec::new(), "HS256", 15, 24);
        assert_eq!(result.unwrap_err(), ConfigError::MissingSecret);
    }

    #[test]
    fn test_short_secret() {
        let result = AuthConfig::new(&b"short"[..], "HS256", 15, 24);
        assert_eq!(result.unwrap_err(), ConfigError::SecretTooShort(5));
    }

    #[test]
    fn test_unknown_algorithm() {
        let result = AuthConfig::new(SECRET, "HS999", 15, 24);
        assert!(matches!(result, Err(ConfigError::UnknownAlgorithm(_))));
    }

    #[test]
    fn test_asymmetric_algorithm_rejected() {
        let result = AuthConfig::new(SECRET, "RS256", 15, 24);
        assert!(matches!(result, Err(ConfigError::UnsupportedAlgorithm(_))));
    }

    #[test]
    fn test_non_positive_ttls() {
        assert_eq!(
            AuthConfig::new(SECRET, "HS256", 0, 24).unwrap_err(),
            ConfigError::NonPositiveTtl("access")
        );
        assert_eq!(
            AuthConfig::new(SECRET, "HS256", 15, -1).unwrap_err(),
            ConfigError::NonPositiveTtl("refresh")
        );
    }

    #[test]
    fn test_refresh_must_outlive_access() {
        // 60 minutes == 1 hour
        let result = AuthConfig::new(SECRET, "HS256", 60, 1);
        assert!(matches!(
            result,
            Err(ConfigError::RefreshNotLongerThanAccess { .. })
        ));

        assert!(AuthConfig::new(SECRET, "HS256", 59, 1).is_ok());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AuthConfig::new(SECRET, "HS256", 15, 24).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("0123456789abcdef"));
        assert!(debug.contains("redacted"));
    }
}

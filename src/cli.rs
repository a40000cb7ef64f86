//! CLI argument parsing, validation, and startup helpers.

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{error, info};

use crate::auth::AuthService;
use crate::config::AuthConfig;
use crate::db::Database;
use crate::password::{HashError, PasswordHasher};

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "tokenauth",
    about = "Password login with JWT access and refresh tokens"
)]
pub struct Args {
    /// Path to SQLite database file
    #[arg(short, long, default_value = "tokenauth.db")]
    pub database: String,

    /// Path to file containing the signing secret. Prefer using SECRET_KEY env var instead
    #[arg(long)]
    pub secret_key_file: Option<String>,

    /// JWT signing algorithm (HS256, HS384 or HS512)
    #[arg(long, env = "ALGORITHM", default_value = "HS256")]
    pub algorithm: String,

    /// Access token lifetime in minutes
    #[arg(long, env = "ACCESS_TOKEN_EXPIRE_MINUTES", default_value = "15")]
    pub access_token_expire_minutes: i64,

    /// Refresh token lifetime in hours
    #[arg(long, env = "REFRESH_TOKEN_EXPIRE_HOURS", default_value = "24")]
    pub refresh_token_expire_hours: i64,

    /// bcrypt work factor for new password hashes
    #[arg(long, default_value_t = bcrypt::DEFAULT_COST)]
    pub bcrypt_cost: u32,

    /// Create this user on startup if it does not exist yet
    #[arg(long, env = "ADMIN_EMAIL", requires = "admin_password")]
    pub admin_email: Option<String>,

    /// Password for the startup user
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Add a user to the directory
    CreateUser {
        email: String,
        #[arg(long, env = "USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Check credentials and print an access and refresh token pair
    Login {
        email: String,
        #[arg(long, env = "USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Verify an access token and print its subject
    Authorize { token: String },
    /// Exchange a refresh token for a new access token
    Refresh { token: String },
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_writer(std::io::stderr).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Compact => tracing_subscriber::fmt()
            .compact()
            .with_writer(std::io::stderr)
            .init(),
    }
}

/// Load the signing secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_secret(secret_key_file: Option<&str>) -> Option<String> {
    if let Ok(secret) = std::env::var("SECRET_KEY") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("SECRET_KEY") };
        Some(secret)
    } else if let Some(path) = secret_key_file {
        match std::fs::read_to_string(path) {
            Ok(content) => Some(content.trim().to_string()),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read secret key file");
                None
            }
        }
    } else {
        error!(
            "Signing secret is required. Set SECRET_KEY environment variable (recommended) or use --secret-key-file"
        );
        None
    }
}

/// Build the auth configuration from validated arguments.
/// Returns None and logs an error if validation fails.
pub fn build_config(secret: String, args: &Args) -> Option<AuthConfig> {
    match AuthConfig::new(
        secret,
        &args.algorithm,
        args.access_token_expire_minutes,
        args.refresh_token_expire_hours,
    ) {
        Ok(config) => {
            info!(
                algorithm = ?config.algorithm(),
                access_ttl_secs = config.access_ttl_secs(),
                refresh_ttl_secs = config.refresh_ttl_secs(),
                "Auth configuration loaded"
            );
            Some(config)
        }
        Err(e) => {
            error!(error = %e, "Invalid auth configuration");
            None
        }
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}

/// Create the startup user unless one with that email already exists.
/// Returns None and logs an error on failure.
pub async fn seed_admin(
    db: &Database,
    hasher: &dyn PasswordHasher,
    email: &str,
    password: &str,
) -> Option<()> {
    match db.users().get_by_email(email).await {
        Ok(Some(_)) => {
            info!(email = %email, "Admin user already exists");
            Some(())
        }
        Ok(None) => create_user(db, hasher, email, password).await.ok(),
        Err(e) => {
            error!(error = %e, "Failed to check for existing admin");
            None
        }
    }
}

/// Failure to add a user to the directory.
#[derive(Debug)]
pub enum CreateUserError {
    Hash(HashError),
    Store(sqlx::Error),
}

impl std::fmt::Display for CreateUserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreateUserError::Hash(e) => write!(f, "{}", e),
            CreateUserError::Store(e) => write!(f, "Failed to store user: {}", e),
        }
    }
}

impl std::error::Error for CreateUserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CreateUserError::Hash(e) => Some(e),
            CreateUserError::Store(e) => Some(e),
        }
    }
}

async fn create_user(
    db: &Database,
    hasher: &dyn PasswordHasher,
    email: &str,
    password: &str,
) -> Result<(), CreateUserError> {
    let hash = hasher.hash(password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        CreateUserError::Hash(e)
    })?;

    db.users().create(email, &hash).await.map_err(|e| {
        error!(email = %email, error = %e, "Failed to create user");
        CreateUserError::Store(e)
    })?;

    info!(email = %email, "User created");
    Ok(())
}

/// Run one subcommand. Returns the JSON document to print on success,
/// or an error document on failure.
pub async fn run_command(
    command: &Command,
    service: &AuthService<Database>,
    db: &Database,
    hasher: &dyn PasswordHasher,
) -> Result<serde_json::Value, serde_json::Value> {
    match command {
        Command::CreateUser { email, password } => create_user(db, hasher, email, password)
            .await
            .map(|()| json!({ "email": email }))
            .map_err(|e| json!({ "error": "create_user_failed", "message": e.to_string() })),
        Command::Login { email, password } => service
            .login(email, password)
            .await
            .map(|pair| json!(pair))
            .map_err(failure_json),
        Command::Authorize { token } => service
            .authorize(token)
            .await
            .map(|user| json!({ "subject": user.subject(), "expires_at": user.claims.exp }))
            .map_err(failure_json),
        Command::Refresh { token } => service
            .refresh(token)
            .await
            .map(|access| json!(access))
            .map_err(failure_json),
    }
}

fn failure_json(failure: crate::auth::AuthFailure) -> serde_json::Value {
    json!({ "error": failure.code(), "message": failure.to_string() })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::password::BcryptHasher;

    const SECRET: &str = "test-secret-key-for-testing-0000";

    fn parse(args: &[&str]) -> Args {
        let mut full = vec!["tokenauth"];
        full.extend_from_slice(args);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_parse_login() {
        let args = parse(&[
            "--algorithm",
            "HS512",
            "--access-token-expire-minutes",
            "5",
            "login",
            "alice@example.com",
            "--password",
            "pw",
        ]);

        assert_eq!(args.algorithm, "HS512");
        assert_eq!(args.access_token_expire_minutes, 5);
        match args.command {
            Command::Login { email, password } => {
                assert_eq!(email, "alice@example.com");
                assert_eq!(password, "pw");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_build_config_rejects_bad_ttls() {
        let args = parse(&[
            "--access-token-expire-minutes",
            "120",
            "--refresh-token-expire-hours",
            "1",
            "authorize",
            "token",
        ]);
        assert!(build_config(SECRET.to_string(), &args).is_none());

        let args = parse(&["authorize", "token"]);
        assert!(build_config(SECRET.to_string(), &args).is_some());
    }

    #[tokio::test]
    async fn test_seed_admin_is_idempotent() {
        let db = Database::open(":memory:").await.unwrap();
        let hasher = BcryptHasher::new(4);

        assert!(
            seed_admin(&db, &hasher, "admin@example.com", "first")
                .await
                .is_some()
        );
        let original = db
            .users()
            .get_by_email("admin@example.com")
            .await
            .unwrap()
            .unwrap();

        assert!(
            seed_admin(&db, &hasher, "admin@example.com", "second")
                .await
                .is_some()
        );
        let after = db
            .users()
            .get_by_email("admin@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(original.password_hash, after.password_hash);
        assert!(hasher.verify("first", &after.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_run_commands() {
        let db = Database::open(":memory:").await.unwrap();
        let hasher = Arc::new(BcryptHasher::new(4));
        let config = AuthConfig::new(SECRET, "HS256", 15, 24).unwrap();
        let service = AuthService::new(
            &config,
            Arc::new(db.clone()),
            hasher.clone(),
            Arc::new(ManualClock::new(1_700_000_000)),
        )
        .unwrap();

        let create = Command::CreateUser {
            email: "alice@example.com".to_string(),
            password: "correct-pw".to_string(),
        };
        let created = run_command(&create, &service, &db, hasher.as_ref())
            .await
            .unwrap();
        assert_eq!(created["email"], "alice@example.com");

        let login = Command::Login {
            email: "alice@example.com".to_string(),
            password: "correct-pw".to_string(),
        };
        let pair = run_command(&login, &service, &db, hasher.as_ref())
            .await
            .unwrap();
        assert_eq!(pair["token_type"], "bearer");

        let authorize = Command::Authorize {
            token: pair["access_token"].as_str().unwrap().to_string(),
        };
        let identity = run_command(&authorize, &service, &db, hasher.as_ref())
            .await
            .unwrap();
        assert_eq!(identity["subject"], "alice@example.com");

        let refresh = Command::Refresh {
            token: pair["refresh_token"].as_str().unwrap().to_string(),
        };
        let access = run_command(&refresh, &service, &db, hasher.as_ref())
            .await
            .unwrap();
        assert_eq!(access["expires_in"], 15 * 60);

        let bad_login = Command::Login {
            email: "alice@example.com".to_string(),
            password: "wrong-pw".to_string(),
        };
        let error = run_command(&bad_login, &service, &db, hasher.as_ref())
            .await
            .unwrap_err();
        assert_eq!(error["error"], "invalid_credentials");

        let error = run_command(&create, &service, &db, hasher.as_ref())
            .await
            .unwrap_err();
        assert_eq!(error["error"], "create_user_failed");
        assert!(
            error["message"]
                .as_str()
                .unwrap()
                .starts_with("Failed to store user")
        );
    }
}

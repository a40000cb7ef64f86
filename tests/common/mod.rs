#![allow(dead_code)]

use std::sync::Arc;

use tokenauth::{
    AuthConfig, AuthService, BcryptHasher, Database, ManualClock, MemoryDirectory, PasswordHasher,
    User,
};

/// Fixed start time for every test clock.
pub const START: u64 = 1_700_000_000;

pub const SECRET: &[u8] = b"test-jwt-secret-for-testing-0000";

pub const ACCESS_TTL_MINUTES: i64 = 15;
pub const REFRESH_TTL_HOURS: i64 = 24;

pub fn test_config() -> AuthConfig {
    AuthConfig::new(SECRET, "HS256", ACCESS_TTL_MINUTES, REFRESH_TTL_HOURS)
        .expect("Invalid test config")
}

/// Cheapest bcrypt cost so tests stay fast.
pub fn test_hasher() -> Arc<BcryptHasher> {
    Arc::new(BcryptHasher::new(4))
}

pub struct TestContext<D> {
    pub service: AuthService<D>,
    pub directory: Arc<D>,
    pub clock: ManualClock,
    pub config: AuthConfig,
}

/// Service over an in-memory directory holding alice@example.com / correct-pw.
pub async fn setup_memory() -> TestContext<MemoryDirectory> {
    let hasher = test_hasher();
    let directory = Arc::new(MemoryDirectory::new());
    directory
        .insert(User {
            email: "alice@example.com".to_string(),
            password_hash: hasher.hash("correct-pw").expect("Failed to hash"),
        })
        .await;
    build(directory, hasher)
}

/// Service over an in-memory SQLite directory holding alice@example.com / correct-pw.
pub async fn setup_sqlite() -> TestContext<Database> {
    let hasher = test_hasher();
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    db.users()
        .create(
            "alice@example.com",
            &hasher.hash("correct-pw").expect("Failed to hash"),
        )
        .await
        .expect("Failed to create user");
    build(Arc::new(db), hasher)
}

fn build<D: tokenauth::UserDirectory>(
    directory: Arc<D>,
    hasher: Arc<BcryptHasher>,
) -> TestContext<D> {
    let clock = ManualClock::new(START);
    let config = test_config();
    let service = AuthService::new(&config, directory.clone(), hasher, Arc::new(clock.clone()))
        .expect("Failed to build service");

    TestContext {
        service,
        directory,
        clock,
        config,
    }
}

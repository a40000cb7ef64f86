//! User lookup by email.
//!
//! The authentication core only reads from the directory. [`crate::db::Database`]
//! is the persistent implementation; [`MemoryDirectory`] keeps users in process.

use std::collections::HashMap;
use std::future::Future;

use tokio::sync::RwLock;

use crate::db::User;

/// Source of user records.
pub trait UserDirectory: Send + Sync {
    type Error: std::fmt::Display + Send;

    /// Find the user with this email, or `None` if there is no such user.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send;
}

/// In-process directory keyed by email.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user.
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.email.clone(), user);
    }

    /// Remove a user. Returns whether one was present.
    pub async fn remove(&self, email: &str) -> bool {
        self.users.write().await.remove(email).is_some()
    }
}

impl UserDirectory for MemoryDirectory {
    type Error = std::convert::Infallible;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Self::Error> {
        Ok(self.users.read().await.get(email).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> User {
        User {
            email: email.to_string(),
            password_hash: "$2b$04$hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_find_remove() {
        let directory = MemoryDirectory::new();
        assert!(
            directory
                .find_by_email("alice@example.com")
                .await
                .unwrap()
                .is_none()
        );

        directory.insert(user("alice@example.com")).await;
        let found = directory
            .find_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.email, "alice@example.com");

        assert!(directory.remove("alice@example.com").await);
        assert!(!directory.remove("alice@example.com").await);
        assert!(
            directory
                .find_by_email("alice@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }
}

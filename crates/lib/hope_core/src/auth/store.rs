//! Credential store abstraction and the in-memory implementation.
//!
//! Login and `/me` only see the `CredentialStore` trait, so a database-backed
//! store can replace the seeded one without touching the auth flow.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::info;

use super::AuthError;
use super::password::hash_password_with_cost;
use crate::models::auth::{Role, UserRecord};

/// Read-only lookup of user records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find a user by exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AuthError>;

    /// Find a user by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, AuthError>;
}

/// A user to create at startup, with a plaintext password that is hashed
/// once and then dropped.
#[derive(Clone)]
pub struct SeedUser {
    pub username: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

/// Immutable user list held in memory.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: Vec<UserRecord>,
}

impl InMemoryCredentialStore {
    /// Build from already-hashed records. Usernames and ids must be unique.
    pub fn new(users: Vec<UserRecord>) -> Result<Self, AuthError> {
        let mut names = HashSet::new();
        let mut ids = HashSet::new();
        for user in &users {
            if !names.insert(user.username.as_str()) {
                return Err(AuthError::ValidationError(format!(
                    "duplicate username '{}'",
                    user.username
                )));
            }
            if !ids.insert(user.id) {
                return Err(AuthError::ValidationError(format!(
                    "duplicate user id {}",
                    user.id
                )));
            }
        }
        Ok(Self { users })
    }

    /// Hash seed passwords and assign sequential ids starting at 1.
    pub fn from_seed(seed: &[SeedUser], cost: u32) -> Result<Self, AuthError> {
        let mut users = Vec::with_capacity(seed.len());
        for (idx, s) in seed.iter().enumerate() {
            users.push(UserRecord {
                id: idx as i64 + 1,
                username: s.username.clone(),
                password_hash: hash_password_with_cost(&s.password, cost)?,
                name: s.name.clone(),
                role: s.role,
            });
        }
        let store = Self::new(users)?;
        info!(users = store.len(), "seeded credential store");
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AuthError> {
        Ok(self.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, AuthError> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }
}

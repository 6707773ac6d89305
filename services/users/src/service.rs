//! Service layer for user business logic
//!
//! The service is the only owner of persistence: handlers call it, and it
//! runs validation and hashing before delegating to the repository.

use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, UpdateUser, User};
use crate::password::{hash_password, verify_password};
use crate::repositories::UserRepository;
use crate::validation::validate_user;

/// User service
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: u64) -> UserResult<User> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(UserError::store("get user"))?
            .ok_or_else(|| UserError::NotFound(format!("No user with ID: {}", id)))
    }

    /// Get a user by exact username
    pub async fn get_user_by_username(&self, username: &str) -> UserResult<User> {
        self.repository
            .find_by_username(username)
            .await
            .map_err(UserError::store("get user by username"))?
            .ok_or_else(|| UserError::NotFound(format!("No user with username: {}", username)))
    }

    /// Validate, hash and store a new user
    ///
    /// `input.password` is the plaintext; the stored and returned record
    /// only ever carries its hash. Nothing is written when validation or
    /// hashing fails.
    pub async fn create_user(&self, mut input: NewUser) -> UserResult<User> {
        if let Err(reason) = validate_user(&input) {
            warn!("Rejected new user {}: {}", input.username, reason);
            return Err(UserError::Validation(reason));
        }

        input.password = hash_password(&input.password)?;

        let user = self
            .repository
            .insert(&input)
            .await
            .map_err(UserError::store("create user"))?;

        info!(user_id = user.id, username = %user.username, "Created user");
        Ok(user)
    }

    /// Apply the supplied fields to an existing user
    ///
    /// Field rules are not re-checked here. Only supplied, non-empty fields
    /// are written, in a single statement, so concurrent partial updates of
    /// different fields do not overwrite each other. A new password is
    /// hashed before it is stored; resubmitting the current password keeps
    /// the old hash.
    pub async fn update_user(&self, id: u64, mut input: UpdateUser) -> UserResult<User> {
        let current = self.get_user(id).await?;

        input.password = match input.password.take().filter(|p| !p.is_empty()) {
            Some(plain) if verify_password(&plain, &current.password) => None,
            Some(plain) => Some(hash_password(&plain)?),
            None => None,
        };

        let updated = self
            .repository
            .update(id, &input)
            .await
            .map_err(UserError::store("update user"))?
            .ok_or_else(|| UserError::NotFound(format!("No user with ID: {}", id)))?;

        info!(user_id = updated.id, "Updated user");
        Ok(updated)
    }

    /// Soft-delete a user; deleting an unknown ID succeeds
    pub async fn delete_user(&self, id: u64) -> UserResult<()> {
        let affected = self
            .repository
            .soft_delete(id)
            .await
            .map_err(UserError::store("delete user"))?;

        info!(user_id = id, affected, "Deleted user");
        Ok(())
    }

    /// All live users
    pub async fn get_all_users(&self) -> UserResult<Vec<User>> {
        self.repository
            .list()
            .await
            .map_err(UserError::store("list users"))
    }
}

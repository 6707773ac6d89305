//! In-memory user repository used by the service and handler tests

use async_trait::async_trait;
use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::UserRepository;
use crate::models::{NewUser, UpdateUser, User};

#[derive(Debug, Default)]
struct Table {
    next_id: u64,
    rows: Vec<User>,
}

impl Table {
    // Unique columns stay reserved by soft-deleted rows, like the SQL constraints.
    fn check_unique(&self, id: u64, username: &str, email: &str) -> DatabaseResult<()> {
        for row in self.rows.iter().filter(|row| row.id != id) {
            if row.username == username {
                return Err(DatabaseError::Constraint(format!(
                    "duplicate key value violates unique constraint \"users_username_key\": {}",
                    username
                )));
            }
            if row.email == email {
                return Err(DatabaseError::Constraint(format!(
                    "duplicate key value violates unique constraint \"users_email_key\": {}",
                    email
                )));
            }
        }
        Ok(())
    }

    fn live(&self) -> impl Iterator<Item = &User> {
        self.rows.iter().filter(|row| row.deleted_at.is_none())
    }
}

// Same column rule as the SQL update: absent and empty values keep the
// stored one.
fn apply_update(row: &mut User, changes: &UpdateUser) {
    fn merge(target: &mut String, value: &Option<String>) {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            *target = value.to_string();
        }
    }

    merge(&mut row.username, &changes.username);
    merge(&mut row.password, &changes.password);
    merge(&mut row.first_name, &changes.first_name);
    merge(&mut row.last_name, &changes.last_name);
    merge(&mut row.email, &changes.email);
    merge(&mut row.telephone, &changes.telephone);
}

/// User repository holding rows in a vector
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<Table>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows ever written, deleted ones included
    pub async fn row_count(&self) -> usize {
        self.table.read().await.rows.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: u64) -> DatabaseResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table.live().find(|row| row.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table.live().find(|row| row.username == username).cloned())
    }

    async fn insert(&self, user: &NewUser) -> DatabaseResult<User> {
        let mut table = self.table.write().await;
        table.check_unique(0, &user.username, &user.email)?;

        table.next_id += 1;
        let now = Utc::now();
        let row = User {
            id: table.next_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            username: user.username.clone(),
            password: user.password.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            telephone: user.telephone.clone(),
        };
        table.rows.push(row.clone());

        Ok(row)
    }

    async fn update(&self, id: u64, changes: &UpdateUser) -> DatabaseResult<Option<User>> {
        let mut table = self.table.write().await;

        let Some(index) = table
            .rows
            .iter()
            .position(|row| row.id == id && row.deleted_at.is_none())
        else {
            return Ok(None);
        };

        let mut merged = table.rows[index].clone();
        apply_update(&mut merged, changes);
        table.check_unique(id, &merged.username, &merged.email)?;

        merged.updated_at = Utc::now();
        table.rows[index] = merged.clone();

        Ok(Some(merged))
    }

    async fn soft_delete(&self, id: u64) -> DatabaseResult<u64> {
        let mut table = self.table.write().await;

        match table
            .rows
            .iter_mut()
            .find(|row| row.id == id && row.deleted_at.is_none())
        {
            Some(row) => {
                row.deleted_at = Some(Utc::now());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn list(&self) -> DatabaseResult<Vec<User>> {
        let table = self.table.read().await;
        Ok(table.live().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "hash".to_string(),
            first_name: "TestyUser".to_string(),
            last_name: "UserTesty".to_string(),
            email: format!("{}@example.com", username),
            telephone: "5555555555".to_string(),
        }
    }

    #[tokio::test]
    async fn test_update_keeps_omitted_and_empty_fields() {
        let repository = InMemoryUserRepository::new();
        let created = repository.insert(&new_user("testyguy")).await.unwrap();

        let updated = repository
            .update(
                created.id,
                &UpdateUser {
                    telephone: Some("6666666666".to_string()),
                    email: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.telephone, "6666666666");
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.first_name, created.first_name);
        assert_eq!(updated.password, created.password);
    }

    #[tokio::test]
    async fn test_update_to_taken_email_is_constraint_violation() {
        let repository = InMemoryUserRepository::new();
        repository.insert(&new_user("first")).await.unwrap();
        let second = repository.insert(&new_user("second")).await.unwrap();

        let err = repository
            .update(
                second.id,
                &UpdateUser {
                    email: Some("first@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DatabaseError::Constraint(_)));
        let stored = repository.find_by_id(second.id).await.unwrap().unwrap();
        assert_eq!(stored.email, "second@example.com");
    }
}

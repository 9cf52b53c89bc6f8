//! In-memory user repository for development and tests

use async_trait::async_trait;
use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::info;

use crate::{
    error::{UserError, UserResult},
    models::{User, UserPayload},
};

use super::UserRepository;

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, User>,
}

impl Table {
    /// Schema rules checked against every row except `exclude_id`
    fn check_constraints(&self, candidate: &User, exclude_id: Option<i64>) -> UserResult<()> {
        if candidate.last_name.is_empty() {
            return Err(UserError::ConstraintViolation(
                "users_last_name_not_empty".to_string(),
            ));
        }
        if candidate.first_name.is_empty() {
            return Err(UserError::ConstraintViolation(
                "users_first_name_not_empty".to_string(),
            ));
        }

        let others = self
            .rows
            .values()
            .filter(|row| Some(row.id) != exclude_id);

        for row in others {
            if row.email == candidate.email {
                return Err(UserError::ConstraintViolation("users_email_key".to_string()));
            }
            if row.phone_number == candidate.phone_number {
                return Err(UserError::ConstraintViolation(
                    "users_phone_number_key".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// In-memory implementation of [`UserRepository`]
///
/// Clones share the same table.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<Table>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, payload: UserPayload) -> UserResult<User> {
        let mut table = self.table.write().await;

        let id = table.next_id + 1;
        let user = User::new(id, payload);
        table.check_constraints(&user, None)?;

        table.next_id = id;
        table.rows.insert(user.id, user.clone());

        info!(user_id = user.id, "Inserted user");
        Ok(user)
    }

    async fn save(&self, user: &User) -> UserResult<User> {
        let mut table = self.table.write().await;

        if !table.rows.contains_key(&user.id) {
            return Err(UserError::UserNotFound(user.id));
        }
        table.check_constraints(user, Some(user.id))?;

        table.rows.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_all(&self) -> UserResult<Vec<User>> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn delete_by_id(&self, id: i64) -> UserResult<()> {
        let mut table = self.table.write().await;

        if table.rows.remove(&id).is_some() {
            info!(user_id = id, "Deleted user");
        }

        Ok(())
    }
}

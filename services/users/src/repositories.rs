//! Repositories for database operations

use async_trait::async_trait;
use common::error::DatabaseError;
use sqlx::{PgPool, error::ErrorKind};
use tracing::info;

use crate::{
    error::{UserError, UserResult},
    models::{User, UserPayload},
};

pub mod memory;

pub use memory::InMemoryUserRepository;

/// Persistence contract for user rows
///
/// Implementations enforce the schema rules themselves: non-empty names and
/// unique email/phone. A rejected write leaves prior state unchanged.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new row and assign its id
    async fn insert(&self, payload: UserPayload) -> UserResult<User>;

    /// Overwrite the row with `user.id`
    ///
    /// Fails with [`UserError::UserNotFound`] when the row no longer exists.
    async fn save(&self, user: &User) -> UserResult<User>;

    /// All rows in ascending id order
    async fn find_all(&self) -> UserResult<Vec<User>>;

    /// Find a row by id
    async fn find_by_id(&self, id: i64) -> UserResult<Option<User>>;

    /// Delete a row by id; absent rows are not an error
    async fn delete_by_id(&self, id: i64) -> UserResult<()>;
}

/// Apply the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), DatabaseError> {
    info!("Running database migrations");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))
}

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Split constraint violations off from other database failures
fn map_write_error(err: sqlx::Error) -> UserError {
    if let sqlx::Error::Database(db_err) = &err {
        if matches!(
            db_err.kind(),
            ErrorKind::UniqueViolation | ErrorKind::NotNullViolation | ErrorKind::CheckViolation
        ) {
            let detail = db_err
                .constraint()
                .map(str::to_string)
                .unwrap_or_else(|| db_err.message().to_string());
            return UserError::ConstraintViolation(detail);
        }
    }

    UserError::Database(DatabaseError::Query(err))
}

fn map_read_error(err: sqlx::Error) -> UserError {
    UserError::Database(DatabaseError::Query(err))
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, payload: UserPayload) -> UserResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (last_name, first_name, middle_name, date_of_birth, email, phone_number)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, last_name, first_name, middle_name, date_of_birth, email, phone_number, path_to_photo
            "#,
        )
        .bind(&payload.last_name)
        .bind(&payload.first_name)
        .bind(&payload.middle_name)
        .bind(payload.date_of_birth)
        .bind(&payload.email)
        .bind(&payload.phone_number)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        info!(user_id = user.id, "Inserted user");
        Ok(user)
    }

    async fn save(&self, user: &User) -> UserResult<User> {
        let saved = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET last_name = $2,
                first_name = $3,
                middle_name = $4,
                date_of_birth = $5,
                email = $6,
                phone_number = $7,
                path_to_photo = $8
            WHERE id = $1
            RETURNING id, last_name, first_name, middle_name, date_of_birth, email, phone_number, path_to_photo
            "#,
        )
        .bind(user.id)
        .bind(&user.last_name)
        .bind(&user.first_name)
        .bind(&user.middle_name)
        .bind(user.date_of_birth)
        .bind(&user.email)
        .bind(&user.phone_number)
        .bind(&user.path_to_photo)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(UserError::UserNotFound(user.id))?;

        Ok(saved)
    }

    async fn find_all(&self) -> UserResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, last_name, first_name, middle_name, date_of_birth, email, phone_number, path_to_photo
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_read_error)
    }

    async fn find_by_id(&self, id: i64) -> UserResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, last_name, first_name, middle_name, date_of_birth, email, phone_number, path_to_photo
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)
    }

    async fn delete_by_id(&self, id: i64) -> UserResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_read_error)?;

        if result.rows_affected() > 0 {
            info!(user_id = id, "Deleted user");
        }

        Ok(())
    }
}

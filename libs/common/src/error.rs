//! Custom error types for the common library
//!
//! Database failures are grouped by the phase they happen in so callers can
//! tell a bad configuration apart from a failing query.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Error raised by pool setup, queries and schema migrations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The pool could not reach the server
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// A statement failed for a reason other than a schema constraint
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Embedded migrations could not be applied
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Bad URL or pool settings
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

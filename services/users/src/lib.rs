//! Users service
//!
//! CRUD over user records plus one stored photo per user, served over HTTP
//! behind a single Basic credential.
//!
//! ```text
//! routes / middleware   <- HTTP boundary, Basic auth
//!         |
//!      service          <- orchestration of rows and photo files
//!       /     \
//! repositories  photos  <- PostgreSQL or in-memory rows, filesystem photos
//! ```
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use users::{
//!     config::AuthConfig, photos::PhotoStore, repositories::InMemoryUserRepository,
//!     routes::create_router, service::UserService, state::AppState,
//! };
//!
//! let service = UserService::new(
//!     Arc::new(InMemoryUserRepository::new()),
//!     PhotoStore::new("photos_dir"),
//! );
//! let credentials = AuthConfig {
//!     username: "admin".to_string(),
//!     password: "admin".to_string(),
//! };
//! let app = create_router(AppState::new(service, credentials, 10 * 1024 * 1024));
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod photos;
pub mod repositories;
pub mod routes;
pub mod service;
pub mod state;

pub use error::{ApiError, UserError, UserResult};
pub use models::{User, UserPayload};
pub use service::UserService;

//! PostgreSQL persistence adapters.

mod diesel_enrollment_repository;
mod diesel_user_directory;
pub mod models;
pub mod pool;
pub mod schema;

pub use diesel_enrollment_repository::DieselEnrollmentRepository;
pub use diesel_user_directory::DieselUserDirectory;
pub use pool::{DbPool, PoolConfig, PoolError};

//! HTTP inbound adapter exposing REST endpoints.

pub mod checkout;
pub mod enrollments;
pub mod error;
pub mod health;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;
pub mod webhook;

pub use error::ApiResult;

//! Payment-to-entitlement reconciliation backend for the course platform.
//!
//! The crate is organised hexagonally: `domain` holds the business services
//! and the ports they depend on, `inbound` exposes the HTTP surface, and
//! `outbound` implements the ports against Mercado Pago and PostgreSQL.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use middleware::trace::{Trace, TraceId};

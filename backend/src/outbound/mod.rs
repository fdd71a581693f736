//! Outbound adapters implementing domain ports against external systems.

pub mod mercado_pago;
pub mod persistence;

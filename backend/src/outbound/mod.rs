//! Outbound adapters implementing the domain's driven ports.
//!
//! - `memory`: in-process store backing every repository port; used when no
//!   database is configured and throughout the tests.
//! - `persistence`: PostgreSQL repositories built on Diesel.
//! - `security`: bcrypt password hashing and HS256 session tokens.

pub mod memory;
pub mod persistence;
pub mod security;

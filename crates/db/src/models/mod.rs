//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row plus the DTOs used for inserts and updates.

pub mod session;
pub mod user;

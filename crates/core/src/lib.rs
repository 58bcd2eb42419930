//! Domain primitives shared by the persistence and HTTP layers.
//!
//! Nothing in this crate performs I/O.

pub mod error;
pub mod hashing;
pub mod ids;
pub mod types;
pub mod validation;

//! Request guards.
//!
//! - [`auth::AuthUser`] -- Authenticates a request from its Bearer access token
//!   and the live session paired with it.

pub mod auth;

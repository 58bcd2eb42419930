//! Authentication primitives and use cases.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- access-token signing/verification and refresh-token issuance.
//! - [`session`] -- the session store: hashed refresh tokens, rotation, revocation.
//! - [`service`] -- sign-up, sign-in, sign-out, and session renewal.
//! - [`models`] -- request/response payloads for the auth endpoints.

pub mod jwt;
pub mod models;
pub mod password;
pub mod service;
pub mod session;

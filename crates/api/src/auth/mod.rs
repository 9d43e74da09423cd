//! Authentication primitives.
//!
//! Identity is owned by an external provider that mints HS256 access tokens
//! with the shared `JWT_SECRET`; this crate only validates them.

pub mod jwt;

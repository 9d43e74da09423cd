//! Request extractors for authentication and role checks.
//!
//! - [`auth::AuthUser`]: any caller with a valid bearer token
//! - [`rbac::RequireInstructor`]: instructors and admins
//! - [`rbac::RequireAdmin`]: admins

pub mod auth;
pub mod rbac;

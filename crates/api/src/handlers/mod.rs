//! Request handlers, one submodule per resource.
//!
//! Handlers delegate storage to the repositories in `gurmania_db`, hand the
//! loaded rows to the rules in `gurmania_core`, and map errors via
//! [`AppError`](crate::error::AppError). Helpers shared across resources
//! (course access, gating state, completion follow-ups, audit writes) live in
//! [`access`].

pub mod access;
pub mod admin;
pub mod certificates;
pub mod comments;
pub mod courses;
pub mod curriculum;
pub mod enrollment;
pub mod quizzes;
pub mod reviews;
pub mod verifications;
pub mod workshops;

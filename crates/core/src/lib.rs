//! Gurmania domain core.
//!
//! Pure business logic with no database or HTTP dependencies. The `db` and
//! `api` crates load rows, hand them to the functions in here, and act on the
//! result.

pub mod audit;
pub mod calendar;
pub mod certificate;
pub mod completion;
pub mod error;
pub mod gating;
pub mod moderation;
pub mod pagination;
pub mod quiz;
pub mod roles;
pub mod types;
pub mod verification;
pub mod workshop;

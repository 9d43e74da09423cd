//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts (validated with `validator`)
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod analytics;
pub mod audit;
pub mod certificate;
pub mod comment;
pub mod course;
pub mod course_module;
pub mod enrollment;
pub mod lesson;
pub mod progress;
pub mod quiz;
pub mod quiz_submission;
pub mod review;
pub mod user;
pub mod verification;
pub mod workshop;

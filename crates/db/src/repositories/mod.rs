//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod analytics_repo;
pub mod audit_repo;
pub mod certificate_repo;
pub mod comment_repo;
pub mod course_module_repo;
pub mod course_repo;
pub mod enrollment_repo;
pub mod lesson_repo;
pub mod outline_repo;
pub mod progress_repo;
pub mod quiz_repo;
pub mod quiz_submission_repo;
pub mod reservation_repo;
pub mod review_repo;
pub mod user_repo;
pub mod verification_repo;
pub mod workshop_repo;

pub use analytics_repo::AnalyticsRepo;
pub use audit_repo::AuditLogRepo;
pub use certificate_repo::CertificateRepo;
pub use comment_repo::CommentRepo;
pub use course_module_repo::CourseModuleRepo;
pub use course_repo::CourseRepo;
pub use enrollment_repo::EnrollmentRepo;
pub use lesson_repo::LessonRepo;
pub use outline_repo::OutlineRepo;
pub use progress_repo::ProgressRepo;
pub use quiz_repo::QuizRepo;
pub use quiz_submission_repo::QuizSubmissionRepo;
pub use reservation_repo::ReservationRepo;
pub use review_repo::ReviewRepo;
pub use user_repo::UserRepo;
pub use verification_repo::VerificationRepo;
pub use workshop_repo::WorkshopRepo;

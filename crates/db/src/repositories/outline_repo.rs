//! Loads the inputs of the gating evaluator: a course outline and one
//! learner's progress in it.

use gurmania_core::gating::{
    CourseOutline, LatestQuizResult, LearnerProgress, LessonOutline, ModuleOutline, QuizGate,
};
use gurmania_core::types::DbId;
use sqlx::{FromRow, PgPool};

use crate::repositories::{ProgressRepo, QuizSubmissionRepo};

/// One row of the flattened module/lesson/quiz join.
#[derive(Debug, FromRow)]
struct OutlineRow {
    module_id: DbId,
    lesson_id: Option<DbId>,
    quiz_id: Option<DbId>,
    passing_score: Option<i32>,
}

pub struct OutlineRepo;

impl OutlineRepo {
    /// Build the ordered outline of a course. Returns `None` when the course
    /// does not exist or is soft-deleted.
    pub async fn load(pool: &PgPool, course_id: DbId) -> Result<Option<CourseOutline>, sqlx::Error> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM courses WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(course_id)
        .fetch_one(pool)
        .await?;
        if !exists {
            return Ok(None);
        }

        let rows = sqlx::query_as::<_, OutlineRow>(
            "SELECT m.id AS module_id, l.id AS lesson_id, q.id AS quiz_id, q.passing_score
             FROM course_modules m
             LEFT JOIN lessons l ON l.module_id = m.id
             LEFT JOIN quizzes q ON q.lesson_id = l.id
             WHERE m.course_id = $1
             ORDER BY m.position, m.id, l.position, l.id",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await?;

        let mut modules: Vec<ModuleOutline> = Vec::new();
        for row in rows {
            if modules.last().map(|m| m.module_id) != Some(row.module_id) {
                modules.push(ModuleOutline {
                    module_id: row.module_id,
                    lessons: Vec::new(),
                });
            }
            let Some(lesson_id) = row.lesson_id else {
                continue;
            };
            let quiz = row.quiz_id.map(|quiz_id| QuizGate {
                quiz_id,
                passing_score: row.passing_score,
            });
            if let Some(module) = modules.last_mut() {
                module.lessons.push(LessonOutline { lesson_id, quiz });
            }
        }

        Ok(Some(CourseOutline { course_id, modules }))
    }

    /// Load a learner's completed lessons, latest quiz results, and whether
    /// they have touched the course at all.
    pub async fn load_progress(
        pool: &PgPool,
        outline: &CourseOutline,
        user_id: DbId,
    ) -> Result<LearnerProgress, sqlx::Error> {
        let completed = ProgressRepo::completed_lesson_ids(pool, user_id, outline.course_id).await?;
        let latest: Vec<LatestQuizResult> =
            QuizSubmissionRepo::latest_for_course(pool, user_id, outline.course_id)
                .await?
                .into_iter()
                .map(|row| LatestQuizResult {
                    lesson_id: row.lesson_id,
                    score: row.score,
                })
                .collect();

        let has_rows = ProgressRepo::has_any(pool, user_id, outline.course_id).await?;

        Ok(LearnerProgress::from_rows(outline, completed, &latest).with_activity(has_rows))
    }
}

//! Lesson completion rules and course completion summary.

use serde::Serialize;

use crate::error::CoreError;
use crate::gating::{ensure_lesson_accessible, CourseOutline, GatingPolicy, LearnerProgress};
use crate::quiz::compute_score_pct;
use crate::types::DbId;

/// How a lesson becomes complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionMode {
    /// The learner presses "mark complete".
    Direct,
    /// Derived from the latest quiz submission.
    QuizDerived,
}

/// Whether the learner may mark `lesson_id` complete directly.
///
/// Returns `Ok(false)` for quiz lessons (they complete by passing the quiz)
/// and [`CoreError::Locked`] when the lesson's module is still locked.
/// Enrollment is checked by the caller.
pub fn can_complete_lesson(
    outline: &CourseOutline,
    progress: &LearnerProgress,
    policy: GatingPolicy,
    lesson_id: DbId,
) -> Result<bool, CoreError> {
    ensure_lesson_accessible(outline, progress, policy, lesson_id)?;
    Ok(completion_mode(outline, lesson_id)? == CompletionMode::Direct)
}

/// The completion mode of a lesson in the outline.
pub fn completion_mode(outline: &CourseOutline, lesson_id: DbId) -> Result<CompletionMode, CoreError> {
    let (_, lesson) = outline.find_lesson(lesson_id).ok_or(CoreError::NotFound {
        entity: "Lesson",
        id: lesson_id,
    })?;
    Ok(match lesson.quiz {
        Some(_) => CompletionMode::QuizDerived,
        None => CompletionMode::Direct,
    })
}

/// Like [`can_complete_lesson`], but rejects quiz lessons with a validation
/// error instead of returning `false`.
pub fn ensure_direct_completion(
    outline: &CourseOutline,
    progress: &LearnerProgress,
    policy: GatingPolicy,
    lesson_id: DbId,
) -> Result<(), CoreError> {
    if can_complete_lesson(outline, progress, policy, lesson_id)? {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Lesson {lesson_id} has a quiz and completes when the quiz is passed"
        )))
    }
}

/// Completion summary for one learner in one course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CourseCompletion {
    pub total_lessons: usize,
    pub completed_lessons: usize,
    pub percent: i32,
    pub is_complete: bool,
}

pub fn course_completion(outline: &CourseOutline, progress: &LearnerProgress) -> CourseCompletion {
    let total_lessons = outline.lesson_count();
    let completed_lessons = outline
        .modules
        .iter()
        .flat_map(|m| m.lessons.iter())
        .filter(|l| progress.is_lesson_complete(l))
        .count();

    CourseCompletion {
        total_lessons,
        completed_lessons,
        percent: compute_score_pct(completed_lessons, total_lessons),
        is_complete: total_lessons > 0 && completed_lessons == total_lessons,
    }
}

/// Follow-up actions owed once a lesson completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompletionEffects {
    /// Issue (or confirm) the course certificate.
    pub issue_certificate: bool,
    /// Ask the learner to review the course.
    pub prompt_review: bool,
}

pub fn completion_effects(completion: &CourseCompletion, has_review: bool) -> CompletionEffects {
    if !completion.is_complete {
        return CompletionEffects::default();
    }
    CompletionEffects {
        issue_certificate: true,
        prompt_review: !has_review,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gating::{LessonOutline, ModuleOutline, QuizGate};
    use assert_matches::assert_matches;

    /// module 10: lesson 1 (no quiz), lesson 2 (quiz 20)
    /// module 11: lesson 3 (no quiz)
    fn outline() -> CourseOutline {
        CourseOutline {
            course_id: 1,
            modules: vec![
                ModuleOutline {
                    module_id: 10,
                    lessons: vec![
                        LessonOutline {
                            lesson_id: 1,
                            quiz: None,
                        },
                        LessonOutline {
                            lesson_id: 2,
                            quiz: Some(QuizGate {
                                quiz_id: 20,
                                passing_score: Some(70),
                            }),
                        },
                    ],
                },
                ModuleOutline {
                    module_id: 11,
                    lessons: vec![LessonOutline {
                        lesson_id: 3,
                        quiz: None,
                    }],
                },
            ],
        }
    }

    fn progress(completed: &[DbId], passed: &[DbId]) -> LearnerProgress {
        LearnerProgress {
            completed_lessons: completed.iter().copied().collect(),
            passed_quiz_lessons: passed.iter().copied().collect(),
            has_activity: false,
        }
    }

    #[test]
    fn quizless_lesson_completes_directly() {
        let result = can_complete_lesson(
            &outline(),
            &LearnerProgress::default(),
            GatingPolicy::QuizzesPassed,
            1,
        );
        assert_matches!(result, Ok(true));
    }

    #[test]
    fn quiz_lesson_cannot_complete_directly() {
        let p = LearnerProgress::default();
        assert_matches!(
            can_complete_lesson(&outline(), &p, GatingPolicy::QuizzesPassed, 2),
            Ok(false)
        );
        assert_matches!(
            ensure_direct_completion(&outline(), &p, GatingPolicy::QuizzesPassed, 2),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn lesson_in_locked_module_reports_locked() {
        let p = progress(&[1], &[]);
        assert_matches!(
            can_complete_lesson(&outline(), &p, GatingPolicy::QuizzesPassed, 3),
            Err(CoreError::Locked(_))
        );
    }

    #[test]
    fn completion_counts_quiz_lessons_by_pass() {
        // Lesson 2 has a completed row but no passing quiz: not counted.
        let summary = course_completion(&outline(), &progress(&[1, 2], &[]));
        assert_eq!(summary.completed_lessons, 1);
        assert_eq!(summary.percent, 33);
        assert!(!summary.is_complete);
    }

    #[test]
    fn finishing_every_lesson_completes_course() {
        let summary = course_completion(&outline(), &progress(&[1, 2, 3], &[2]));
        assert!(summary.is_complete);
        assert_eq!(summary.percent, 100);

        let effects = completion_effects(&summary, false);
        assert!(effects.issue_certificate);
        assert!(effects.prompt_review);

        let effects = completion_effects(&summary, true);
        assert!(effects.issue_certificate);
        assert!(!effects.prompt_review);
    }

    #[test]
    fn empty_course_is_never_complete() {
        let course = CourseOutline {
            course_id: 5,
            modules: vec![],
        };
        let summary = course_completion(&course, &LearnerProgress::default());
        assert!(!summary.is_complete);
        assert_eq!(completion_effects(&summary, false), CompletionEffects::default());
    }
}

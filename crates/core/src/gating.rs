//! Progressive module unlocking.
//!
//! A course is an ordered list of modules. Whether a learner may open a
//! module depends on what they achieved in the module before it. Evaluation
//! is a pure function over the course outline and the learner's progress;
//! the caller is responsible for loading both.
//!
//! Staff (admins, the course's instructor) are never gated. Callers skip
//! evaluation for them instead of passing a special progress value.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::quiz::is_passing;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

pub const POLICY_QUIZZES_PASSED: &str = "quizzes_passed";
pub const POLICY_LESSONS_COMPLETED: &str = "lessons_completed";

/// Which achievements in module `i - 1` unlock module `i`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatingPolicy {
    /// Every quiz in the previous module must be passed. Lessons without a
    /// quiz do not gate.
    #[default]
    QuizzesPassed,
    /// Every lesson in the previous module must be complete. A quiz lesson
    /// is complete only once its quiz is passed.
    LessonsCompleted,
}

impl GatingPolicy {
    /// Parse a configuration value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            POLICY_QUIZZES_PASSED => Ok(Self::QuizzesPassed),
            POLICY_LESSONS_COMPLETED => Ok(Self::LessonsCompleted),
            _ => Err(format!(
                "Invalid gating policy '{s}'. Must be one of: {POLICY_QUIZZES_PASSED}, {POLICY_LESSONS_COMPLETED}"
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QuizzesPassed => POLICY_QUIZZES_PASSED,
            Self::LessonsCompleted => POLICY_LESSONS_COMPLETED,
        }
    }
}

// ---------------------------------------------------------------------------
// Outline
// ---------------------------------------------------------------------------

/// The quiz attached to a lesson, as far as gating cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizGate {
    pub quiz_id: DbId,
    pub passing_score: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LessonOutline {
    pub lesson_id: DbId,
    pub quiz: Option<QuizGate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleOutline {
    pub module_id: DbId,
    /// Lessons in display order.
    pub lessons: Vec<LessonOutline>,
}

/// A course's modules in display order.
#[derive(Debug, Clone, Serialize)]
pub struct CourseOutline {
    pub course_id: DbId,
    pub modules: Vec<ModuleOutline>,
}

impl CourseOutline {
    /// Locate a lesson, returning its module index and outline entry.
    pub fn find_lesson(&self, lesson_id: DbId) -> Option<(usize, &LessonOutline)> {
        self.modules.iter().enumerate().find_map(|(idx, module)| {
            module
                .lessons
                .iter()
                .find(|l| l.lesson_id == lesson_id)
                .map(|lesson| (idx, lesson))
        })
    }

    /// Locate the lesson that owns a quiz.
    pub fn find_quiz(&self, quiz_id: DbId) -> Option<(usize, &LessonOutline)> {
        self.modules.iter().enumerate().find_map(|(idx, module)| {
            module
                .lessons
                .iter()
                .find(|l| l.quiz.is_some_and(|q| q.quiz_id == quiz_id))
                .map(|lesson| (idx, lesson))
        })
    }

    pub fn module_index(&self, module_id: DbId) -> Option<usize> {
        self.modules.iter().position(|m| m.module_id == module_id)
    }

    pub fn lesson_ids(&self) -> impl Iterator<Item = DbId> + '_ {
        self.modules
            .iter()
            .flat_map(|m| m.lessons.iter().map(|l| l.lesson_id))
    }

    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Learner progress
// ---------------------------------------------------------------------------

/// The latest quiz result a learner holds for a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatestQuizResult {
    pub lesson_id: DbId,
    pub score: i32,
}

/// What a learner has achieved in one course.
#[derive(Debug, Clone, Default)]
pub struct LearnerProgress {
    /// Lessons whose progress row is marked completed.
    pub completed_lessons: BTreeSet<DbId>,
    /// Lessons whose quiz the learner currently passes (latest submission).
    pub passed_quiz_lessons: BTreeSet<DbId>,
    /// The learner holds at least one progress or submission row in the
    /// course, completed or not.
    pub has_activity: bool,
}

impl LearnerProgress {
    /// Build progress from completed-lesson rows and the latest submission per
    /// quiz, judging each submission against the quiz's current passing score.
    pub fn from_rows(
        outline: &CourseOutline,
        completed_lessons: impl IntoIterator<Item = DbId>,
        latest_results: &[LatestQuizResult],
    ) -> Self {
        let passed_quiz_lessons = latest_results
            .iter()
            .filter(|r| {
                outline
                    .find_lesson(r.lesson_id)
                    .and_then(|(_, lesson)| lesson.quiz)
                    .is_some_and(|quiz| is_passing(r.score, quiz.passing_score))
            })
            .map(|r| r.lesson_id)
            .collect();

        let completed_lessons: BTreeSet<DbId> = completed_lessons.into_iter().collect();
        Self {
            has_activity: !completed_lessons.is_empty() || !latest_results.is_empty(),
            completed_lessons,
            passed_quiz_lessons,
        }
    }

    /// Mark that the learner has rows the completed/passed sets do not show,
    /// such as a viewed-but-unfinished lesson.
    pub fn with_activity(mut self, has_activity: bool) -> Self {
        self.has_activity |= has_activity;
        self
    }

    /// No progress and no submissions at all.
    pub fn is_empty(&self) -> bool {
        !self.has_activity
            && self.completed_lessons.is_empty()
            && self.passed_quiz_lessons.is_empty()
    }

    pub fn has_passed_quiz(&self, lesson_id: DbId) -> bool {
        self.passed_quiz_lessons.contains(&lesson_id)
    }

    /// Whether `lesson` counts as complete: quiz lessons by passing, the rest
    /// by their progress row.
    pub fn is_lesson_complete(&self, lesson: &LessonOutline) -> bool {
        match lesson.quiz {
            Some(_) => self.has_passed_quiz(lesson.lesson_id),
            None => self.completed_lessons.contains(&lesson.lesson_id),
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Whether the achievements in `previous` unlock the module after it.
fn unlocks_next(previous: &ModuleOutline, progress: &LearnerProgress, policy: GatingPolicy) -> bool {
    match policy {
        GatingPolicy::QuizzesPassed => previous
            .lessons
            .iter()
            .filter(|l| l.quiz.is_some())
            .all(|l| progress.has_passed_quiz(l.lesson_id)),
        GatingPolicy::LessonsCompleted => previous
            .lessons
            .iter()
            .all(|l| progress.is_lesson_complete(l)),
    }
}

/// Lock state of each module, in outline order.
///
/// The first module is never locked. Module `i` is locked when module `i - 1`
/// is itself locked or its achievements do not satisfy `policy`, so a
/// quiz-free module cannot open a path past a locked one. A learner with no
/// progress at all sees every later module locked regardless of policy.
fn lock_states<'a>(
    outline: &'a CourseOutline,
    progress: &'a LearnerProgress,
    policy: GatingPolicy,
) -> impl Iterator<Item = (DbId, bool)> + 'a {
    let fail_closed = progress.is_empty();
    let mut previous: Option<(&ModuleOutline, bool)> = None;

    outline.modules.iter().map(move |module| {
        let locked = match previous {
            None => false,
            Some((prev, prev_locked)) => {
                fail_closed || prev_locked || !unlocks_next(prev, progress, policy)
            }
        };
        previous = Some((module, locked));
        (module.module_id, locked)
    })
}

/// Compute the set of locked module ids.
pub fn locked_modules(
    outline: &CourseOutline,
    progress: &LearnerProgress,
    policy: GatingPolicy,
) -> BTreeSet<DbId> {
    lock_states(outline, progress, policy)
        .filter_map(|(module_id, locked)| locked.then_some(module_id))
        .collect()
}

/// Whether a single module is locked. Modules outside the outline report
/// unlocked; callers check membership first.
pub fn is_module_locked(
    outline: &CourseOutline,
    progress: &LearnerProgress,
    policy: GatingPolicy,
    module_id: DbId,
) -> bool {
    lock_states(outline, progress, policy)
        .find(|(id, _)| *id == module_id)
        .is_some_and(|(_, locked)| locked)
}

/// Fail with [`CoreError::Locked`] when the lesson sits in a locked module.
pub fn ensure_lesson_accessible(
    outline: &CourseOutline,
    progress: &LearnerProgress,
    policy: GatingPolicy,
    lesson_id: DbId,
) -> Result<(), CoreError> {
    let (module_idx, _) = outline.find_lesson(lesson_id).ok_or(CoreError::NotFound {
        entity: "Lesson",
        id: lesson_id,
    })?;

    let module_id = outline.modules[module_idx].module_id;
    if is_module_locked(outline, progress, policy, module_id) {
        return Err(CoreError::Locked(format!(
            "Lesson {lesson_id} is locked until the previous module is finished"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn lesson(lesson_id: DbId, quiz: Option<(DbId, Option<i32>)>) -> LessonOutline {
        LessonOutline {
            lesson_id,
            quiz: quiz.map(|(quiz_id, passing_score)| QuizGate {
                quiz_id,
                passing_score,
            }),
        }
    }

    /// Three modules:
    /// - module 100: lesson 1 (quiz 501, pass 70), lesson 2 (no quiz)
    /// - module 200: lesson 3 (quiz 503, pass 50)
    /// - module 300: lesson 4 (no quiz)
    fn outline() -> CourseOutline {
        CourseOutline {
            course_id: 9,
            modules: vec![
                ModuleOutline {
                    module_id: 100,
                    lessons: vec![lesson(1, Some((501, Some(70)))), lesson(2, None)],
                },
                ModuleOutline {
                    module_id: 200,
                    lessons: vec![lesson(3, Some((503, Some(50))))],
                },
                ModuleOutline {
                    module_id: 300,
                    lessons: vec![lesson(4, None)],
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
    fn zero_progress_locks_everything_after_first_module() {
        let locked = locked_modules(&outline(), &LearnerProgress::default(), GatingPolicy::default());
        assert_eq!(locked, BTreeSet::from([200, 300]));
    }

    #[test]
    fn zero_progress_locks_even_when_previous_module_has_no_quiz() {
        let course = CourseOutline {
            course_id: 1,
            modules: vec![
                ModuleOutline {
                    module_id: 1,
                    lessons: vec![lesson(1, None)],
                },
                ModuleOutline {
                    module_id: 2,
                    lessons: vec![lesson(2, None)],
                },
            ],
        };
        let empty = LearnerProgress::default();
        assert!(is_module_locked(&course, &empty, GatingPolicy::QuizzesPassed, 2));

        // Any row at all, even an unfinished view, lifts the fail-closed rule.
        let viewed = LearnerProgress::default().with_activity(true);
        assert!(!is_module_locked(&course, &viewed, GatingPolicy::QuizzesPassed, 2));
    }

    #[test]
    fn first_module_is_never_locked() {
        let empty = LearnerProgress::default();
        assert!(!is_module_locked(&outline(), &empty, GatingPolicy::default(), 100));
    }

    #[test]
    fn passing_quiz_unlocks_only_the_next_module() {
        let p = progress(&[1], &[1]);
        let locked = locked_modules(&outline(), &p, GatingPolicy::QuizzesPassed);
        assert!(!locked.contains(&200));
        assert!(locked.contains(&300));
    }

    #[test]
    fn lessons_without_quiz_do_not_gate_under_quiz_policy() {
        // Lesson 2 (no quiz) is not complete, but module 200 is still open.
        let p = progress(&[], &[1]);
        assert!(!is_module_locked(&outline(), &p, GatingPolicy::QuizzesPassed, 200));
    }

    #[test]
    fn lessons_completed_policy_requires_every_lesson() {
        let p = progress(&[], &[1]);
        assert!(is_module_locked(&outline(), &p, GatingPolicy::LessonsCompleted, 200));

        let p = progress(&[2], &[1]);
        assert!(!is_module_locked(&outline(), &p, GatingPolicy::LessonsCompleted, 200));
    }

    #[test]
    fn module_after_quizless_module_opens_under_quiz_policy() {
        // Module 200's quiz passed; module 300 follows and opens.
        let p = progress(&[1, 3], &[1, 3]);
        assert!(locked_modules(&outline(), &p, GatingPolicy::QuizzesPassed).is_empty());
    }

    #[test]
    fn locked_quizless_module_keeps_the_next_one_locked() {
        // Module 10's quiz failed; 20 and 30 carry no quiz.
        let course = CourseOutline {
            course_id: 4,
            modules: vec![
                ModuleOutline {
                    module_id: 10,
                    lessons: vec![lesson(1, Some((701, Some(70))))],
                },
                ModuleOutline {
                    module_id: 20,
                    lessons: vec![lesson(2, None)],
                },
                ModuleOutline {
                    module_id: 30,
                    lessons: vec![lesson(3, None)],
                },
            ],
        };
        let failed = LearnerProgress::from_rows(
            &course,
            [],
            &[LatestQuizResult {
                lesson_id: 1,
                score: 10,
            }],
        );

        let policy = GatingPolicy::QuizzesPassed;
        assert_eq!(locked_modules(&course, &failed, policy), BTreeSet::from([20, 30]));
        assert!(is_module_locked(&course, &failed, policy, 30));
        assert_matches!(
            ensure_lesson_accessible(&course, &failed, policy, 3),
            Err(CoreError::Locked(_))
        );

        let passed = LearnerProgress::from_rows(
            &course,
            [],
            &[LatestQuizResult {
                lesson_id: 1,
                score: 90,
            }],
        );
        assert!(locked_modules(&course, &passed, policy).is_empty());
    }

    #[test]
    fn failing_then_passing_submission_flips_lock() {
        let course = outline();
        let failing = LearnerProgress::from_rows(
            &course,
            [],
            &[LatestQuizResult {
                lesson_id: 1,
                score: 60,
            }],
        );
        assert!(is_module_locked(&course, &failing, GatingPolicy::QuizzesPassed, 200));

        let passing = LearnerProgress::from_rows(
            &course,
            [1],
            &[LatestQuizResult {
                lesson_id: 1,
                score: 80,
            }],
        );
        assert!(!is_module_locked(&course, &passing, GatingPolicy::QuizzesPassed, 200));
    }

    #[test]
    fn from_rows_ignores_results_for_unknown_lessons() {
        let p = LearnerProgress::from_rows(
            &outline(),
            [],
            &[LatestQuizResult {
                lesson_id: 999,
                score: 100,
            }],
        );
        assert!(p.passed_quiz_lessons.is_empty());
    }

    #[test]
    fn locked_lesson_fetch_fails_with_locked() {
        let p = progress(&[2], &[]);
        assert_matches!(
            ensure_lesson_accessible(&outline(), &p, GatingPolicy::QuizzesPassed, 3),
            Err(CoreError::Locked(_))
        );
        assert!(ensure_lesson_accessible(&outline(), &p, GatingPolicy::QuizzesPassed, 2).is_ok());
    }

    #[test]
    fn unknown_lesson_is_not_found() {
        assert_matches!(
            ensure_lesson_accessible(
                &outline(),
                &LearnerProgress::default(),
                GatingPolicy::QuizzesPassed,
                77
            ),
            Err(CoreError::NotFound { entity: "Lesson", id: 77 })
        );
    }

    #[test]
    fn policy_round_trips_through_config_strings() {
        assert_eq!(
            GatingPolicy::from_str_value("lessons_completed").unwrap(),
            GatingPolicy::LessonsCompleted
        );
        assert_eq!(GatingPolicy::QuizzesPassed.as_str(), "quizzes_passed");
        assert!(GatingPolicy::from_str_value("anything").is_err());
    }

    #[test]
    fn find_quiz_resolves_owning_lesson() {
        let course = outline();
        let (idx, lesson) = course.find_quiz(503).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(lesson.lesson_id, 3);
        assert!(course.find_quiz(1).is_none());
    }
}

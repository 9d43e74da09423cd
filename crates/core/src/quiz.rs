//! Quiz answer validation and scoring.
//!
//! Scoring is all-or-nothing per question: a question counts as correct only
//! when the selected option set equals the set of options flagged correct.
//! The caller loads the answer key from the database and passes it in; this
//! module never touches storage.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lowest accepted passing score.
pub const MIN_PASSING_SCORE: i32 = 0;

/// Highest accepted passing score.
pub const MAX_PASSING_SCORE: i32 = 100;

/// Upper bound on questions per quiz.
pub const MAX_QUESTIONS: usize = 100;

/// Upper bound on options per question.
pub const MAX_OPTIONS_PER_QUESTION: usize = 12;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Answer key for one question.
#[derive(Debug, Clone)]
pub struct QuestionKey {
    pub question_id: DbId,
    /// Every option that belongs to the question.
    pub option_ids: BTreeSet<DbId>,
    /// The subset of `option_ids` flagged correct.
    pub correct_option_ids: BTreeSet<DbId>,
}

/// Answer key for a whole quiz.
#[derive(Debug, Clone)]
pub struct QuizKey {
    pub passing_score: Option<i32>,
    pub questions: Vec<QuestionKey>,
}

/// One entry of a submitted answer sheet as it arrives over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub question_id: DbId,
    #[serde(default)]
    pub option_ids: Vec<DbId>,
}

/// Normalised answer sheet: question id to the selected option set.
pub type AnswerSheet = BTreeMap<DbId, BTreeSet<DbId>>;

/// Outcome of scoring one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizScore {
    /// Integer percentage in `0..=100`.
    pub score: i32,
    pub passed: bool,
    pub correct: usize,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Pass/fail
// ---------------------------------------------------------------------------

/// Whether `score` passes a quiz with the given passing score.
///
/// A `None` passing score means any submission passes.
pub fn is_passing(score: i32, passing_score: Option<i32>) -> bool {
    match passing_score {
        Some(threshold) => score >= threshold,
        None => true,
    }
}

/// Compute the rounded integer percentage for `correct` out of `total`.
///
/// Returns 0 if `total` is 0.
pub fn compute_score_pct(correct: usize, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    let pct = (correct as f64 / total as f64 * 100.0).round() as i32;
    pct.clamp(0, 100)
}

// ---------------------------------------------------------------------------
// Answer sheet handling
// ---------------------------------------------------------------------------

/// Collapse wire entries into an [`AnswerSheet`].
///
/// A question listed twice is malformed. Duplicate option ids within one
/// entry collapse into the set.
pub fn collect_answers(entries: &[AnswerEntry]) -> Result<AnswerSheet, CoreError> {
    let mut sheet = AnswerSheet::new();
    for entry in entries {
        let options: BTreeSet<DbId> = entry.option_ids.iter().copied().collect();
        if sheet.insert(entry.question_id, options).is_some() {
            return Err(CoreError::Validation(format!(
                "Question {} answered more than once",
                entry.question_id
            )));
        }
    }
    Ok(sheet)
}

/// Reject answer sheets that reference questions or options outside the key.
pub fn validate_answers(key: &QuizKey, answers: &AnswerSheet) -> Result<(), CoreError> {
    if key.questions.is_empty() {
        return Err(CoreError::Validation("Quiz has no questions".into()));
    }

    for (question_id, selected) in answers {
        let question = key
            .questions
            .iter()
            .find(|q| q.question_id == *question_id)
            .ok_or_else(|| {
                CoreError::Validation(format!("Question {question_id} is not part of this quiz"))
            })?;

        if let Some(stray) = selected.iter().find(|o| !question.option_ids.contains(o)) {
            return Err(CoreError::Validation(format!(
                "Option {stray} does not belong to question {question_id}"
            )));
        }
    }
    Ok(())
}

/// Validate and score an answer sheet against a quiz key.
///
/// Unanswered questions count as incorrect.
pub fn score_submission(key: &QuizKey, answers: &AnswerSheet) -> Result<QuizScore, CoreError> {
    validate_answers(key, answers)?;

    let empty = BTreeSet::new();
    let correct = key
        .questions
        .iter()
        .filter(|q| answers.get(&q.question_id).unwrap_or(&empty) == &q.correct_option_ids)
        .count();
    let total = key.questions.len();
    let score = compute_score_pct(correct, total);

    Ok(QuizScore {
        score,
        passed: is_passing(score, key.passing_score),
        correct,
        total,
    })
}

// ---------------------------------------------------------------------------
// Authoring validation
// ---------------------------------------------------------------------------

/// Validate an optional passing score.
pub fn validate_passing_score(passing_score: Option<i32>) -> Result<(), String> {
    match passing_score {
        Some(p) if !(MIN_PASSING_SCORE..=MAX_PASSING_SCORE).contains(&p) => Err(format!(
            "Passing score must be between {MIN_PASSING_SCORE} and {MAX_PASSING_SCORE}, got {p}"
        )),
        _ => Ok(()),
    }
}

/// Validate the shape of an authored question: option count and at least one
/// correct option.
pub fn validate_question_shape(option_count: usize, correct_count: usize) -> Result<(), String> {
    if option_count < 2 {
        return Err("A question needs at least 2 options".into());
    }
    if option_count > MAX_OPTIONS_PER_QUESTION {
        return Err(format!(
            "A question may have at most {MAX_OPTIONS_PER_QUESTION} options"
        ));
    }
    if correct_count == 0 {
        return Err("A question needs at least one correct option".into());
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

    fn set(ids: &[DbId]) -> BTreeSet<DbId> {
        ids.iter().copied().collect()
    }

    /// Three questions: q1 single-answer, q2 multi-answer, q3 single-answer.
    fn sample_key(passing_score: Option<i32>) -> QuizKey {
        QuizKey {
            passing_score,
            questions: vec![
                QuestionKey {
                    question_id: 1,
                    option_ids: set(&[10, 11, 12]),
                    correct_option_ids: set(&[11]),
                },
                QuestionKey {
                    question_id: 2,
                    option_ids: set(&[20, 21, 22]),
                    correct_option_ids: set(&[20, 22]),
                },
                QuestionKey {
                    question_id: 3,
                    option_ids: set(&[30, 31]),
                    correct_option_ids: set(&[30]),
                },
            ],
        }
    }

    fn all_correct() -> AnswerSheet {
        let mut sheet = AnswerSheet::new();
        sheet.insert(1, set(&[11]));
        sheet.insert(2, set(&[20, 22]));
        sheet.insert(3, set(&[30]));
        sheet
    }

    #[test]
    fn exact_answers_score_100() {
        let result = score_submission(&sample_key(Some(70)), &all_correct()).unwrap();
        assert_eq!(result.score, 100);
        assert!(result.passed);
        assert_eq!(result.correct, 3);
        assert_eq!(result.total, 3);
    }

    #[test]
    fn partial_multi_select_gets_no_credit() {
        let mut sheet = all_correct();
        sheet.insert(2, set(&[20]));
        let result = score_submission(&sample_key(Some(70)), &sheet).unwrap();
        assert_eq!(result.correct, 2);
        assert_eq!(result.score, 67);
        assert!(!result.passed);
    }

    #[test]
    fn superset_selection_is_incorrect() {
        let mut sheet = all_correct();
        sheet.insert(1, set(&[10, 11]));
        let result = score_submission(&sample_key(None), &sheet).unwrap();
        assert_eq!(result.correct, 2);
    }

    #[test]
    fn unanswered_questions_count_as_incorrect() {
        let mut sheet = AnswerSheet::new();
        sheet.insert(3, set(&[30]));
        let result = score_submission(&sample_key(Some(30)), &sheet).unwrap();
        assert_eq!(result.score, 33);
        assert!(result.passed);
    }

    #[test]
    fn null_passing_score_passes_any_submission() {
        let result = score_submission(&sample_key(None), &AnswerSheet::new()).unwrap();
        assert_eq!(result.score, 0);
        assert!(result.passed);
    }

    #[test]
    fn scoring_is_deterministic() {
        let key = sample_key(Some(50));
        let mut sheet = all_correct();
        sheet.insert(3, set(&[31]));
        let first = score_submission(&key, &sheet).unwrap();
        let second = score_submission(&key, &sheet).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_question_is_rejected() {
        let mut sheet = all_correct();
        sheet.insert(99, set(&[10]));
        assert_matches!(
            score_submission(&sample_key(None), &sheet),
            Err(CoreError::Validation(msg)) if msg.contains("99")
        );
    }

    #[test]
    fn option_from_another_question_is_rejected() {
        let mut sheet = all_correct();
        sheet.insert(1, set(&[20]));
        assert_matches!(
            score_submission(&sample_key(None), &sheet),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn empty_quiz_is_rejected() {
        let key = QuizKey {
            passing_score: None,
            questions: vec![],
        };
        assert_matches!(
            score_submission(&key, &AnswerSheet::new()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn duplicate_question_entries_are_malformed() {
        let entries = vec![
            AnswerEntry {
                question_id: 1,
                option_ids: vec![11],
            },
            AnswerEntry {
                question_id: 1,
                option_ids: vec![10],
            },
        ];
        assert_matches!(collect_answers(&entries), Err(CoreError::Validation(_)));
    }

    #[test]
    fn is_passing_boundary() {
        assert!(is_passing(70, Some(70)));
        assert!(!is_passing(69, Some(70)));
        assert!(is_passing(0, None));
    }

    #[test]
    fn compute_score_pct_rounds_half_up() {
        assert_eq!(compute_score_pct(1, 8), 13);
        assert_eq!(compute_score_pct(2, 3), 67);
        assert_eq!(compute_score_pct(0, 0), 0);
    }

    #[test]
    fn passing_score_bounds() {
        assert!(validate_passing_score(None).is_ok());
        assert!(validate_passing_score(Some(100)).is_ok());
        assert!(validate_passing_score(Some(101)).is_err());
        assert!(validate_passing_score(Some(-1)).is_err());
    }

    #[test]
    fn question_shape_requires_a_correct_option() {
        assert!(validate_question_shape(3, 1).is_ok());
        assert!(validate_question_shape(1, 1).is_err());
        assert!(validate_question_shape(3, 0).is_err());
    }
}

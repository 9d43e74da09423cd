//! Quiz, question, and option models and the authoring DTO.

use gurmania_core::quiz::{QuestionKey, QuizKey};
use gurmania_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `quizzes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Quiz {
    pub id: DbId,
    pub lesson_id: DbId,
    pub title: String,
    /// Percentage needed to pass; `None` means any submission passes.
    pub passing_score: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizQuestion {
    pub id: DbId,
    pub quiz_id: DbId,
    pub prompt: String,
    pub position: i32,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizOption {
    pub id: DbId,
    pub question_id: DbId,
    pub label: String,
    pub is_correct: bool,
    pub position: i32,
}

/// Where a quiz sits in the course tree.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct QuizLocation {
    pub quiz_id: DbId,
    pub lesson_id: DbId,
    pub module_id: DbId,
    pub course_id: DbId,
}

/// Staff view: a question with its options including correctness flags.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionWithOptions {
    #[serde(flatten)]
    pub question: QuizQuestion,
    pub options: Vec<QuizOption>,
}

/// Staff view of a whole quiz.
#[derive(Debug, Clone, Serialize)]
pub struct QuizDetail {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<QuestionWithOptions>,
}

/// Learner view of an option: no correctness flag.
#[derive(Debug, Clone, Serialize)]
pub struct PublicOption {
    pub id: DbId,
    pub label: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: DbId,
    pub prompt: String,
    pub position: i32,
    pub options: Vec<PublicOption>,
}

/// Learner view of a quiz.
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuiz {
    pub id: DbId,
    pub lesson_id: DbId,
    pub title: String,
    pub passing_score: Option<i32>,
    pub questions: Vec<PublicQuestion>,
}

impl From<QuizDetail> for PublicQuiz {
    fn from(detail: QuizDetail) -> Self {
        Self {
            id: detail.quiz.id,
            lesson_id: detail.quiz.lesson_id,
            title: detail.quiz.title,
            passing_score: detail.quiz.passing_score,
            questions: detail
                .questions
                .into_iter()
                .map(|q| PublicQuestion {
                    id: q.question.id,
                    prompt: q.question.prompt,
                    position: q.question.position,
                    options: q
                        .options
                        .into_iter()
                        .map(|o| PublicOption {
                            id: o.id,
                            label: o.label,
                            position: o.position,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Authoring DTO
// ---------------------------------------------------------------------------

/// Full replacement of a lesson's quiz. Questions and options are stored in
/// the order given.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertQuiz {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(range(min = 0, max = 100))]
    pub passing_score: Option<i32>,
    #[validate(length(min = 1, max = 100), nested)]
    pub questions: Vec<UpsertQuestion>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct UpsertQuestion {
    #[validate(length(min = 1, max = 1000))]
    pub prompt: String,
    #[validate(nested)]
    pub options: Vec<UpsertOption>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct UpsertOption {
    #[validate(length(min = 1, max = 500))]
    pub label: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl QuizDetail {
    /// Build the scoring key from the stored questions and options.
    pub fn answer_key(&self) -> QuizKey {
        QuizKey {
            passing_score: self.quiz.passing_score,
            questions: self
                .questions
                .iter()
                .map(|q| QuestionKey {
                    question_id: q.question.id,
                    option_ids: q.options.iter().map(|o| o.id).collect(),
                    correct_option_ids: q
                        .options
                        .iter()
                        .filter(|o| o.is_correct)
                        .map(|o| o.id)
                        .collect(),
                })
                .collect(),
        }
    }
}

//! Data models for quizzes, questions, answers, and attempt results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A quiz is a titled, ordered collection of questions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub question_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quiz {
    /// Create a new quiz with the given title
    pub fn new(title: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description: None,
            question_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The four supported question types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Mcq,
    FillBlank,
    TrueFalse,
    MatchFollowing,
}

/// One left-to-right pairing in a matching question.
///
/// Indices refer to positions in the question's `left_items` and
/// `right_items` lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPair {
    pub left_index: usize,
    pub right_index: usize,
}

/// Type-specific content of a question.
///
/// Serialized with a `questionType` tag alongside the variant's own fields,
/// so a question file reads as one flat object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "questionType",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum QuestionKind {
    /// Multiple choice with a single correct option
    Mcq {
        options: Vec<String>,
        /// Index into `options`
        correct_answer: usize,
        #[serde(default)]
        shuffle_options: bool,
    },
    /// Free-text answer matched against a list of accepted strings
    FillBlank {
        correct_answers: Vec<String>,
        #[serde(default)]
        case_sensitive: bool,
        /// Reserved. Present in stored data but not consulted when grading.
        #[serde(default)]
        accept_partial_match: bool,
    },
    TrueFalse {
        correct_answer: bool,
    },
    /// Match items from the left list to items on the right
    MatchFollowing {
        left_items: Vec<String>,
        right_items: Vec<String>,
        correct_pairs: Vec<MatchPair>,
        #[serde(default)]
        shuffle_items: bool,
    },
}

impl QuestionKind {
    /// The question type this content belongs to
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::Mcq { .. } => QuestionType::Mcq,
            QuestionKind::FillBlank { .. } => QuestionType::FillBlank,
            QuestionKind::TrueFalse { .. } => QuestionType::TrueFalse,
            QuestionKind::MatchFollowing { .. } => QuestionType::MatchFollowing,
        }
    }

    /// Check structural validity before the question is stored.
    ///
    /// The evaluator never rejects input while grading (a malformed answer
    /// is simply wrong), so broken question definitions are caught here.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            QuestionKind::Mcq {
                options,
                correct_answer,
                ..
            } => {
                if options.len() < 2 {
                    return Err("Multiple choice needs at least 2 options".to_string());
                }
                if *correct_answer >= options.len() {
                    return Err(format!(
                        "Correct answer index {} is out of range for {} options",
                        correct_answer,
                        options.len()
                    ));
                }
                Ok(())
            }
            QuestionKind::FillBlank {
                correct_answers, ..
            } => {
                if correct_answers.is_empty() {
                    return Err("Fill in the blank needs at least one accepted answer".to_string());
                }
                if correct_answers.iter().any(|a| a.trim().is_empty()) {
                    return Err("Accepted answers must not be blank".to_string());
                }
                Ok(())
            }
            QuestionKind::TrueFalse { .. } => Ok(()),
            QuestionKind::MatchFollowing {
                left_items,
                right_items,
                correct_pairs,
                ..
            } => {
                if left_items.is_empty() || right_items.is_empty() {
                    return Err("Matching needs items on both sides".to_string());
                }
                if correct_pairs.is_empty() {
                    return Err("Matching needs at least one correct pair".to_string());
                }
                for pair in correct_pairs {
                    if pair.left_index >= left_items.len() || pair.right_index >= right_items.len()
                    {
                        return Err(format!(
                            "Pair ({}, {}) is out of range",
                            pair.left_index, pair.right_index
                        ));
                    }
                }
                Ok(())
            }
        }
    }
}

/// A question within a quiz
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub quiz_id: Uuid,
    /// The prompt shown to the student
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Sort order within the quiz
    #[serde(default)]
    pub position: i32,
    #[serde(flatten)]
    pub kind: QuestionKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Question {
    /// Create a new question for a quiz
    pub fn new(quiz_id: Uuid, text: String, kind: QuestionKind) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            quiz_id,
            text,
            explanation: None,
            position: 0,
            kind,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A submitted answer, shaped to match one question type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Answer {
    Mcq { selected_option: usize },
    FillBlank { text: String },
    TrueFalse { value: bool },
    MatchFollowing { pairs: Vec<MatchPair> },
}

impl Answer {
    /// The question type this answer is shaped for
    pub fn question_type(&self) -> QuestionType {
        match self {
            Answer::Mcq { .. } => QuestionType::Mcq,
            Answer::FillBlank { .. } => QuestionType::FillBlank,
            Answer::TrueFalse { .. } => QuestionType::TrueFalse,
            Answer::MatchFollowing { .. } => QuestionType::MatchFollowing,
        }
    }
}

/// One answered question within an attempt.
///
/// The `correct` flag is derived by the grader; incoming values are ignored
/// and recomputed, so stored records always reflect the evaluator's verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnswer {
    pub question_id: Uuid,
    pub answer: Answer,
    #[serde(default)]
    pub correct: bool,
    /// Seconds spent on this question, when the client tracked it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_taken: Option<u32>,
}

/// Correct/total tally for one question type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCount {
    pub correct: usize,
    pub total: usize,
}

/// Per-type tallies for a scored attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeBreakdown {
    pub mcq: TypeCount,
    pub fill_blank: TypeCount,
    pub true_false: TypeCount,
    pub match_following: TypeCount,
}

impl TypeBreakdown {
    /// Tally slot for a question type
    pub fn for_type_mut(&mut self, question_type: QuestionType) -> &mut TypeCount {
        match question_type {
            QuestionType::Mcq => &mut self.mcq,
            QuestionType::FillBlank => &mut self.fill_blank,
            QuestionType::TrueFalse => &mut self.true_false,
            QuestionType::MatchFollowing => &mut self.match_following,
        }
    }
}

/// Timing stats over the answers that reported a time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingStats {
    pub total_seconds: u32,
    /// Mean seconds per timed answer, rounded to the nearest whole second
    pub average_seconds: u32,
    pub fastest_seconds: u32,
    pub slowest_seconds: u32,
}

/// Aggregate result of scoring one attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    /// Percentage correct, rounded to 2 decimal places
    pub score: f64,
    pub correct_count: usize,
    pub total_count: usize,
    pub breakdown: TypeBreakdown,
    pub timing: TimingStats,
}

/// A completed, graded run through a quiz
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: Uuid,
    pub quiz_id: Uuid,
    /// Graded answers, in the order they were submitted
    pub answers: Vec<QuestionAnswer>,
    pub result: ScoreResult,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

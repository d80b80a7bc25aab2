//! Storage operations for quizzes
//!
//! Directory structure:
//! ```text
//! {data_dir}/quizzes/
//! ├── quizzes.json              # Array of all quizzes
//! ├── questions/
//! │   └── {question-id}.json    # Individual question files
//! └── attempts/
//!     └── {attempt-id}.json     # Graded attempt records
//! ```

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::models::*;
use super::scoring;

#[derive(Error, Debug)]
pub enum QuizStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Quiz not found: {0}")]
    QuizNotFound(Uuid),

    #[error("Question not found: {0}")]
    QuestionNotFound(Uuid),

    #[error("Attempt not found: {0}")]
    AttemptNotFound(Uuid),

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),
}

pub type Result<T> = std::result::Result<T, QuizStorageError>;

/// Storage manager for quizzes, questions, and attempts
pub struct QuizStorage {
    /// Quizzes directory (e.g., ~/.local/share/mneme/quizzes)
    quizzes_dir: PathBuf,
}

impl QuizStorage {
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        let quizzes_dir = data_dir.join("quizzes");
        fs::create_dir_all(&quizzes_dir)?;

        let storage = Self { quizzes_dir };
        fs::create_dir_all(storage.questions_dir())?;
        fs::create_dir_all(storage.attempts_dir())?;

        Ok(storage)
    }

    /// Get the quizzes.json path
    fn quizzes_path(&self) -> PathBuf {
        self.quizzes_dir.join("quizzes.json")
    }

    /// Get the questions directory
    fn questions_dir(&self) -> PathBuf {
        self.quizzes_dir.join("questions")
    }

    /// Get the attempts directory
    fn attempts_dir(&self) -> PathBuf {
        self.quizzes_dir.join("attempts")
    }

    /// Get the path for a specific question
    fn question_path(&self, question_id: Uuid) -> PathBuf {
        self.questions_dir().join(format!("{}.json", question_id))
    }

    /// Get the path for a specific attempt
    fn attempt_path(&self, attempt_id: Uuid) -> PathBuf {
        self.attempts_dir().join(format!("{}.json", attempt_id))
    }

    // ==================== Quiz Operations ====================

    /// List all quizzes, sorted by title
    pub fn list_quizzes(&self) -> Result<Vec<Quiz>> {
        let quizzes_path = self.quizzes_path();
        if !quizzes_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&quizzes_path)?;
        let mut quizzes: Vec<Quiz> = serde_json::from_str(&content)?;
        quizzes.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(quizzes)
    }

    /// Get a specific quiz
    pub fn get_quiz(&self, quiz_id: Uuid) -> Result<Quiz> {
        let quizzes = self.list_quizzes()?;
        quizzes
            .into_iter()
            .find(|q| q.id == quiz_id)
            .ok_or(QuizStorageError::QuizNotFound(quiz_id))
    }

    /// Create a new quiz
    pub fn create_quiz(&self, title: String, description: Option<String>) -> Result<Quiz> {
        let mut quiz = Quiz::new(title);
        quiz.description = description;

        let mut quizzes = self.list_quizzes()?;
        quizzes.push(quiz.clone());
        self.save_quizzes(&quizzes)?;

        Ok(quiz)
    }

    /// Update a quiz
    pub fn update_quiz(&self, quiz: &Quiz) -> Result<()> {
        let mut quizzes = self.list_quizzes()?;
        let pos = quizzes
            .iter()
            .position(|q| q.id == quiz.id)
            .ok_or(QuizStorageError::QuizNotFound(quiz.id))?;

        quizzes[pos] = quiz.clone();
        self.save_quizzes(&quizzes)?;

        Ok(())
    }

    /// Delete a quiz along with its questions and attempts
    pub fn delete_quiz(&self, quiz_id: Uuid) -> Result<()> {
        for question in self.list_questions(quiz_id)? {
            let path = self.question_path(question.id);
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        for attempt in self.list_attempts(quiz_id)? {
            let path = self.attempt_path(attempt.id);
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }

        let mut quizzes = self.list_quizzes()?;
        quizzes.retain(|q| q.id != quiz_id);
        self.save_quizzes(&quizzes)?;

        Ok(())
    }

    fn save_quizzes(&self, quizzes: &[Quiz]) -> Result<()> {
        fs::write(self.quizzes_path(), serde_json::to_string_pretty(quizzes)?)?;
        Ok(())
    }

    /// Refresh the stored question count for a quiz
    fn update_quiz_question_count(&self, quiz_id: Uuid) -> Result<()> {
        let mut quiz = self.get_quiz(quiz_id)?;
        quiz.question_count = self.list_questions(quiz_id)?.len();
        quiz.updated_at = Utc::now();
        self.update_quiz(&quiz)?;
        Ok(())
    }

    // ==================== Question Operations ====================

    /// List all questions in a quiz, in position order
    pub fn list_questions(&self, quiz_id: Uuid) -> Result<Vec<Question>> {
        let questions_dir = self.questions_dir();
        if !questions_dir.exists() {
            return Ok(Vec::new());
        }

        let mut questions = Vec::new();
        for entry in fs::read_dir(&questions_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                let content = fs::read_to_string(&path)?;
                let question: Question = serde_json::from_str(&content)?;
                if question.quiz_id == quiz_id {
                    questions.push(question);
                }
            }
        }

        questions.sort_by(|a, b| a.position.cmp(&b.position));
        Ok(questions)
    }

    /// Get a specific question
    pub fn get_question(&self, question_id: Uuid) -> Result<Question> {
        let question_path = self.question_path(question_id);
        if !question_path.exists() {
            return Err(QuizStorageError::QuestionNotFound(question_id));
        }

        let content = fs::read_to_string(&question_path)?;
        let question: Question = serde_json::from_str(&content)?;
        Ok(question)
    }

    /// Add a question to a quiz
    pub fn add_question(
        &self,
        quiz_id: Uuid,
        text: String,
        explanation: Option<String>,
        kind: QuestionKind,
    ) -> Result<Question> {
        self.get_quiz(quiz_id)?;
        kind.validate().map_err(QuizStorageError::InvalidQuestion)?;

        // Append at the end of the quiz
        let position = self.list_questions(quiz_id)?.len() as i32;

        let mut question = Question::new(quiz_id, text, kind);
        question.explanation = explanation;
        question.position = position;

        fs::write(
            self.question_path(question.id),
            serde_json::to_string_pretty(&question)?,
        )?;
        self.update_quiz_question_count(quiz_id)?;

        Ok(question)
    }

    /// Update a question
    pub fn update_question(&self, question: &Question) -> Result<()> {
        let question_path = self.question_path(question.id);
        if !question_path.exists() {
            return Err(QuizStorageError::QuestionNotFound(question.id));
        }
        question
            .kind
            .validate()
            .map_err(QuizStorageError::InvalidQuestion)?;

        fs::write(question_path, serde_json::to_string_pretty(question)?)?;
        Ok(())
    }

    /// Delete a question
    pub fn delete_question(&self, question_id: Uuid) -> Result<()> {
        let question = self.get_question(question_id)?;
        let quiz_id = question.quiz_id;

        fs::remove_file(self.question_path(question_id))?;
        self.update_quiz_question_count(quiz_id)?;

        Ok(())
    }

    // ==================== Attempt Operations ====================

    /// Grade a set of answers against a quiz and store the attempt.
    ///
    /// Returns the stored attempt with every answer's `correct` flag
    /// recomputed and the aggregate result filled in.
    pub fn record_attempt(
        &self,
        quiz_id: Uuid,
        answers: Vec<QuestionAnswer>,
        started_at: DateTime<Utc>,
    ) -> Result<QuizAttempt> {
        self.get_quiz(quiz_id)?;
        let questions = self.list_questions(quiz_id)?;

        let graded = scoring::grade(&questions, &answers);
        let result = scoring::score_quiz(&questions, &graded);

        let attempt = QuizAttempt {
            id: Uuid::new_v4(),
            quiz_id,
            answers: graded,
            result,
            started_at,
            completed_at: Utc::now(),
        };

        fs::write(
            self.attempt_path(attempt.id),
            serde_json::to_string_pretty(&attempt)?,
        )?;

        Ok(attempt)
    }

    /// List attempts for a quiz, most recent first.
    ///
    /// Unreadable attempt files are skipped with a warning so one corrupt
    /// record does not hide the rest of the history.
    pub fn list_attempts(&self, quiz_id: Uuid) -> Result<Vec<QuizAttempt>> {
        let attempts_dir = self.attempts_dir();
        if !attempts_dir.exists() {
            return Ok(Vec::new());
        }

        let mut attempts = Vec::new();
        for entry in fs::read_dir(&attempts_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                let content = fs::read_to_string(&path)?;
                match serde_json::from_str::<QuizAttempt>(&content) {
                    Ok(attempt) => {
                        if attempt.quiz_id == quiz_id {
                            attempts.push(attempt);
                        }
                    }
                    Err(e) => {
                        log::warn!("Failed to load attempt from {:?}: {}", path, e);
                    }
                }
            }
        }

        attempts.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(attempts)
    }

    /// Get a specific attempt
    pub fn get_attempt(&self, attempt_id: Uuid) -> Result<QuizAttempt> {
        let attempt_path = self.attempt_path(attempt_id);
        if !attempt_path.exists() {
            return Err(QuizStorageError::AttemptNotFound(attempt_id));
        }

        let content = fs::read_to_string(&attempt_path)?;
        let attempt: QuizAttempt = serde_json::from_str(&content)?;
        Ok(attempt)
    }

    /// Delete an attempt
    pub fn delete_attempt(&self, attempt_id: Uuid) -> Result<()> {
        let attempt_path = self.attempt_path(attempt_id);
        if !attempt_path.exists() {
            return Err(QuizStorageError::AttemptNotFound(attempt_id));
        }

        fs::remove_file(&attempt_path)?;
        Ok(())
    }
}

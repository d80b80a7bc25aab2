//! Mneme - quiz scoring and spaced repetition study engine
//!
//! Mneme is the data and computation core of a study app. It covers two
//! areas:
//!
//! - **Quizzes**: typed questions (multiple choice, fill in the blank,
//!   true/false, matching), an answer evaluator, score aggregation with
//!   per-type breakdowns and timing stats, and attempt history.
//! - **Flashcards**: decks and cards with an SM-2 family spaced repetition
//!   scheduler driven by correctness and response speed.
//!
//! Everything persists as plain JSON files under a data directory. Scoring
//! and scheduling are pure functions layered on top of that storage, so
//! grading an attempt or previewing a review never touches the clock or the
//! filesystem on its own.

use std::path::PathBuf;

pub mod flashcards;
pub mod quizzes;

/// Default data directory for mneme (e.g. `~/.local/share/mneme` on Linux)
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("mneme"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_data_dir_ends_with_app_name() {
        if let Some(dir) = default_data_dir() {
            assert!(dir.ends_with("mneme"));
        }
    }
}

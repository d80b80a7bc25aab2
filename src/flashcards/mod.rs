//! Flashcard and spaced repetition system for mneme
//!
//! This module provides:
//! - Deck and card management
//! - An SM-2 family scheduler driven by correctness and response speed
//! - Review state tracking with per-card history
//! - Study statistics (due counts, daily totals, streaks)

pub mod algorithm;
pub mod models;
pub mod storage;

pub use algorithm::{calculate_next_review, quality_score, ReviewOutcome};
pub use models::*;
pub use storage::{StudyStorage, StudyStorageError};

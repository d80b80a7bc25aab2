//! Quiz system for mneme
//!
//! This module provides:
//! - Quiz and question management with four question types
//! - A pure answer evaluator and attempt scorer
//! - Per-type score breakdowns and timing statistics
//! - Persistent attempt history

pub mod models;
pub mod scoring;
pub mod storage;

pub use models::*;
pub use scoring::{grade, is_correct, score_quiz};
pub use storage::{QuizStorage, QuizStorageError};

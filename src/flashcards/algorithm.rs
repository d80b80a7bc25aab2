//! SM-2 family spaced repetition scheduler
//!
//! Computes review intervals from a card's state and a quality grade
//! derived from answer correctness and response speed.
//!
//! Quality grades (0-5):
//! - 0: Incorrect and slow, memory gone
//! - 1: Incorrect but answered quickly
//! - 2: Not produced by the grader, treated as a failure
//! - 3: Correct but slow
//! - 4: Correct after some hesitation
//! - 5: Correct and fast
//!
//! Cards carry a difficulty in [0.0, 1.0] rather than a raw SM-2 ease
//! factor: 0.0 is easiest, 1.0 hardest. Difficulty maps linearly onto the
//! classic ease range, so the standard SM-2 ease adjustment applies after
//! rescaling into that range.

use chrono::{DateTime, Duration, Utc};

use super::models::CardState;

/// Easiest difficulty a card can reach
pub const MIN_DIFFICULTY: f64 = 0.0;
/// Hardest difficulty a card can reach
pub const MAX_DIFFICULTY: f64 = 1.0;
/// Difficulty assigned to a card before its first review
pub const DEFAULT_DIFFICULTY: f64 = 0.3;

/// Ease factor at difficulty 0.0
const MAX_EASE: f64 = 2.5;
/// Ease factor at difficulty 1.0 (the SM-2 floor)
const MIN_EASE: f64 = 1.3;

/// Quality at or above this counts as a successful recall
pub const PASSING_QUALITY: u8 = 3;

/// Interval after the first successful review, in days
const FIRST_INTERVAL: u32 = 1;
/// Interval after the second successful review, in days
const SECOND_INTERVAL: u32 = 6;
/// Interval after a failed review, in days
const RELEARN_INTERVAL: u32 = 1;
/// Longest interval the scheduler will produce, in days
pub const MAX_INTERVAL: u32 = 365;

/// Correct answers faster than this count as perfect recall, in ms
const FAST_RESPONSE_MS: u64 = 3_000;
/// Answers slower than this count as hesitant, in ms
const SLOW_RESPONSE_MS: u64 = 10_000;

/// Result of scheduling the next review for a card
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    /// Updated difficulty, clamped to [0.0, 1.0]
    pub difficulty: f64,
    /// Days until the next review
    pub interval_days: u32,
    pub next_review: DateTime<Utc>,
    pub review_count: u32,
    pub correct_count: u32,
    /// Whether the quality grade counted as a successful recall
    pub passed: bool,
}

/// Derive a 0-5 quality grade from correctness and response time.
///
/// Correct answers grade 3-5 depending on speed, incorrect answers 0-1, so
/// any correct answer outranks any incorrect one.
pub fn quality_score(was_correct: bool, response_time_ms: u64) -> u8 {
    if was_correct {
        if response_time_ms < FAST_RESPONSE_MS {
            5
        } else if response_time_ms < SLOW_RESPONSE_MS {
            4
        } else {
            3
        }
    } else if response_time_ms < SLOW_RESPONSE_MS {
        1
    } else {
        0
    }
}

/// Calculate the next review for a card using the SM-2 schedule
///
/// A passing review never schedules the card sooner than the interval it
/// just cleared, even when a run of slow answers has dragged the ease down.
///
/// # Arguments
/// * `state` - Current card state
/// * `quality` - Quality grade (0-5); values above 5 are clamped
/// * `reviewed_at` - When the review happened; the next review date is
///   anchored here rather than read from the clock
///
/// # Returns
/// ReviewOutcome with the new difficulty, interval, due date, and counts
pub fn calculate_next_review(
    state: &CardState,
    quality: u8,
    reviewed_at: DateTime<Utc>,
) -> ReviewOutcome {
    let quality = quality.min(5);
    let passed = quality >= PASSING_QUALITY;

    let difficulty = next_difficulty(state.difficulty, quality);
    let review_count = state.review_count + 1;
    let correct_count = if passed {
        state.correct_count + 1
    } else {
        state.correct_count
    };

    let interval_days = if passed {
        let ladder = match correct_count {
            1 => FIRST_INTERVAL,
            2 => SECOND_INTERVAL,
            n => {
                // Grows geometrically past the second success; the exponent
                // is capped since the result saturates at MAX_INTERVAL long
                // before the cap matters
                let steps = (n - 2).min(32) as i32;
                let grown = SECOND_INTERVAL as f64 * ease_factor(difficulty).powi(steps);
                (grown.round() as u32).min(MAX_INTERVAL)
            }
        };
        // A slow streak drags the ease down between passes; never bring the
        // next review closer than the gap the card just cleared
        ladder.max(previous_interval(state)).min(MAX_INTERVAL)
    } else {
        RELEARN_INTERVAL
    };

    ReviewOutcome {
        difficulty,
        interval_days,
        next_review: reviewed_at + Duration::days(interval_days as i64),
        review_count,
        correct_count,
        passed,
    }
}

/// Days between a card's last review and its scheduled due date, zero for a
/// card that has never been reviewed
fn previous_interval(state: &CardState) -> u32 {
    match state.last_reviewed {
        Some(last) => (state.next_review - last).num_days().max(0) as u32,
        None => 0,
    }
}

/// Apply the SM-2 ease adjustment in the difficulty domain
///
/// EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02)), rescaled through the
/// linear map between ease and difficulty and clamped to the valid range.
/// A perfect grade lowers difficulty, grade 4 leaves it alone, and anything
/// below raises it.
fn next_difficulty(difficulty: f64, quality: u8) -> f64 {
    let q = quality as f64;
    let ease_delta = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
    let difficulty_delta = -ease_delta / (MAX_EASE - MIN_EASE);
    (difficulty + difficulty_delta).clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

/// Effective SM-2 ease factor for a difficulty value
fn ease_factor(difficulty: f64) -> f64 {
    MAX_EASE - difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY) * (MAX_EASE - MIN_EASE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn new_card_state() -> CardState {
        CardState::new(Uuid::new_v4(), Utc::now())
    }

    fn advance(state: &mut CardState, outcome: &ReviewOutcome, reviewed_at: DateTime<Utc>) {
        state.difficulty = outcome.difficulty;
        state.review_count = outcome.review_count;
        state.correct_count = outcome.correct_count;
        state.last_reviewed = Some(reviewed_at);
        state.next_review = outcome.next_review;
    }

    #[test]
    fn test_quality_rewards_speed() {
        assert_eq!(quality_score(true, 1_000), 5);
        assert_eq!(quality_score(true, 5_000), 4);
        assert_eq!(quality_score(true, 20_000), 3);
        assert_eq!(quality_score(false, 2_000), 1);
        assert_eq!(quality_score(false, 60_000), 0);
    }

    #[test]
    fn test_any_correct_grade_beats_any_incorrect_grade() {
        let slowest_correct = quality_score(true, u64::MAX);
        let fastest_incorrect = quality_score(false, 0);
        assert!(slowest_correct > fastest_incorrect);
        assert!(slowest_correct >= PASSING_QUALITY);
        assert!(fastest_incorrect < PASSING_QUALITY);
    }

    #[test]
    fn test_first_review_correct() {
        let state = new_card_state();
        let reviewed_at = Utc::now();
        let outcome = calculate_next_review(&state, 4, reviewed_at);

        assert_eq!(outcome.interval_days, 1);
        assert_eq!(outcome.review_count, 1);
        assert_eq!(outcome.correct_count, 1);
        assert!(outcome.passed);
        assert_eq!(outcome.next_review, reviewed_at + Duration::days(1));
    }

    #[test]
    fn test_second_review_correct() {
        let mut state = new_card_state();
        state.review_count = 1;
        state.correct_count = 1;

        let outcome = calculate_next_review(&state, 4, Utc::now());
        assert_eq!(outcome.interval_days, 6);
    }

    #[test]
    fn test_third_review_grows_past_six_days() {
        let mut state = new_card_state();
        state.review_count = 2;
        state.correct_count = 2;

        let outcome = calculate_next_review(&state, 4, Utc::now());
        assert!(outcome.interval_days > 6);
    }

    #[test]
    fn test_intervals_grow_until_capped() {
        let mut state = new_card_state();
        let reviewed_at = Utc::now();
        let mut prev_interval = 0;
        let mut reached_cap = false;

        for _ in 0..20 {
            let outcome = calculate_next_review(&state, 4, reviewed_at);
            if outcome.interval_days == MAX_INTERVAL {
                reached_cap = true;
                assert!(outcome.interval_days >= prev_interval);
            } else {
                assert!(!reached_cap);
                assert!(outcome.interval_days > prev_interval);
            }
            prev_interval = outcome.interval_days;
            advance(&mut state, &outcome, reviewed_at);
        }

        assert!(reached_cap);
        assert_eq!(prev_interval, MAX_INTERVAL);
    }

    #[test]
    fn test_interval_never_exceeds_cap() {
        let mut state = new_card_state();
        state.difficulty = 0.0;
        state.review_count = 40;
        state.correct_count = 40;

        let outcome = calculate_next_review(&state, 5, Utc::now());
        assert_eq!(outcome.interval_days, MAX_INTERVAL);
    }

    #[test]
    fn test_sustained_slow_correct_reviews_never_shrink_interval() {
        let mut state = new_card_state();
        let reviewed_at = Utc::now();
        let mut prev_interval = 0;

        // Grade 3 raises difficulty on every pass, so the ease keeps
        // falling; the schedule must still never move a due date closer
        // than the one before it
        for _ in 0..12 {
            let outcome = calculate_next_review(&state, 3, reviewed_at);
            assert!(outcome.passed);
            assert!(outcome.interval_days >= prev_interval);
            prev_interval = outcome.interval_days;
            advance(&mut state, &outcome, reviewed_at);
        }

        assert!((state.difficulty - MAX_DIFFICULTY).abs() < 1e-9);
        assert!(prev_interval > SECOND_INTERVAL);
    }

    #[test]
    fn test_failed_review_resets_interval() {
        let mut state = new_card_state();
        state.review_count = 8;
        state.correct_count = 8;
        state.difficulty = 0.1;

        let outcome = calculate_next_review(&state, 1, Utc::now());

        assert_eq!(outcome.interval_days, 1);
        assert!(!outcome.passed);
        assert_eq!(outcome.review_count, 9);
        assert_eq!(outcome.correct_count, 8);
    }

    #[test]
    fn test_failure_raises_difficulty() {
        let state = new_card_state();
        let outcome = calculate_next_review(&state, 0, Utc::now());
        assert!(outcome.difficulty > state.difficulty);

        let outcome = calculate_next_review(&state, 1, Utc::now());
        assert!(outcome.difficulty > state.difficulty);
    }

    #[test]
    fn test_perfect_grade_lowers_difficulty() {
        let state = new_card_state();
        let outcome = calculate_next_review(&state, 5, Utc::now());
        assert!(outcome.difficulty < state.difficulty);
    }

    #[test]
    fn test_grade_four_keeps_difficulty() {
        let state = new_card_state();
        let outcome = calculate_next_review(&state, 4, Utc::now());
        assert!((outcome.difficulty - state.difficulty).abs() < 1e-9);
    }

    #[test]
    fn test_hesitant_pass_raises_difficulty() {
        let state = new_card_state();
        let outcome = calculate_next_review(&state, 3, Utc::now());
        assert!(outcome.difficulty > state.difficulty);
        assert!(outcome.passed);
    }

    #[test]
    fn test_difficulty_stays_in_bounds() {
        let mut easy = new_card_state();
        easy.difficulty = 0.02;
        let outcome = calculate_next_review(&easy, 5, Utc::now());
        assert!(outcome.difficulty >= MIN_DIFFICULTY);

        let mut hard = new_card_state();
        hard.difficulty = 0.95;
        let outcome = calculate_next_review(&hard, 0, Utc::now());
        assert!(outcome.difficulty <= MAX_DIFFICULTY);
    }

    #[test]
    fn test_repeated_failures_saturate_difficulty() {
        let mut state = new_card_state();
        let reviewed_at = Utc::now();

        for _ in 0..5 {
            let outcome = calculate_next_review(&state, 0, reviewed_at);
            assert!(outcome.difficulty <= MAX_DIFFICULTY);
            assert_eq!(outcome.interval_days, 1);
            advance(&mut state, &outcome, reviewed_at);
        }

        assert!((state.difficulty - MAX_DIFFICULTY).abs() < 1e-9);
    }

    #[test]
    fn test_next_review_anchored_to_review_time() {
        let mut state = new_card_state();
        state.review_count = 1;
        state.correct_count = 1;

        let reviewed_at = "2026-03-01T09:30:00Z".parse::<DateTime<Utc>>().unwrap();
        let outcome = calculate_next_review(&state, 4, reviewed_at);

        assert_eq!(outcome.interval_days, 6);
        assert_eq!(outcome.next_review, reviewed_at + Duration::days(6));
    }

    #[test]
    fn test_quality_above_range_is_clamped() {
        let state = new_card_state();
        let reviewed_at = Utc::now();
        let clamped = calculate_next_review(&state, 9, reviewed_at);
        let perfect = calculate_next_review(&state, 5, reviewed_at);

        assert_eq!(clamped.interval_days, perfect.interval_days);
        assert!((clamped.difficulty - perfect.difficulty).abs() < 1e-9);
    }

    #[test]
    fn test_scheduling_is_deterministic() {
        let mut state = new_card_state();
        state.review_count = 3;
        state.correct_count = 3;
        state.difficulty = 0.4;

        let reviewed_at = Utc::now();
        let first = calculate_next_review(&state, 4, reviewed_at);
        let second = calculate_next_review(&state, 4, reviewed_at);

        assert_eq!(first.interval_days, second.interval_days);
        assert_eq!(first.next_review, second.next_review);
        assert!((first.difficulty - second.difficulty).abs() < 1e-12);
    }
}

//! Answer evaluation and quiz scoring
//!
//! Everything here is a pure function of its arguments. Correctness is
//! always recomputed from the question and the submitted answer; flags
//! arriving on answer records are never trusted. Malformed input grades as
//! wrong rather than erroring, so a partially broken attempt still scores.

use super::models::{
    Answer, MatchPair, Question, QuestionAnswer, QuestionKind, ScoreResult, TimingStats,
    TypeBreakdown,
};

/// Decide whether an answer is correct for a question.
///
/// An answer whose shape does not match the question's type is wrong by
/// definition. Out-of-range indices compare unequal instead of erroring.
pub fn is_correct(question: &Question, answer: &Answer) -> bool {
    match (&question.kind, answer) {
        (
            QuestionKind::Mcq { correct_answer, .. },
            Answer::Mcq { selected_option },
        ) => selected_option == correct_answer,
        (
            QuestionKind::FillBlank {
                correct_answers,
                case_sensitive,
                ..
            },
            Answer::FillBlank { text },
        ) => fill_blank_matches(correct_answers, *case_sensitive, text),
        (
            QuestionKind::TrueFalse { correct_answer },
            Answer::TrueFalse { value },
        ) => value == correct_answer,
        (
            QuestionKind::MatchFollowing { correct_pairs, .. },
            Answer::MatchFollowing { pairs },
        ) => match_pairs_correct(correct_pairs, pairs),
        _ => false,
    }
}

/// Exact match against any of the accepted answers.
///
/// Both sides are trimmed; unless the question is case sensitive both are
/// lowercased first. `accept_partial_match` is reserved and not consulted,
/// so substrings never pass.
fn fill_blank_matches(correct_answers: &[String], case_sensitive: bool, text: &str) -> bool {
    let submitted = text.trim();
    correct_answers.iter().any(|accepted| {
        let accepted = accepted.trim();
        if case_sensitive {
            submitted == accepted
        } else {
            submitted.to_lowercase() == accepted.to_lowercase()
        }
    })
}

/// Every correct pair must appear among the submitted pairs and the counts
/// must agree. Submission order is irrelevant. Duplicate submitted pairs are
/// not screened out, but they consume slots the missing pairs would need.
fn match_pairs_correct(correct_pairs: &[MatchPair], submitted: &[MatchPair]) -> bool {
    submitted.len() == correct_pairs.len()
        && correct_pairs
            .iter()
            .all(|correct| submitted.iter().any(|pair| pair == correct))
}

/// Grade a batch of submitted answers against their questions.
///
/// Returns the records with every `correct` flag freshly derived. Answers
/// referencing a question id that is not in `questions` grade as wrong.
pub fn grade(questions: &[Question], answers: &[QuestionAnswer]) -> Vec<QuestionAnswer> {
    answers
        .iter()
        .map(|record| {
            let correct = questions
                .iter()
                .find(|q| q.id == record.question_id)
                .map(|q| is_correct(q, &record.answer))
                .unwrap_or(false);
            QuestionAnswer {
                correct,
                ..record.clone()
            }
        })
        .collect()
}

/// Score a quiz attempt.
///
/// The question list is canonical: every question counts toward the totals
/// whether or not it was answered, and a missing answer counts as wrong.
/// Answers are looked up by question id, so partial or reordered submissions
/// are fine; when a question id appears more than once the first record
/// wins. Timing stats cover only the answers that reported a time.
pub fn score_quiz(questions: &[Question], answers: &[QuestionAnswer]) -> ScoreResult {
    let mut breakdown = TypeBreakdown::default();
    let mut correct_count = 0;
    let mut times = Vec::new();

    for question in questions {
        let tally = breakdown.for_type_mut(question.kind.question_type());
        tally.total += 1;

        let Some(record) = answers.iter().find(|a| a.question_id == question.id) else {
            continue;
        };

        if is_correct(question, &record.answer) {
            correct_count += 1;
            tally.correct += 1;
        }
        if let Some(seconds) = record.time_taken {
            times.push(seconds);
        }
    }

    let total_count = questions.len();
    let score = if total_count == 0 {
        0.0
    } else {
        round2(correct_count as f64 / total_count as f64 * 100.0)
    };

    ScoreResult {
        score,
        correct_count,
        total_count,
        breakdown,
        timing: timing_stats(&times),
    }
}

fn timing_stats(times: &[u32]) -> TimingStats {
    let mut iter = times.iter().copied();
    let Some(first) = iter.next() else {
        return TimingStats::default();
    };

    let mut total = u64::from(first);
    let mut fastest = first;
    let mut slowest = first;
    for seconds in iter {
        total += u64::from(seconds);
        fastest = fastest.min(seconds);
        slowest = slowest.max(seconds);
    }

    TimingStats {
        total_seconds: total.min(u64::from(u32::MAX)) as u32,
        average_seconds: (total as f64 / times.len() as f64).round() as u32,
        fastest_seconds: fastest,
        slowest_seconds: slowest,
    }
}

/// Round to 2 decimal places
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

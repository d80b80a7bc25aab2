//! Data models for the flashcard system

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::algorithm::DEFAULT_DIFFICULTY;

/// A deck is a collection of flashcards studied together
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub card_count: usize,
    /// Daily intake limit for unseen cards
    #[serde(default = "default_new_cards_per_day")]
    pub new_cards_per_day: i32,
    #[serde(default = "default_reviews_per_day")]
    pub reviews_per_day: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_new_cards_per_day() -> i32 {
    20
}

fn default_reviews_per_day() -> i32 {
    100
}

impl Deck {
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description: None,
            card_count: 0,
            new_cards_per_day: default_new_cards_per_day(),
            reviews_per_day: default_reviews_per_day(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A flashcard with a prompt (front) and an answer (back)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Flashcard {
    pub fn new(deck_id: Uuid, front: String, back: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            deck_id,
            front,
            back,
            tags: Vec::new(),
            position: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Current spaced repetition state for a card.
///
/// Created on the card's first review; a card without a state has never
/// been studied.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardState {
    pub card_id: Uuid,
    /// How hard the card currently is, 0.0 (easy) to 1.0 (hard).
    /// Stored on disk as an integer 0-100; see [`scaled_difficulty`].
    #[serde(with = "scaled_difficulty")]
    pub difficulty: f64,
    /// Total number of reviews
    #[serde(default)]
    pub review_count: u32,
    /// Number of successful recalls
    #[serde(default)]
    pub correct_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
    /// When the card is due for review
    pub next_review: DateTime<Utc>,
}

impl CardState {
    /// State for a card ahead of its first review, due immediately
    pub fn new(card_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            card_id,
            difficulty: DEFAULT_DIFFICULTY,
            review_count: 0,
            correct_count: 0,
            last_reviewed: None,
            next_review: now,
        }
    }

    /// Check if the card is due for review
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_review
    }
}

/// Serde helpers for the persisted difficulty scale.
///
/// Review state files store difficulty as an integer 0-100; in memory the
/// scheduler works on the real 0.0-1.0 value. The conversion lives here so
/// it happens exactly at the storage boundary.
pub mod scaled_difficulty {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64((value.clamp(0.0, 1.0) * 100.0).round() as i64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let stored = i64::deserialize(deserializer)?;
        Ok((stored as f64 / 100.0).clamp(0.0, 1.0))
    }
}

/// A record of a single review
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: Uuid,
    pub card_id: Uuid,
    /// Quality grade (0-5) derived from correctness and speed
    pub quality: u8,
    pub was_correct: bool,
    pub response_time_ms: u64,
    /// Interval scheduled by this review, in days
    pub interval_days: u32,
    /// Difficulty after this review, on the stored 0-100 scale
    #[serde(with = "scaled_difficulty")]
    pub difficulty: f64,
    /// When the review occurred
    pub reviewed_at: DateTime<Utc>,
}

/// Statistics for a deck or all decks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_cards: usize,
    /// Cards that have never been reviewed
    pub new_cards: usize,
    /// Cards still in the initial learning phase
    pub learning_cards: usize,
    /// Cards in regular spaced review
    pub review_cards: usize,
    pub due_cards: usize,
    pub reviews_today: usize,
    pub correct_today: usize,
    /// Consecutive days with at least one review, ending today or yesterday
    pub streak_days: u32,
}

/// A card with its review state, used for study sessions.
///
/// `state` is `None` for cards that have never been reviewed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardWithState {
    pub card: Flashcard,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<CardState>,
}

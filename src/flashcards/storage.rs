//! Storage operations for flashcards
//!
//! Directory structure:
//! ```text
//! {data_dir}/flashcards/
//! ├── decks.json            # Array of all decks
//! ├── cards/
//! │   └── {card-id}.json    # Individual card files
//! ├── states/
//! │   └── {card-id}.json    # Card spaced repetition state
//! └── reviews/
//!     └── {card-id}.json    # Per-card review history
//! ```
//!
//! A card has no state file until its first review; the absence of a state
//! is what marks a card as new.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use chrono::{Duration, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::algorithm::{calculate_next_review, quality_score, ReviewOutcome};
use super::models::*;

#[derive(Error, Debug)]
pub enum StudyStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Deck not found: {0}")]
    DeckNotFound(Uuid),

    #[error("Card not found: {0}")]
    CardNotFound(Uuid),
}

pub type Result<T> = std::result::Result<T, StudyStorageError>;

/// Storage manager for decks, cards, and review state
pub struct StudyStorage {
    /// Flashcards directory (e.g., ~/.local/share/mneme/flashcards)
    flashcards_dir: PathBuf,
}

impl StudyStorage {
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        let flashcards_dir = data_dir.join("flashcards");
        fs::create_dir_all(&flashcards_dir)?;

        let storage = Self { flashcards_dir };
        fs::create_dir_all(storage.cards_dir())?;
        fs::create_dir_all(storage.states_dir())?;
        fs::create_dir_all(storage.reviews_dir())?;

        Ok(storage)
    }

    /// Get the decks.json path
    fn decks_path(&self) -> PathBuf {
        self.flashcards_dir.join("decks.json")
    }

    /// Get the cards directory
    fn cards_dir(&self) -> PathBuf {
        self.flashcards_dir.join("cards")
    }

    /// Get the states directory
    fn states_dir(&self) -> PathBuf {
        self.flashcards_dir.join("states")
    }

    /// Get the reviews directory
    fn reviews_dir(&self) -> PathBuf {
        self.flashcards_dir.join("reviews")
    }

    /// Get the path for a specific card
    fn card_path(&self, card_id: Uuid) -> PathBuf {
        self.cards_dir().join(format!("{}.json", card_id))
    }

    /// Get the path for a card's state
    fn state_path(&self, card_id: Uuid) -> PathBuf {
        self.states_dir().join(format!("{}.json", card_id))
    }

    /// Get the path for a card's review history
    fn reviews_path(&self, card_id: Uuid) -> PathBuf {
        self.reviews_dir().join(format!("{}.json", card_id))
    }

    // ==================== Deck Operations ====================

    /// List all decks, sorted by name
    pub fn list_decks(&self) -> Result<Vec<Deck>> {
        let decks_path = self.decks_path();
        if !decks_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&decks_path)?;
        let mut decks: Vec<Deck> = serde_json::from_str(&content)?;
        decks.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(decks)
    }

    /// Get a specific deck
    pub fn get_deck(&self, deck_id: Uuid) -> Result<Deck> {
        let decks = self.list_decks()?;
        decks
            .into_iter()
            .find(|d| d.id == deck_id)
            .ok_or(StudyStorageError::DeckNotFound(deck_id))
    }

    /// Create a new deck
    pub fn create_deck(&self, name: String, description: Option<String>) -> Result<Deck> {
        let mut deck = Deck::new(name);
        deck.description = description;

        let mut decks = self.list_decks()?;
        decks.push(deck.clone());
        self.save_decks(&decks)?;

        Ok(deck)
    }

    /// Update a deck
    pub fn update_deck(&self, deck: &Deck) -> Result<()> {
        let mut decks = self.list_decks()?;
        let pos = decks
            .iter()
            .position(|d| d.id == deck.id)
            .ok_or(StudyStorageError::DeckNotFound(deck.id))?;

        decks[pos] = deck.clone();
        self.save_decks(&decks)?;

        Ok(())
    }

    /// Delete a deck and all its cards
    pub fn delete_deck(&self, deck_id: Uuid) -> Result<()> {
        for card in self.list_cards(deck_id)? {
            self.delete_card(card.id)?;
        }

        let mut decks = self.list_decks()?;
        decks.retain(|d| d.id != deck_id);
        self.save_decks(&decks)?;

        Ok(())
    }

    fn save_decks(&self, decks: &[Deck]) -> Result<()> {
        fs::write(self.decks_path(), serde_json::to_string_pretty(decks)?)?;
        Ok(())
    }

    /// Update the card count for a deck
    fn update_deck_card_count(&self, deck_id: Uuid) -> Result<()> {
        let mut deck = self.get_deck(deck_id)?;
        deck.card_count = self.list_cards(deck_id)?.len();
        deck.updated_at = Utc::now();
        self.update_deck(&deck)?;
        Ok(())
    }

    // ==================== Card Operations ====================

    /// List all cards in a deck, in position order
    pub fn list_cards(&self, deck_id: Uuid) -> Result<Vec<Flashcard>> {
        let cards_dir = self.cards_dir();
        if !cards_dir.exists() {
            return Ok(Vec::new());
        }

        let mut cards = Vec::new();
        for entry in fs::read_dir(&cards_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                let content = fs::read_to_string(&path)?;
                let card: Flashcard = serde_json::from_str(&content)?;
                if card.deck_id == deck_id {
                    cards.push(card);
                }
            }
        }

        cards.sort_by(|a, b| a.position.cmp(&b.position));
        Ok(cards)
    }

    /// List all cards across all decks
    pub fn list_all_cards(&self) -> Result<Vec<Flashcard>> {
        let cards_dir = self.cards_dir();
        if !cards_dir.exists() {
            return Ok(Vec::new());
        }

        let mut cards = Vec::new();
        for entry in fs::read_dir(&cards_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                let content = fs::read_to_string(&path)?;
                let card: Flashcard = serde_json::from_str(&content)?;
                cards.push(card);
            }
        }

        Ok(cards)
    }

    /// Get a specific card
    pub fn get_card(&self, card_id: Uuid) -> Result<Flashcard> {
        let card_path = self.card_path(card_id);
        if !card_path.exists() {
            return Err(StudyStorageError::CardNotFound(card_id));
        }

        let content = fs::read_to_string(&card_path)?;
        let card: Flashcard = serde_json::from_str(&content)?;
        Ok(card)
    }

    /// Create a new card at the end of a deck.
    ///
    /// No review state is written; the card stays new until first studied.
    pub fn create_card(
        &self,
        deck_id: Uuid,
        front: String,
        back: String,
        tags: Vec<String>,
    ) -> Result<Flashcard> {
        self.get_deck(deck_id)?;

        let position = self.list_cards(deck_id)?.len() as i32;

        let mut card = Flashcard::new(deck_id, front, back);
        card.position = position;
        card.tags = tags;

        fs::write(self.card_path(card.id), serde_json::to_string_pretty(&card)?)?;
        self.update_deck_card_count(deck_id)?;

        Ok(card)
    }

    /// Update a card
    pub fn update_card(&self, card: &Flashcard) -> Result<()> {
        let card_path = self.card_path(card.id);
        if !card_path.exists() {
            return Err(StudyStorageError::CardNotFound(card.id));
        }

        fs::write(&card_path, serde_json::to_string_pretty(card)?)?;
        Ok(())
    }

    /// Delete a card along with its state and review history
    pub fn delete_card(&self, card_id: Uuid) -> Result<()> {
        let card = self.get_card(card_id)?;
        let deck_id = card.deck_id;

        fs::remove_file(self.card_path(card_id))?;

        let state_path = self.state_path(card_id);
        if state_path.exists() {
            fs::remove_file(&state_path)?;
        }

        let reviews_path = self.reviews_path(card_id);
        if reviews_path.exists() {
            fs::remove_file(&reviews_path)?;
        }

        self.update_deck_card_count(deck_id)?;

        Ok(())
    }

    // ==================== State Operations ====================

    /// Get the review state for a card, or `None` if it was never reviewed
    pub fn get_card_state(&self, card_id: Uuid) -> Result<Option<CardState>> {
        let state_path = self.state_path(card_id);
        if !state_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&state_path)?;
        let state: CardState = serde_json::from_str(&content)?;
        Ok(Some(state))
    }

    fn save_card_state(&self, state: &CardState) -> Result<()> {
        fs::write(
            self.state_path(state.card_id),
            serde_json::to_string_pretty(state)?,
        )?;
        Ok(())
    }

    // ==================== Review Operations ====================

    /// Get all study-ready cards, optionally filtered by deck.
    ///
    /// Includes cards that have never been reviewed, ordered ahead of due
    /// cards; due cards follow oldest due date first.
    pub fn due_cards(&self, deck_id: Option<Uuid>) -> Result<Vec<CardWithState>> {
        let cards = match deck_id {
            Some(did) => self.list_cards(did)?,
            None => self.list_all_cards()?,
        };

        let now = Utc::now();
        let mut due = Vec::new();

        for card in cards {
            match self.get_card_state(card.id)? {
                None => due.push(CardWithState { card, state: None }),
                Some(state) if state.is_due(now) => due.push(CardWithState {
                    card,
                    state: Some(state),
                }),
                Some(_) => {}
            }
        }

        // None sorts first, so new cards lead
        due.sort_by_key(|entry| entry.state.as_ref().map(|s| s.next_review));

        Ok(due)
    }

    /// Record a review for a card and reschedule it.
    ///
    /// Derives the quality grade from correctness and response time, applies
    /// the scheduler, persists the updated state, and appends to the card's
    /// review history. On the first review the state is created here.
    pub fn submit_review(
        &self,
        card_id: Uuid,
        was_correct: bool,
        response_time_ms: u64,
    ) -> Result<CardState> {
        self.get_card(card_id)?;

        let now = Utc::now();
        let mut state = self
            .get_card_state(card_id)?
            .unwrap_or_else(|| CardState::new(card_id, now));

        let quality = quality_score(was_correct, response_time_ms);
        let ReviewOutcome {
            difficulty,
            interval_days,
            next_review,
            review_count,
            correct_count,
            passed: _,
        } = calculate_next_review(&state, quality, now);

        state.difficulty = difficulty;
        state.review_count = review_count;
        state.correct_count = correct_count;
        state.last_reviewed = Some(now);
        state.next_review = next_review;
        self.save_card_state(&state)?;

        let record = ReviewRecord {
            id: Uuid::new_v4(),
            card_id,
            quality,
            was_correct,
            response_time_ms,
            interval_days,
            difficulty,
            reviewed_at: now,
        };
        self.append_review(&record)?;

        Ok(state)
    }

    /// Get the review history for a card, oldest first
    pub fn list_reviews(&self, card_id: Uuid) -> Result<Vec<ReviewRecord>> {
        let reviews_path = self.reviews_path(card_id);
        if !reviews_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&reviews_path)?;
        let reviews: Vec<ReviewRecord> = serde_json::from_str(&content)?;
        Ok(reviews)
    }

    fn append_review(&self, record: &ReviewRecord) -> Result<()> {
        let mut reviews = self.list_reviews(record.card_id)?;
        reviews.push(record.clone());
        fs::write(
            self.reviews_path(record.card_id),
            serde_json::to_string_pretty(&reviews)?,
        )?;
        Ok(())
    }

    /// Get review statistics, optionally filtered by deck
    pub fn review_stats(&self, deck_id: Option<Uuid>) -> Result<ReviewStats> {
        let cards = match deck_id {
            Some(did) => self.list_cards(did)?,
            None => self.list_all_cards()?,
        };

        let now = Utc::now();
        let today = now.date_naive();

        let mut stats = ReviewStats::default();
        stats.total_cards = cards.len();

        let mut review_dates: BTreeSet<NaiveDate> = BTreeSet::new();

        for card in &cards {
            match self.get_card_state(card.id)? {
                None => {
                    stats.new_cards += 1;
                    stats.due_cards += 1;
                }
                Some(state) => {
                    // Two successful recalls graduate a card out of learning
                    if state.correct_count < 2 {
                        stats.learning_cards += 1;
                    } else {
                        stats.review_cards += 1;
                    }
                    if state.is_due(now) {
                        stats.due_cards += 1;
                    }
                }
            }

            for record in self.list_reviews(card.id)? {
                let date = record.reviewed_at.date_naive();
                review_dates.insert(date);
                if date == today {
                    stats.reviews_today += 1;
                    if record.was_correct {
                        stats.correct_today += 1;
                    }
                }
            }
        }

        stats.streak_days = current_streak(&review_dates, today);

        Ok(stats)
    }
}

/// Consecutive days with at least one review, counting back from today.
/// A day without reviews yet does not break the streak until it is over.
fn current_streak(review_dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut day = if review_dates.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0;
    while review_dates.contains(&day) {
        streak += 1;
        day = day - Duration::days(1);
    }

    streak
}

//! Data models for vocab trainer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifiers.
pub type CardId = Uuid;
pub type BatchId = u32;

/// Study content of a card.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vocabulary {
    /// The word being learned.
    pub word: String,
    /// Part of speech (n, v, adj, phr.v).
    #[serde(default)]
    pub word_type: String,
    /// IPA transcription.
    #[serde(default)]
    pub phonetic: String,
    /// Translation or definition.
    pub meaning: String,
    /// English example sentence.
    #[serde(default)]
    pub example_en: String,
    /// Vietnamese example sentence.
    #[serde(default)]
    pub example_vi: String,
}

impl Vocabulary {
    /// Create vocabulary with just the required fields.
    pub fn new(word: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            meaning: meaning.into(),
            ..Default::default()
        }
    }

    /// Set part of speech.
    pub fn with_word_type(mut self, word_type: impl Into<String>) -> Self {
        self.word_type = word_type.into();
        self
    }

    /// Set phonetic transcription.
    pub fn with_phonetic(mut self, phonetic: impl Into<String>) -> Self {
        self.phonetic = phonetic.into();
        self
    }

    /// Set example sentences.
    pub fn with_examples(mut self, en: impl Into<String>, vi: impl Into<String>) -> Self {
        self.example_en = en.into();
        self.example_vi = vi.into();
        self
    }

    /// Word and meaning must both be non-empty after trimming.
    pub fn is_valid(&self) -> bool {
        !self.word.trim().is_empty() && !self.meaning.trim().is_empty()
    }

    /// Synonyms listed in the English example as `Synonyms: a, b, c`.
    pub fn synonyms(&self) -> Vec<&str> {
        let Some(rest) = self.example_en.trim().strip_prefix("Synonyms:") else {
            return Vec::new();
        };
        rest.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Normalized form used for duplicate detection.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// A flashcard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    /// Unique identifier.
    pub id: CardId,
    /// Study content.
    pub vocabulary: Vocabulary,
    /// Import batch the card belongs to.
    pub batch: BatchId,
    /// Whether the card was marked learned in study mode.
    #[serde(default)]
    pub is_learned: bool,
    /// When created.
    pub created_at: DateTime<Utc>,
}

impl Flashcard {
    /// Create a new unlearned card.
    pub fn new(vocabulary: Vocabulary, batch: BatchId) -> Self {
        Self {
            id: Uuid::new_v4(),
            vocabulary,
            batch,
            is_learned: false,
            created_at: Utc::now(),
        }
    }

    pub fn word(&self) -> &str {
        &self.vocabulary.word
    }

    pub fn meaning(&self) -> &str {
        &self.vocabulary.meaning
    }
}

/// Which cards a session draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Batch(BatchId),
}

impl CategoryFilter {
    pub fn matches(&self, card: &Flashcard) -> bool {
        match self {
            Self::All => true,
            Self::Batch(batch) => card.batch == *batch,
        }
    }

    /// Step to the next filter in `[All, batches...]`, wrapping around.
    pub fn cycle(self, batches: &[BatchId]) -> Self {
        match self {
            Self::All => batches.first().map_or(Self::All, |b| Self::Batch(*b)),
            Self::Batch(current) => batches
                .iter()
                .position(|b| *b == current)
                .and_then(|i| batches.get(i + 1))
                .map_or(Self::All, |b| Self::Batch(*b)),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "All categories"),
            Self::Batch(batch) => write!(f, "Category {}", batch),
        }
    }
}

/// A missed word kept for review after a quiz or spelling session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrongAnswer {
    pub word: String,
    pub word_type: String,
    pub meaning: String,
    pub phonetic: String,
}

impl From<&Flashcard> for WrongAnswer {
    fn from(card: &Flashcard) -> Self {
        Self {
            word: card.vocabulary.word.clone(),
            word_type: card.vocabulary.word_type.clone(),
            meaning: card.vocabulary.meaning.clone(),
            phonetic: card.vocabulary.phonetic.clone(),
        }
    }
}

/// Accuracy tier shown on completion screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    Excellent,
    Great,
    Good,
    KeepPracticing,
}

impl Grade {
    pub fn from_accuracy(accuracy: u32) -> Self {
        if accuracy >= 90 {
            Self::Excellent
        } else if accuracy >= 70 {
            Self::Great
        } else if accuracy >= 50 {
            Self::Good
        } else {
            Self::KeepPracticing
        }
    }

    /// Get display name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent!",
            Self::Great => "Great job!",
            Self::Good => "Pretty good!",
            Self::KeepPracticing => "Keep practicing!",
        }
    }
}

/// Mode-specific line of a completion report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportDetail {
    /// Quiz: seconds on the clock.
    ElapsedSecs(u64),
    /// Spelling: longest run of correct answers.
    PeakStreak(u32),
}

/// Summary shown when a quiz or spelling session completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub correct: usize,
    pub wrong: usize,
    /// Percentage, rounded.
    pub accuracy: u32,
    pub score: u32,
    pub detail: ReportDetail,
}

impl SessionReport {
    pub fn grade(&self) -> Grade {
        Grade::from_accuracy(self.accuracy)
    }
}

/// Rounded percentage of `part` in `total`; zero when `total` is zero.
pub fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        (100.0 * part as f64 / total as f64).round() as u32
    }
}

/// Format seconds as `mm:ss`.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_creation() {
        let card = Flashcard::new(Vocabulary::new("Apple", "Quả táo").with_word_type("n"), 1);
        assert_eq!(card.word(), "Apple");
        assert_eq!(card.meaning(), "Quả táo");
        assert_eq!(card.batch, 1);
        assert!(!card.is_learned);
    }

    #[test]
    fn test_vocabulary_validity() {
        assert!(Vocabulary::new("cat", "con mèo").is_valid());
        assert!(!Vocabulary::new("  ", "con mèo").is_valid());
        assert!(!Vocabulary::new("cat", "").is_valid());
    }

    #[test]
    fn test_synonyms() {
        let vocab = Vocabulary::new("big", "lớn").with_examples("Synonyms: large, huge , ,vast", "");
        assert_eq!(vocab.synonyms(), vec!["large", "huge", "vast"]);

        let plain = Vocabulary::new("big", "lớn").with_examples("A big tree.", "");
        assert!(plain.synonyms().is_empty());
    }

    #[test]
    fn test_serde_uses_camel_case_and_defaults() {
        let json = r#"{"word":"Cat","meaning":"Con mèo","wordType":"n"}"#;
        let vocab: Vocabulary = serde_json::from_str(json).unwrap();
        assert_eq!(vocab.word_type, "n");
        assert_eq!(vocab.phonetic, "");
    }

    #[test]
    fn test_category_cycle() {
        let batches = [1, 3];
        let f = CategoryFilter::All.cycle(&batches);
        assert_eq!(f, CategoryFilter::Batch(1));
        let f = f.cycle(&batches);
        assert_eq!(f, CategoryFilter::Batch(3));
        assert_eq!(f.cycle(&batches), CategoryFilter::All);
        assert_eq!(CategoryFilter::All.cycle(&[]), CategoryFilter::All);
        // A batch that disappeared falls back to All
        assert_eq!(CategoryFilter::Batch(9).cycle(&batches), CategoryFilter::All);
    }

    #[test]
    fn test_grade_tiers() {
        assert_eq!(Grade::from_accuracy(100), Grade::Excellent);
        assert_eq!(Grade::from_accuracy(90), Grade::Excellent);
        assert_eq!(Grade::from_accuracy(89), Grade::Great);
        assert_eq!(Grade::from_accuracy(70), Grade::Great);
        assert_eq!(Grade::from_accuracy(50), Grade::Good);
        assert_eq!(Grade::from_accuracy(49), Grade::KeepPracticing);
    }

    #[test]
    fn test_percentage_and_clock() {
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(format_clock(75), "01:15");
    }
}

//! Spelling drill: type the word for a meaning, with masked-letter hints.

use crate::audio::Speaker;
use crate::models::{normalize_word, percentage, Flashcard, ReportDetail, SessionReport, WrongAnswer};
use crate::selection::{SelectionError, SPELLING_MIN_CARDS};

pub const MAX_ATTEMPTS: u32 = 3;
pub const MAX_HINT_LEVEL: u8 = 2;
/// Score deducted per hint level, floored at zero.
pub const HINT_COST: u32 = 2;
const BASE_POINTS: u32 = 10;
const RETRY_PENALTY: u32 = 3;
const MIN_POINTS: u32 = 2;
const STREAK_BONUS_CAP: u32 = 5;
const STREAK_BONUS: u32 = 2;

const VOWELS: &str = "aeiouAEIOU";
const MASK: char = '_';

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '-' | '\'')
}

fn is_vowel(c: char) -> bool {
    VOWELS.contains(c)
}

/// Masked rendering of `word` for a hint level.
///
/// The first character and separators are always shown. Level 0 hides
/// every vowel, level 1 hides vowels at odd positions, level 2 hides at
/// most two vowels and never the last character.
pub fn hint_pattern(word: &str, level: u8) -> String {
    let chars: Vec<char> = word.chars().collect();
    let last = chars.len().saturating_sub(1);
    let mut hidden = 0;

    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            if is_separator(c) || i == 0 || !is_vowel(c) {
                return c;
            }
            let masked = match level {
                0 => true,
                1 => i % 2 != 0,
                _ => hidden < 2 && i != last,
            };
            if masked {
                hidden += 1;
                MASK
            } else {
                c
            }
        })
        .collect()
}

/// Points for a correct answer after `attempts` misses at streak `streak`.
pub fn points_for(attempts: u32, streak: u32) -> u32 {
    let base = BASE_POINTS
        .saturating_sub(attempts * RETRY_PENALTY)
        .max(MIN_POINTS);
    let bonus = streak.saturating_sub(1).min(STREAK_BONUS_CAP) * STREAK_BONUS;
    base + bonus
}

/// Per-question state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellingQuestion {
    pub attempts: u32,
    pub hint_level: u8,
    pub answered: bool,
    pub hint: String,
}

/// Feedback line for the last submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpellingFeedback {
    Correct { points: u32 },
    Retry { remaining: u32 },
    OutOfAttempts { answer: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpellingAnswer {
    Correct { points: u32 },
    /// Wrong, but the same question can be tried again.
    Retry { remaining: u32 },
    /// Wrong on the last attempt; the answer is revealed.
    Failed { answer: String },
    Ignored,
}

pub struct SpellingEngine {
    cards: Vec<Flashcard>,
    index: usize,
    score: u32,
    streak: u32,
    peak_streak: u32,
    correct_count: usize,
    wrong_count: usize,
    wrong_answers: Vec<WrongAnswer>,
    question: Option<SpellingQuestion>,
    feedback: Option<SpellingFeedback>,
    report: Option<SessionReport>,
}

impl SpellingEngine {
    pub fn new(cards: Vec<Flashcard>) -> Result<Self, SelectionError> {
        if cards.len() < SPELLING_MIN_CARDS {
            return Err(SelectionError::InsufficientCards {
                required: SPELLING_MIN_CARDS,
                available: cards.len(),
            });
        }
        let mut engine = Self {
            cards,
            index: 0,
            score: 0,
            streak: 0,
            peak_streak: 0,
            correct_count: 0,
            wrong_count: 0,
            wrong_answers: Vec::new(),
            question: None,
            feedback: None,
            report: None,
        };
        engine.new_question();
        tracing::info!(questions = engine.cards.len(), "spelling session started");
        Ok(engine)
    }

    fn new_question(&mut self) {
        self.feedback = None;
        self.question = self.cards.get(self.index).map(|card| SpellingQuestion {
            attempts: 0,
            hint_level: 0,
            answered: false,
            hint: hint_pattern(&card.vocabulary.word, 0),
        });
    }

    /// The card being asked. After an answer this stays on the answered
    /// card until `next_question`.
    pub fn current(&self) -> Option<&Flashcard> {
        let answered = self.question.as_ref().is_some_and(|q| q.answered);
        let index = if answered { self.index.checked_sub(1)? } else { self.index };
        self.cards.get(index)
    }

    pub fn question(&self) -> Option<&SpellingQuestion> {
        self.question.as_ref()
    }

    pub fn feedback(&self) -> Option<&SpellingFeedback> {
        self.feedback.as_ref()
    }

    pub fn report(&self) -> Option<&SessionReport> {
        self.report.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.report.is_some()
    }

    /// Zero-based number of the question on screen.
    pub fn position(&self) -> usize {
        match &self.question {
            Some(q) if q.answered => self.index.saturating_sub(1),
            _ => self.index,
        }
    }

    pub fn total(&self) -> usize {
        self.cards.len()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn wrong_count(&self) -> usize {
        self.wrong_count
    }

    pub fn accuracy(&self) -> u32 {
        percentage(self.correct_count, self.correct_count + self.wrong_count)
    }

    pub fn wrong_answers(&self) -> &[WrongAnswer] {
        &self.wrong_answers
    }

    /// Reveal more of the word. Costs points; cannot be undone.
    ///
    /// Returns the new pattern, or `None` if no further hint is possible.
    pub fn request_hint(&mut self) -> Option<&str> {
        let word = self.cards.get(self.index)?.vocabulary.word.clone();
        let question = self.question.as_mut()?;
        if question.answered || question.hint_level >= MAX_HINT_LEVEL {
            return None;
        }
        question.hint_level += 1;
        question.hint = hint_pattern(&word, question.hint_level);
        self.score = self.score.saturating_sub(HINT_COST);
        tracing::debug!(level = question.hint_level, "spelling hint");
        Some(question.hint.as_str())
    }

    /// Check typed text against the word, ignoring case and outer whitespace.
    pub fn submit(&mut self, text: &str, speaker: &dyn Speaker) -> SpellingAnswer {
        let Some(card) = self.cards.get(self.index) else {
            return SpellingAnswer::Ignored;
        };
        let Some(question) = self.question.as_mut() else {
            return SpellingAnswer::Ignored;
        };
        if question.answered {
            return SpellingAnswer::Ignored;
        }

        if normalize_word(text) == normalize_word(&card.vocabulary.word) {
            question.answered = true;
            self.streak += 1;
            self.peak_streak = self.peak_streak.max(self.streak);
            self.correct_count += 1;
            let points = points_for(question.attempts, self.streak);
            self.score += points;
            speaker.speak(&card.vocabulary.word);
            self.index += 1;
            self.feedback = Some(SpellingFeedback::Correct { points });
            return SpellingAnswer::Correct { points };
        }

        question.attempts += 1;
        if question.attempts < MAX_ATTEMPTS {
            let remaining = MAX_ATTEMPTS - question.attempts;
            self.feedback = Some(SpellingFeedback::Retry { remaining });
            return SpellingAnswer::Retry { remaining };
        }

        question.answered = true;
        self.streak = 0;
        self.wrong_count += 1;
        self.wrong_answers.push(WrongAnswer::from(card));
        let answer = card.vocabulary.word.clone();
        self.index += 1;
        tracing::debug!(word = %answer, "spelling attempts exhausted");
        self.feedback = Some(SpellingFeedback::OutOfAttempts { answer: answer.clone() });
        SpellingAnswer::Failed { answer }
    }

    /// Hide retry feedback once it has been on screen long enough.
    pub fn clear_retry_feedback(&mut self) {
        if matches!(self.feedback, Some(SpellingFeedback::Retry { .. })) {
            self.feedback = None;
        }
    }

    /// Move on after an answered question. Returns true when the session
    /// just completed.
    pub fn next_question(&mut self) -> bool {
        if !self.question.as_ref().is_some_and(|q| q.answered) {
            return false;
        }
        if self.index >= self.cards.len() {
            let report = SessionReport {
                correct: self.correct_count,
                wrong: self.wrong_count,
                accuracy: self.accuracy(),
                score: self.score,
                detail: ReportDetail::PeakStreak(self.peak_streak),
            };
            tracing::info!(score = report.score, accuracy = report.accuracy, "spelling session complete");
            self.question = None;
            self.feedback = None;
            self.report = Some(report);
            true
        } else {
            self.new_question();
            false
        }
    }
}

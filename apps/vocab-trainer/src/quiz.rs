//! Multiple-choice quiz: pick the word that matches a meaning.

use crate::audio::Speaker;
use crate::models::{percentage, CardId, Flashcard, ReportDetail, SessionReport, WrongAnswer};
use crate::selection::{SelectionError, QUIZ_MIN_CARDS};
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};

/// Points for a correct answer.
pub const POINTS_PER_CORRECT: u32 = 10;
const DISTRACTORS: usize = QUIZ_MIN_CARDS - 1;

/// One answer button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOption {
    pub card_id: CardId,
    pub word: String,
    pub word_type: String,
}

/// The question currently on screen.
#[derive(Debug, Clone)]
pub struct QuizQuestion {
    pub target_id: CardId,
    /// Meaning shown as the prompt.
    pub prompt: String,
    pub options: Vec<QuizOption>,
}

impl QuizQuestion {
    pub fn correct_slot(&self) -> Option<usize> {
        self.options.iter().position(|o| o.card_id == self.target_id)
    }
}

/// Result of an answer, kept on screen until the next question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizFeedback {
    pub correct: bool,
    pub chosen: CardId,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizPhase {
    Question,
    Feedback(QuizFeedback),
    Completed(SessionReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizAnswer {
    Correct,
    Incorrect { answer: String },
    /// Out of phase or unknown option.
    Ignored,
}

pub struct QuizEngine {
    cards: Vec<Flashcard>,
    index: usize,
    score: u32,
    correct_count: usize,
    wrong_answers: Vec<WrongAnswer>,
    elapsed_secs: u64,
    question: Option<QuizQuestion>,
    phase: QuizPhase,
    rng: StdRng,
}

impl QuizEngine {
    pub fn new(cards: Vec<Flashcard>, rng: StdRng) -> Result<Self, SelectionError> {
        if cards.len() < QUIZ_MIN_CARDS {
            return Err(SelectionError::InsufficientCards {
                required: QUIZ_MIN_CARDS,
                available: cards.len(),
            });
        }
        let mut engine = Self {
            cards,
            index: 0,
            score: 0,
            correct_count: 0,
            wrong_answers: Vec::new(),
            elapsed_secs: 0,
            question: None,
            phase: QuizPhase::Question,
            rng,
        };
        engine.generate_question();
        tracing::info!(questions = engine.cards.len(), "quiz started");
        Ok(engine)
    }

    fn generate_question(&mut self) {
        let Some(target) = self.cards.get(self.index) else {
            self.question = None;
            return;
        };

        let others: Vec<&Flashcard> = self.cards.iter().filter(|c| c.id != target.id).collect();
        let mut options: Vec<QuizOption> = std::iter::once(target)
            .chain(others.choose_multiple(&mut self.rng, DISTRACTORS).copied())
            .map(|c| QuizOption {
                card_id: c.id,
                word: c.vocabulary.word.clone(),
                word_type: c.vocabulary.word_type.clone(),
            })
            .collect();
        options.shuffle(&mut self.rng);

        self.question = Some(QuizQuestion {
            target_id: target.id,
            prompt: target.vocabulary.meaning.clone(),
            options,
        });
    }

    pub fn question(&self) -> Option<&QuizQuestion> {
        self.question.as_ref()
    }

    pub fn phase(&self) -> &QuizPhase {
        &self.phase
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.phase, QuizPhase::Completed(_))
    }

    /// Zero-based number of the question being asked.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.cards.len()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn wrong_answers(&self) -> &[WrongAnswer] {
        &self.wrong_answers
    }

    /// Answer with the option in `slot`.
    pub fn answer_slot(&mut self, slot: usize, speaker: &dyn Speaker) -> QuizAnswer {
        let chosen = self.question.as_ref().and_then(|q| q.options.get(slot)).map(|o| o.card_id);
        match chosen {
            Some(id) => self.answer(id, speaker),
            None => QuizAnswer::Ignored,
        }
    }

    /// Answer with an option's card id. Correctness is by id, never by text.
    pub fn answer(&mut self, option_id: CardId, speaker: &dyn Speaker) -> QuizAnswer {
        if self.phase != QuizPhase::Question {
            return QuizAnswer::Ignored;
        }
        let Some(question) = &self.question else {
            return QuizAnswer::Ignored;
        };
        if !question.options.iter().any(|o| o.card_id == option_id) {
            return QuizAnswer::Ignored;
        }
        let Some(target) = self.cards.get(self.index) else {
            return QuizAnswer::Ignored;
        };

        let correct = option_id == question.target_id;
        let answer = target.vocabulary.word.clone();
        if correct {
            self.score += POINTS_PER_CORRECT;
            self.correct_count += 1;
            speaker.speak(&answer);
        } else {
            self.wrong_answers.push(WrongAnswer::from(target));
        }
        tracing::debug!(question = self.index, correct, "quiz answer");

        self.index += 1;
        self.phase = QuizPhase::Feedback(QuizFeedback {
            correct,
            chosen: option_id,
            answer: answer.clone(),
        });

        if correct {
            QuizAnswer::Correct
        } else {
            QuizAnswer::Incorrect { answer }
        }
    }

    /// Leave the feedback phase: next question, or the final report.
    ///
    /// Returns true when the quiz just completed.
    pub fn advance(&mut self) -> bool {
        if !matches!(self.phase, QuizPhase::Feedback(_)) {
            return false;
        }
        if self.index >= self.cards.len() {
            let report = self.report();
            tracing::info!(
                score = report.score,
                accuracy = report.accuracy,
                elapsed = self.elapsed_secs,
                "quiz complete"
            );
            self.question = None;
            self.phase = QuizPhase::Completed(report);
            true
        } else {
            self.generate_question();
            self.phase = QuizPhase::Question;
            false
        }
    }

    /// One second of quiz time. The clock stops on completion.
    pub fn tick(&mut self) {
        if !self.is_completed() {
            self.elapsed_secs += 1;
        }
    }

    fn report(&self) -> SessionReport {
        let total = self.cards.len();
        SessionReport {
            correct: self.correct_count,
            wrong: total - self.correct_count,
            accuracy: percentage(self.correct_count, total),
            score: self.score,
            detail: ReportDetail::ElapsedSecs(self.elapsed_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::RecordingSpeaker;
    use crate::audio::Silent;
    use crate::models::{Grade, Vocabulary};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn deck(words: &[(&str, &str)]) -> Vec<Flashcard> {
        words
            .iter()
            .map(|(w, m)| Flashcard::new(Vocabulary::new(*w, *m), 1))
            .collect()
    }

    fn fruit() -> Vec<Flashcard> {
        deck(&[
            ("Apple", "Quả táo"),
            ("Banana", "Quả chuối"),
            ("Cat", "Con mèo"),
            ("Dog", "Con chó"),
        ])
    }

    fn engine(cards: Vec<Flashcard>, seed: u64) -> QuizEngine {
        QuizEngine::new(cards, StdRng::seed_from_u64(seed)).unwrap()
    }

    fn answer_correctly(quiz: &mut QuizEngine, speaker: &dyn Speaker) -> QuizAnswer {
        let target = quiz.question().unwrap().target_id;
        quiz.answer(target, speaker)
    }

    fn answer_wrongly(quiz: &mut QuizEngine) -> QuizAnswer {
        let q = quiz.question().unwrap();
        let wrong = q.options.iter().find(|o| o.card_id != q.target_id).unwrap().card_id;
        quiz.answer(wrong, &Silent)
    }

    #[test]
    fn test_requires_four_cards() {
        let cards = deck(&[("a", "1"), ("b", "2"), ("c", "3")]);
        assert!(matches!(
            QuizEngine::new(cards, StdRng::seed_from_u64(0)),
            Err(SelectionError::InsufficientCards { required: 4, available: 3 })
        ));
    }

    #[test]
    fn test_question_shape() {
        let quiz = engine(fruit(), 1);
        let q = quiz.question().unwrap();
        assert_eq!(q.options.len(), 4);
        assert_eq!(q.prompt, quiz.cards[0].vocabulary.meaning);
        assert_eq!(q.options.iter().filter(|o| o.card_id == q.target_id).count(), 1);
        assert!(q.correct_slot().is_some());
    }

    #[test]
    fn test_all_correct_scenario() {
        let speaker = RecordingSpeaker::default();
        let mut quiz = engine(fruit(), 7);

        for i in 0..4 {
            assert_eq!(quiz.position(), i);
            assert_eq!(answer_correctly(&mut quiz, &speaker), QuizAnswer::Correct);
            let done = quiz.advance();
            assert_eq!(done, i == 3);
        }

        let QuizPhase::Completed(report) = quiz.phase() else {
            panic!("quiz should be complete");
        };
        assert_eq!(report.score, 40);
        assert_eq!(report.correct, 4);
        assert_eq!(report.wrong, 0);
        assert_eq!(report.accuracy, 100);
        assert_eq!(report.grade(), Grade::Excellent);
        assert_eq!(speaker.spoken.borrow().len(), 4);
    }

    #[test]
    fn test_wrong_answer_logged_without_points() {
        let mut quiz = engine(fruit(), 3);
        let target_word = quiz.cards[0].vocabulary.word.clone();
        assert_eq!(answer_wrongly(&mut quiz), QuizAnswer::Incorrect { answer: target_word.clone() });
        assert_eq!(quiz.score(), 0);
        assert_eq!(quiz.wrong_answers().len(), 1);
        assert_eq!(quiz.wrong_answers()[0].word, target_word);
    }

    #[test]
    fn test_answer_during_feedback_is_ignored() {
        let mut quiz = engine(fruit(), 4);
        answer_correctly(&mut quiz, &Silent);
        let stale = quiz.question().unwrap().target_id;
        assert_eq!(quiz.answer(stale, &Silent), QuizAnswer::Ignored);
        assert_eq!(quiz.score(), 10);
        assert_eq!(quiz.position(), 1);
    }

    #[test]
    fn test_unknown_option_is_ignored() {
        let mut quiz = engine(fruit(), 5);
        assert_eq!(quiz.answer(uuid::Uuid::new_v4(), &Silent), QuizAnswer::Ignored);
        assert_eq!(quiz.answer_slot(9, &Silent), QuizAnswer::Ignored);
        assert_eq!(quiz.position(), 0);
        assert!(!quiz.advance());
    }

    #[test]
    fn test_duplicate_words_judged_by_id() {
        let cards = deck(&[("same", "one"), ("same", "two"), ("c", "3"), ("d", "4")]);
        let mut quiz = engine(cards, 11);
        let q = quiz.question().unwrap().clone();
        let twin = q
            .options
            .iter()
            .find(|o| o.card_id != q.target_id && o.word == "same");
        if let Some(twin) = twin {
            assert!(matches!(quiz.answer(twin.card_id, &Silent), QuizAnswer::Incorrect { .. }));
        }
    }

    #[test]
    fn test_mixed_report_and_clock() {
        let mut quiz = engine(fruit(), 9);
        answer_correctly(&mut quiz, &Silent);
        quiz.advance();
        for _ in 0..3 {
            answer_wrongly(&mut quiz);
            quiz.advance();
        }
        quiz.tick();
        let QuizPhase::Completed(report) = quiz.phase().clone() else {
            panic!("quiz should be complete");
        };
        assert_eq!(report.correct, 1);
        assert_eq!(report.wrong, 3);
        assert_eq!(report.accuracy, 25);
        assert_eq!(report.grade(), Grade::KeepPracticing);
        // Clock stopped at completion
        assert_eq!(quiz.elapsed_secs(), 0);
    }

    #[test]
    fn test_clock_runs_while_active() {
        let mut quiz = engine(fruit(), 2);
        quiz.tick();
        quiz.tick();
        assert_eq!(quiz.elapsed_secs(), 2);
    }

    proptest! {
        #[test]
        fn prop_four_distinct_options(size in 4usize..20, seed in any::<u64>()) {
            let cards: Vec<Flashcard> = (0..size)
                .map(|i| Flashcard::new(Vocabulary::new(format!("w{}", i), format!("m{}", i)), 1))
                .collect();
            let mut quiz = engine(cards, seed);
            while !quiz.is_completed() {
                let q = quiz.question().unwrap();
                let ids: HashSet<_> = q.options.iter().map(|o| o.card_id).collect();
                prop_assert_eq!(ids.len(), 4);
                prop_assert_eq!(q.options.iter().filter(|o| o.card_id == q.target_id).count(), 1);
                let target = q.target_id;
                quiz.answer(target, &Silent);
                quiz.advance();
            }
            prop_assert_eq!(quiz.score(), size as u32 * POINTS_PER_CORRECT);
        }
    }
}

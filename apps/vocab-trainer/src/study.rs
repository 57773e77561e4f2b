//! Sequential review: reveal a card, move on, mark it learned.

use crate::models::Flashcard;
use crate::store::CardStore;

/// Result of a study navigation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyStep {
    /// Cursor moved to another card.
    Moved,
    /// The last unlearned card was marked; the cursor stays put.
    Completed,
    /// Not allowed here (empty session, first card, or nothing left).
    Ignored,
}

/// Study session over a filtered, unshuffled set of cards.
#[derive(Debug, Clone)]
pub struct StudyEngine {
    cards: Vec<Flashcard>,
    cursor: usize,
    flipped: bool,
}

impl StudyEngine {
    /// Start at the first unlearned card, or the first card if all are learned.
    pub fn new(cards: Vec<Flashcard>) -> Self {
        let cursor = cards.iter().position(|c| !c.is_learned).unwrap_or(0);
        tracing::debug!(cards = cards.len(), cursor, "study session started");
        Self {
            cards,
            cursor,
            flipped: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&Flashcard> {
        self.cards.get(self.cursor)
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Reveal or hide the meaning of the current card.
    pub fn flip(&mut self) {
        if !self.cards.is_empty() {
            self.flipped = !self.flipped;
        }
    }

    fn next_unlearned_after(&self, index: usize) -> Option<usize> {
        self.cards
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, c)| !c.is_learned)
            .map(|(i, _)| i)
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_next(&self) -> bool {
        match self.current() {
            Some(card) => !card.is_learned || self.next_unlearned_after(self.cursor).is_some(),
            None => false,
        }
    }

    /// Mark the current card learned and seek the next unlearned one.
    pub fn next(&mut self, store: &mut CardStore) -> StudyStep {
        if !self.can_go_next() {
            return StudyStep::Ignored;
        }

        let card = &mut self.cards[self.cursor];
        card.is_learned = true;
        store.set_learned(card.id, true);

        match self.next_unlearned_after(self.cursor) {
            Some(index) => {
                self.cursor = index;
                self.flipped = false;
                StudyStep::Moved
            }
            None => {
                tracing::info!(cards = self.cards.len(), "study session complete");
                StudyStep::Completed
            }
        }
    }

    /// Step back one card without touching learned state.
    pub fn previous(&mut self) -> StudyStep {
        if !self.can_go_back() {
            return StudyStep::Ignored;
        }
        self.cursor -= 1;
        self.flipped = false;
        StudyStep::Moved
    }

    /// Learned and total counts, recomputed from the session's flags.
    pub fn progress(&self) -> (usize, usize) {
        let learned = self.cards.iter().filter(|c| c.is_learned).count();
        (learned, self.cards.len())
    }

    pub fn is_complete(&self) -> bool {
        !self.cards.is_empty() && self.cards.iter().all(|c| c.is_learned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Vocabulary;

    fn setup(words: &[&str]) -> (CardStore, StudyEngine) {
        let mut store = CardStore::new();
        let batch = store.next_batch();
        for w in words {
            store.add(Vocabulary::new(*w, "m"), batch);
        }
        let engine = StudyEngine::new(store.cards().to_vec());
        (store, engine)
    }

    #[test]
    fn test_empty_session() {
        let (mut store, mut engine) = setup(&[]);
        assert!(engine.is_empty());
        assert!(engine.current().is_none());
        assert_eq!(engine.next(&mut store), StudyStep::Ignored);
        assert_eq!(engine.previous(), StudyStep::Ignored);
        assert_eq!(engine.progress(), (0, 0));
        assert_eq!(store.stats(), (0, 0));
    }

    #[test]
    fn test_starts_at_first_unlearned() {
        let mut store = CardStore::new();
        let b = store.next_batch();
        let first = store.add(Vocabulary::new("a", "m"), b);
        store.add(Vocabulary::new("b", "m"), b);
        store.set_learned(first, true);

        let engine = StudyEngine::new(store.cards().to_vec());
        assert_eq!(engine.cursor(), 1);
    }

    #[test]
    fn test_all_learned_starts_at_zero() {
        let (mut store, _) = setup(&["a", "b"]);
        let ids: Vec<_> = store.cards().iter().map(|c| c.id).collect();
        for id in ids {
            store.set_learned(id, true);
        }
        let engine = StudyEngine::new(store.cards().to_vec());
        assert_eq!(engine.cursor(), 0);
        assert!(engine.is_complete());
        assert!(!engine.can_go_next());
    }

    #[test]
    fn test_next_marks_learned_and_writes_back() {
        let (mut store, mut engine) = setup(&["a", "b", "c"]);
        assert_eq!(engine.next(&mut store), StudyStep::Moved);
        assert_eq!(engine.cursor(), 1);
        assert!(store.cards()[0].is_learned);
        assert_eq!(engine.progress(), (1, 3));
    }

    #[test]
    fn test_completion_does_not_move_past_end() {
        let (mut store, mut engine) = setup(&["a", "b"]);
        assert_eq!(engine.next(&mut store), StudyStep::Moved);
        assert_eq!(engine.next(&mut store), StudyStep::Completed);
        assert_eq!(engine.cursor(), 1);
        assert!(engine.is_complete());
        assert_eq!(engine.next(&mut store), StudyStep::Ignored);
        assert_eq!(engine.cursor(), 1);
        assert_eq!(store.stats(), (2, 2));
    }

    #[test]
    fn test_previous_keeps_learned_state() {
        let (mut store, mut engine) = setup(&["a", "b", "c"]);
        engine.next(&mut store);
        assert!(engine.can_go_back());
        assert_eq!(engine.previous(), StudyStep::Moved);
        assert_eq!(engine.cursor(), 0);
        assert!(engine.current().unwrap().is_learned);
        assert!(!engine.can_go_back());
        assert_eq!(engine.previous(), StudyStep::Ignored);

        // A learned card with unlearned cards ahead can still move forward
        assert!(engine.can_go_next());
        assert_eq!(engine.next(&mut store), StudyStep::Moved);
        assert_eq!(engine.cursor(), 1);
    }

    #[test]
    fn test_skips_cards_learned_elsewhere() {
        let (mut store, _) = setup(&["a", "b", "c"]);
        // Learned state in the snapshot drives the seek
        let mut cards = store.cards().to_vec();
        cards[1].is_learned = true;
        let mut engine = StudyEngine::new(cards);
        assert_eq!(engine.next(&mut store), StudyStep::Moved);
        assert_eq!(engine.cursor(), 2);
    }

    #[test]
    fn test_flip_resets_on_move() {
        let (mut store, mut engine) = setup(&["a", "b"]);
        engine.flip();
        assert!(engine.is_flipped());
        engine.next(&mut store);
        assert!(!engine.is_flipped());
    }

    #[test]
    fn test_write_back_to_deleted_card_is_harmless() {
        let (mut store, mut engine) = setup(&["a", "b"]);
        let id = store.cards()[0].id;
        store.remove(id);
        assert_eq!(engine.next(&mut store), StudyStep::Moved);
        assert_eq!(store.stats(), (1, 0));
    }
}

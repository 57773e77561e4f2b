//! In-memory card collection and batch counter.

use crate::models::{normalize_word, BatchId, CardId, CategoryFilter, Flashcard, Vocabulary};
use rand::seq::SliceRandom;
use rand::Rng;

/// Owner of the canonical flashcards.
///
/// Sessions work on snapshots and write learned state back here by id,
/// since a shuffled snapshot does not share the store's ordering.
#[derive(Debug, Clone, Default)]
pub struct CardStore {
    cards: Vec<Flashcard>,
    batch_counter: BatchId,
}

impl CardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted state.
    pub fn from_parts(cards: Vec<Flashcard>, batch_counter: BatchId) -> Self {
        // Never hand out a batch number that is already in use
        let highest = cards.iter().map(|c| c.batch).max().unwrap_or(0);
        Self {
            cards,
            batch_counter: batch_counter.max(highest),
        }
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn batch_counter(&self) -> BatchId {
        self.batch_counter
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Check if a word already exists, ignoring case and surrounding whitespace.
    pub fn is_word_duplicate(&self, word: &str) -> bool {
        let needle = normalize_word(word);
        self.cards.iter().any(|c| normalize_word(&c.vocabulary.word) == needle)
    }

    /// Reserve the next batch number.
    pub fn next_batch(&mut self) -> BatchId {
        self.batch_counter += 1;
        self.batch_counter
    }

    /// Append a card. Duplicate checks are the importer's job.
    pub fn add(&mut self, vocabulary: Vocabulary, batch: BatchId) -> CardId {
        let card = Flashcard::new(vocabulary, batch);
        let id = card.id;
        self.cards.push(card);
        id
    }

    pub fn get(&self, id: CardId) -> Option<&Flashcard> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Set the learned flag. Returns false if the card no longer exists.
    pub fn set_learned(&mut self, id: CardId, learned: bool) -> bool {
        match self.cards.iter_mut().find(|c| c.id == id) {
            Some(card) => {
                card.is_learned = learned;
                true
            }
            None => {
                tracing::warn!(%id, "learned-state write-back to missing card");
                false
            }
        }
    }

    /// Replace a card's content. Rejects invalid content and words that
    /// would duplicate a different card.
    pub fn update_vocabulary(&mut self, id: CardId, vocabulary: Vocabulary) -> bool {
        if !vocabulary.is_valid() {
            return false;
        }
        let needle = normalize_word(&vocabulary.word);
        let clash = self
            .cards
            .iter()
            .any(|c| c.id != id && normalize_word(&c.vocabulary.word) == needle);
        if clash {
            return false;
        }
        match self.cards.iter_mut().find(|c| c.id == id) {
            Some(card) => {
                card.vocabulary = vocabulary;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: CardId) -> bool {
        let before = self.cards.len();
        self.cards.retain(|c| c.id != id);
        self.cards.len() != before
    }

    /// Delete every card. The batch counter keeps counting.
    pub fn clear(&mut self) {
        self.cards.clear();
    }

    /// Shuffle the browse order.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Batches in ascending order with their card counts.
    pub fn batches(&self) -> Vec<(BatchId, usize)> {
        let mut batches: Vec<(BatchId, usize)> = Vec::new();
        for card in &self.cards {
            match batches.iter_mut().find(|(b, _)| *b == card.batch) {
                Some((_, count)) => *count += 1,
                None => batches.push((card.batch, 1)),
            }
        }
        batches.sort_by_key(|(b, _)| *b);
        batches
    }

    pub fn batch_ids(&self) -> Vec<BatchId> {
        self.batches().into_iter().map(|(b, _)| b).collect()
    }

    /// Cards matching a filter, in store order.
    pub fn filtered(&self, filter: CategoryFilter) -> Vec<Flashcard> {
        self.cards.iter().filter(|c| filter.matches(c)).cloned().collect()
    }

    pub fn count(&self, filter: CategoryFilter) -> usize {
        self.cards.iter().filter(|c| filter.matches(c)).count()
    }

    /// Total and learned card counts.
    pub fn stats(&self) -> (usize, usize) {
        let learned = self.cards.iter().filter(|c| c.is_learned).count();
        (self.cards.len(), learned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn store_with(words: &[&str]) -> CardStore {
        let mut store = CardStore::new();
        let batch = store.next_batch();
        for w in words {
            store.add(Vocabulary::new(*w, "meaning"), batch);
        }
        store
    }

    #[test]
    fn test_duplicate_detection() {
        let store = store_with(&["Apple", "banana"]);
        assert!(store.is_word_duplicate("apple"));
        assert!(store.is_word_duplicate("  BANANA "));
        assert!(!store.is_word_duplicate("cherry"));
    }

    #[test]
    fn test_batch_counter_is_monotonic() {
        let mut store = CardStore::new();
        assert_eq!(store.next_batch(), 1);
        assert_eq!(store.next_batch(), 2);
        store.clear();
        assert_eq!(store.next_batch(), 3);
    }

    #[test]
    fn test_from_parts_repairs_counter() {
        let mut store = store_with(&["a"]);
        store.next_batch();
        store.next_batch();
        let cards = store.cards().to_vec();
        let restored = CardStore::from_parts(cards, 0);
        assert_eq!(restored.batch_counter(), 1);
    }

    #[test]
    fn test_set_learned_by_id() {
        let mut store = store_with(&["cat", "dog"]);
        let id = store.cards()[1].id;
        assert!(store.set_learned(id, true));
        assert!(store.get(id).unwrap().is_learned);
        assert_eq!(store.stats(), (2, 1));
        assert!(!store.set_learned(uuid::Uuid::new_v4(), true));
    }

    #[test]
    fn test_update_rejects_duplicate_word() {
        let mut store = store_with(&["cat", "dog"]);
        let id = store.cards()[0].id;
        assert!(!store.update_vocabulary(id, Vocabulary::new("DOG", "x")));
        assert!(store.update_vocabulary(id, Vocabulary::new("Cat", "con mèo")));
        assert_eq!(store.get(id).unwrap().meaning(), "con mèo");
        assert!(!store.update_vocabulary(id, Vocabulary::new("cat", " ")));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut store = store_with(&["cat", "dog"]);
        let id = store.cards()[0].id;
        assert!(store.remove(id));
        assert!(!store.remove(id));
        assert_eq!(store.len(), 1);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_batches_and_filter() {
        let mut store = CardStore::new();
        let b1 = store.next_batch();
        let b2 = store.next_batch();
        store.add(Vocabulary::new("a1", "m"), b2);
        store.add(Vocabulary::new("a2", "m"), b1);
        store.add(Vocabulary::new("a3", "m"), b2);

        assert_eq!(store.batches(), vec![(1, 1), (2, 2)]);
        assert_eq!(store.count(CategoryFilter::Batch(b2)), 2);
        let words: Vec<_> = store
            .filtered(CategoryFilter::Batch(b2))
            .iter()
            .map(|c| c.word().to_string())
            .collect();
        assert_eq!(words, vec!["a1", "a3"]);
        assert_eq!(store.count(CategoryFilter::All), 3);
    }

    #[test]
    fn test_shuffle_keeps_cards() {
        let mut store = store_with(&["a", "b", "c", "d", "e"]);
        let mut before: Vec<_> = store.cards().iter().map(|c| c.id).collect();
        store.shuffle(&mut StdRng::seed_from_u64(3));
        let mut after: Vec<_> = store.cards().iter().map(|c| c.id).collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    proptest! {
        #[test]
        fn prop_duplicate_iff_normalized_match(
            words in proptest::collection::vec("[a-zA-Z ]{1,8}", 0..8),
            probe in "[a-zA-Z ]{1,8}",
        ) {
            let mut store = CardStore::new();
            for (i, w) in words.iter().enumerate() {
                // Spread across batches; duplicates ignore batch boundaries
                store.add(Vocabulary::new(w.clone(), "m"), i as BatchId + 1);
            }
            let expected = words
                .iter()
                .any(|w| w.trim().to_lowercase() == probe.trim().to_lowercase());
            prop_assert_eq!(store.is_word_duplicate(&probe), expected);
        }
    }
}

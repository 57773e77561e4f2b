//! Card selection for study sessions.

use crate::models::{CategoryFilter, Flashcard};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

/// A quiz needs the target plus three distractors.
pub const QUIZ_MIN_CARDS: usize = 4;
pub const SPELLING_MIN_CARDS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("need at least {required} cards, only {available} available")]
    InsufficientCards { required: usize, available: usize },
}

/// Clamp a requested sample size to `[minimum, available]`.
pub fn clamp_sample_size(requested: usize, minimum: usize, available: usize) -> usize {
    requested.max(minimum).min(available)
}

/// Draw a uniformly shuffled sample of cards matching `filter`.
///
/// The result is a snapshot; changes to it do not reach the store.
pub fn select_sample<R: Rng + ?Sized>(
    cards: &[Flashcard],
    filter: CategoryFilter,
    requested: usize,
    minimum: usize,
    rng: &mut R,
) -> Result<Vec<Flashcard>, SelectionError> {
    let mut pool: Vec<Flashcard> = cards.iter().filter(|c| filter.matches(c)).cloned().collect();
    if pool.len() < minimum {
        return Err(SelectionError::InsufficientCards {
            required: minimum,
            available: pool.len(),
        });
    }

    let size = clamp_sample_size(requested, minimum, pool.len());
    pool.shuffle(rng);
    pool.truncate(size);
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Vocabulary;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn cards(batches: &[u32]) -> Vec<Flashcard> {
        batches
            .iter()
            .enumerate()
            .map(|(i, b)| Flashcard::new(Vocabulary::new(format!("word{}", i), "m"), *b))
            .collect()
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp_sample_size(50, 4, 10), 10);
        assert_eq!(clamp_sample_size(2, 4, 10), 4);
        assert_eq!(clamp_sample_size(6, 4, 10), 6);
        assert_eq!(clamp_sample_size(0, 1, 3), 1);
    }

    #[test]
    fn test_insufficient_cards() {
        let all = cards(&[1, 1, 2]);
        let mut rng = StdRng::seed_from_u64(1);
        let err = select_sample(&all, CategoryFilter::All, 10, QUIZ_MIN_CARDS, &mut rng).unwrap_err();
        assert_eq!(err, SelectionError::InsufficientCards { required: 4, available: 3 });

        let err = select_sample(&all, CategoryFilter::Batch(7), 10, SPELLING_MIN_CARDS, &mut rng).unwrap_err();
        assert_eq!(err, SelectionError::InsufficientCards { required: 1, available: 0 });
    }

    #[test]
    fn test_filter_by_batch() {
        let all = cards(&[1, 2, 2, 1, 2]);
        let mut rng = StdRng::seed_from_u64(2);
        let sample = select_sample(&all, CategoryFilter::Batch(2), 50, SPELLING_MIN_CARDS, &mut rng).unwrap();
        assert_eq!(sample.len(), 3);
        assert!(sample.iter().all(|c| c.batch == 2));
    }

    proptest! {
        #[test]
        fn prop_sample_bounds(
            count in 0usize..30,
            requested in 0usize..40,
            minimum in 1usize..6,
            seed in any::<u64>(),
        ) {
            let all = cards(&vec![1; count]);
            let mut rng = StdRng::seed_from_u64(seed);
            match select_sample(&all, CategoryFilter::All, requested, minimum, &mut rng) {
                Ok(sample) => {
                    prop_assert!(count >= minimum);
                    prop_assert!(sample.len() >= minimum);
                    prop_assert!(sample.len() <= count);
                    prop_assert!(sample.len() <= requested.max(minimum));
                    let ids: HashSet<_> = sample.iter().map(|c| c.id).collect();
                    prop_assert_eq!(ids.len(), sample.len());
                }
                Err(SelectionError::InsufficientCards { required, available }) => {
                    prop_assert!(count < minimum);
                    prop_assert_eq!(required, minimum);
                    prop_assert_eq!(available, count);
                }
            }
        }
    }
}

//! Multiple-choice candidate generation
//!
//! One correct value plus two distractors drawn from `correct ± 1..=3`,
//! returned in shuffled order.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::consts::{CANDIDATE_COUNT, MAX_DISTRACTOR_OFFSET};

/// Inclusive bounds every candidate must respect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRange {
    pub floor: u32,
    pub ceiling: u32,
}

impl AnswerRange {
    pub const fn new(floor: u32, ceiling: u32) -> Self {
        Self { floor, ceiling }
    }

    /// Addition and multiplication never offer zero
    pub const fn positive(ceiling: u32) -> Self {
        Self::new(1, ceiling)
    }

    /// Subtraction may legitimately land on zero
    pub const fn non_negative(ceiling: u32) -> Self {
        Self::new(0, ceiling)
    }

    /// Raise the ceiling so that `value` itself is in range
    pub fn covering(self, value: u32) -> Self {
        Self::new(self.floor, self.ceiling.max(value))
    }

    #[inline]
    pub fn contains(&self, value: u32) -> bool {
        (self.floor..=self.ceiling).contains(&value)
    }
}

/// Distractor values available around `correct` within `range`
fn distractor_pool(correct: u32, range: AnswerRange) -> impl Iterator<Item = u32> {
    (1..=MAX_DISTRACTOR_OFFSET)
        .flat_map(move |d| [correct.checked_sub(d), correct.checked_add(d)])
        .flatten()
        .filter(move |v| range.contains(*v))
}

/// Generate the candidate answer set for `correct`.
///
/// Returns `None` when `correct` is outside `range` or the range leaves fewer
/// than two distractors, since sampling could never finish.
pub fn generate_answers<R: Rng + ?Sized>(
    rng: &mut R,
    correct: u32,
    range: AnswerRange,
) -> Option<[u32; CANDIDATE_COUNT]> {
    if !range.contains(correct) || distractor_pool(correct, range).count() < CANDIDATE_COUNT - 1 {
        return None;
    }

    let max_offset = MAX_DISTRACTOR_OFFSET as i64;
    let mut answers = Vec::with_capacity(CANDIDATE_COUNT);
    answers.push(correct);
    while answers.len() < CANDIDATE_COUNT {
        let candidate = correct as i64 + rng.random_range(-max_offset..=max_offset);
        let Ok(candidate) = u32::try_from(candidate) else {
            continue;
        };
        if range.contains(candidate) && !answers.contains(&candidate) {
            answers.push(candidate);
        }
    }

    answers.shuffle(rng);
    Some([answers[0], answers[1], answers[2]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_contains_correct_once() {
        let mut rng = Pcg32::seed_from_u64(7);
        let answers = generate_answers(&mut rng, 5, AnswerRange::positive(20)).unwrap();
        assert_eq!(answers.iter().filter(|&&a| a == 5).count(), 1);
        assert!(answers.iter().all(|a| (2..=8).contains(a)));
    }

    #[test]
    fn test_floor_respected() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..200 {
            let answers = generate_answers(&mut rng, 1, AnswerRange::positive(20)).unwrap();
            assert!(answers.iter().all(|&a| a >= 1));
        }
        for _ in 0..200 {
            let answers = generate_answers(&mut rng, 0, AnswerRange::non_negative(20)).unwrap();
            assert!(answers.contains(&0));
            assert!(answers.iter().all(|&a| a <= 3));
        }
    }

    #[test]
    fn test_ceiling_respected() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..200 {
            let answers = generate_answers(&mut rng, 20, AnswerRange::positive(20)).unwrap();
            assert!(answers.iter().all(|&a| (17..=20).contains(&a)));
        }
    }

    #[test]
    fn test_impossible_ranges_rejected() {
        let mut rng = Pcg32::seed_from_u64(0);
        // Correct value above the ceiling
        assert!(generate_answers(&mut rng, 25, AnswerRange::positive(20)).is_none());
        // Only one distractor fits
        assert!(generate_answers(&mut rng, 1, AnswerRange::new(1, 2)).is_none());
        // Widening the ceiling makes it work again
        let range = AnswerRange::positive(20).covering(25);
        assert!(generate_answers(&mut rng, 25, range).is_some());
    }

    #[test]
    fn test_correct_position_roughly_uniform() {
        let mut rng = Pcg32::seed_from_u64(2024);
        let mut positions = [0u32; CANDIDATE_COUNT];
        for _ in 0..1000 {
            let answers = generate_answers(&mut rng, 10, AnswerRange::positive(20)).unwrap();
            let idx = answers.iter().position(|&a| a == 10).unwrap();
            positions[idx] += 1;
        }
        for count in positions {
            assert!((250..=420).contains(&count), "skewed positions: {positions:?}");
        }
    }

    #[test]
    fn test_determinism() {
        let mut rng1 = Pcg32::seed_from_u64(99);
        let mut rng2 = Pcg32::seed_from_u64(99);
        for correct in 1..15 {
            let range = AnswerRange::positive(20);
            assert_eq!(
                generate_answers(&mut rng1, correct, range),
                generate_answers(&mut rng2, correct, range)
            );
        }
    }

    proptest! {
        #[test]
        fn prop_three_distinct_in_range(seed in any::<u64>(), correct in 1u32..=200, floor in 0u32..=1) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let range = AnswerRange::new(floor, 20).covering(correct);
            let answers = generate_answers(&mut rng, correct, range).unwrap();

            prop_assert_eq!(answers.iter().filter(|&&a| a == correct).count(), 1);
            prop_assert!(answers[0] != answers[1] && answers[1] != answers[2] && answers[0] != answers[2]);
            for a in answers {
                prop_assert!(range.contains(a));
                prop_assert!(a.abs_diff(correct) <= MAX_DISTRACTOR_OFFSET);
            }
        }
    }
}

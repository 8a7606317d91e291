//! Addition exercise
//!
//! The child taps two zones to place red and blue balloons, presses `=`,
//! then picks the total from three candidates.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::answers::{AnswerRange, generate_answers};
use super::state::{Counter, Deferred, Feedback, Operand, Phase, Quiz, Rejection, Timing};
use crate::settings::Settings;
use crate::words::tally_caption;

/// Per-round state, replaced wholesale on reset
#[derive(Debug, Clone, Default)]
pub struct AdditionRound {
    pub counters: Vec<Counter>,
    pub first_count: u32,
    pub second_count: u32,
    /// Present once the round is locked
    pub quiz: Option<Quiz>,
    pub completed: bool,
}

/// Read-only view of an addition round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdditionSnapshot {
    pub phase: Phase,
    pub counters: Vec<Counter>,
    pub first_count: u32,
    pub second_count: u32,
    pub first_caption: Option<String>,
    pub second_caption: Option<String>,
    pub locked: bool,
    /// Only revealed once locked
    pub result: Option<u32>,
    pub candidates: Vec<u32>,
    pub selected: Option<u32>,
    pub feedback: Option<Feedback>,
    pub completed: bool,
    pub celebrating: bool,
}

pub struct AdditionExercise {
    rng: Pcg32,
    timing: Timing,
    answer_ceiling: u32,
    number_words: bool,
    next_id: u32,
    round: AdditionRound,
}

impl AdditionExercise {
    pub fn new(seed: u64, settings: &Settings) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            timing: Timing::from_settings(settings),
            answer_ceiling: settings.usable_answer_ceiling(),
            number_words: settings.number_words,
            next_id: 1,
            round: AdditionRound::default(),
        }
    }

    pub fn round(&self) -> &AdditionRound {
        &self.round
    }

    pub fn phase(&self) -> Phase {
        match &self.round.quiz {
            None => Phase::Collecting,
            Some(_) if self.round.completed => Phase::Celebrating,
            Some(_) => Phase::Evaluating,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.round.quiz.is_some()
    }

    pub fn count(&self, operand: Operand) -> u32 {
        match operand {
            Operand::First => self.round.first_count,
            Operand::Second => self.round.second_count,
        }
    }

    /// Frozen once locked; otherwise the live sum of both groups
    pub fn expected_result(&self) -> u32 {
        match &self.round.quiz {
            Some(quiz) => quiz.expected,
            None => self.round.first_count + self.round.second_count,
        }
    }

    /// Place a balloon in one of the two groups. Returns the new counter id.
    pub fn add_counter(&mut self, operand: Operand, pos: Vec2) -> Result<u32, Rejection> {
        if self.is_locked() {
            return Err(Rejection::Locked);
        }

        let id = self.next_id;
        self.next_id += 1;
        self.round.counters.push(Counter {
            id,
            pos,
            operand,
            color: operand.color(),
            removed: false,
        });
        match operand {
            Operand::First => self.round.first_count += 1,
            Operand::Second => self.round.second_count += 1,
        }
        Ok(id)
    }

    /// Lock the round and build the candidate answers
    pub fn confirm(&mut self) -> Result<(), Rejection> {
        if self.is_locked() {
            return Err(Rejection::Locked);
        }
        let total = self.expected_result();
        if total == 0 {
            return Err(Rejection::NothingToConfirm);
        }

        let range = AnswerRange::positive(self.answer_ceiling).covering(total);
        let candidates =
            generate_answers(&mut self.rng, total, range).ok_or(Rejection::NoCandidates)?;
        log::info!(
            "Addition {} + {} locked, candidates {:?}",
            self.round.first_count,
            self.round.second_count,
            candidates
        );
        self.round.quiz = Some(Quiz::new(total, candidates));
        Ok(())
    }

    pub fn select_answer(&mut self, value: u32) -> Result<Feedback, Rejection> {
        let quiz = self.round.quiz.as_mut().ok_or(Rejection::WrongPhase)?;
        let feedback = quiz.select(value, &self.timing)?;
        if feedback == Feedback::Correct {
            self.round.completed = true;
            log::info!("Addition solved: {}", value);
        }
        Ok(feedback)
    }

    /// Advance deferred transitions by one tick
    pub fn tick(&mut self) -> Option<Deferred> {
        let fired = self.round.quiz.as_mut()?.tick()?;
        if fired == Deferred::EndCelebration {
            self.reset();
        }
        Some(fired)
    }

    pub fn reset(&mut self) {
        self.round = AdditionRound::default();
        log::info!("Addition reset");
    }

    pub fn snapshot(&self) -> AdditionSnapshot {
        let round = &self.round;
        let quiz = round.quiz.as_ref();
        let caption = |n| self.number_words.then(|| tally_caption(n));
        AdditionSnapshot {
            phase: self.phase(),
            counters: round.counters.clone(),
            first_count: round.first_count,
            second_count: round.second_count,
            first_caption: caption(round.first_count),
            second_caption: caption(round.second_count),
            locked: quiz.is_some(),
            result: quiz.map(|q| q.expected),
            candidates: quiz.map(|q| q.candidates.to_vec()).unwrap_or_default(),
            selected: quiz.and_then(|q| q.selected),
            feedback: quiz.and_then(|q| q.feedback()),
            completed: round.completed,
            celebrating: self.phase() == Phase::Celebrating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn exercise() -> AdditionExercise {
        AdditionExercise::new(42, &Settings::default())
    }

    fn run_ticks(ex: &mut AdditionExercise, n: u32) {
        for _ in 0..n {
            ex.tick();
        }
    }

    #[test]
    fn test_zero_ceiling_still_confirms() {
        let settings = Settings {
            answer_ceiling: 0,
            ..Settings::default()
        };
        let mut ex = AdditionExercise::new(1, &settings);
        ex.add_counter(Operand::First, Vec2::ZERO).unwrap();
        assert_eq!(ex.confirm(), Ok(()));
        assert!(ex.is_locked());
        assert!(ex.snapshot().candidates.contains(&1));
    }

    #[test]
    fn test_end_to_end_with_retry() {
        let mut ex = exercise();
        for _ in 0..2 {
            ex.add_counter(Operand::First, Vec2::new(10.0, 10.0)).unwrap();
        }
        for _ in 0..3 {
            ex.add_counter(Operand::Second, Vec2::new(50.0, 10.0)).unwrap();
        }
        ex.confirm().unwrap();
        assert_eq!(ex.expected_result(), 5);
        assert_eq!(ex.phase(), Phase::Evaluating);

        let snap = ex.snapshot();
        assert_eq!(snap.candidates.iter().filter(|&&c| c == 5).count(), 1);
        let wrong = *snap.candidates.iter().find(|&&c| c != 5).unwrap();

        assert_eq!(ex.select_answer(wrong), Ok(Feedback::Incorrect));
        assert_eq!(ex.select_answer(5), Err(Rejection::AlreadySelected));
        run_ticks(&mut ex, Timing::default().wrong_answer_ticks);

        let after = ex.snapshot();
        assert_eq!(after.selected, None);
        assert!(after.locked);
        assert_eq!(after.phase, Phase::Evaluating);
        assert_eq!(after.candidates, snap.candidates);

        assert_eq!(ex.select_answer(5), Ok(Feedback::Correct));
        assert!(ex.round().completed);
        assert!(ex.snapshot().celebrating);
    }

    #[test]
    fn test_celebration_resets_exercise() {
        let mut ex = exercise();
        ex.add_counter(Operand::First, Vec2::ZERO).unwrap();
        ex.confirm().unwrap();
        ex.select_answer(1).unwrap();

        let ticks = Timing::default().celebration_ticks;
        run_ticks(&mut ex, ticks - 1);
        assert_eq!(ex.phase(), Phase::Celebrating);
        assert_eq!(ex.tick(), Some(Deferred::EndCelebration));

        assert_eq!(ex.phase(), Phase::Collecting);
        assert!(ex.round().counters.is_empty());
        assert!(!ex.round().completed);
    }

    #[test]
    fn test_locked_rejects_input() {
        let mut ex = exercise();
        ex.add_counter(Operand::First, Vec2::ZERO).unwrap();
        ex.confirm().unwrap();
        assert_eq!(ex.add_counter(Operand::Second, Vec2::ZERO), Err(Rejection::Locked));
        assert_eq!(ex.confirm(), Err(Rejection::Locked));
        assert_eq!(ex.count(Operand::Second), 0);
    }

    #[test]
    fn test_confirm_requires_counters() {
        let mut ex = exercise();
        assert_eq!(ex.confirm(), Err(Rejection::NothingToConfirm));
        assert!(!ex.is_locked());
        assert_eq!(ex.select_answer(0), Err(Rejection::WrongPhase));
    }

    #[test]
    fn test_reset_cancels_pending_clear() {
        let mut ex = exercise();
        ex.add_counter(Operand::First, Vec2::ZERO).unwrap();
        ex.add_counter(Operand::First, Vec2::ZERO).unwrap();
        ex.confirm().unwrap();
        ex.select_answer(99).unwrap();
        let half = Timing::default().wrong_answer_ticks / 2;
        run_ticks(&mut ex, half);
        ex.reset();

        ex.add_counter(Operand::Second, Vec2::ZERO).unwrap();
        ex.confirm().unwrap();
        ex.select_answer(98).unwrap();
        run_ticks(&mut ex, half + 1);
        // The old round's clear would have fired by now; the new one has not
        assert_eq!(ex.snapshot().selected, Some(98));
    }

    #[test]
    fn test_large_totals_extend_range() {
        let mut ex = exercise();
        for _ in 0..25 {
            ex.add_counter(Operand::First, Vec2::ZERO).unwrap();
        }
        ex.confirm().unwrap();
        let snap = ex.snapshot();
        assert!(snap.candidates.contains(&25));
        assert!(snap.candidates.iter().all(|&c| (22..=25).contains(&c)));
    }

    #[test]
    fn test_counter_ids_unique_across_rounds() {
        let mut ex = exercise();
        let a = ex.add_counter(Operand::First, Vec2::ZERO).unwrap();
        ex.reset();
        let b = ex.add_counter(Operand::First, Vec2::ZERO).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_captions_in_snapshot() {
        let mut ex = exercise();
        ex.add_counter(Operand::First, Vec2::ZERO).unwrap();
        let snap = ex.snapshot();
        assert_eq!(snap.first_caption.as_deref(), Some("1 - uno"));
        assert_eq!(snap.second_caption.as_deref(), Some("0 - cero"));
        assert_eq!(snap.counters[0].color, crate::sim::state::Color::Red);
    }

    proptest! {
        #[test]
        fn prop_expected_is_sum_regardless_of_order(ops in proptest::collection::vec(any::<bool>(), 1..40)) {
            let mut ex = exercise();
            for &first in &ops {
                let operand = if first { Operand::First } else { Operand::Second };
                ex.add_counter(operand, Vec2::ZERO).unwrap();
            }
            let firsts = ops.iter().filter(|&&f| f).count() as u32;
            ex.confirm().unwrap();
            prop_assert_eq!(ex.expected_result(), ops.len() as u32);
            prop_assert_eq!(ex.count(Operand::First), firsts);
            prop_assert!(ex.snapshot().candidates.contains(&(ops.len() as u32)));
        }
    }
}

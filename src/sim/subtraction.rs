//! Subtraction exercise
//!
//! Balloons are added to one zone, `−` switches to removal where tapped
//! balloons turn transparent, and `=` locks the round for answering.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::answers::{AnswerRange, generate_answers};
use super::state::{Color, Counter, Deferred, Feedback, Operand, Phase, Quiz, Rejection, Timing};
use crate::settings::Settings;
use crate::words::subtraction_caption;

/// Per-round state, replaced wholesale on reset
#[derive(Debug, Clone, Default)]
pub struct SubtractionRound {
    pub counters: Vec<Counter>,
    pub total_count: u32,
    pub removed_count: u32,
    pub removing: bool,
    pub quiz: Option<Quiz>,
    pub completed: bool,
}

/// Read-only view of a subtraction round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtractionSnapshot {
    pub phase: Phase,
    pub counters: Vec<Counter>,
    pub total_count: u32,
    pub removed_count: u32,
    pub caption: Option<String>,
    pub locked: bool,
    pub result: Option<u32>,
    pub candidates: Vec<u32>,
    pub selected: Option<u32>,
    pub feedback: Option<Feedback>,
    pub completed: bool,
    pub celebrating: bool,
}

pub struct SubtractionExercise {
    rng: Pcg32,
    timing: Timing,
    answer_ceiling: u32,
    number_words: bool,
    next_id: u32,
    round: SubtractionRound,
}

impl SubtractionExercise {
    pub fn new(seed: u64, settings: &Settings) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            timing: Timing::from_settings(settings),
            answer_ceiling: settings.usable_answer_ceiling(),
            number_words: settings.number_words,
            next_id: 1,
            round: SubtractionRound::default(),
        }
    }

    pub fn round(&self) -> &SubtractionRound {
        &self.round
    }

    pub fn phase(&self) -> Phase {
        match &self.round.quiz {
            Some(_) if self.round.completed => Phase::Celebrating,
            Some(_) => Phase::Evaluating,
            None if self.round.removing => Phase::Removing,
            None => Phase::Collecting,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.round.quiz.is_some()
    }

    pub fn expected_result(&self) -> u32 {
        match &self.round.quiz {
            Some(quiz) => quiz.expected,
            None => self.round.total_count - self.round.removed_count,
        }
    }

    pub fn add_counter(&mut self, pos: Vec2) -> Result<u32, Rejection> {
        match self.phase() {
            Phase::Collecting => {}
            Phase::Removing => return Err(Rejection::WrongPhase),
            Phase::Evaluating | Phase::Celebrating => return Err(Rejection::Locked),
        }

        let id = self.next_id;
        self.next_id += 1;
        self.round.counters.push(Counter {
            id,
            pos,
            operand: Operand::First,
            color: Color::Blue,
            removed: false,
        });
        self.round.total_count += 1;
        Ok(id)
    }

    /// Switch from adding balloons to removing them
    pub fn begin_removal(&mut self) -> Result<(), Rejection> {
        match self.phase() {
            Phase::Collecting if self.round.total_count > 0 => {
                self.round.removing = true;
                log::debug!("Subtraction removing from {}", self.round.total_count);
                Ok(())
            }
            Phase::Collecting => Err(Rejection::NothingToConfirm),
            Phase::Removing => Err(Rejection::WrongPhase),
            Phase::Evaluating | Phase::Celebrating => Err(Rejection::Locked),
        }
    }

    pub fn remove_counter(&mut self, id: u32) -> Result<(), Rejection> {
        match self.phase() {
            Phase::Removing => {}
            Phase::Collecting => return Err(Rejection::WrongPhase),
            Phase::Evaluating | Phase::Celebrating => return Err(Rejection::Locked),
        }

        let counter = self
            .round
            .counters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(Rejection::UnknownCounter(id))?;
        if counter.removed {
            return Err(Rejection::AlreadyRemoved(id));
        }
        counter.removed = true;
        self.round.removed_count += 1;
        Ok(())
    }

    /// Lock the round. Needs removal mode and at least one removed balloon.
    pub fn confirm(&mut self) -> Result<(), Rejection> {
        match self.phase() {
            Phase::Removing if self.round.removed_count > 0 => {}
            Phase::Removing | Phase::Collecting => return Err(Rejection::NothingToConfirm),
            Phase::Evaluating | Phase::Celebrating => return Err(Rejection::Locked),
        }

        let remaining = self.expected_result();
        let range = AnswerRange::non_negative(self.answer_ceiling).covering(remaining);
        let candidates =
            generate_answers(&mut self.rng, remaining, range).ok_or(Rejection::NoCandidates)?;
        log::info!(
            "Subtraction {} - {} locked, candidates {:?}",
            self.round.total_count,
            self.round.removed_count,
            candidates
        );
        self.round.quiz = Some(Quiz::new(remaining, candidates));
        Ok(())
    }

    pub fn select_answer(&mut self, value: u32) -> Result<Feedback, Rejection> {
        let quiz = self.round.quiz.as_mut().ok_or(Rejection::WrongPhase)?;
        let feedback = quiz.select(value, &self.timing)?;
        if feedback == Feedback::Correct {
            self.round.completed = true;
            log::info!("Subtraction solved: {}", value);
        }
        Ok(feedback)
    }

    pub fn tick(&mut self) -> Option<Deferred> {
        let fired = self.round.quiz.as_mut()?.tick()?;
        if fired == Deferred::EndCelebration {
            self.reset();
        }
        Some(fired)
    }

    pub fn reset(&mut self) {
        self.round = SubtractionRound::default();
        log::info!("Subtraction reset");
    }

    pub fn snapshot(&self) -> SubtractionSnapshot {
        let round = &self.round;
        let quiz = round.quiz.as_ref();
        SubtractionSnapshot {
            phase: self.phase(),
            counters: round.counters.clone(),
            total_count: round.total_count,
            removed_count: round.removed_count,
            caption: self
                .number_words
                .then(|| subtraction_caption(round.total_count, round.removed_count)),
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

    fn with_balloons(n: u32) -> (SubtractionExercise, Vec<u32>) {
        let mut ex = SubtractionExercise::new(7, &Settings::default());
        let ids = (0..n)
            .map(|i| ex.add_counter(Vec2::new(i as f32 * 10.0, 0.0)).unwrap())
            .collect();
        (ex, ids)
    }

    #[test]
    fn test_zero_ceiling_still_confirms() {
        let settings = Settings {
            answer_ceiling: 0,
            ..Settings::default()
        };
        let mut ex = SubtractionExercise::new(1, &settings);
        let id = ex.add_counter(Vec2::ZERO).unwrap();
        ex.begin_removal().unwrap();
        ex.remove_counter(id).unwrap();
        assert_eq!(ex.confirm(), Ok(()));
        assert!(ex.is_locked());
        assert!(ex.snapshot().candidates.contains(&0));
    }

    #[test]
    fn test_full_round() {
        let (mut ex, ids) = with_balloons(5);
        assert_eq!(ex.confirm(), Err(Rejection::NothingToConfirm));
        ex.begin_removal().unwrap();
        assert_eq!(ex.phase(), Phase::Removing);
        assert_eq!(ex.confirm(), Err(Rejection::NothingToConfirm));

        ex.remove_counter(ids[0]).unwrap();
        ex.remove_counter(ids[3]).unwrap();
        ex.confirm().unwrap();
        assert_eq!(ex.expected_result(), 3);

        let snap = ex.snapshot();
        assert!(snap.candidates.contains(&3));
        assert_eq!(snap.caption.as_deref(), Some("5 - cinco menos 2 - dos"));
        assert_eq!(ex.select_answer(3), Ok(Feedback::Correct));
        assert_eq!(ex.phase(), Phase::Celebrating);
    }

    #[test]
    fn test_begin_removal_needs_balloons() {
        let (mut ex, _) = with_balloons(0);
        assert_eq!(ex.begin_removal(), Err(Rejection::NothingToConfirm));
        assert_eq!(ex.phase(), Phase::Collecting);
    }

    #[test]
    fn test_no_adding_while_removing() {
        let (mut ex, _) = with_balloons(2);
        ex.begin_removal().unwrap();
        assert_eq!(ex.add_counter(Vec2::ZERO), Err(Rejection::WrongPhase));
        assert_eq!(ex.begin_removal(), Err(Rejection::WrongPhase));
        assert_eq!(ex.round().total_count, 2);
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let (mut ex, ids) = with_balloons(3);
        ex.begin_removal().unwrap();
        ex.remove_counter(ids[1]).unwrap();
        assert_eq!(ex.remove_counter(ids[1]), Err(Rejection::AlreadyRemoved(ids[1])));
        assert_eq!(ex.round().removed_count, 1);
        assert_eq!(ex.remove_counter(999), Err(Rejection::UnknownCounter(999)));
    }

    #[test]
    fn test_remove_requires_removal_mode() {
        let (mut ex, ids) = with_balloons(3);
        assert_eq!(ex.remove_counter(ids[0]), Err(Rejection::WrongPhase));
        assert!(!ex.round().counters[0].removed);
    }

    #[test]
    fn test_remove_all_allows_zero_answer() {
        let (mut ex, ids) = with_balloons(2);
        ex.begin_removal().unwrap();
        for id in &ids {
            ex.remove_counter(*id).unwrap();
        }
        ex.confirm().unwrap();
        let snap = ex.snapshot();
        assert_eq!(snap.result, Some(0));
        assert!(snap.candidates.contains(&0));
        assert_eq!(ex.remove_counter(ids[0]), Err(Rejection::Locked));
    }

    #[test]
    fn test_celebration_resets_to_collecting() {
        let (mut ex, ids) = with_balloons(1);
        ex.begin_removal().unwrap();
        ex.remove_counter(ids[0]).unwrap();
        ex.confirm().unwrap();
        ex.select_answer(0).unwrap();
        let mut fired = None;
        for _ in 0..Timing::default().celebration_ticks {
            fired = ex.tick().or(fired);
        }
        assert_eq!(fired, Some(Deferred::EndCelebration));
        assert_eq!(ex.phase(), Phase::Collecting);
        assert_eq!(ex.round().total_count, 0);
    }

    proptest! {
        #[test]
        fn prop_removed_never_exceeds_total(total in 1u32..20, taps in proptest::collection::vec(0usize..40, 0..60)) {
            let (mut ex, ids) = with_balloons(total);
            ex.begin_removal().unwrap();
            for tap in taps {
                let id = ids.get(tap).copied().unwrap_or(10_000 + tap as u32);
                let _ = ex.remove_counter(id);
                prop_assert!(ex.round().removed_count <= ex.round().total_count);
            }
            let transparent = ex.round().counters.iter().filter(|c| c.removed).count() as u32;
            prop_assert_eq!(transparent, ex.round().removed_count);
        }
    }
}

//! Shared exercise types
//!
//! Counters, phases, rejections and the deferred transitions every engine
//! counts down each tick. Pending transitions live inside the round state,
//! so replacing the round on reset also cancels them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{CANDIDATE_COUNT, CELEBRATION_MS, WRONG_ANSWER_CLEAR_MS};
use crate::ms_to_ticks;
use crate::settings::Settings;

/// Phase of an addition or subtraction round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Taps add counters
    #[default]
    Collecting,
    /// Subtraction only: taps on counters remove them
    Removing,
    /// Locked, waiting for an answer
    Evaluating,
    /// Correct answer given, auto-reset pending
    Celebrating,
}

impl Phase {
    pub fn is_locked(self) -> bool {
        matches!(self, Phase::Evaluating | Phase::Celebrating)
    }
}

/// Which operand group a counter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    First,
    Second,
}

impl Operand {
    pub fn color(self) -> Color {
        match self {
            Operand::First => Color::Red,
            Operand::Second => Color::Blue,
        }
    }
}

/// Balloon colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Green,
    Red,
    Blue,
    Yellow,
    Pink,
    Purple,
}

/// Multiplication groups cycle through this palette by index
pub const GROUP_PALETTE: [Color; 6] = [
    Color::Green,
    Color::Red,
    Color::Blue,
    Color::Yellow,
    Color::Pink,
    Color::Purple,
];

/// A single balloon placed by the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub id: u32,
    /// Where the player tapped (view coordinates, carried through untouched)
    pub pos: Vec2,
    pub operand: Operand,
    pub color: Color,
    /// Subtraction only: the balloon was tapped away and renders transparent.
    /// Left out of the JSON while false.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub removed: bool,
}

/// Why an operation left the exercise untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("exercise is locked")]
    Locked,
    #[error("operation not available in the current phase")]
    WrongPhase,
    #[error("nothing to evaluate yet")]
    NothingToConfirm,
    #[error("an answer is already selected")]
    AlreadySelected,
    #[error("counter {0} was already removed")]
    AlreadyRemoved(u32),
    #[error("group {0} is already committed")]
    AlreadyCommitted(u32),
    #[error("factor already entered")]
    FactorAlreadySet,
    #[error("no counter with id {0}")]
    UnknownCounter(u32),
    #[error("no group with id {0}")]
    UnknownGroup(u32),
    #[error("digit {0} is not between 0 and 9")]
    DigitOutOfRange(u8),
    #[error("no drag in progress")]
    NoDrag,
    #[error("no candidate answers fit the configured range")]
    NoCandidates,
    #[error("this exercise does not understand that intent")]
    Unsupported,
}

/// Coarse classification of a rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    InvalidPhase,
    AlreadySatisfied,
    InvalidInput,
}

impl Rejection {
    pub fn kind(&self) -> RejectionKind {
        match self {
            Rejection::Locked
            | Rejection::WrongPhase
            | Rejection::NothingToConfirm
            | Rejection::NoDrag
            | Rejection::NoCandidates => RejectionKind::InvalidPhase,
            Rejection::AlreadySelected
            | Rejection::AlreadyRemoved(_)
            | Rejection::AlreadyCommitted(_)
            | Rejection::FactorAlreadySet => RejectionKind::AlreadySatisfied,
            Rejection::UnknownCounter(_)
            | Rejection::UnknownGroup(_)
            | Rejection::DigitOutOfRange(_)
            | Rejection::Unsupported => RejectionKind::InvalidInput,
        }
    }
}

/// Delays expressed in simulation ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub wrong_answer_ticks: u32,
    pub celebration_ticks: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            wrong_answer_ticks: ms_to_ticks(WRONG_ANSWER_CLEAR_MS),
            celebration_ticks: ms_to_ticks(CELEBRATION_MS),
        }
    }
}

impl Timing {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            wrong_answer_ticks: ms_to_ticks(settings.wrong_answer_clear_ms).max(1),
            celebration_ticks: ms_to_ticks(settings.celebration_ms).max(1),
        }
    }
}

/// Transitions scheduled for a later tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deferred {
    /// Wrong answer: clear the selection so the child can retry
    ClearSelection,
    /// Celebration over: start a fresh exercise
    EndCelebration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredTransition {
    pub kind: Deferred,
    pub ticks_remaining: u32,
}

impl DeferredTransition {
    pub fn new(kind: Deferred, ticks: u32) -> Self {
        Self {
            kind,
            ticks_remaining: ticks,
        }
    }

    /// Count down one tick; returns the kind once it is due
    pub fn step(&mut self) -> Option<Deferred> {
        self.ticks_remaining = self.ticks_remaining.saturating_sub(1);
        (self.ticks_remaining == 0).then_some(self.kind)
    }
}

/// Count down an optional pending transition, clearing it once it fires
pub fn step_pending(pending: &mut Option<DeferredTransition>) -> Option<Deferred> {
    let fired = pending.as_mut()?.step();
    if fired.is_some() {
        *pending = None;
    }
    fired
}

/// How the selected answer compares to the expected result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    Correct,
    Incorrect,
}

/// Locked evaluation state: fixed candidates and a single selection slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    pub expected: u32,
    pub candidates: [u32; CANDIDATE_COUNT],
    pub selected: Option<u32>,
    pending: Option<DeferredTransition>,
}

impl Quiz {
    pub fn new(expected: u32, candidates: [u32; CANDIDATE_COUNT]) -> Self {
        Self {
            expected,
            candidates,
            selected: None,
            pending: None,
        }
    }

    /// Record a selection. Values outside the candidate set count as wrong.
    pub fn select(&mut self, value: u32, timing: &Timing) -> Result<Feedback, Rejection> {
        if self.selected.is_some() {
            return Err(Rejection::AlreadySelected);
        }
        self.selected = Some(value);
        if value == self.expected {
            self.pending = Some(DeferredTransition::new(
                Deferred::EndCelebration,
                timing.celebration_ticks,
            ));
            Ok(Feedback::Correct)
        } else {
            self.pending = Some(DeferredTransition::new(
                Deferred::ClearSelection,
                timing.wrong_answer_ticks,
            ));
            Ok(Feedback::Incorrect)
        }
    }

    pub fn feedback(&self) -> Option<Feedback> {
        self.selected.map(|v| {
            if v == self.expected {
                Feedback::Correct
            } else {
                Feedback::Incorrect
            }
        })
    }

    pub fn pending(&self) -> Option<Deferred> {
        self.pending.map(|p| p.kind)
    }

    /// Advance one tick. A due `ClearSelection` is applied here; a due
    /// `EndCelebration` is returned for the owning engine to act on.
    pub fn tick(&mut self) -> Option<Deferred> {
        let fired = step_pending(&mut self.pending)?;
        if fired == Deferred::ClearSelection {
            self.selected = None;
        }
        Some(fired)
    }
}

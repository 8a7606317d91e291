//! Deterministic exercise module
//!
//! All arithmetic and answer checking lives here. This module must stay
//! free of rendering and platform code:
//! - Fixed timestep only (delays are tick countdowns)
//! - Seeded RNG only
//! - Each exercise owns its state; reset replaces it and drops pending timers

pub mod addition;
pub mod answers;
pub mod multiplication;
pub mod state;
pub mod subtraction;
pub mod tick;

pub use addition::{AdditionExercise, AdditionSnapshot};
pub use answers::{AnswerRange, generate_answers};
pub use multiplication::{
    DragSession, DropOutcome, FactorSlot, Group, MultiplicationExercise, MultiplicationPhase,
    MultiplicationSnapshot, generate_groups, group_position,
};
pub use state::{
    Color, Counter, Deferred, Feedback, Operand, Phase, Rejection, RejectionKind, Timing,
};
pub use subtraction::{SubtractionExercise, SubtractionSnapshot};
pub use tick::{Exercise, ExerciseSnapshot, Intent};

//! Intent dispatch and fixed timestep tick
//!
//! Views translate raw gestures into [`Intent`]s and hand them to
//! [`Exercise::apply`]; [`Exercise::tick`] advances deferred transitions.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::addition::{AdditionExercise, AdditionSnapshot};
use super::multiplication::{FactorSlot, MultiplicationExercise, MultiplicationSnapshot};
use super::state::{Deferred, Operand, Rejection};
use super::subtraction::{SubtractionExercise, SubtractionSnapshot};

/// A user gesture, already resolved to its meaning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    /// Tap inside a balloon zone. Subtraction ignores `operand`.
    AddCounter {
        #[serde(default = "default_operand")]
        operand: Operand,
        x: f32,
        y: f32,
    },
    BeginRemoval,
    RemoveCounter { id: u32 },
    Confirm,
    SelectAnswer { value: u32 },
    SetFactor { slot: FactorSlot, digit: u8 },
    EnterDigit { digit: u8 },
    BeginDrag { group: u32, x: f32, y: f32 },
    DragTo { x: f32, y: f32 },
    /// Pointer released; the view has already tested it against the sum zone
    EndDrag { x: f32, y: f32, in_zone: bool },
    DropGroup { group: u32, x: f32, y: f32, in_zone: bool },
    Reset,
}

fn default_operand() -> Operand {
    Operand::First
}

/// One running mini-game
pub enum Exercise {
    Addition(AdditionExercise),
    Subtraction(SubtractionExercise),
    Multiplication(MultiplicationExercise),
}

/// Read-only view of whichever exercise is running
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum ExerciseSnapshot {
    Addition(AdditionSnapshot),
    Subtraction(SubtractionSnapshot),
    Multiplication(MultiplicationSnapshot),
}

impl Exercise {
    /// Apply one intent. Rejected intents leave the exercise unchanged.
    pub fn apply(&mut self, intent: Intent) -> Result<(), Rejection> {
        let result = match self {
            Exercise::Addition(ex) => apply_addition(ex, intent),
            Exercise::Subtraction(ex) => apply_subtraction(ex, intent),
            Exercise::Multiplication(ex) => apply_multiplication(ex, intent),
        };
        match &result {
            Ok(()) => log::debug!("Applied {:?}", intent),
            Err(rejection) => log::debug!("Rejected {:?}: {}", intent, rejection),
        }
        result
    }

    /// Advance one fixed timestep
    pub fn tick(&mut self) -> Option<Deferred> {
        match self {
            Exercise::Addition(ex) => ex.tick(),
            Exercise::Subtraction(ex) => ex.tick(),
            Exercise::Multiplication(ex) => ex.tick(),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Exercise::Addition(ex) => ex.reset(),
            Exercise::Subtraction(ex) => ex.reset(),
            Exercise::Multiplication(ex) => ex.reset(),
        }
    }

    pub fn snapshot(&self) -> ExerciseSnapshot {
        match self {
            Exercise::Addition(ex) => ExerciseSnapshot::Addition(ex.snapshot()),
            Exercise::Subtraction(ex) => ExerciseSnapshot::Subtraction(ex.snapshot()),
            Exercise::Multiplication(ex) => ExerciseSnapshot::Multiplication(ex.snapshot()),
        }
    }
}

fn apply_addition(ex: &mut AdditionExercise, intent: Intent) -> Result<(), Rejection> {
    match intent {
        Intent::AddCounter { operand, x, y } => ex.add_counter(operand, Vec2::new(x, y)).map(drop),
        Intent::Confirm => ex.confirm(),
        Intent::SelectAnswer { value } => ex.select_answer(value).map(drop),
        Intent::Reset => {
            ex.reset();
            Ok(())
        }
        _ => Err(Rejection::Unsupported),
    }
}

fn apply_subtraction(ex: &mut SubtractionExercise, intent: Intent) -> Result<(), Rejection> {
    match intent {
        Intent::AddCounter { x, y, .. } => ex.add_counter(Vec2::new(x, y)).map(drop),
        Intent::BeginRemoval => ex.begin_removal(),
        Intent::RemoveCounter { id } => ex.remove_counter(id),
        Intent::Confirm => ex.confirm(),
        Intent::SelectAnswer { value } => ex.select_answer(value).map(drop),
        Intent::Reset => {
            ex.reset();
            Ok(())
        }
        _ => Err(Rejection::Unsupported),
    }
}

fn apply_multiplication(ex: &mut MultiplicationExercise, intent: Intent) -> Result<(), Rejection> {
    match intent {
        Intent::SetFactor { slot, digit } => ex.set_factor(slot, digit),
        Intent::EnterDigit { digit } => ex.enter_digit(digit),
        Intent::BeginDrag { group, x, y } => ex.begin_drag(group, Vec2::new(x, y)),
        Intent::DragTo { x, y } => ex.drag_to(Vec2::new(x, y)),
        Intent::EndDrag { x, y, in_zone } => ex.end_drag(Vec2::new(x, y), |_| in_zone).map(drop),
        Intent::DropGroup { group, x, y, in_zone } => {
            ex.drop_group(group, Vec2::new(x, y), in_zone).map(drop)
        }
        Intent::Reset => {
            ex.reset();
            Ok(())
        }
        _ => Err(Rejection::Unsupported),
    }
}

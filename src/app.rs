//! Mini-game navigation and clock
//!
//! The app shows either the home screen or one running exercise. Choosing an
//! operation builds a fresh engine; going back drops it together with any
//! pending timers.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::settings::Settings;
use crate::sim::{
    AdditionExercise, Deferred, Exercise, ExerciseSnapshot, Intent, MultiplicationExercise,
    Rejection, SubtractionExercise,
};

/// The three mini-games on the home screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
}

impl Operation {
    pub const ALL: [Operation; 3] = [
        Operation::Addition,
        Operation::Subtraction,
        Operation::Multiplication,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Addition => "addition",
            Operation::Subtraction => "subtraction",
            Operation::Multiplication => "multiplication",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "addition" | "add" | "suma" | "+" => Some(Operation::Addition),
            "subtraction" | "sub" | "resta" | "-" => Some(Operation::Subtraction),
            "multiplication" | "mul" | "multiplicacion" | "x" | "*" => {
                Some(Operation::Multiplication)
            }
            _ => None,
        }
    }

    /// Screen title
    pub fn title(&self) -> &'static str {
        match self {
            Operation::Addition => "SUMA",
            Operation::Subtraction => "RESTA",
            Operation::Multiplication => "MULTIPLICACIÓN",
        }
    }
}

/// What the view should draw
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum AppSnapshot {
    Home,
    Exercise(ExerciseSnapshot),
}

pub struct App {
    settings: Settings,
    seed: u64,
    /// Exercises opened so far, mixed into each engine's seed
    opened: u64,
    exercise: Option<(Operation, Exercise)>,
    accumulator: f32,
}

impl App {
    pub fn new(settings: Settings, seed: u64) -> Self {
        Self {
            settings: settings.sanitized(),
            seed,
            opened: 0,
            exercise: None,
            accumulator: 0.0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Operation currently on screen, `None` on the home screen
    pub fn current(&self) -> Option<Operation> {
        self.exercise.as_ref().map(|(op, _)| *op)
    }

    pub fn exercise(&self) -> Option<&Exercise> {
        self.exercise.as_ref().map(|(_, ex)| ex)
    }

    /// Open a mini-game with a brand new engine
    pub fn select(&mut self, operation: Operation) {
        self.opened += 1;
        let seed = self.seed ^ self.opened.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let exercise = match operation {
            Operation::Addition => Exercise::Addition(AdditionExercise::new(seed, &self.settings)),
            Operation::Subtraction => {
                Exercise::Subtraction(SubtractionExercise::new(seed, &self.settings))
            }
            Operation::Multiplication => {
                Exercise::Multiplication(MultiplicationExercise::new(&self.settings))
            }
        };
        self.exercise = Some((operation, exercise));
        self.accumulator = 0.0;
        log::info!("Opened {} (seed {})", operation.as_str(), seed);
    }

    /// Back to the home screen, discarding the running exercise
    pub fn back(&mut self) {
        if let Some((operation, _)) = self.exercise.take() {
            log::info!("Left {}", operation.as_str());
        }
    }

    pub fn dispatch(&mut self, intent: Intent) -> Result<(), Rejection> {
        match &mut self.exercise {
            Some((_, exercise)) => exercise.apply(intent),
            None => Err(Rejection::WrongPhase),
        }
    }

    /// Run a single fixed timestep
    pub fn tick(&mut self) -> Option<Deferred> {
        let (_, exercise) = self.exercise.as_mut()?;
        let fired = exercise.tick();
        if let Some(kind) = fired {
            log::debug!("Deferred transition fired: {:?}", kind);
        }
        fired
    }

    /// Feed real frame time; runs as many fixed ticks as have accumulated
    pub fn update(&mut self, dt: f32) {
        // NaN would poison the accumulator for good
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.tick();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
    }

    pub fn snapshot(&self) -> AppSnapshot {
        match self.exercise() {
            Some(exercise) => AppSnapshot::Exercise(exercise.snapshot()),
            None => AppSnapshot::Home,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Operand, Phase};

    fn add(operand: Operand) -> Intent {
        Intent::AddCounter {
            operand,
            x: 0.0,
            y: 0.0,
        }
    }

    fn addition(app: &App) -> crate::sim::AdditionSnapshot {
        match app.snapshot() {
            AppSnapshot::Exercise(ExerciseSnapshot::Addition(snap)) => snap,
            other => panic!("expected addition, got {other:?}"),
        }
    }

    #[test]
    fn test_home_rejects_intents() {
        let mut app = App::new(Settings::default(), 1);
        assert_eq!(app.snapshot(), AppSnapshot::Home);
        assert_eq!(app.dispatch(Intent::Confirm), Err(Rejection::WrongPhase));
        assert_eq!(app.tick(), None);
    }

    #[test]
    fn test_navigation_discards_state() {
        let mut app = App::new(Settings::default(), 1);
        app.select(Operation::Addition);
        app.dispatch(add(Operand::First)).unwrap();
        assert_eq!(addition(&app).first_count, 1);

        app.back();
        assert_eq!(app.current(), None);
        app.select(Operation::Addition);
        assert_eq!(addition(&app).first_count, 0);
    }

    #[test]
    fn test_update_drives_wrong_answer_clear() {
        let mut app = App::new(Settings::default(), 9);
        app.select(Operation::Addition);
        app.dispatch(add(Operand::First)).unwrap();
        app.dispatch(add(Operand::Second)).unwrap();
        app.dispatch(Intent::Confirm).unwrap();
        app.dispatch(Intent::SelectAnswer { value: 50 }).unwrap();
        assert_eq!(addition(&app).selected, Some(50));

        app.update(0.5);
        // Clamped frame: at most MAX_FRAME_DT worth of ticks ran
        assert_eq!(addition(&app).selected, Some(50));

        for _ in 0..15 {
            app.update(0.1);
        }
        let snap = addition(&app);
        assert_eq!(snap.selected, None);
        assert_eq!(snap.phase, Phase::Evaluating);
    }

    #[test]
    fn test_celebration_ends_in_fresh_round() {
        let mut app = App::new(Settings::default(), 3);
        app.select(Operation::Addition);
        app.dispatch(add(Operand::First)).unwrap();
        app.dispatch(Intent::Confirm).unwrap();
        app.dispatch(Intent::SelectAnswer { value: 1 }).unwrap();
        assert!(addition(&app).celebrating);

        for _ in 0..(4.5 / SIM_DT) as u32 {
            app.update(SIM_DT);
        }
        let snap = addition(&app);
        assert_eq!(snap.phase, Phase::Collecting);
        assert!(snap.counters.is_empty());
    }

    #[test]
    fn test_non_finite_frame_is_skipped() {
        let mut app = App::new(Settings::default(), 3);
        app.select(Operation::Addition);
        app.dispatch(add(Operand::First)).unwrap();
        app.dispatch(Intent::Confirm).unwrap();
        app.dispatch(Intent::SelectAnswer { value: 1 }).unwrap();

        app.update(f32::NAN);
        app.update(f32::INFINITY);
        app.update(f32::NEG_INFINITY);
        for _ in 0..100 {
            app.update(0.1);
        }
        let snap = addition(&app);
        assert_eq!(snap.phase, Phase::Collecting);
        assert!(!snap.celebrating);
    }

    #[test]
    fn test_seeds_differ_between_exercises() {
        let mut app = App::new(Settings::default(), 77);
        let mut candidates = Vec::new();
        for _ in 0..8 {
            app.select(Operation::Addition);
            for _ in 0..10 {
                app.dispatch(add(Operand::First)).unwrap();
            }
            app.dispatch(Intent::Confirm).unwrap();
            candidates.push(addition(&app).candidates);
        }
        candidates.dedup();
        assert!(candidates.len() > 1);
    }

    #[test]
    fn test_operation_parsing() {
        assert_eq!(Operation::from_str("SUMA"), Some(Operation::Addition));
        assert_eq!(Operation::from_str("x"), Some(Operation::Multiplication));
        assert_eq!(Operation::from_str("divide"), None);
        for op in Operation::ALL {
            assert_eq!(Operation::from_str(op.as_str()), Some(op));
        }
    }
}

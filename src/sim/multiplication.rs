//! Multiplication exercise
//!
//! Two digits are entered on a keypad. The product is shown as
//! `min(a, b)` groups of `max(a, b)` balloons, and the child drags each group
//! into the sum zone until every group has been counted.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{
    Color, Deferred, DeferredTransition, GROUP_PALETTE, Rejection, Timing, step_pending,
};
use crate::consts::{GROUP_CELL_SIZE, GROUP_GRID_MAX_COLUMNS, GROUP_GRID_ORIGIN, MAX_FACTOR};
use crate::settings::Settings;
use crate::words::groups_caption;

/// Which keypad entry a digit fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorSlot {
    First,
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplicationPhase {
    /// Keypad shown until both factors are in
    #[default]
    EnteringFactors,
    /// Groups are on screen and being dragged into the sum zone
    Transferring,
    /// Every group counted, auto-reset pending
    Celebrating,
}

/// A batch of identical balloons moved as one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: u32,
    pub pos: Vec2,
    pub count: u32,
    pub color: Color,
    /// Dropped into the sum zone and counted
    pub committed: bool,
}

/// Result of a group drop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Dropped outside the zone, only the position changed
    Moved,
    /// Counted into the running sum
    Committed,
    /// Counted, and it was the last group
    Completed,
}

/// A group being dragged. The grab offset keeps the group anchored
/// to the point where the pointer picked it up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub group_id: u32,
    pub grab_offset: Vec2,
}

/// Grid cell position for group `index` out of `group_count`
pub fn group_position(index: u32, group_count: u32) -> Vec2 {
    let columns = group_count.clamp(1, GROUP_GRID_MAX_COLUMNS);
    let col = index % columns;
    let row = index / columns;
    GROUP_GRID_ORIGIN + GROUP_CELL_SIZE * Vec2::new(col as f32, row as f32)
}

/// Partition `a × b` into `min(a, b)` groups of `max(a, b)` balloons.
/// Ids are assigned sequentially from `first_id`.
pub fn generate_groups(a: u8, b: u8, first_id: u32) -> Vec<Group> {
    let group_count = a.min(b) as u32;
    let per_group = a.max(b) as u32;
    (0..group_count)
        .map(|i| Group {
            id: first_id + i,
            pos: group_position(i, group_count),
            count: per_group,
            color: GROUP_PALETTE[i as usize % GROUP_PALETTE.len()],
            committed: false,
        })
        .collect()
}

/// Per-round state, replaced wholesale on reset
#[derive(Debug, Clone, Default)]
pub struct MultiplicationRound {
    pub first: Option<u8>,
    pub second: Option<u8>,
    pub groups: Vec<Group>,
    pub total_sum: u32,
    pub completed: bool,
    pub drag: Option<DragSession>,
    pending: Option<DeferredTransition>,
}

impl MultiplicationRound {
    fn factors(&self) -> Option<(u8, u8)> {
        Some((self.first?, self.second?))
    }
}

/// Read-only view of a multiplication round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiplicationSnapshot {
    pub phase: MultiplicationPhase,
    pub first_factor: Option<u8>,
    pub second_factor: Option<u8>,
    /// Keypad prompt target while entering factors
    pub awaiting: Option<FactorSlot>,
    pub groups: Vec<Group>,
    pub group_count: u32,
    pub committed_groups: u32,
    pub items_per_group: u32,
    pub caption: Option<String>,
    pub total_sum: u32,
    /// False when a zero factor left nothing to drag
    pub completable: bool,
    pub dragging: Option<u32>,
    pub completed: bool,
    pub celebrating: bool,
}

pub struct MultiplicationExercise {
    timing: Timing,
    number_words: bool,
    next_id: u32,
    round: MultiplicationRound,
}

impl MultiplicationExercise {
    pub fn new(settings: &Settings) -> Self {
        Self {
            timing: Timing::from_settings(settings),
            number_words: settings.number_words,
            next_id: 1,
            round: MultiplicationRound::default(),
        }
    }

    pub fn round(&self) -> &MultiplicationRound {
        &self.round
    }

    pub fn phase(&self) -> MultiplicationPhase {
        if self.round.completed {
            MultiplicationPhase::Celebrating
        } else if self.round.factors().is_some() {
            MultiplicationPhase::Transferring
        } else {
            MultiplicationPhase::EnteringFactors
        }
    }

    /// Next empty keypad slot
    pub fn awaiting(&self) -> Option<FactorSlot> {
        match (self.round.first, self.round.second) {
            (None, _) => Some(FactorSlot::First),
            (Some(_), None) => Some(FactorSlot::Second),
            _ => None,
        }
    }

    /// A zero factor produces no groups, and the round can then never finish
    pub fn is_completable(&self) -> bool {
        match self.round.factors() {
            Some(_) => !self.round.groups.is_empty(),
            None => true,
        }
    }

    pub fn set_factor(&mut self, slot: FactorSlot, digit: u8) -> Result<(), Rejection> {
        if digit > MAX_FACTOR {
            return Err(Rejection::DigitOutOfRange(digit));
        }
        let target = match slot {
            FactorSlot::First => &mut self.round.first,
            FactorSlot::Second => &mut self.round.second,
        };
        if target.is_some() {
            return Err(Rejection::FactorAlreadySet);
        }
        *target = Some(digit);

        if let Some((a, b)) = self.round.factors() {
            self.round.groups = generate_groups(a, b, self.next_id);
            self.next_id += self.round.groups.len() as u32;
            self.round.total_sum = 0;
            log::info!(
                "Multiplication {} x {}: {} groups",
                a,
                b,
                self.round.groups.len()
            );
        }
        Ok(())
    }

    /// Keypad entry: fills the first factor, then the second
    pub fn enter_digit(&mut self, digit: u8) -> Result<(), Rejection> {
        let slot = self.awaiting().ok_or(Rejection::FactorAlreadySet)?;
        self.set_factor(slot, digit)
    }

    fn open_group(&self, id: u32) -> Result<usize, Rejection> {
        match self.phase() {
            MultiplicationPhase::Transferring => {}
            MultiplicationPhase::EnteringFactors => return Err(Rejection::WrongPhase),
            MultiplicationPhase::Celebrating => return Err(Rejection::Locked),
        }
        let idx = self
            .round
            .groups
            .iter()
            .position(|g| g.id == id)
            .ok_or(Rejection::UnknownGroup(id))?;
        if self.round.groups[idx].committed {
            return Err(Rejection::AlreadyCommitted(id));
        }
        Ok(idx)
    }

    /// Pick up a group under the pointer
    pub fn begin_drag(&mut self, group_id: u32, pointer: Vec2) -> Result<(), Rejection> {
        let idx = self.open_group(group_id)?;
        self.round.drag = Some(DragSession {
            group_id,
            grab_offset: pointer - self.round.groups[idx].pos,
        });
        Ok(())
    }

    pub fn drag_to(&mut self, pointer: Vec2) -> Result<(), Rejection> {
        let session = self.round.drag.ok_or(Rejection::NoDrag)?;
        let idx = self.open_group(session.group_id)?;
        self.round.groups[idx].pos = pointer - session.grab_offset;
        Ok(())
    }

    /// Release the dragged group. `in_zone` tells whether a pointer position
    /// lies inside the sum zone; the geometry stays with the caller.
    pub fn end_drag<F>(&mut self, pointer: Vec2, in_zone: F) -> Result<DropOutcome, Rejection>
    where
        F: Fn(Vec2) -> bool,
    {
        let session = self.round.drag.ok_or(Rejection::NoDrag)?;
        let outcome = self.drop_group(
            session.group_id,
            pointer - session.grab_offset,
            in_zone(pointer),
        )?;
        self.round.drag = None;
        Ok(outcome)
    }

    /// Drop a group at `pos`. Inside the zone it is counted exactly once.
    pub fn drop_group(
        &mut self,
        group_id: u32,
        pos: Vec2,
        in_zone: bool,
    ) -> Result<DropOutcome, Rejection> {
        let idx = self.open_group(group_id)?;
        if self.round.drag.is_some_and(|d| d.group_id == group_id) {
            self.round.drag = None;
        }

        let group = &mut self.round.groups[idx];
        group.pos = pos;
        if !in_zone {
            return Ok(DropOutcome::Moved);
        }

        group.committed = true;
        self.round.total_sum += group.count;
        if !self.round.groups.iter().all(|g| g.committed) {
            return Ok(DropOutcome::Committed);
        }

        self.round.completed = true;
        self.round.pending = Some(DeferredTransition::new(
            Deferred::EndCelebration,
            self.timing.celebration_ticks,
        ));
        log::info!("Multiplication solved: {}", self.round.total_sum);
        Ok(DropOutcome::Completed)
    }

    pub fn tick(&mut self) -> Option<Deferred> {
        let fired = step_pending(&mut self.round.pending)?;
        if fired == Deferred::EndCelebration {
            self.reset();
        }
        Some(fired)
    }

    pub fn reset(&mut self) {
        self.round = MultiplicationRound::default();
        log::info!("Multiplication reset");
    }

    pub fn snapshot(&self) -> MultiplicationSnapshot {
        let round = &self.round;
        let group_count = round.groups.len() as u32;
        let items_per_group = round.groups.first().map_or(0, |g| g.count);
        MultiplicationSnapshot {
            phase: self.phase(),
            first_factor: round.first,
            second_factor: round.second,
            awaiting: self.awaiting(),
            groups: round.groups.clone(),
            group_count,
            committed_groups: round.groups.iter().filter(|g| g.committed).count() as u32,
            items_per_group,
            caption: (self.number_words && group_count > 0)
                .then(|| groups_caption(group_count, items_per_group)),
            total_sum: round.total_sum,
            completable: self.is_completable(),
            dragging: round.drag.map(|d| d.group_id),
            completed: round.completed,
            celebrating: self.phase() == MultiplicationPhase::Celebrating,
        }
    }
}

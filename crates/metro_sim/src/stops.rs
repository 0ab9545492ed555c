//! Stop reservation state machine.
//!
//! Each stop cycles `Free -> Reserved(owner) -> Occupied(owner) -> Free`.
//! The owner is carried inside the state, so a stop can never be Reserved or
//! Occupied without one, nor Free with one.
//!
//! Reservation always scans stops in their static index order and takes the
//! first Free slot. That tie-break is part of the observable behaviour:
//! identical request sequences must produce identical stop assignments.

use bevy::prelude::*;

use crate::grid::GridPos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StopState {
    #[default]
    Free,
    Reserved(Entity),
    Occupied(Entity),
}

impl StopState {
    pub fn owner(self) -> Option<Entity> {
        match self {
            StopState::Free => None,
            StopState::Reserved(e) | StopState::Occupied(e) => Some(e),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StopState::Free => "Free",
            StopState::Reserved(_) => "Reserved",
            StopState::Occupied(_) => "Occupied",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    pub index: usize,
    pub position: GridPos,
    pub state: StopState,
}

/// Rejected stop transitions. Under correct sequencing none of these occur;
/// callers log them and carry on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopError {
    UnknownStop(usize),
    NotReservedBy {
        index: usize,
        requester: Entity,
        found: StopState,
    },
    NotOccupied {
        index: usize,
        found: StopState,
    },
}

impl std::fmt::Display for StopError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopError::UnknownStop(index) => write!(f, "stop {} does not exist", index),
            StopError::NotReservedBy {
                index,
                requester,
                found,
            } => write!(
                f,
                "stop {} is not reserved by {:?} (state {}, owner {:?})",
                index,
                requester,
                found.label(),
                found.owner()
            ),
            StopError::NotOccupied { index, found } => {
                write!(f, "stop {} is not occupied (state {})", index, found.label())
            }
        }
    }
}

impl std::error::Error for StopError {}

#[derive(Resource, Debug, Clone, Default)]
pub struct StopRegistry {
    stops: Vec<Stop>,
}

impl StopRegistry {
    /// Create one Free stop per position; indices follow the given order.
    pub fn new(positions: impl IntoIterator<Item = GridPos>) -> Self {
        let stops = positions
            .into_iter()
            .enumerate()
            .map(|(index, position)| Stop {
                index,
                position,
                state: StopState::Free,
            })
            .collect();
        Self { stops }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stop> {
        self.stops.iter()
    }

    pub fn stop(&self, index: usize) -> Option<&Stop> {
        self.stops.get(index)
    }

    pub fn state(&self, index: usize) -> Option<StopState> {
        self.stops.get(index).map(|s| s.state)
    }

    pub fn position_of(&self, index: usize) -> Option<GridPos> {
        self.stops.get(index).map(|s| s.position)
    }

    pub fn stop_at(&self, pos: GridPos) -> Option<usize> {
        self.stops.iter().position(|s| s.position == pos)
    }

    /// The stop currently Reserved by `requester`, if any.
    pub fn reservation_of(&self, requester: Entity) -> Option<usize> {
        self.stops
            .iter()
            .position(|s| s.state == StopState::Reserved(requester))
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Reserve the first Free stop for `requester`.
    ///
    /// A requester that already holds a reservation gets the same stop back
    /// without a new allocation. Returns `None` when every stop is taken.
    pub fn reserve_first_free(&mut self, requester: Entity) -> Option<(GridPos, usize)> {
        if let Some(index) = self.reservation_of(requester) {
            return Some((self.stops[index].position, index));
        }
        let stop = self
            .stops
            .iter_mut()
            .find(|s| s.state == StopState::Free)?;
        stop.state = StopState::Reserved(requester);
        Some((stop.position, stop.index))
    }

    /// Reserved(requester) -> Occupied(requester).
    pub fn confirm_arrival(&mut self, index: usize, requester: Entity) -> Result<(), StopError> {
        let stop = self.stop_mut(index)?;
        if stop.state != StopState::Reserved(requester) {
            let err = StopError::NotReservedBy {
                index,
                requester,
                found: stop.state,
            };
            warn!("Invariant violation: confirm_arrival rejected: {}", err);
            return Err(err);
        }
        stop.state = StopState::Occupied(requester);
        Ok(())
    }

    /// Reserved(requester) -> Free. Used when the walk to the stop fails.
    pub fn cancel_reservation(&mut self, index: usize, requester: Entity) -> Result<(), StopError> {
        let stop = self.stop_mut(index)?;
        if stop.state != StopState::Reserved(requester) {
            let err = StopError::NotReservedBy {
                index,
                requester,
                found: stop.state,
            };
            warn!("cancel_reservation rejected: {}", err);
            return Err(err);
        }
        stop.state = StopState::Free;
        Ok(())
    }

    /// Occupied(_) -> Free. Used once a boarded group has no capacity left.
    pub fn free_stop(&mut self, index: usize) -> Result<(), StopError> {
        let stop = self.stop_mut(index)?;
        if !matches!(stop.state, StopState::Occupied(_)) {
            let err = StopError::NotOccupied {
                index,
                found: stop.state,
            };
            warn!("free_stop rejected: {}", err);
            return Err(err);
        }
        stop.state = StopState::Free;
        Ok(())
    }

    fn stop_mut(&mut self, index: usize) -> Result<&mut Stop, StopError> {
        self.stops.get_mut(index).ok_or_else(|| {
            warn!("StopRegistry: unknown stop index {}", index);
            StopError::UnknownStop(index)
        })
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn has_available_stop(&self) -> bool {
        let taken = self
            .stops
            .iter()
            .filter(|s| s.state != StopState::Free)
            .count();
        taken < self.stops.len()
    }

    pub fn free_count(&self) -> usize {
        self.stops
            .iter()
            .filter(|s| s.state == StopState::Free)
            .count()
    }

    pub fn is_occupied(&self, index: usize) -> bool {
        matches!(self.state(index), Some(StopState::Occupied(_)))
    }

    pub fn is_reserved(&self, index: usize) -> bool {
        matches!(self.state(index), Some(StopState::Reserved(_)))
    }

    /// The entity physically holding stop `index`, if it is Occupied.
    pub fn occupant_at(&self, index: usize) -> Option<Entity> {
        match self.state(index)? {
            StopState::Occupied(e) => Some(e),
            _ => None,
        }
    }

    /// `(index, occupant)` for every Occupied stop in ascending index order.
    pub fn occupied_in_order(&self) -> impl Iterator<Item = (usize, Entity)> + '_ {
        self.stops.iter().filter_map(|s| match s.state {
            StopState::Occupied(e) => Some((s.index, e)),
            _ => None,
        })
    }
}

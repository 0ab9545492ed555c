//! Walk planning helpers shared by the passenger systems.

use bevy::prelude::*;

use crate::grid::{GridMap, GridPos};

use super::types::PassengerPhase;

impl PassengerPhase {
    pub fn is_waiting(&self) -> bool {
        matches!(self, PassengerPhase::Waiting)
    }

    pub fn is_walking(&self) -> bool {
        matches!(self, PassengerPhase::Walking { .. })
    }

    /// The stop this group has reserved or occupies.
    pub fn stop_index(&self) -> Option<usize> {
        match self {
            PassengerPhase::Walking { stop_index, .. } | PassengerPhase::AtStop { stop_index } => {
                Some(*stop_index)
            }
            _ => None,
        }
    }

    /// Whether the group should currently hold a grid cell.
    pub fn holds_cell(&self) -> bool {
        matches!(self, PassengerPhase::Waiting | PassengerPhase::AtStop { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            PassengerPhase::Waiting => "Waiting",
            PassengerPhase::Walking { .. } => "Walking",
            PassengerPhase::Returning { .. } => "Returning",
            PassengerPhase::AtStop { .. } => "AtStop",
            PassengerPhase::Departing => "Departing",
        }
    }
}

/// Whether `walker` may step into `pos` right now.
///
/// The cell must be one a passenger can stand on. If someone else is on it,
/// only Walkable and Stop cells can be passed through.
pub fn step_is_clear(grid: &GridMap, pos: GridPos, walker: Entity) -> bool {
    let Some(cell) = grid.cell(pos) else {
        return false;
    };
    if !cell.cell_type.is_traversable() {
        return false;
    }
    match cell.occupant {
        Some(other) if other != walker => cell.cell_type.is_jumpable(),
        _ => true,
    }
}

/// World waypoints back to `origin` from `path[current]`, retracing the
/// cells already walked.
pub fn return_waypoints(path: &[GridPos], current: usize, origin: GridPos) -> Vec<Vec2> {
    let walked = current.min(path.len());
    path[..walked]
        .iter()
        .rev()
        .copied()
        .chain(std::iter::once(origin))
        .map(GridMap::cell_to_world)
        .collect()
}

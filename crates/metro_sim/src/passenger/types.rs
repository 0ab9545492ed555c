//! Passenger group components.

use bevy::prelude::*;

use crate::color::MatchColor;
use crate::grid::GridPos;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassengerGroup {
    pub color: MatchColor,
    /// Wagons this group still needs to fill.
    pub remaining_capacity: u32,
}

/// The cell a group last stood on.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition(pub GridPos);

#[derive(Component, Debug, Clone, PartialEq, Eq, Default)]
pub enum PassengerPhase {
    /// Standing on its origin cell, registered on the grid.
    #[default]
    Waiting,
    /// Walking to a reserved stop. `path[next]` is the cell the current move
    /// is heading to; the group is off the grid until it arrives.
    Walking {
        stop_index: usize,
        origin: GridPos,
        path: Vec<GridPos>,
        next: usize,
    },
    /// Walking back to `origin` after the route ahead was blocked.
    Returning { origin: GridPos },
    AtStop { stop_index: usize },
    /// Capacity exhausted; off the grid, waiting to be despawned.
    Departing,
}

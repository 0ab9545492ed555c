//! Runtime invariant validation for the transit core.
//!
//! These systems run at the end of every tick and log warnings when the
//! services disagree with the entities they track. Counts are kept so that
//! integration tests can assert zero violations.
//!
//! Validated invariants:
//! 1. **Occupancy**: every waiting or seated group is registered on the cell
//!    it stands on, and no group is registered anywhere else.
//! 2. **Stop owners**: a Reserved stop belongs to a group walking to it, an
//!    Occupied stop to a group seated on it, and vice versa.
//! 3. **Fleet order**: outside of a reorder, live wagons are ordered by
//!    non-increasing track progress.
//! 4. **Head**: a non-empty fleet has exactly one head wagon and it is the
//!    one the fleet names.

use bevy::prelude::*;

use crate::config::PROGRESS_EPSILON;
use crate::fleet::{Wagon, WagonFleet};
use crate::grid::GridMap;
use crate::passenger::{GridPosition, PassengerPhase};
use crate::stops::{StopRegistry, StopState};

/// Violations found by the most recent validation pass, plus a running total.
#[derive(Resource, Default, Debug)]
pub struct InvariantViolations {
    pub occupancy: u32,
    pub stop_owner: u32,
    pub fleet_order: u32,
    pub head_count: u32,
    /// Sum of every violation seen since startup.
    pub total: u64,
}

// ---------------------------------------------------------------------------
// System: validate_occupancy
// ---------------------------------------------------------------------------

pub fn validate_occupancy(
    grid: Res<GridMap>,
    passengers: Query<(Entity, &GridPosition, &PassengerPhase)>,
    mut violations: ResMut<InvariantViolations>,
) {
    violations.occupancy = 0;

    for (entity, pos, phase) in &passengers {
        let registered = grid.occupant_at(pos.0) == Some(entity);
        if phase.holds_cell() && !registered {
            warn!(
                "Invariant violation: {:?} is {} at {} but the cell holds {:?}",
                entity,
                phase.label(),
                pos.0,
                grid.occupant_at(pos.0)
            );
            violations.occupancy += 1;
        }
    }

    for (cell, occupant) in grid.occupants() {
        let Ok((_, pos, phase)) = passengers.get(occupant) else {
            continue;
        };
        if !phase.holds_cell() || pos.0 != cell {
            warn!(
                "Invariant violation: {:?} ({} at {}) is still registered on {}",
                occupant,
                phase.label(),
                pos.0,
                cell
            );
            violations.occupancy += 1;
        }
    }

    violations.total += u64::from(violations.occupancy);
}

// ---------------------------------------------------------------------------
// System: validate_stop_owners
// ---------------------------------------------------------------------------

pub fn validate_stop_owners(
    stops: Res<StopRegistry>,
    passengers: Query<&PassengerPhase>,
    mut violations: ResMut<InvariantViolations>,
) {
    violations.stop_owner = 0;

    for stop in stops.iter() {
        let consistent = match stop.state {
            StopState::Free => true,
            StopState::Reserved(owner) => passengers.get(owner).is_ok_and(|phase| {
                phase.is_walking() && phase.stop_index() == Some(stop.index)
            }),
            StopState::Occupied(owner) => passengers
                .get(owner)
                .is_ok_and(|phase| *phase == PassengerPhase::AtStop { stop_index: stop.index }),
        };
        if !consistent {
            warn!(
                "Invariant violation: stop {} is {} by {:?} which does not hold it",
                stop.index,
                stop.state.label(),
                stop.state.owner()
            );
            violations.stop_owner += 1;
        }
    }

    for phase in &passengers {
        if let PassengerPhase::AtStop { stop_index } = phase {
            if !stops.is_occupied(*stop_index) {
                warn!(
                    "Invariant violation: a group is seated on stop {} which is {:?}",
                    stop_index,
                    stops.state(*stop_index)
                );
                violations.stop_owner += 1;
            }
        }
    }

    violations.total += u64::from(violations.stop_owner);
}

// ---------------------------------------------------------------------------
// System: validate_fleet
// ---------------------------------------------------------------------------

pub fn validate_fleet(
    fleet: Res<WagonFleet>,
    wagons: Query<(Entity, &Wagon)>,
    mut violations: ResMut<InvariantViolations>,
) {
    violations.fleet_order = 0;
    violations.head_count = 0;

    if !fleet.is_adjusting() {
        let progress: Vec<f32> = fleet
            .order()
            .iter()
            .filter_map(|&e| wagons.get(e).ok().map(|(_, w)| w.track_progress))
            .collect();
        for pair in progress.windows(2) {
            if pair[1] > pair[0] + PROGRESS_EPSILON {
                warn!(
                    "Invariant violation: wagon at progress {} runs ahead of the one before it at {}",
                    pair[1], pair[0]
                );
                violations.fleet_order += 1;
            }
        }
    }

    let heads: Vec<Entity> = wagons
        .iter()
        .filter(|(_, w)| w.active && w.is_head)
        .map(|(e, _)| e)
        .collect();
    let expected = usize::from(!fleet.is_empty());
    if heads.len() != expected || (expected == 1 && fleet.head() != heads.first().copied()) {
        warn!(
            "Invariant violation: fleet head is {:?} but head wagons are {:?}",
            fleet.head(),
            heads
        );
        violations.head_count += 1;
    }

    violations.total += u64::from(violations.fleet_order + violations.head_count);
}

pub struct InvariantsPlugin;

impl Plugin for InvariantsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InvariantViolations>().add_systems(
            FixedUpdate,
            (
                validate_occupancy.run_if(resource_exists::<GridMap>),
                validate_stop_owners.run_if(resource_exists::<StopRegistry>),
                validate_fleet.run_if(resource_exists::<WagonFleet>),
            )
                .in_set(crate::SimulationSet::PostSim),
        );
    }
}

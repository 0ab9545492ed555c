//! Grid occupancy, stop reservation, wagon fleet reordering and boarding
//! dispatch for a metro puzzle, as a set of Bevy plugins.
//!
//! Insert a [`level::LevelLayout`] and add [`MetroSimPlugin`] plus a mover
//! (the headless [`mover::InstantMoverPlugin`] or an animation layer that
//! answers `MoveRequest` with `MoveCompleted`). Drive the game by sending
//! [`events::SendToStop`].

use bevy::prelude::*;

pub mod boarding;
pub mod color;
pub mod config;
pub mod events;
pub mod fleet;
pub mod grid;
pub mod invariants;
pub mod level;
pub mod mover;
pub mod passenger;
pub mod pathfinding_sys;
pub mod sim_params;
pub mod simulation_sets;
pub mod stops;
pub mod track;

#[cfg(test)]
mod integration_tests;
#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use simulation_sets::SimulationSet;

// ---------------------------------------------------------------------------
// Core resources
// ---------------------------------------------------------------------------

/// Global tick counter incremented each FixedUpdate.
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

pub fn advance_tick_counter(mut tick: ResMut<TickCounter>) {
    tick.0 = tick.0.wrapping_add(1);
}

pub struct MetroSimPlugin;

impl Plugin for MetroSimPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TickCounter>()
            .init_resource::<level::LevelStatus>()
            .add_plugins(simulation_sets::SimulationSetsPlugin)
            .add_systems(
                FixedUpdate,
                (
                    advance_tick_counter,
                    level::init_level.run_if(resource_exists::<level::LevelLayout>),
                )
                    .chain()
                    .in_set(SimulationSet::PreSim),
            );

        app.add_plugins((
            events::TransitEventsPlugin,
            passenger::PassengerPlugin,
            fleet::FleetPlugin,
            boarding::BoardingPlugin,
            invariants::InvariantsPlugin,
        ));
    }
}

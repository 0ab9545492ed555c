//! The wagon fleet: the physical train as an ordered list of wagons.
//!
//! ## Removal
//! A matched wagon is queued with [`WagonFleet::request_removal`]. Queued
//! removals run one at a time: the remaining wagons are ranked by track
//! progress, every wagon behind the gap slides one slot forward, and the
//! next removal waits until the mover reports every slide complete.
//!
//! While a reorder is running or queued the fleet is *adjusting*: the train
//! stops advancing and the boarding zone is not refreshed.
//!
//! If the head is removed the earliest-created remaining wagon takes over.
//! Removing the last wagon halts the train for good.

pub mod state;
pub mod systems;
pub mod types;

pub use systems::*;
pub use types::*;

use bevy::prelude::*;

// =============================================================================
// Plugin
// =============================================================================

pub struct FleetPlugin;

impl Plugin for FleetPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (process_reorders, advance_train)
                .chain()
                .after(crate::passenger::advance_walkers)
                .in_set(crate::SimulationSet::Simulation)
                .run_if(resource_exists::<WagonFleet>),
        )
        .add_systems(
            FixedUpdate,
            announce_adjustment
                .after(crate::boarding::dispatch_boarding)
                .in_set(crate::SimulationSet::Simulation)
                .run_if(resource_exists::<WagonFleet>),
        );
    }
}

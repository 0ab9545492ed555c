//! Boarding: which wagon colors are in reach, and which waiting group gets
//! on next.
//!
//! The *boarding zone* is the stretch of track from the head back by
//! `SimParams::boarding_zone_depth`. Groups standing on Occupied stops are
//! matched against active, unfilled wagons in that zone, lowest stop index
//! first, one match per dispatch.

pub mod dispatcher;
pub mod systems;

pub use dispatcher::*;
pub use systems::*;

use bevy::prelude::*;

pub struct BoardingPlugin;

impl Plugin for BoardingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (refresh_available_colors, dispatch_boarding)
                .chain()
                .after(crate::fleet::advance_train)
                .in_set(crate::SimulationSet::Simulation)
                .run_if(resource_exists::<BoardingDispatcher>),
        );
    }
}

//! Passenger groups and their walk to a stop.
//!
//! A waiting group that receives [`SendToStop`](crate::events::SendToStop)
//! reserves a stop, plans a path and steps along it one cell per mover
//! round-trip:
//!
//! ```text
//! Waiting -> Walking -> AtStop -> Departing
//!               |
//!               +-> Returning -> Waiting      (route blocked)
//! ```

pub mod state;
pub mod systems;
pub mod types;

pub use state::*;
pub use systems::*;
pub use types::*;

use bevy::prelude::*;

pub struct PassengerPlugin;

impl Plugin for PassengerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (handle_send_requests, advance_walkers)
                .chain()
                .in_set(crate::SimulationSet::Simulation)
                .run_if(resource_exists::<crate::grid::GridMap>),
        );
    }
}

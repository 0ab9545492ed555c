//! Deterministic ordering of the transit core via `SystemSet` phases.
//!
//! Every `FixedUpdate` system of the crate belongs to one of these sets:
//!
//! ```text
//! PreSim  →  Simulation  →  PostSim
//! ```
//!
//! * **PreSim** – tick counter, level bootstrap, mover completions.
//! * **Simulation** – passenger walks, then fleet reorders and train motion,
//!   then boarding, then the adjustment announcement. Ordering inside the
//!   phase is expressed with `.after()` on the neighbouring plugin's systems.
//! * **PostSim** – journal recording and invariant checks. These only read
//!   simulation state.

use bevy::prelude::*;

/// Ordered phases for systems running in the `FixedUpdate` schedule.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    PreSim,
    Simulation,
    PostSim,
}

pub struct SimulationSetsPlugin;

impl Plugin for SimulationSetsPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::PreSim,
                SimulationSet::Simulation,
                SimulationSet::PostSim,
            )
                .chain(),
        );
    }
}

//! Movement hand-off to the animation layer.
//!
//! The core never interpolates. It sends a [`MoveRequest`] with the world
//! positions to visit and a duration, and waits for a [`MoveCompleted`] for
//! that entity before continuing. Whatever plays the motion (a tween system,
//! or [`InstantMoverPlugin`] in headless runs) owns [`WorldPosition`] while
//! the move is in flight.

use bevy::prelude::*;

use crate::SimulationSet;

/// World-space position of a passenger group or wagon.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldPosition(pub Vec2);

#[derive(Event, Debug, Clone, PartialEq)]
pub struct MoveRequest {
    pub entity: Entity,
    /// Positions to visit in order; the last one is the destination.
    pub waypoints: Vec<Vec2>,
    /// Seconds the whole move should take.
    pub duration: f32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCompleted {
    pub entity: Entity,
}

/// Completes every move on the tick after it was requested by snapping the
/// entity to its final waypoint.
pub fn complete_moves_instantly(
    mut requests: EventReader<MoveRequest>,
    mut positions: Query<&mut WorldPosition>,
    mut completed: EventWriter<MoveCompleted>,
) {
    for request in requests.read() {
        if let Some(&target) = request.waypoints.last() {
            if let Ok(mut pos) = positions.get_mut(request.entity) {
                pos.0 = target;
            }
        }
        completed.send(MoveCompleted {
            entity: request.entity,
        });
    }
}

/// Headless mover used by tests and by runs without an animation layer.
pub struct InstantMoverPlugin;

impl Plugin for InstantMoverPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            complete_moves_instantly.in_set(SimulationSet::PreSim),
        );
    }
}

//! ECS systems driving passenger groups between their origin and a stop.

use bevy::prelude::*;

use crate::events::{ArrivedAtStop, BounceReason, PassengerBounced, SendToStop};
use crate::grid::{GridMap, GridPos};
use crate::mover::{MoveCompleted, MoveRequest};
use crate::pathfinding_sys::find_path;
use crate::sim_params::SimParams;
use crate::stops::StopRegistry;

use super::state::{return_waypoints, step_is_clear};
use super::types::*;

/// Put `entity` on its stop cell and mark the stop Occupied. Returns false,
/// leaving both untouched, if someone else already holds the cell.
fn arrive_at_stop(
    grid: &mut GridMap,
    stops: &mut StopRegistry,
    entity: Entity,
    stop_pos: GridPos,
    stop_index: usize,
) -> bool {
    if !grid.register_occupant(stop_pos, entity) {
        warn!(
            "Passenger {:?} reached stop {} but {} is held by {:?}",
            entity,
            stop_index,
            stop_pos,
            grid.occupant_at(stop_pos)
        );
        return false;
    }
    if stops.confirm_arrival(stop_index, entity).is_err() {
        grid.unregister_occupant(stop_pos, entity);
        return false;
    }
    true
}

fn step_move(entity: Entity, to: GridPos, duration: f32) -> MoveRequest {
    MoveRequest {
        entity,
        waypoints: vec![GridMap::cell_to_world(to)],
        duration,
    }
}

// =============================================================================
// Systems
// =============================================================================

/// System: turn `SendToStop` requests into walks.
///
/// Reserves the first free stop and plans a path to it. A request that finds
/// no free stop, no path, or a blocked first step bounces and leaves the
/// group where it is. Otherwise the group leaves its origin cell and the
/// first step is handed to the mover.
#[allow(clippy::too_many_arguments)]
pub fn handle_send_requests(
    mut requests: EventReader<SendToStop>,
    mut grid: ResMut<GridMap>,
    mut stops: ResMut<StopRegistry>,
    params: Res<SimParams>,
    mut passengers: Query<(&PassengerGroup, &GridPosition, &mut PassengerPhase)>,
    mut moves: EventWriter<MoveRequest>,
    mut arrivals: EventWriter<ArrivedAtStop>,
    mut bounces: EventWriter<PassengerBounced>,
) {
    for request in requests.read() {
        let entity = request.passenger;
        let Ok((group, pos, mut phase)) = passengers.get_mut(entity) else {
            warn!("SendToStop for unknown passenger {:?}", entity);
            continue;
        };
        if !phase.is_waiting() || group.remaining_capacity == 0 {
            debug!(
                "Ignoring SendToStop for {:?} while {}",
                entity,
                phase.label()
            );
            continue;
        }
        let origin = pos.0;

        let Some((stop_pos, stop_index)) = stops.reserve_first_free(entity) else {
            bounces.send(PassengerBounced {
                passenger: entity,
                reason: BounceReason::NoFreeStop,
            });
            continue;
        };

        let Some(path) = find_path(&grid, origin, stop_pos, None) else {
            let _ = stops.cancel_reservation(stop_index, entity);
            bounces.send(PassengerBounced {
                passenger: entity,
                reason: BounceReason::NoPath,
            });
            continue;
        };

        let Some(&first) = path.first() else {
            // Already standing on the stop.
            if arrive_at_stop(&mut grid, &mut stops, entity, stop_pos, stop_index) {
                *phase = PassengerPhase::AtStop { stop_index };
                arrivals.send(ArrivedAtStop {
                    passenger: entity,
                    stop_index,
                });
            } else {
                let _ = stops.cancel_reservation(stop_index, entity);
                bounces.send(PassengerBounced {
                    passenger: entity,
                    reason: BounceReason::PathBlocked,
                });
            }
            continue;
        };

        if !step_is_clear(&grid, first, entity) {
            let _ = stops.cancel_reservation(stop_index, entity);
            bounces.send(PassengerBounced {
                passenger: entity,
                reason: BounceReason::PathBlocked,
            });
            continue;
        }

        debug!(
            "Passenger {:?} walking {} steps from {} to stop {}",
            entity,
            path.len(),
            origin,
            stop_index
        );
        grid.unregister_occupant(origin, entity);
        moves.send(step_move(entity, first, params.walk_step_duration));
        *phase = PassengerPhase::Walking {
            stop_index,
            origin,
            path,
            next: 0,
        };
    }
}

/// System: react to finished moves of walking and returning groups.
///
/// A walker re-checks the next cell before every step. If it has become
/// impassable, or the stop cell turns out to be held on arrival, the
/// reservation is cancelled and the group walks back the way it came.
#[allow(clippy::too_many_arguments)]
pub fn advance_walkers(
    mut completions: EventReader<MoveCompleted>,
    mut grid: ResMut<GridMap>,
    mut stops: ResMut<StopRegistry>,
    params: Res<SimParams>,
    mut passengers: Query<(&mut GridPosition, &mut PassengerPhase), With<PassengerGroup>>,
    mut moves: EventWriter<MoveRequest>,
    mut arrivals: EventWriter<ArrivedAtStop>,
    mut bounces: EventWriter<PassengerBounced>,
) {
    for done in completions.read() {
        let entity = done.entity;
        let Ok((mut grid_pos, mut phase)) = passengers.get_mut(entity) else {
            continue;
        };

        match &mut *phase {
            PassengerPhase::Walking {
                stop_index,
                origin,
                path,
                next,
            } => {
                let current = *next;
                let Some(&here) = path.get(current) else {
                    warn!("Passenger {:?} walked past the end of its path", entity);
                    continue;
                };
                grid_pos.0 = here;
                let stop_index = *stop_index;

                if current + 1 == path.len() {
                    if arrive_at_stop(&mut grid, &mut stops, entity, here, stop_index) {
                        *phase = PassengerPhase::AtStop { stop_index };
                        arrivals.send(ArrivedAtStop {
                            passenger: entity,
                            stop_index,
                        });
                        continue;
                    }
                } else {
                    let ahead = path[current + 1];
                    if step_is_clear(&grid, ahead, entity) {
                        *next = current + 1;
                        moves.send(step_move(entity, ahead, params.walk_step_duration));
                        continue;
                    }
                    info!(
                        "Passenger {:?} blocked at {} heading to stop {}",
                        entity, ahead, stop_index
                    );
                }

                let origin = *origin;
                let waypoints = return_waypoints(path, current, origin);
                let _ = stops.cancel_reservation(stop_index, entity);
                moves.send(MoveRequest {
                    entity,
                    duration: params.return_step_duration * waypoints.len() as f32,
                    waypoints,
                });
                *phase = PassengerPhase::Returning { origin };
                bounces.send(PassengerBounced {
                    passenger: entity,
                    reason: BounceReason::PathBlocked,
                });
            }
            PassengerPhase::Returning { origin } => {
                let origin = *origin;
                grid_pos.0 = origin;
                grid.register_occupant(origin, entity);
                *phase = PassengerPhase::Waiting;
            }
            _ => {}
        }
    }
}

//! ECS systems for the wagon fleet.

use bevy::prelude::*;

use crate::events::{AdjustmentStateChanged, RoundCompleted, WagonRemoved};
use crate::mover::{MoveCompleted, MoveRequest, WorldPosition};
use crate::sim_params::SimParams;
use crate::track::TrackPath;

use super::types::*;

// =============================================================================
// Systems
// =============================================================================

/// System: finish repositions reported by the mover, then start as many
/// queued removals as the fleet allows.
#[allow(clippy::too_many_arguments)]
pub fn process_reorders(
    mut commands: Commands,
    mut fleet: ResMut<WagonFleet>,
    track: Res<TrackPath>,
    params: Res<SimParams>,
    mut completions: EventReader<MoveCompleted>,
    mut wagons: Query<(&mut Wagon, &WorldPosition)>,
    mut moves: EventWriter<MoveRequest>,
    mut removed_events: EventWriter<WagonRemoved>,
    mut round_events: EventWriter<RoundCompleted>,
) {
    for done in completions.read() {
        if !fleet.complete_reposition(done.entity) {
            continue;
        }
        if let Ok((mut wagon, pos)) = wagons.get_mut(done.entity) {
            wagon.track_progress = track.project(pos.0);
        }
        commands.entity(done.entity).remove::<TrackTarget>();
    }

    loop {
        let plan = {
            let wagons = &wagons;
            fleet.begin_next_reorder(&track, |e| wagons.get(e).ok().map(|(_, p)| p.0))
        };
        let Some(plan) = plan else {
            break;
        };

        if let Ok((mut wagon, _)) = wagons.get_mut(plan.removed) {
            wagon.active = false;
            wagon.is_head = false;
            removed_events.send(WagonRemoved {
                wagon: plan.removed,
                color: wagon.color,
            });
            info!(
                "Wagon {:?} ({}) left the fleet, {} remain, {} to reposition",
                plan.removed,
                wagon.color.label(),
                plan.order.len(),
                plan.retargets.len()
            );
        }

        for r in &plan.retargets {
            moves.send(MoveRequest {
                entity: r.entity,
                waypoints: track.waypoints_between(r.from_progress, r.to_progress),
                duration: params.reposition_duration,
            });
            commands.entity(r.entity).insert(TrackTarget {
                checkpoint: r.checkpoint,
                slot: r.slot,
                progress: r.to_progress,
            });
        }

        if let Some(head) = plan.promoted_head {
            if let Ok((mut wagon, _)) = wagons.get_mut(head) {
                wagon.is_head = true;
            }
            debug!("Wagon {:?} promoted to head", head);
        }

        if plan.halted {
            round_events.send(RoundCompleted);
        }
    }
}

/// System: move every live wagon forward along the track by the same step.
///
/// The train stands still while halted or adjusting. When the head reaches
/// the end of the track the whole train stops there, keeping its spacing.
pub fn advance_train(
    fleet: Res<WagonFleet>,
    track: Res<TrackPath>,
    params: Res<SimParams>,
    mut wagons: Query<(&mut Wagon, &mut WorldPosition)>,
) {
    if fleet.is_halted() || fleet.is_adjusting() {
        return;
    }
    let Some(head) = fleet.head() else {
        return;
    };
    let Ok((lead, _)) = wagons.get(head) else {
        return;
    };
    let step = params
        .train_speed_per_tick
        .min(track.max_progress() - lead.track_progress)
        .max(0.0);
    if step <= 0.0 {
        return;
    }

    for &entity in fleet.order() {
        let Ok((mut wagon, mut pos)) = wagons.get_mut(entity) else {
            continue;
        };
        if !wagon.active {
            continue;
        }
        wagon.track_progress = (wagon.track_progress + step).min(track.max_progress());
        pos.0 = track.point_at(wagon.track_progress);
    }
}

/// System: publish `AdjustmentStateChanged` whenever the fleet enters or
/// leaves a reorder. Runs after boarding so a removal requested this tick
/// is announced this tick.
pub fn announce_adjustment(
    mut fleet: ResMut<WagonFleet>,
    mut events: EventWriter<AdjustmentStateChanged>,
) {
    if let Some(adjusting) = fleet.take_adjustment_transition() {
        debug!("Fleet adjusting: {}", adjusting);
        events.send(AdjustmentStateChanged { adjusting });
    }
}

//! ECS systems for the boarding dispatcher.

use bevy::prelude::*;

use crate::events::{
    AdjustmentStateChanged, ArrivedAtStop, PassengerBoarded, PassengerDeparted, WagonRemoved,
};
use crate::fleet::{Wagon, WagonFleet};
use crate::grid::GridMap;
use crate::passenger::{GridPosition, PassengerGroup, PassengerPhase};
use crate::sim_params::SimParams;
use crate::stops::StopRegistry;

use super::dispatcher::*;

/// Live wagons in fleet order.
fn fleet_views(fleet: &WagonFleet, wagon: impl Fn(Entity) -> Option<WagonView>) -> Vec<WagonView> {
    fleet.order().iter().filter_map(|&e| wagon(e)).collect()
}

// =============================================================================
// Systems
// =============================================================================

/// System: refresh the boarding zone colors.
///
/// Skipped while the fleet is adjusting, except right after a wagon was
/// removed or the adjustment ended. Those two cases also clear the cache so
/// the refresh counts as a change and a dispatch follows.
pub fn refresh_available_colors(
    mut dispatcher: ResMut<BoardingDispatcher>,
    fleet: Res<WagonFleet>,
    params: Res<SimParams>,
    wagons: Query<&Wagon>,
    mut removed: EventReader<WagonRemoved>,
    mut adjustment: EventReader<AdjustmentStateChanged>,
) {
    let wagon_removed = removed.read().count() > 0;
    let unblocked = adjustment.read().filter(|e| !e.adjusting).count() > 0;
    let forced = wagon_removed || unblocked;
    if forced {
        dispatcher.invalidate();
    } else if fleet.is_adjusting() {
        return;
    }

    let views = fleet_views(&fleet, |e| wagons.get(e).ok().map(|w| WagonView::of(e, w)));
    let lead = lead_progress(&views, fleet.head());
    dispatcher.recompute(&views, lead, params.boarding_zone_depth);
}

/// System: commit at most one boarding match per tick.
///
/// Runs when the color set changed, a group arrived at a stop, or the
/// previous run committed a match, and only once the fleet is settled. The matched wagon is marked filled and
/// queued for removal; a group whose capacity reaches zero frees its stop,
/// leaves the grid and starts departing.
#[allow(clippy::too_many_arguments)]
pub fn dispatch_boarding(
    mut dispatcher: ResMut<BoardingDispatcher>,
    mut fleet: ResMut<WagonFleet>,
    mut stops: ResMut<StopRegistry>,
    mut grid: ResMut<GridMap>,
    params: Res<SimParams>,
    mut arrivals: EventReader<ArrivedAtStop>,
    mut wagons: Query<&mut Wagon>,
    mut passengers: Query<(&mut PassengerGroup, &GridPosition, &mut PassengerPhase)>,
    mut boarded: EventWriter<PassengerBoarded>,
    mut departed: EventWriter<PassengerDeparted>,
) {
    if arrivals.read().count() > 0 {
        dispatcher.request_dispatch();
    }
    // Requests stay armed until the fleet has finished reordering.
    if !fleet.is_settled() {
        return;
    }
    if !dispatcher.take_dispatch_request() {
        return;
    }

    let views = fleet_views(&fleet, |e| wagons.get(e).ok().map(|w| WagonView::of(e, w)));
    let lead = lead_progress(&views, fleet.head());
    let found = dispatcher.find_match(&stops, &views, lead, params.boarding_zone_depth, |e| {
        passengers.get(e).ok().map(|(group, _, _)| PassengerView {
            entity: e,
            color: group.color,
            remaining_capacity: group.remaining_capacity,
        })
    });
    let Some(m) = found else {
        return;
    };

    if !fleet.request_removal(m.wagon) {
        return;
    }
    if let Ok(mut wagon) = wagons.get_mut(m.wagon) {
        wagon.filled = true;
    }

    let Ok((mut group, grid_pos, mut phase)) = passengers.get_mut(m.passenger) else {
        return;
    };
    group.remaining_capacity = m.remaining_capacity;
    dispatcher.record_commit();
    info!(
        "Passenger {:?} boarded {} wagon {:?} at stop {}, {} left",
        m.passenger,
        m.color.label(),
        m.wagon,
        m.stop_index,
        m.remaining_capacity
    );
    boarded.send(PassengerBoarded {
        passenger: m.passenger,
        wagon: m.wagon,
        stop_index: m.stop_index,
        remaining_capacity: m.remaining_capacity,
    });

    if m.remaining_capacity == 0 {
        if let Err(err) = stops.free_stop(m.stop_index) {
            warn!("Boarding could not release stop {}: {}", m.stop_index, err);
        }
        grid.unregister_occupant(grid_pos.0, m.passenger);
        *phase = PassengerPhase::Departing;
        departed.send(PassengerDeparted {
            passenger: m.passenger,
            stop_index: m.stop_index,
        });
    }
}

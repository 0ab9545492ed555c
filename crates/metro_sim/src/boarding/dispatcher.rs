//! Boarding zone colors and passenger/wagon matching.

use std::collections::BTreeSet;

use bevy::prelude::*;

use crate::color::MatchColor;
use crate::config::PROGRESS_EPSILON;
use crate::fleet::Wagon;
use crate::stops::StopRegistry;

/// What the matcher needs to know about a wagon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WagonView {
    pub entity: Entity,
    pub color: MatchColor,
    pub progress: f32,
    pub active: bool,
    pub filled: bool,
}

impl WagonView {
    pub fn of(entity: Entity, wagon: &Wagon) -> Self {
        Self {
            entity,
            color: wagon.color,
            progress: wagon.track_progress,
            active: wagon.active,
            filled: wagon.filled,
        }
    }

    fn can_board(&self) -> bool {
        self.active && !self.filled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassengerView {
    pub entity: Entity,
    pub color: MatchColor,
    pub remaining_capacity: u32,
}

/// A passenger group at a stop paired with a wagon of its color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardingMatch {
    pub stop_index: usize,
    pub passenger: Entity,
    pub wagon: Entity,
    pub color: MatchColor,
    /// The group's capacity once this match is committed.
    pub remaining_capacity: u32,
}

/// Whether a wagon at `progress` is close enough behind the head to board.
pub fn in_boarding_zone(progress: f32, lead_progress: f32, depth: f32) -> bool {
    progress >= lead_progress - depth - PROGRESS_EPSILON
}

/// Progress of `head`, looked up among `wagons`.
pub fn lead_progress(wagons: &[WagonView], head: Option<Entity>) -> Option<f32> {
    let head = head?;
    wagons.iter().find(|w| w.entity == head).map(|w| w.progress)
}

/// Colors of the active, unfilled wagons inside the boarding zone.
pub fn zone_colors(wagons: &[WagonView], lead: Option<f32>, depth: f32) -> BTreeSet<MatchColor> {
    let Some(lead) = lead else {
        return BTreeSet::new();
    };
    wagons
        .iter()
        .filter(|w| w.can_board() && in_boarding_zone(w.progress, lead, depth))
        .map(|w| w.color)
        .collect()
}

#[derive(Resource, Debug, Clone, Default)]
pub struct BoardingDispatcher {
    available_colors: BTreeSet<MatchColor>,
    cache_valid: bool,
    last_recompute_changed: bool,
    dispatch_pending: bool,
    matches_committed: u64,
}

impl BoardingDispatcher {
    pub fn available_colors(&self) -> &BTreeSet<MatchColor> {
        &self.available_colors
    }

    /// Whether the most recent recompute reported a change.
    pub fn last_recompute_changed(&self) -> bool {
        self.last_recompute_changed
    }

    pub fn matches_committed(&self) -> u64 {
        self.matches_committed
    }

    pub fn is_dispatch_pending(&self) -> bool {
        self.dispatch_pending
    }

    /// Drop the cached color set so the next recompute reports a change even
    /// if the colors come out the same.
    pub fn invalidate(&mut self) {
        self.cache_valid = false;
    }

    /// Rebuild the available color set. A change arms a dispatch.
    pub fn recompute(&mut self, wagons: &[WagonView], lead: Option<f32>, depth: f32) -> bool {
        let colors = zone_colors(wagons, lead, depth);
        let changed = !self.cache_valid || colors != self.available_colors;
        if changed {
            debug!("Boarding colors now {:?}", colors);
            self.dispatch_pending = true;
        }
        self.available_colors = colors;
        self.cache_valid = true;
        self.last_recompute_changed = changed;
        changed
    }

    pub fn request_dispatch(&mut self) {
        self.dispatch_pending = true;
    }

    pub fn take_dispatch_request(&mut self) -> bool {
        std::mem::take(&mut self.dispatch_pending)
    }

    /// Find at most one match.
    ///
    /// Occupied stops are visited in ascending index order. For each group
    /// whose color is currently available, the first wagon of that color in
    /// fleet order that can still board and sits inside the zone is taken.
    /// `wagons` must be in fleet order.
    pub fn find_match(
        &self,
        stops: &StopRegistry,
        wagons: &[WagonView],
        lead: Option<f32>,
        depth: f32,
        passenger: impl Fn(Entity) -> Option<PassengerView>,
    ) -> Option<BoardingMatch> {
        let lead = lead?;
        for (stop_index, occupant) in stops.occupied_in_order() {
            let Some(group) = passenger(occupant) else {
                continue;
            };
            if group.remaining_capacity == 0 || !self.available_colors.contains(&group.color) {
                continue;
            }
            let wagon = wagons.iter().find(|w| {
                w.color == group.color
                    && w.can_board()
                    && in_boarding_zone(w.progress, lead, depth)
            });
            if let Some(wagon) = wagon {
                return Some(BoardingMatch {
                    stop_index,
                    passenger: occupant,
                    wagon: wagon.entity,
                    color: group.color,
                    remaining_capacity: group.remaining_capacity - 1,
                });
            }
        }
        None
    }

    /// Count a committed match and arm the next dispatch so remaining
    /// matches are picked up one per tick.
    pub fn record_commit(&mut self) {
        self.matches_committed += 1;
        self.dispatch_pending = true;
    }
}

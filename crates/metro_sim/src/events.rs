use bevy::prelude::*;

use crate::color::MatchColor;
use crate::TickCounter;

// =============================================================================
// Domain events
// =============================================================================

/// Input: ask a waiting passenger group to walk to a stop.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendToStop {
    pub passenger: Entity,
}

/// A passenger group reached its reserved stop and now occupies it.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrivedAtStop {
    pub passenger: Entity,
    pub stop_index: usize,
}

/// A wagon left the fleet and the reorder for it has started.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WagonRemoved {
    pub wagon: Entity,
    pub color: MatchColor,
}

/// The fleet entered (`true`) or left (`false`) a reorder.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjustmentStateChanged {
    pub adjusting: bool,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassengerBoarded {
    pub passenger: Entity,
    pub wagon: Entity,
    pub stop_index: usize,
    pub remaining_capacity: u32,
}

/// A group with no capacity left released its stop and is leaving. The
/// presentation layer despawns it once its exit animation finishes.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassengerDeparted {
    pub passenger: Entity,
    pub stop_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BounceReason {
    NoFreeStop,
    NoPath,
    PathBlocked,
}

/// A request to walk to a stop failed; the group stays at (or walks back
/// to) its origin.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassengerBounced {
    pub passenger: Entity,
    pub reason: BounceReason,
}

/// The last wagon left the fleet; the train is halted for good.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundCompleted;

// =============================================================================
// Journal
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum JournalKind {
    Arrived { passenger: Entity, stop_index: usize },
    Boarded { passenger: Entity, wagon: Entity },
    Departed { passenger: Entity },
    Bounced { passenger: Entity, reason: BounceReason },
    WagonRemoved { wagon: Entity, color: MatchColor },
    Adjustment { adjusting: bool },
    RoundCompleted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub tick: u64,
    pub kind: JournalKind,
}

/// Rolling record of domain events, in delivery order, for UI and tests.
#[derive(Resource)]
pub struct TransitJournal {
    pub entries: Vec<JournalEntry>,
    pub max_entries: usize,
}

impl Default for TransitJournal {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            max_entries: 500,
        }
    }
}

impl TransitJournal {
    /// Push a new entry, trimming the oldest ones if over capacity.
    pub fn push(&mut self, tick: u64, kind: JournalKind) {
        self.entries.push(JournalEntry { tick, kind });
        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(0..excess);
        }
    }

    pub fn count(&self, pred: impl Fn(&JournalKind) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.kind)).count()
    }
}

/// Copies this tick's domain events into the journal.
///
/// Each event type is drained in its own delivery order; across types the
/// journal groups by the order listed here, which matches the order the
/// simulation phases emit them.
#[allow(clippy::too_many_arguments)]
pub fn record_journal(
    tick: Res<TickCounter>,
    mut journal: ResMut<TransitJournal>,
    mut arrived: EventReader<ArrivedAtStop>,
    mut bounced: EventReader<PassengerBounced>,
    mut removed: EventReader<WagonRemoved>,
    mut adjustment: EventReader<AdjustmentStateChanged>,
    mut boarded: EventReader<PassengerBoarded>,
    mut departed: EventReader<PassengerDeparted>,
    mut completed: EventReader<RoundCompleted>,
) {
    let t = tick.0;
    for e in arrived.read() {
        journal.push(
            t,
            JournalKind::Arrived {
                passenger: e.passenger,
                stop_index: e.stop_index,
            },
        );
    }
    for e in bounced.read() {
        journal.push(
            t,
            JournalKind::Bounced {
                passenger: e.passenger,
                reason: e.reason,
            },
        );
    }
    for e in removed.read() {
        journal.push(
            t,
            JournalKind::WagonRemoved {
                wagon: e.wagon,
                color: e.color,
            },
        );
    }
    for e in adjustment.read() {
        journal.push(t, JournalKind::Adjustment { adjusting: e.adjusting });
    }
    for e in boarded.read() {
        journal.push(
            t,
            JournalKind::Boarded {
                passenger: e.passenger,
                wagon: e.wagon,
            },
        );
    }
    for e in departed.read() {
        journal.push(t, JournalKind::Departed { passenger: e.passenger });
    }
    for _ in completed.read() {
        info!("Round completed at tick {}", t);
        journal.push(t, JournalKind::RoundCompleted);
    }
}

pub struct TransitEventsPlugin;

impl Plugin for TransitEventsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TransitJournal>()
            .add_event::<SendToStop>()
            .add_event::<ArrivedAtStop>()
            .add_event::<WagonRemoved>()
            .add_event::<AdjustmentStateChanged>()
            .add_event::<PassengerBoarded>()
            .add_event::<PassengerDeparted>()
            .add_event::<PassengerBounced>()
            .add_event::<RoundCompleted>()
            .add_event::<crate::mover::MoveRequest>()
            .add_event::<crate::mover::MoveCompleted>()
            .add_systems(
                FixedUpdate,
                record_journal.in_set(crate::SimulationSet::PostSim),
            );
    }
}

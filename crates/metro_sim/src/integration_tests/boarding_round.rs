use crate::color::MatchColor;
use crate::events::JournalKind;
use crate::grid::GridPos;
use crate::passenger::PassengerPhase;
use crate::sim_params::SimParams;
use crate::stops::StopState;
use crate::test_harness::TestLevel;

use super::layouts::{layout, parked_layout, passenger};

const ROWS: [&str; 3] = ["S.S", "...", "w.w"];

#[test]
fn test_full_round_until_train_is_empty() {
    let mut level = TestLevel::new(layout(
        &ROWS,
        vec![MatchColor::Red, MatchColor::Blue],
        vec![
            passenger(MatchColor::Red, 1, 0, 0),
            passenger(MatchColor::Blue, 1, 2, 0),
        ],
    ));
    let (red, blue) = (level.passenger(0), level.passenger(1));
    let (red_wagon, blue_wagon) = (level.wagon(0), level.wagon(1));

    level.send_to_stop(red);
    level.tick(1);
    assert!(level.phase(red).is_walking());
    assert_eq!(level.stops().state(0), Some(StopState::Reserved(red)));
    assert_eq!(level.grid().occupant_at(GridPos::new(0, 0)), None, "left its origin");

    assert!(level.tick_until(10, |l| l.phase(red) == PassengerPhase::Departing));
    assert_eq!(level.group(red).remaining_capacity, 0);
    assert_eq!(level.stops().state(0), Some(StopState::Free));
    assert!(level.wagon_state(red_wagon).filled);

    assert!(level.tick_until(10, |l| !l.fleet().is_adjusting()));
    assert!(!level.wagon_state(red_wagon).active);
    assert_eq!(level.fleet().order(), &[blue_wagon]);
    assert_eq!(level.fleet().head(), Some(blue_wagon), "head promoted");

    level.send_to_stop(blue);
    assert!(level.tick_until(20, |l| l.fleet().is_halted()));
    level.tick(1);
    assert_eq!(level.phase(blue), PassengerPhase::Departing);
    assert_eq!(level.grid().occupied_count(), 0);
    assert_eq!(level.stops().free_count(), 2);

    let journal = level.journal();
    assert_eq!(journal.count(|k| matches!(k, JournalKind::Boarded { .. })), 2);
    assert_eq!(journal.count(|k| matches!(k, JournalKind::Departed { .. })), 2);
    assert_eq!(journal.count(|k| matches!(k, JournalKind::RoundCompleted)), 1);
    assert_eq!(level.dispatcher().matches_committed(), 2);
    level.assert_no_violations();
}

#[test]
fn test_group_boards_one_wagon_per_dispatch() {
    let mut level = TestLevel::new(parked_layout(
        &ROWS,
        vec![MatchColor::Green, MatchColor::Green, MatchColor::Red],
        vec![passenger(MatchColor::Green, 2, 0, 0)],
    ));
    let group = level.passenger(0);
    level.send_to_stop(group);
    assert!(level.tick_until(10, |l| matches!(
        l.phase(group),
        PassengerPhase::AtStop { .. }
    ) || l.group(group).remaining_capacity < 2));

    // Arrival and the first boarding happen on the same tick.
    assert_eq!(level.group(group).remaining_capacity, 1);
    assert!(matches!(level.phase(group), PassengerPhase::AtStop { stop_index: 0 }));
    assert_eq!(level.dispatcher().matches_committed(), 1);

    level.tick(1);
    assert_eq!(
        level.dispatcher().matches_committed(),
        1,
        "no match while the first wagon is being removed"
    );

    assert!(level.tick_until(10, |l| l.phase(group) == PassengerPhase::Departing));
    assert_eq!(level.dispatcher().matches_committed(), 2);
    assert!(level.wagon_state(level.wagon(0)).filled);
    assert!(level.wagon_state(level.wagon(1)).filled);
    assert!(!level.wagon_state(level.wagon(2)).filled);

    assert!(level.tick_until(10, |l| !l.fleet().is_adjusting()));
    assert_eq!(level.fleet().order(), &[level.wagon(2)]);
    level.assert_no_violations();
}

#[test]
fn test_second_boarding_waits_for_reorder_to_finish() {
    let mut l = parked_layout(
        &ROWS,
        vec![MatchColor::Orange, MatchColor::Red, MatchColor::Blue],
        vec![
            passenger(MatchColor::Red, 1, 0, 0),
            passenger(MatchColor::Blue, 1, 2, 0),
        ],
    );
    // Only the Orange head is in reach until the zone is widened.
    l.params.boarding_zone_depth = 0.0;
    let mut level = TestLevel::new(l);
    let (red, blue) = (level.passenger(0), level.passenger(1));

    level.send_to_stop(red);
    level.send_to_stop(blue);
    assert!(level.tick_until(10, |l| {
        matches!(l.phase(red), PassengerPhase::AtStop { stop_index: 0 })
            && matches!(l.phase(blue), PassengerPhase::AtStop { stop_index: 1 })
    }));
    level.tick(2);
    assert_eq!(level.dispatcher().matches_committed(), 0);

    level
        .world_mut()
        .resource_mut::<SimParams>()
        .boarding_zone_depth = 1.5;
    level.tick(1);
    assert_eq!(level.dispatcher().matches_committed(), 1);
    assert_eq!(level.phase(red), PassengerPhase::Departing, "lowest stop first");
    assert!(matches!(level.phase(blue), PassengerPhase::AtStop { .. }));

    // Blue waits while the fleet closes the gap Red left behind.
    level.tick(1);
    assert!(level.fleet().is_adjusting());
    assert_eq!(level.dispatcher().matches_committed(), 1);
    assert!(level.dispatcher().is_dispatch_pending());

    assert!(level.tick_until(10, |l| l.dispatcher().matches_committed() == 2));
    assert_eq!(level.phase(blue), PassengerPhase::Departing);

    let journal = level.journal();
    let boarded_ticks: Vec<u64> = journal
        .entries
        .iter()
        .filter(|e| matches!(e.kind, JournalKind::Boarded { .. }))
        .map(|e| e.tick)
        .collect();
    let settled_tick = journal
        .entries
        .iter()
        .find(|e| e.kind == JournalKind::Adjustment { adjusting: false })
        .map(|e| e.tick)
        .expect("reorder finished");
    assert_eq!(boarded_ticks.len(), 2);
    assert!(boarded_ticks[0] < settled_tick);
    assert!(
        settled_tick < boarded_ticks[1],
        "second boarding waits for the fleet to settle"
    );
    level.assert_no_violations();
}

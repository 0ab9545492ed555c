use crate::color::MatchColor;
use crate::events::{BounceReason, JournalKind};
use crate::grid::GridPos;
use crate::passenger::PassengerPhase;
use crate::stops::StopState;
use crate::test_harness::TestLevel;

use super::layouts::{parked_layout, passenger};

fn bounces(level: &TestLevel, reason: BounceReason) -> usize {
    level
        .journal()
        .count(|k| matches!(k, JournalKind::Bounced { reason: r, .. } if *r == reason))
}

#[test]
fn test_walker_returns_when_route_is_blocked_mid_path() {
    // One row: stop on the left, the group on the far right, an empty
    // waiting cell halfway.
    let mut level = TestLevel::new(parked_layout(
        &["S.w.w"],
        vec![MatchColor::Green],
        vec![passenger(MatchColor::Red, 1, 4, 0)],
    ));
    let group = level.passenger(0);
    let origin = GridPos::new(4, 0);

    level.send_to_stop(group);
    level.tick(1);
    match level.phase(group) {
        PassengerPhase::Walking { path, next, .. } => {
            assert_eq!(path.len(), 4);
            assert_eq!(path[1], GridPos::new(2, 0), "route crosses the waiting cell");
            assert_eq!(next, 0);
        }
        other => panic!("expected Walking, got {:?}", other),
    }

    // Someone settles on the waiting cell before the walker gets there.
    let blocker = level.with_blocker(GridPos::new(2, 0));
    level.tick(1);
    assert_eq!(level.phase(group), PassengerPhase::Returning { origin });
    assert_eq!(level.stops().state(0), Some(StopState::Free), "reservation cancelled");
    assert_eq!(bounces(&level, BounceReason::PathBlocked), 1);

    level.tick(1);
    level.assert_phase(group, &PassengerPhase::Waiting);
    assert_eq!(level.grid_position(group).0, origin);
    assert_eq!(level.grid().occupant_at(origin), Some(group));
    assert_eq!(level.grid().occupant_at(GridPos::new(2, 0)), Some(blocker));
    assert_eq!(
        level.world_position(group),
        crate::grid::GridMap::cell_to_world(origin)
    );
    level.assert_unique_occupancy();
    level.assert_no_violations();
}

#[test]
fn test_walker_turns_back_when_stop_cell_is_held_on_arrival() {
    let mut level = TestLevel::new(parked_layout(
        &["S...w"],
        vec![MatchColor::Green],
        vec![passenger(MatchColor::Red, 1, 4, 0)],
    ));
    let group = level.passenger(0);
    let origin = GridPos::new(4, 0);
    let stop_cell = GridPos::new(0, 0);

    level.send_to_stop(group);
    level.tick(1);
    assert!(level.phase(group).is_walking());
    let squatter = level.with_blocker(stop_cell);

    assert!(level.tick_until(10, |l| matches!(
        l.phase(group),
        PassengerPhase::Returning { .. }
    )));
    assert_eq!(level.stops().state(0), Some(StopState::Free));
    assert_eq!(level.grid().occupant_at(stop_cell), Some(squatter));
    assert_eq!(bounces(&level, BounceReason::PathBlocked), 1);
    assert_eq!(
        level
            .journal()
            .count(|k| matches!(k, JournalKind::Arrived { .. })),
        0
    );

    level.tick(1);
    level.assert_phase(group, &PassengerPhase::Waiting);
    assert_eq!(level.grid().occupant_at(origin), Some(group));
    level.assert_unique_occupancy();
    level.assert_no_violations();
}

#[test]
fn test_occupied_walkable_cell_does_not_stop_walker() {
    let mut level = TestLevel::new(parked_layout(
        &["S...w"],
        vec![MatchColor::Green],
        vec![passenger(MatchColor::Red, 1, 4, 0)],
    ));
    let group = level.passenger(0);
    level.with_blocker(GridPos::new(2, 0));

    level.send_to_stop(group);
    assert!(level.tick_until(10, |l| matches!(
        l.phase(group),
        PassengerPhase::AtStop { stop_index: 0 }
    )));
    assert_eq!(level.grid().occupant_at(GridPos::new(0, 0)), Some(group));
    assert_eq!(level.stops().state(0), Some(StopState::Occupied(group)));
    assert_eq!(bounces(&level, BounceReason::PathBlocked), 0);
    level.assert_no_violations();
}

#[test]
fn test_bounce_when_no_stop_is_free() {
    let mut level = TestLevel::new(parked_layout(
        &["S..", "w.w"],
        vec![MatchColor::Green],
        vec![
            passenger(MatchColor::Red, 1, 0, 0),
            passenger(MatchColor::Blue, 1, 2, 0),
        ],
    ));
    let (first, second) = (level.passenger(0), level.passenger(1));

    level.send_to_stop(first);
    level.send_to_stop(second);
    level.tick(1);
    assert!(level.phase(first).is_walking());
    level.assert_phase(second, &PassengerPhase::Waiting);
    assert_eq!(bounces(&level, BounceReason::NoFreeStop), 1);
    assert_eq!(level.grid().occupant_at(GridPos::new(2, 0)), Some(second));

    assert!(level.tick_until(5, |l| matches!(
        l.phase(first),
        PassengerPhase::AtStop { .. }
    )));
    assert!(!level.stops().has_available_stop());

    level.send_to_stop(second);
    level.tick(1);
    assert_eq!(bounces(&level, BounceReason::NoFreeStop), 2);
    level.assert_phase(second, &PassengerPhase::Waiting);
    level.assert_no_violations();
}

#[test]
fn test_bounce_when_stop_is_unreachable() {
    let mut level = TestLevel::new(parked_layout(
        &["S#.", "w#w"],
        vec![MatchColor::Green],
        vec![passenger(MatchColor::Red, 1, 2, 0)],
    ));
    let group = level.passenger(0);

    level.send_to_stop(group);
    level.tick(1);
    assert_eq!(bounces(&level, BounceReason::NoPath), 1);
    level.assert_phase(group, &PassengerPhase::Waiting);
    assert_eq!(level.stops().state(0), Some(StopState::Free));
    assert_eq!(level.grid().occupant_at(GridPos::new(2, 0)), Some(group));
    level.assert_no_violations();
}

#[test]
fn test_requests_while_walking_are_ignored() {
    let mut level = TestLevel::new(parked_layout(
        &["S.S", "...", "..w"],
        vec![MatchColor::Green],
        vec![passenger(MatchColor::Red, 1, 2, 0)],
    ));
    let group = level.passenger(0);
    level.send_to_stop(group);
    level.tick(1);
    level.send_to_stop(group);
    level.tick(1);
    assert!(level.phase(group).is_walking());
    assert_eq!(level.stops().free_count(), 1, "only one stop reserved");
    assert_eq!(level.stops().reservation_of(group), Some(0));
}

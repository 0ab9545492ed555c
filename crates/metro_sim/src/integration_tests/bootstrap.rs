use crate::color::MatchColor;
use crate::events::JournalKind;
use crate::grid::{CellType, GridPos};
use crate::level::LevelStatus;
use crate::passenger::PassengerPhase;
use crate::test_harness::TestLevel;

use super::layouts::{layout, passenger};

#[test]
fn test_valid_layout_bootstraps_services() {
    let level = TestLevel::new(layout(
        &["S.S", "...", "w.w"],
        vec![MatchColor::Red, MatchColor::Blue],
        vec![
            passenger(MatchColor::Red, 1, 0, 0),
            passenger(MatchColor::Blue, 1, 2, 0),
        ],
    ));
    assert!(level.is_ready());
    assert_eq!(level.stops().len(), 2);
    assert_eq!(level.stops().position_of(0), Some(GridPos::new(0, 2)));
    assert_eq!(level.grid().cell_type(GridPos::new(1, 1)), Some(CellType::Walkable));

    let p0 = level.passenger(0);
    assert_eq!(level.grid().occupant_at(GridPos::new(0, 0)), Some(p0));
    level.assert_phase(p0, &PassengerPhase::Waiting);

    assert_eq!(level.fleet().order(), &[level.wagon(0), level.wagon(1)]);
    assert_eq!(level.fleet().head(), Some(level.wagon(0)));
    assert!(level.wagon_state(level.wagon(0)).is_head);
    level.assert_no_violations();
}

#[test]
fn test_invalid_layout_leaves_core_inert() {
    let mut bad = layout(&["S.S", "w.w"], vec![MatchColor::Red], vec![]);
    bad.stops.clear();
    let mut level = TestLevel::new(bad);
    assert_eq!(level.status(), LevelStatus::Inert);
    level.tick(5);
    assert_eq!(level.status(), LevelStatus::Inert);
    assert!(level.world_mut().get_resource::<crate::grid::GridMap>().is_none());
    assert!(level.journal().entries.is_empty());
}

#[test]
fn test_train_advances_and_stops_at_track_end() {
    let mut l = layout(&["S", "w"], vec![MatchColor::Red, MatchColor::Blue], vec![]);
    l.params.train_speed_per_tick = 0.25;
    let mut level = TestLevel::new(l);
    let (head, tail) = (level.wagon(0), level.wagon(1));
    let start_head = level.wagon_state(head).track_progress;

    level.tick(2);
    let moved = level.wagon_state(head).track_progress - start_head;
    assert!(moved > 0.0, "train moves while the fleet is idle");
    let gap = level.wagon_state(head).track_progress - level.wagon_state(tail).track_progress;
    assert!((gap - 0.5).abs() < 1e-4, "spacing is kept, got {gap}");

    level.tick(40);
    assert!((level.wagon_state(head).track_progress - 3.0).abs() < 1e-4);
    let gap = level.wagon_state(head).track_progress - level.wagon_state(tail).track_progress;
    assert!((gap - 0.5).abs() < 1e-4, "train stops as a whole at the end");
    assert_eq!(level.world_position(head), bevy::math::Vec2::new(12.0, 10.0));
    assert_eq!(
        level.journal().count(|k| matches!(k, JournalKind::WagonRemoved { .. })),
        0
    );
    level.assert_no_violations();
}

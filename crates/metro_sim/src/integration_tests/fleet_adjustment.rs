use std::collections::BTreeSet;

use bevy::math::Vec2;

use crate::color::MatchColor;
use crate::events::JournalKind;
use crate::fleet::TrackTarget;
use crate::test_harness::TestLevel;

use super::layouts::{parked_layout, passenger};

#[test]
fn test_middle_removal_announces_adjustment_around_reorder() {
    let mut level = TestLevel::new(parked_layout(
        &["S", "w"],
        vec![MatchColor::Red, MatchColor::Blue, MatchColor::Green],
        vec![passenger(MatchColor::Blue, 1, 0, 0)],
    ));
    let (red, blue, green) = (level.wagon(0), level.wagon(1), level.wagon(2));
    let blue_slot = level.world_position(blue);
    assert_eq!(blue_slot, Vec2::new(6.0, 10.0), "progress 1.5 on the straight track");

    level.send_to_stop(level.passenger(0));
    assert!(level.tick_until(10, |l| l.fleet().is_adjusting()));

    // The reorder starts on the following tick; Green is handed a target.
    level.tick(1);
    let target = *level
        .world_mut()
        .get::<TrackTarget>(green)
        .expect("green is repositioning");
    assert_eq!(target.slot, blue_slot);
    assert_eq!(target.checkpoint, 1);
    assert!(level.fleet().is_adjusting());

    assert!(level.tick_until(5, |l| !l.fleet().is_adjusting()));
    assert_eq!(level.fleet().order(), &[red, green]);
    assert_eq!(level.fleet().head(), Some(red));
    assert_eq!(level.world_position(green), blue_slot);
    assert!((level.wagon_state(green).track_progress - 1.5).abs() < 1e-4);
    assert!(level.world_mut().get::<TrackTarget>(green).is_none());

    let sequence: Vec<&JournalKind> = level
        .journal()
        .entries
        .iter()
        .map(|e| &e.kind)
        .filter(|k| {
            matches!(
                k,
                JournalKind::Adjustment { .. } | JournalKind::WagonRemoved { .. }
            )
        })
        .collect();
    assert_eq!(
        sequence,
        vec![
            &JournalKind::Adjustment { adjusting: true },
            &JournalKind::WagonRemoved {
                wagon: blue,
                color: MatchColor::Blue
            },
            &JournalKind::Adjustment { adjusting: false },
        ]
    );
    level.assert_no_violations();
}

#[test]
fn test_train_holds_still_while_adjusting() {
    let mut l = parked_layout(
        &["S", "w"],
        vec![MatchColor::Red, MatchColor::Blue],
        vec![passenger(MatchColor::Red, 1, 0, 0)],
    );
    l.params.train_speed_per_tick = 0.01;
    let mut level = TestLevel::new(l);
    let blue = level.wagon(1);

    level.send_to_stop(level.passenger(0));
    assert!(level.tick_until(10, |l| l.fleet().is_adjusting()));
    let held = level.wagon_state(blue).track_progress;
    level.tick(1);
    assert!(level.fleet().is_adjusting());
    assert_eq!(level.wagon_state(blue).track_progress, held);

    assert!(level.tick_until(5, |l| !l.fleet().is_adjusting()));
    let resumed = level.wagon_state(blue).track_progress;
    level.tick(1);
    assert!(level.wagon_state(blue).track_progress > resumed);
    assert_eq!(level.fleet().head(), Some(blue));
    level.assert_no_violations();
}

#[test]
fn test_unblock_refresh_reports_change_with_identical_colors() {
    let mut level = TestLevel::new(parked_layout(
        &["S", "w"],
        vec![MatchColor::Red, MatchColor::Red, MatchColor::Blue],
        vec![passenger(MatchColor::Red, 1, 0, 0)],
    ));
    let both: BTreeSet<MatchColor> = [MatchColor::Red, MatchColor::Blue].into_iter().collect();
    assert_eq!(level.dispatcher().available_colors(), &both);

    level.send_to_stop(level.passenger(0));
    assert!(level.tick_until(10, |l| {
        l.journal()
            .count(|k| *k == JournalKind::Adjustment { adjusting: false })
            > 0
    }));
    // The refresh on the unblocking tick ran before the announcement.
    assert!(!level.dispatcher().last_recompute_changed());
    assert_eq!(level.dispatcher().available_colors(), &both);

    level.tick(1);
    assert!(
        level.dispatcher().last_recompute_changed(),
        "unblock forces a change"
    );
    assert_eq!(level.dispatcher().available_colors(), &both);
    level.assert_no_violations();
}

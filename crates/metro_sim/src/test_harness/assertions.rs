//! Assertion helpers for `TestLevel`.

use crate::passenger::PassengerPhase;

use super::TestLevel;

impl TestLevel {
    /// Assert that no invariant check has fired since the level started.
    pub fn assert_no_violations(&self) {
        let v = self.violations();
        assert_eq!(v.total, 0, "invariant violations recorded: {:?}", v);
    }

    pub fn assert_phase(&self, passenger: bevy::prelude::Entity, expected: &PassengerPhase) {
        let actual = self.phase(passenger);
        assert_eq!(
            &actual, expected,
            "passenger {:?} is {} not {}",
            passenger,
            actual.label(),
            expected.label()
        );
    }

    /// Assert that every live entity occupies at most one cell.
    pub fn assert_unique_occupancy(&self) {
        let mut seen = std::collections::HashSet::new();
        for (pos, entity) in self.grid().occupants() {
            assert!(
                seen.insert(entity),
                "{:?} is registered on more than one cell (again at {})",
                entity,
                pos
            );
        }
    }
}

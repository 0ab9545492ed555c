//! Tick, input and query methods for `TestLevel`.

use bevy::prelude::*;

use crate::boarding::BoardingDispatcher;
use crate::events::{SendToStop, TransitJournal};
use crate::fleet::{Wagon, WagonFleet};
use crate::grid::GridMap;
use crate::invariants::InvariantViolations;
use crate::level::{LevelEntities, LevelStatus};
use crate::mover::WorldPosition;
use crate::passenger::{GridPosition, PassengerGroup, PassengerPhase};
use crate::stops::StopRegistry;

use super::TestLevel;

impl TestLevel {
    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Run N fixed-update ticks by executing the `FixedUpdate` schedule
    /// directly, bypassing Bevy's time system.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
        }
    }

    /// Tick until `done` holds or `max_ticks` have run. Returns whether the
    /// condition was met.
    pub fn tick_until(&mut self, max_ticks: u32, done: impl Fn(&Self) -> bool) -> bool {
        for _ in 0..max_ticks {
            if done(self) {
                return true;
            }
            self.tick(1);
        }
        done(self)
    }

    pub fn send_to_stop(&mut self, passenger: Entity) {
        self.app.world_mut().send_event(SendToStop { passenger });
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn status(&self) -> LevelStatus {
        *self.app.world().resource::<LevelStatus>()
    }

    pub fn is_ready(&self) -> bool {
        self.status() == LevelStatus::Ready
    }

    pub fn grid(&self) -> &GridMap {
        self.app.world().resource::<GridMap>()
    }

    pub fn stops(&self) -> &StopRegistry {
        self.app.world().resource::<StopRegistry>()
    }

    pub fn fleet(&self) -> &WagonFleet {
        self.app.world().resource::<WagonFleet>()
    }

    pub fn dispatcher(&self) -> &BoardingDispatcher {
        self.app.world().resource::<BoardingDispatcher>()
    }

    pub fn journal(&self) -> &TransitJournal {
        self.app.world().resource::<TransitJournal>()
    }

    pub fn violations(&self) -> &InvariantViolations {
        self.app.world().resource::<InvariantViolations>()
    }

    fn entities(&self) -> &LevelEntities {
        self.app.world().resource::<LevelEntities>()
    }

    /// The passenger group spawned from `layout.passengers[index]`.
    pub fn passenger(&self, index: usize) -> Entity {
        self.entities().passengers[index]
    }

    /// The wagon spawned from `layout.wagons[index]`.
    pub fn wagon(&self, index: usize) -> Entity {
        self.entities().wagons[index]
    }

    pub fn phase(&self, passenger: Entity) -> PassengerPhase {
        self.app
            .world()
            .get::<PassengerPhase>(passenger)
            .cloned()
            .expect("entity is a passenger group")
    }

    pub fn group(&self, passenger: Entity) -> PassengerGroup {
        *self
            .app
            .world()
            .get::<PassengerGroup>(passenger)
            .expect("entity is a passenger group")
    }

    pub fn grid_position(&self, passenger: Entity) -> GridPosition {
        *self
            .app
            .world()
            .get::<GridPosition>(passenger)
            .expect("entity has a grid position")
    }

    pub fn wagon_state(&self, wagon: Entity) -> Wagon {
        self.app
            .world()
            .get::<Wagon>(wagon)
            .cloned()
            .expect("entity is a wagon")
    }

    pub fn world_position(&self, entity: Entity) -> Vec2 {
        self.app
            .world()
            .get::<WorldPosition>(entity)
            .map(|p| p.0)
            .expect("entity has a world position")
    }
}

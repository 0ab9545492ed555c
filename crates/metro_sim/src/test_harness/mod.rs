//! # TestLevel: headless harness for the transit core
//!
//! Wraps `bevy::app::App` + `MetroSimPlugin` + `InstantMoverPlugin` so tests
//! can load a layout, send input events, step `FixedUpdate` and inspect the
//! resulting services and entities without a window or renderer.

mod assertions;
mod queries;

use bevy::app::App;
use bevy::prelude::*;

use crate::grid::{GridMap, GridPos};
use crate::level::LevelLayout;
use crate::mover::InstantMoverPlugin;
use crate::MetroSimPlugin;

pub struct TestLevel {
    app: App,
}

impl TestLevel {
    /// Build an app around `layout` and run the first tick so the level is
    /// bootstrapped.
    pub fn new(layout: LevelLayout) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(layout);
        app.add_plugins((MetroSimPlugin, InstantMoverPlugin));

        // Run one update so plugin setup completes before ticking manually.
        app.update();

        let mut level = Self { app };
        level.tick(1);
        level
    }

    /// Spawn a bare entity and register it on `pos`, standing in for some
    /// other occupant the walker has to deal with.
    pub fn with_blocker(&mut self, pos: GridPos) -> Entity {
        let world = self.app.world_mut();
        let blocker = world.spawn_empty().id();
        world.resource_mut::<GridMap>().register_occupant(pos, blocker);
        blocker
    }
}

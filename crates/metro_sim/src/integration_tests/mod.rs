//! Integration tests for the transit core using the `TestLevel` harness.
//!
//! These tests spin up a headless Bevy App with `MetroSimPlugin` and the
//! instant mover, and verify behavior across the walker, fleet and boarding
//! systems working together.

mod boarding_round;
mod bootstrap;
mod fleet_adjustment;
mod layouts;
mod walker;

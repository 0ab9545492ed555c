//! Data-driven simulation parameters.
//!
//! Collects the tunables that systems read every tick into a single
//! [`SimParams`] resource. Levels can override any subset of fields; missing
//! fields fall back to the defaults in [`crate::config`].

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_BOARDING_ZONE_DEPTH, DEFAULT_REPOSITION_DURATION, DEFAULT_RETURN_STEP_DURATION,
    DEFAULT_TRAIN_SPEED_PER_TICK, DEFAULT_WALK_STEP_DURATION,
};

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Wagons whose progress is within this distance behind the head are
    /// eligible for boarding.
    pub boarding_zone_depth: f32,
    /// Track progress gained by every live wagon per fixed tick.
    pub train_speed_per_tick: f32,
    /// Mover duration for one passenger step.
    pub walk_step_duration: f32,
    /// Mover duration per cell on the way back to a passenger's origin.
    pub return_step_duration: f32,
    /// Mover duration for a wagon sliding into the slot ahead of it.
    pub reposition_duration: f32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            boarding_zone_depth: DEFAULT_BOARDING_ZONE_DEPTH,
            train_speed_per_tick: DEFAULT_TRAIN_SPEED_PER_TICK,
            walk_step_duration: DEFAULT_WALK_STEP_DURATION,
            return_step_duration: DEFAULT_RETURN_STEP_DURATION,
            reposition_duration: DEFAULT_REPOSITION_DURATION,
        }
    }
}

impl SimParams {
    /// Replace non-finite or negative values with their defaults, logging
    /// each correction.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let fields: [(&str, &mut f32, f32); 5] = [
            (
                "boarding_zone_depth",
                &mut self.boarding_zone_depth,
                defaults.boarding_zone_depth,
            ),
            (
                "train_speed_per_tick",
                &mut self.train_speed_per_tick,
                defaults.train_speed_per_tick,
            ),
            (
                "walk_step_duration",
                &mut self.walk_step_duration,
                defaults.walk_step_duration,
            ),
            (
                "return_step_duration",
                &mut self.return_step_duration,
                defaults.return_step_duration,
            ),
            (
                "reposition_duration",
                &mut self.reposition_duration,
                defaults.reposition_duration,
            ),
        ];
        for (name, value, fallback) in fields {
            if !value.is_finite() || *value < 0.0 {
                warn!(
                    "SimParams: {} = {} is invalid, using default {}",
                    name, value, fallback
                );
                *value = fallback;
            }
        }
        self
    }
}

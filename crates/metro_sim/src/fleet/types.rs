//! Components, plans and the `WagonFleet` resource.

use std::collections::VecDeque;

use bevy::prelude::*;

use crate::color::MatchColor;

// =============================================================================
// Components
// =============================================================================

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Wagon {
    pub color: MatchColor,
    pub is_head: bool,
    /// Distance along the track, `segment_index + t`.
    pub track_progress: f32,
    /// False once the wagon has left the fleet.
    pub active: bool,
    /// Set when a passenger group is matched to this wagon. A filled wagon no
    /// longer offers its color even while its removal is still queued.
    pub filled: bool,
    /// Position in the master creation order.
    pub creation_index: usize,
}

impl Wagon {
    pub fn new(color: MatchColor, creation_index: usize, track_progress: f32) -> Self {
        Self {
            color,
            is_head: false,
            track_progress,
            active: true,
            filled: false,
            creation_index,
        }
    }
}

/// Where a wagon is sliding to during a reorder.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct TrackTarget {
    /// Checkpoint nearest to the slot.
    pub checkpoint: usize,
    pub slot: Vec2,
    pub progress: f32,
}

// =============================================================================
// Reorder plan
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Retarget {
    pub entity: Entity,
    pub from_progress: f32,
    pub to_progress: f32,
    pub slot: Vec2,
    pub checkpoint: usize,
}

/// The outcome of starting one queued removal.
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderPlan {
    pub removed: Entity,
    /// Fleet order after the removal, head first.
    pub order: Vec<Entity>,
    /// Wagons behind the removed one, each moving into the slot ahead.
    pub retargets: Vec<Retarget>,
    /// Set when the removed wagon was the head and another took over.
    pub promoted_head: Option<Entity>,
    /// The removed wagon was the last one.
    pub halted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReorderPhase {
    #[default]
    Idle,
    AwaitingReposition {
        removed: Entity,
        outstanding: Vec<Entity>,
    },
}

// =============================================================================
// Resource
// =============================================================================

/// The physical train, head first.
#[derive(Resource, Debug, Clone, Default)]
pub struct WagonFleet {
    /// Every wagon ever added, in creation order. Never shrinks.
    pub(crate) master: Vec<Entity>,
    /// Live wagons in physical order, non-increasing in track progress.
    pub(crate) order: Vec<Entity>,
    pub(crate) head: Option<Entity>,
    pub(crate) pending: VecDeque<Entity>,
    pub(crate) phase: ReorderPhase,
    pub(crate) halted: bool,
    /// Last adjustment state announced through `AdjustmentStateChanged`.
    pub(crate) adjusting_reported: bool,
}

//! Methods on `WagonFleet`: membership, the removal queue and the reorder
//! state machine.

use bevy::prelude::*;

use crate::track::TrackPath;

use super::types::*;

impl WagonFleet {
    /// Append a wagon at the tail. The first wagon added becomes the head.
    pub fn add_wagon(&mut self, entity: Entity) -> bool {
        if self.master.contains(&entity) {
            warn!("WagonFleet: {:?} was already added", entity);
            return false;
        }
        self.master.push(entity);
        self.order.push(entity);
        if self.head.is_none() {
            self.head = Some(entity);
        }
        self.halted = false;
        true
    }

    pub fn order(&self) -> &[Entity] {
        &self.order
    }

    pub fn head(&self) -> Option<Entity> {
        self.head
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.order.contains(&entity)
    }

    pub fn creation_index(&self, entity: Entity) -> Option<usize> {
        self.master.iter().position(|&e| e == entity)
    }

    pub fn pending_removals(&self) -> impl Iterator<Item = Entity> + '_ {
        self.pending.iter().copied()
    }

    pub fn is_pending_removal(&self, entity: Entity) -> bool {
        self.pending.contains(&entity)
    }

    pub fn phase(&self) -> &ReorderPhase {
        &self.phase
    }

    /// True while a reorder is running or removals are waiting for one.
    pub fn is_adjusting(&self) -> bool {
        self.phase != ReorderPhase::Idle || !self.pending.is_empty()
    }

    /// True once the last wagon has been removed.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// True when no reorder is running or queued and the end of the last one
    /// has been announced. Boarding only matches against a settled fleet.
    pub fn is_settled(&self) -> bool {
        !self.is_adjusting() && !self.adjusting_reported
    }

    /// Queue `entity` for removal. Removals run one at a time in the order
    /// they were requested.
    pub fn request_removal(&mut self, entity: Entity) -> bool {
        if !self.contains(entity) {
            warn!("WagonFleet: removal requested for {:?} which is not in the fleet", entity);
            return false;
        }
        if self.is_pending_removal(entity) {
            warn!("WagonFleet: {:?} is already queued for removal", entity);
            return false;
        }
        self.pending.push_back(entity);
        true
    }

    /// Start the next queued removal if no reorder is in flight.
    ///
    /// `position_of` reports the current world position of a wagon. Every
    /// live wagon (the one being removed included) is projected onto the
    /// track and ranked head first; equal progress keeps creation order.
    /// Each wagon behind the removed one is given the slot of the wagon
    /// directly ahead of it. A plan without any retargets finishes at once
    /// and leaves the fleet Idle.
    pub fn begin_next_reorder(
        &mut self,
        track: &TrackPath,
        position_of: impl Fn(Entity) -> Option<Vec2>,
    ) -> Option<ReorderPlan> {
        if self.phase != ReorderPhase::Idle {
            return None;
        }
        let removed = self.pending.pop_front()?;

        let mut ranked: Vec<(Entity, Option<Vec2>, f32, usize)> = self
            .order
            .iter()
            .map(|&e| {
                let pos = position_of(e);
                if pos.is_none() {
                    warn!("WagonFleet: no position for {:?}, ranking it last", e);
                }
                let progress = pos.map_or(f32::NEG_INFINITY, |p| track.project(p));
                let created = self.creation_index(e).unwrap_or(usize::MAX);
                (e, pos, progress, created)
            })
            .collect();
        ranked.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.3.cmp(&b.3)));

        let mut retargets = Vec::new();
        if let Some(slot_rank) = ranked.iter().position(|r| r.0 == removed) {
            for i in slot_rank + 1..ranked.len() {
                let (entity, from, from_progress, _) = ranked[i];
                let (_, ahead, to_progress, _) = ranked[i - 1];
                let (Some(_), Some(slot)) = (from, ahead) else {
                    continue;
                };
                retargets.push(Retarget {
                    entity,
                    from_progress,
                    to_progress,
                    slot,
                    checkpoint: track.nearest_checkpoint(slot),
                });
            }
        }

        self.order = ranked
            .into_iter()
            .map(|r| r.0)
            .filter(|&e| e != removed)
            .collect();

        let mut promoted_head = None;
        if self.head == Some(removed) {
            self.head = self
                .master
                .iter()
                .find(|e| self.order.contains(e))
                .copied();
            promoted_head = self.head;
        }

        let halted = self.order.is_empty();
        if halted {
            self.halted = true;
            self.head = None;
            self.pending.clear();
        }

        if !retargets.is_empty() {
            self.phase = ReorderPhase::AwaitingReposition {
                removed,
                outstanding: retargets.iter().map(|r| r.entity).collect(),
            };
        }

        Some(ReorderPlan {
            removed,
            order: self.order.clone(),
            retargets,
            promoted_head,
            halted,
        })
    }

    /// Record that a repositioning wagon reached its slot. The reorder ends
    /// when the last outstanding wagon reports in.
    pub fn complete_reposition(&mut self, entity: Entity) -> bool {
        let ReorderPhase::AwaitingReposition { outstanding, .. } = &mut self.phase else {
            return false;
        };
        let Some(i) = outstanding.iter().position(|&e| e == entity) else {
            return false;
        };
        outstanding.remove(i);
        if outstanding.is_empty() {
            self.phase = ReorderPhase::Idle;
        }
        true
    }

    /// `Some(new_state)` the first time it is called after the adjustment
    /// flag changed, `None` otherwise.
    pub fn take_adjustment_transition(&mut self) -> Option<bool> {
        let adjusting = self.is_adjusting();
        if adjusting == self.adjusting_reported {
            return None;
        }
        self.adjusting_reported = adjusting;
        Some(adjusting)
    }
}

//! The fixed checkpoint polyline the train runs along.
//!
//! Track progress is a scalar `segment_index + t` with `t` in `[0, 1]`, so a
//! wagon sitting on checkpoint `k` has progress `k` and the end of the track
//! has progress `checkpoints.len() - 1`.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct TrackPath {
    checkpoints: Vec<Vec2>,
}

impl TrackPath {
    pub fn new(checkpoints: Vec<Vec2>) -> Self {
        Self { checkpoints }
    }

    pub fn checkpoints(&self) -> &[Vec2] {
        &self.checkpoints
    }

    pub fn segment_count(&self) -> usize {
        self.checkpoints.len().saturating_sub(1)
    }

    pub fn max_progress(&self) -> f32 {
        self.segment_count() as f32
    }

    /// Project a world position onto the nearest segment and return its
    /// progress. The first segment wins exact distance ties.
    pub fn project(&self, pos: Vec2) -> f32 {
        let mut best_progress = 0.0;
        let mut best_dist = f32::INFINITY;
        for (i, pair) in self.checkpoints.windows(2).enumerate() {
            let (a, b) = (pair[0], pair[1]);
            let ab = b - a;
            let len_sq = ab.length_squared();
            let t = if len_sq <= f32::EPSILON {
                0.0
            } else {
                ((pos - a).dot(ab) / len_sq).clamp(0.0, 1.0)
            };
            let dist = pos.distance_squared(a + ab * t);
            if dist < best_dist {
                best_dist = dist;
                best_progress = i as f32 + t;
            }
        }
        best_progress
    }

    /// World position at `progress`, clamped to the track ends.
    pub fn point_at(&self, progress: f32) -> Vec2 {
        match self.checkpoints.len() {
            0 => Vec2::ZERO,
            1 => self.checkpoints[0],
            _ => {
                let p = progress.clamp(0.0, self.max_progress());
                let i = (p.floor() as usize).min(self.segment_count() - 1);
                let t = p - i as f32;
                self.checkpoints[i].lerp(self.checkpoints[i + 1], t)
            }
        }
    }

    /// Index of the checkpoint closest to `pos` (first wins ties).
    pub fn nearest_checkpoint(&self, pos: Vec2) -> usize {
        let mut best = 0;
        let mut best_dist = f32::INFINITY;
        for (i, cp) in self.checkpoints.iter().enumerate() {
            let d = cp.distance_squared(pos);
            if d < best_dist {
                best_dist = d;
                best = i;
            }
        }
        best
    }

    /// Waypoints for moving along the track from `from` to `to` progress:
    /// every checkpoint strictly between the two, then the end point. Works
    /// in both directions.
    pub fn waypoints_between(&self, from: f32, to: f32) -> Vec<Vec2> {
        let mut points = Vec::new();
        if to >= from {
            let first = from.floor() as usize + 1;
            let last = to.ceil() as usize;
            for k in first..last {
                if (k as f32) > from && (k as f32) < to {
                    if let Some(cp) = self.checkpoints.get(k) {
                        points.push(*cp);
                    }
                }
            }
        } else {
            let first = from.ceil() as usize;
            let last = to.floor() as usize;
            for k in (last + 1..first).rev() {
                if (k as f32) < from && (k as f32) > to {
                    if let Some(cp) = self.checkpoints.get(k) {
                        points.push(*cp);
                    }
                }
            }
        }
        points.push(self.point_at(to));
        points
    }
}

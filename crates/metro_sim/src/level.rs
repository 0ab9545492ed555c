//! Static level data and the bootstrap that turns it into a running core.
//!
//! A [`LevelLayout`] resource is inserted before the first tick. On its first
//! run `init_level` validates it, builds the grid, stop registry and track,
//! and spawns the wagons and passenger groups. A layout that fails
//! validation is reported once and the core stays inert: none of the
//! services are inserted, so every system gated on them stays idle.

use std::collections::HashSet;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::boarding::BoardingDispatcher;
use crate::color::MatchColor;
use crate::config::DEFAULT_WAGON_SPACING;
use crate::fleet::{Wagon, WagonFleet};
use crate::grid::{CellType, GridMap, GridPos};
use crate::mover::WorldPosition;
use crate::passenger::{GridPosition, PassengerGroup, PassengerPhase};
use crate::sim_params::SimParams;
use crate::stops::StopRegistry;
use crate::track::TrackPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerSpawn {
    pub color: MatchColor,
    pub capacity: u32,
    pub position: GridPos,
}

fn default_wagon_spacing() -> f32 {
    DEFAULT_WAGON_SPACING
}

/// Everything needed to start a level.
///
/// `rows` are listed top to bottom using `#` Blocked, `.` Walkable,
/// `w` WaitingArea, `S` Stop and a space for Empty. Stop indices follow the
/// order of `stops`. Wagons are listed head first.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub rows: Vec<String>,
    pub stops: Vec<GridPos>,
    pub checkpoints: Vec<[f32; 2]>,
    pub wagons: Vec<MatchColor>,
    #[serde(default)]
    pub passengers: Vec<PassengerSpawn>,
    /// Track progress of the head wagon at spawn.
    #[serde(default)]
    pub train_start: f32,
    /// Track progress between consecutive wagons at spawn.
    #[serde(default = "default_wagon_spacing")]
    pub wagon_spacing: f32,
    #[serde(default)]
    pub params: SimParams,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LevelError {
    Parse(String),
    EmptyGrid,
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    UnknownGlyph {
        row: usize,
        column: usize,
        glyph: char,
    },
    NoStops,
    StopNotOnStopCell {
        index: usize,
        position: GridPos,
    },
    DuplicateStop(GridPos),
    UnlistedStopCell(GridPos),
    TooFewCheckpoints(usize),
    TrainStartOffTrack(f32),
    PassengerNotOnTraversableCell(GridPos),
    PassengerOnStopCell(GridPos),
    DuplicatePassengerCell(GridPos),
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelError::Parse(msg) => write!(f, "level data could not be parsed: {}", msg),
            LevelError::EmptyGrid => write!(f, "level has no grid rows"),
            LevelError::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {} has {} cells, expected {}",
                row, found, expected
            ),
            LevelError::UnknownGlyph { row, column, glyph } => {
                write!(f, "unknown cell glyph {:?} at row {} column {}", glyph, row, column)
            }
            LevelError::NoStops => write!(f, "level defines no stops"),
            LevelError::StopNotOnStopCell { index, position } => {
                write!(f, "stop {} at {} is not on a Stop cell", index, position)
            }
            LevelError::DuplicateStop(pos) => write!(f, "stop position {} listed twice", pos),
            LevelError::UnlistedStopCell(pos) => {
                write!(f, "Stop cell {} has no entry in the stop list", pos)
            }
            LevelError::TooFewCheckpoints(n) => {
                write!(f, "track needs at least 2 checkpoints, got {}", n)
            }
            LevelError::TrainStartOffTrack(p) => {
                write!(f, "train start progress {} is outside the track", p)
            }
            LevelError::PassengerNotOnTraversableCell(pos) => {
                write!(f, "passenger group at {} is not on a walkable cell", pos)
            }
            LevelError::PassengerOnStopCell(pos) => {
                write!(f, "passenger group at {} starts on a stop", pos)
            }
            LevelError::DuplicatePassengerCell(pos) => {
                write!(f, "more than one passenger group starts at {}", pos)
            }
        }
    }
}

impl std::error::Error for LevelError {}

/// The services a valid layout produces.
#[derive(Debug, Clone)]
pub struct BuiltLevel {
    pub grid: GridMap,
    pub stops: StopRegistry,
    pub track: TrackPath,
}

impl LevelLayout {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        serde_json::from_str(json).map_err(|e| LevelError::Parse(e.to_string()))
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |r| r.chars().count())
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn track(&self) -> TrackPath {
        TrackPath::new(
            self.checkpoints
                .iter()
                .map(|&[x, y]| Vec2::new(x, y))
                .collect(),
        )
    }

    /// Grid built from `rows`, with stop indices assigned to the stop cells.
    pub fn build_grid(&self) -> Result<GridMap, LevelError> {
        let height = self.height();
        let width = self.width();
        if height == 0 || width == 0 {
            return Err(LevelError::EmptyGrid);
        }
        let mut grid = GridMap::new(width, height);
        for (row, line) in self.rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(LevelError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            let y = (height - 1 - row) as i32;
            for (column, glyph) in line.chars().enumerate() {
                let cell_type = CellType::from_glyph(glyph).ok_or(LevelError::UnknownGlyph {
                    row,
                    column,
                    glyph,
                })?;
                grid.set_cell_type(GridPos::new(column as i32, y), cell_type);
            }
        }
        for (index, &pos) in self.stops.iter().enumerate() {
            grid.assign_stop_index(pos, index);
        }
        Ok(grid)
    }

    /// Check the layout and build its services.
    pub fn build(&self) -> Result<BuiltLevel, LevelError> {
        let grid = self.build_grid()?;

        if self.stops.is_empty() {
            return Err(LevelError::NoStops);
        }
        let mut seen = HashSet::new();
        for (index, &position) in self.stops.iter().enumerate() {
            if grid.cell_type(position) != Some(CellType::Stop) {
                return Err(LevelError::StopNotOnStopCell { index, position });
            }
            if !seen.insert(position) {
                return Err(LevelError::DuplicateStop(position));
            }
        }
        for y in 0..grid.height() as i32 {
            for x in 0..grid.width() as i32 {
                let pos = GridPos::new(x, y);
                if grid.cell_type(pos) == Some(CellType::Stop) && !seen.contains(&pos) {
                    return Err(LevelError::UnlistedStopCell(pos));
                }
            }
        }

        if self.checkpoints.len() < 2 {
            return Err(LevelError::TooFewCheckpoints(self.checkpoints.len()));
        }
        let track = self.track();
        if !self.train_start.is_finite()
            || self.train_start < 0.0
            || self.train_start > track.max_progress()
        {
            return Err(LevelError::TrainStartOffTrack(self.train_start));
        }

        let mut starts = HashSet::new();
        for spawn in &self.passengers {
            match grid.cell_type(spawn.position) {
                Some(CellType::Stop) => {
                    return Err(LevelError::PassengerOnStopCell(spawn.position));
                }
                Some(t) if t.is_traversable() => {}
                _ => return Err(LevelError::PassengerNotOnTraversableCell(spawn.position)),
            }
            if !starts.insert(spawn.position) {
                return Err(LevelError::DuplicatePassengerCell(spawn.position));
            }
        }

        Ok(BuiltLevel {
            stops: StopRegistry::new(self.stops.iter().copied()),
            grid,
            track,
        })
    }

    /// Spawn progress of the wagon at `index` (0 is the head).
    pub fn wagon_progress(&self, index: usize) -> f32 {
        (self.train_start - self.wagon_spacing.max(0.0) * index as f32).max(0.0)
    }
}

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelStatus {
    /// Waiting for a layout.
    #[default]
    Pending,
    Ready,
    /// The layout was rejected; the core does nothing.
    Inert,
}

/// Entities spawned for the current level, in layout order.
#[derive(Resource, Debug, Clone, Default)]
pub struct LevelEntities {
    pub passengers: Vec<Entity>,
    pub wagons: Vec<Entity>,
}

pub fn init_level(
    mut commands: Commands,
    layout: Res<LevelLayout>,
    mut status: ResMut<LevelStatus>,
) {
    if *status != LevelStatus::Pending {
        return;
    }
    let BuiltLevel {
        mut grid,
        stops,
        track,
    } = match layout.build() {
        Ok(built) => built,
        Err(err) => {
            error!("Level rejected, simulation stays inert: {}", err);
            *status = LevelStatus::Inert;
            return;
        }
    };

    let mut entities = LevelEntities::default();

    let mut fleet = WagonFleet::default();
    for (i, &color) in layout.wagons.iter().enumerate() {
        let progress = layout.wagon_progress(i);
        let mut wagon = Wagon::new(color, i, progress);
        wagon.is_head = i == 0;
        let id = commands
            .spawn((wagon, WorldPosition(track.point_at(progress))))
            .id();
        fleet.add_wagon(id);
        entities.wagons.push(id);
    }

    for spawn in &layout.passengers {
        let id = commands
            .spawn((
                PassengerGroup {
                    color: spawn.color,
                    remaining_capacity: spawn.capacity,
                },
                GridPosition(spawn.position),
                PassengerPhase::Waiting,
                WorldPosition(GridMap::cell_to_world(spawn.position)),
            ))
            .id();
        grid.register_occupant(spawn.position, id);
        entities.passengers.push(id);
    }

    info!(
        "Level ready: {}x{} grid, {} stops, {} wagons, {} passenger groups",
        grid.width(),
        grid.height(),
        stops.len(),
        entities.wagons.len(),
        entities.passengers.len()
    );

    commands.insert_resource(grid);
    commands.insert_resource(stops);
    commands.insert_resource(track);
    commands.insert_resource(fleet);
    commands.insert_resource(BoardingDispatcher::default());
    commands.insert_resource(layout.params.clone().sanitized());
    commands.insert_resource(entities);
    *status = LevelStatus::Ready;
}

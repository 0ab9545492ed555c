use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::CELL_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CellType {
    #[default]
    Empty,
    Blocked,
    Walkable,
    WaitingArea,
    Stop,
}

impl CellType {
    /// Cells a walker may pass through while another entity stands on them.
    pub fn is_jumpable(self) -> bool {
        matches!(self, CellType::Walkable | CellType::Stop)
    }

    /// Cells a passenger can ever stand on.
    pub fn is_traversable(self) -> bool {
        matches!(
            self,
            CellType::Walkable | CellType::WaitingArea | CellType::Stop
        )
    }

    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            ' ' => Some(CellType::Empty),
            '#' => Some(CellType::Blocked),
            '.' => Some(CellType::Walkable),
            'w' => Some(CellType::WaitingArea),
            'S' => Some(CellType::Stop),
            _ => None,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            CellType::Empty => ' ',
            CellType::Blocked => '#',
            CellType::Walkable => '.',
            CellType::WaitingArea => 'w',
            CellType::Stop => 'S',
        }
    }
}

/// Integer grid coordinate. Signed so that out-of-range probes (e.g. the
/// neighbor left of column 0) are representable and simply rejected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Neighbor enumeration order: up, down, left, right. Path search tie-breaks
/// depend on this order, so it must not change.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(0, 1), (0, -1), (-1, 0), (1, 0)];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cell {
    pub cell_type: CellType,
    pub stop_index: Option<usize>,
    pub occupant: Option<Entity>,
}

/// Static cell classification plus the dynamic occupancy table.
///
/// Occupancy is stored inline in each cell, so a position can never map to
/// more than one occupant. Entries are only changed through
/// [`GridMap::register_occupant`] and [`GridMap::unregister_occupant`].
#[derive(Resource, Debug, Clone)]
pub struct GridMap {
    cells: Vec<Cell>,
    width: usize,
    height: usize,
}

impl GridMap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![Cell::default(); width * height],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    #[inline]
    fn index(&self, pos: GridPos) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width + pos.x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn cell(&self, pos: GridPos) -> Option<&Cell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    #[inline]
    pub fn cell_type(&self, pos: GridPos) -> Option<CellType> {
        self.cell(pos).map(|c| c.cell_type)
    }

    /// Set the static type of a cell. Only used while building a level; the
    /// layout is treated as immutable once the simulation runs.
    pub fn set_cell_type(&mut self, pos: GridPos, cell_type: CellType) -> bool {
        let Some(i) = self.index(pos) else {
            return false;
        };
        self.cells[i].cell_type = cell_type;
        true
    }

    pub fn assign_stop_index(&mut self, pos: GridPos, stop_index: usize) -> bool {
        let Some(i) = self.index(pos) else {
            return false;
        };
        self.cells[i].stop_index = Some(stop_index);
        true
    }

    pub fn stop_index_at(&self, pos: GridPos) -> Option<usize> {
        self.cell(pos).and_then(|c| c.stop_index)
    }

    // -------------------------------------------------------------------------
    // Occupancy
    // -------------------------------------------------------------------------

    pub fn occupant_at(&self, pos: GridPos) -> Option<Entity> {
        self.cell(pos).and_then(|c| c.occupant)
    }

    pub fn is_occupied(&self, pos: GridPos) -> bool {
        self.occupant_at(pos).is_some()
    }

    /// Record `entity` as physically residing at `pos`.
    ///
    /// Registering the same entity twice on a cell is a no-op. Registering
    /// onto a cell held by a different entity is an invariant violation: it
    /// is logged and ignored, and `false` is returned.
    pub fn register_occupant(&mut self, pos: GridPos, entity: Entity) -> bool {
        let Some(i) = self.index(pos) else {
            warn!(
                "GridMap: cannot register {:?} at out-of-bounds cell {}",
                entity, pos
            );
            return false;
        };
        match self.cells[i].occupant {
            Some(current) if current == entity => true,
            Some(current) => {
                warn!(
                    "Invariant violation: {:?} tried to register at {} already held by {:?}",
                    entity, pos, current
                );
                false
            }
            None => {
                self.cells[i].occupant = Some(entity);
                true
            }
        }
    }

    /// Clear `pos` if and only if it is currently held by `entity`.
    /// Stale calls from an entity that no longer owns the cell are ignored.
    pub fn unregister_occupant(&mut self, pos: GridPos, entity: Entity) -> bool {
        let Some(i) = self.index(pos) else {
            return false;
        };
        if self.cells[i].occupant == Some(entity) {
            self.cells[i].occupant = None;
            true
        } else {
            false
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.occupant.is_some()).count()
    }

    /// Iterate `(position, occupant)` for every occupied cell, row-major.
    pub fn occupants(&self) -> impl Iterator<Item = (GridPos, Entity)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(i, c)| {
            c.occupant.map(|e| {
                let x = (i % self.width) as i32;
                let y = (i / self.width) as i32;
                (GridPos::new(x, y), e)
            })
        })
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// `false` for out-of-bounds, Blocked and Empty cells, and for any cell
    /// that currently has an occupant.
    pub fn is_walkable(&self, pos: GridPos) -> bool {
        match self.cell(pos) {
            Some(cell) => {
                !matches!(cell.cell_type, CellType::Blocked | CellType::Empty)
                    && cell.occupant.is_none()
            }
            None => false,
        }
    }

    /// In-bounds 4-neighbors in the fixed order up, down, left, right.
    pub fn neighbors4(&self, pos: GridPos) -> impl Iterator<Item = GridPos> + '_ {
        NEIGHBOR_OFFSETS
            .iter()
            .map(move |&(dx, dy)| pos.offset(dx, dy))
            .filter(move |&n| self.in_bounds(n))
    }

    pub fn world_to_cell(world: Vec2) -> GridPos {
        GridPos::new(
            (world.x / CELL_SIZE).floor() as i32,
            (world.y / CELL_SIZE).floor() as i32,
        )
    }

    pub fn cell_to_world(pos: GridPos) -> Vec2 {
        Vec2::new(
            pos.x as f32 * CELL_SIZE + CELL_SIZE * 0.5,
            pos.y as f32 * CELL_SIZE + CELL_SIZE * 0.5,
        )
    }

    /// Render the grid top row first, marking occupied cells with `o`.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in (0..self.height as i32).rev() {
            for x in 0..self.width as i32 {
                let pos = GridPos::new(x, y);
                let ch = match self.cell(pos) {
                    Some(c) if c.occupant.is_some() => 'o',
                    Some(c) => c.cell_type.glyph(),
                    None => '?',
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}

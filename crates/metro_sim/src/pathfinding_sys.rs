use pathfinding::prelude::bfs;

use crate::grid::{CellType, GridMap, GridPos};
use crate::stops::StopRegistry;

/// Cell types a passenger may path through when the caller does not say
/// otherwise.
pub const DEFAULT_ALLOWED: [CellType; 3] =
    [CellType::Walkable, CellType::Stop, CellType::WaitingArea];

/// Whether a path search may step into `pos`.
///
/// Occupancy only blocks WaitingArea cells. Walkable and Stop cells stay
/// traversable while occupied so several walkers can converge on shared slots.
fn can_enter(grid: &GridMap, pos: GridPos, allowed: &[CellType]) -> bool {
    let Some(cell) = grid.cell(pos) else {
        return false;
    };
    if !allowed.contains(&cell.cell_type) {
        return false;
    }
    !(cell.occupant.is_some() && cell.cell_type == CellType::WaitingArea)
}

fn successors(grid: &GridMap, pos: GridPos, allowed: &[CellType]) -> Vec<GridPos> {
    grid.neighbors4(pos)
        .filter(|&n| can_enter(grid, n, allowed))
        .collect()
}

/// Breadth-first search from `from` to `to`.
///
/// Returns the cells stepped into, excluding `from` (a straight 5-cell
/// corridor yields 4 steps; `from == to` yields an empty path). Equal-length
/// alternatives resolve to the first one discovered with the up, down, left,
/// right neighbor order. Out-of-range endpoints return `None`.
pub fn find_path(
    grid: &GridMap,
    from: GridPos,
    to: GridPos,
    allowed: Option<&[CellType]>,
) -> Option<Vec<GridPos>> {
    if !grid.in_bounds(from) || !grid.in_bounds(to) {
        return None;
    }
    let allowed = allowed.unwrap_or(&DEFAULT_ALLOWED);

    let path = bfs(&from, |&p| successors(grid, p, allowed), |&p| p == to)?;
    Some(path.into_iter().skip(1).collect())
}

/// Breadth-first search to the nearest reachable Stop cell whose stop is not
/// Occupied. Reserved stops still count as reachable.
pub fn find_nearest_stop_path(
    grid: &GridMap,
    stops: &StopRegistry,
    from: GridPos,
) -> Option<Vec<GridPos>> {
    if !grid.in_bounds(from) {
        return None;
    }
    let is_open_stop = |p: &GridPos| match grid.cell(*p) {
        Some(cell) if cell.cell_type == CellType::Stop => cell
            .stop_index
            .is_some_and(|index| !stops.is_occupied(index)),
        _ => false,
    };

    let path = bfs(
        &from,
        |&p| successors(grid, p, &DEFAULT_ALLOWED),
        is_open_stop,
    )?;
    Some(path.into_iter().skip(1).collect())
}

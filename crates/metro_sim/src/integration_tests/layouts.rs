//! Layout builders shared by the integration tests.

use crate::color::MatchColor;
use crate::grid::GridPos;
use crate::level::{LevelLayout, PassengerSpawn};
use crate::sim_params::SimParams;

pub fn passenger(color: MatchColor, capacity: u32, x: i32, y: i32) -> PassengerSpawn {
    PassengerSpawn {
        color,
        capacity,
        position: GridPos::new(x, y),
    }
}

/// Straight track along y = 10 with a checkpoint every 4 units.
pub fn straight_checkpoints(count: usize) -> Vec<[f32; 2]> {
    (0..count).map(|i| [i as f32 * 4.0, 10.0]).collect()
}

/// Every `S` in `rows`, in reading order (top row first).
pub fn stops_in_reading_order(rows: &[&str]) -> Vec<GridPos> {
    let height = rows.len() as i32;
    let mut stops = Vec::new();
    for (row, line) in rows.iter().enumerate() {
        for (x, ch) in line.chars().enumerate() {
            if ch == 'S' {
                stops.push(GridPos::new(x as i32, height - 1 - row as i32));
            }
        }
    }
    stops
}

pub fn layout(
    rows: &[&str],
    wagons: Vec<MatchColor>,
    passengers: Vec<PassengerSpawn>,
) -> LevelLayout {
    LevelLayout {
        rows: rows.iter().map(|r| r.to_string()).collect(),
        stops: stops_in_reading_order(rows),
        checkpoints: straight_checkpoints(4),
        wagons,
        passengers,
        train_start: 2.0,
        wagon_spacing: 0.5,
        params: SimParams::default(),
    }
}

/// Same as [`layout`] with the train standing still, so wagon positions
/// only change through reorders.
pub fn parked_layout(
    rows: &[&str],
    wagons: Vec<MatchColor>,
    passengers: Vec<PassengerSpawn>,
) -> LevelLayout {
    let mut l = layout(rows, wagons, passengers);
    l.params.train_speed_per_tick = 0.0;
    l
}

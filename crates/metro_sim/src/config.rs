/// World units per grid cell. Cell `(x, y)` is centred on
/// `((x + 0.5) * CELL_SIZE, (y + 0.5) * CELL_SIZE)`.
pub const CELL_SIZE: f32 = 1.0;

/// Default depth of the boarding zone, in track-progress units behind the head.
pub const DEFAULT_BOARDING_ZONE_DEPTH: f32 = 1.5;

/// Default train advance per fixed tick, in track-progress units.
pub const DEFAULT_TRAIN_SPEED_PER_TICK: f32 = 0.02;

/// Default spacing between consecutive wagons at level start (progress units).
pub const DEFAULT_WAGON_SPACING: f32 = 0.5;

/// Seconds the mover is given for a single passenger step between cells.
pub const DEFAULT_WALK_STEP_DURATION: f32 = 0.12;

/// Seconds per cell when a passenger walks back to its origin.
pub const DEFAULT_RETURN_STEP_DURATION: f32 = 0.08;

/// Seconds the mover is given to slide a wagon into its new slot.
pub const DEFAULT_REPOSITION_DURATION: f32 = 0.35;

/// Progress tolerance used when validating fleet ordering.
pub const PROGRESS_EPSILON: f32 = 1e-4;

/// Points for a discrete hit.
pub const HIT_REWARD: u32 = 100;
/// Points removed for a discrete miss (score never drops below zero).
pub const MISS_PENALTY: u32 = 20;
/// Points for a tracking sample on target.
pub const SAMPLE_REWARD: u32 = 10;
/// Seconds of held time between tracking samples.
pub const SAMPLE_INTERVAL: f64 = 0.1;

/// Frame delta cap (seconds) so a stalled tab does not teleport targets.
pub const MAX_FRAME_DT: f64 = 0.05;

pub const GRIDSHOT_TARGETS: usize = 3;
pub const GRID_COLS: usize = 4;
pub const GRID_ROWS: usize = 3;
pub const GRID_PLACEMENT_ATTEMPTS: usize = 50;
pub const OUTER_PLACEMENT_ATTEMPTS: usize = 100;

/// Per-frame chance that the tracking target changes heading.
pub const TRACKING_TURN_CHANCE: f64 = 0.02;

/// Canvas modes. Distances in pixels, speeds in px/s.
pub mod planar {
    pub const SPAWN_IN_MS: f64 = 200.0;
    pub const GRID_RADIUS_FACTOR: f64 = 0.25;
    pub const CELL_OCCUPIED_PX: f64 = 10.0;
    pub const PIVOT_RADIUS: f64 = 40.0;
    pub const OUTER_RADIUS: f64 = 35.0;
    pub const OUTER_MIN_DISTANCE: f64 = 100.0;
    pub const MICRO_MIN_DISTANCE: f64 = 50.0;
    pub const MICRO_MAX_DISTANCE: f64 = 150.0;
    pub const TRACKING_RADIUS: f64 = 30.0;
    pub const TRACKING_SPEED: f64 = 250.0;
    pub const TRACKING_JITTER: f64 = 50.0;
}

/// First-person mode. Distances in world units, angles in radians.
pub mod fps {
    pub const SPAWN_IN_MS: f64 = 250.0;
    // Hitboxes are the sphere itself. No extra glow shell is hittable, so 3D
    // targets are smaller to hit than a 1.4x shell would make them.
    pub const GRID_RADIUS: f64 = 0.7;
    pub const MICRO_RADIUS: f64 = 0.35;
    pub const PIVOT_RADIUS: f64 = 0.8;
    pub const OUTER_RADIUS: f64 = 0.7;
    pub const OUTER_MIN_DISTANCE: f64 = 3.0;
    pub const MICRO_MIN_DISTANCE: f64 = 1.0;
    pub const MICRO_MAX_DISTANCE: f64 = 3.0;
    pub const CELL_OCCUPIED: f64 = 0.25;
    /// Sphere-only hitbox, same as `GRID_RADIUS`.
    pub const TRACKING_RADIUS: f64 = 0.6;
    pub const TRACKING_SPEED: f64 = 6.0;
    pub const TRACKING_JITTER: f64 = 1.2;
    pub const MAX_PITCH: f64 = 1.4;
}

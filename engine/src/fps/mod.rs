//! First-person engine: targets are spheres in world space, hit by a ray
//! from the camera through the crosshair.

pub mod camera;
pub mod engine;
pub mod hit;
pub mod map;
pub mod modes;

pub use engine::{FpsEngine, FpsSnapshot, LockState};
pub use map::MapLayout;

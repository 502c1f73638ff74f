//! Canvas engine: targets live in pixel space and are hit by pointer position.

pub mod engine;
pub mod hit;
pub mod modes;

pub use engine::{PlanarEngine, PlanarSnapshot};
pub use modes::Viewport;

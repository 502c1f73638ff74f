//! Aim trainer simulation core.
//!
//! Two engines share one contract ([`session::Engine`]): [`planar::PlanarEngine`]
//! for the canvas modes and [`fps::FpsEngine`] for the first-person mode. Both
//! are driven one frame at a time by the host and report through an
//! [`events::EventBus`].

pub mod clock;
pub mod constants;
pub mod easing;
pub mod events;
pub mod fps;
pub mod frame;
pub mod planar;
pub mod registry;
pub mod session;
pub mod stats;

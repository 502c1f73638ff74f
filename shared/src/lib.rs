//! Types shared between the simulation engine, the leaderboard server and
//! the web client (via generated TypeScript bindings).

pub mod config;
pub mod protocol;
pub mod vec2;
pub mod vec3;

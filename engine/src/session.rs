use aimtrainer_shared::config::Mode;
use aimtrainer_shared::protocol::StatsUpdate;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::easing::spawn_in_scale;
use crate::events::EngineEvent;
use crate::frame::FrameId;
use crate::registry::{Target, TargetId, TargetKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    /// Constructed, never started
    Idle,
    Running,
    /// Expired or stopped
    Ended,
}

/// Contract shared by the planar and first-person engines.
///
/// Time is the host's monotonic millisecond clock (`performance.now()` in a
/// browser). Engines never read a clock themselves.
pub trait Engine {
    type Snapshot;

    /// Reset everything and begin a session, optionally switching mode.
    fn start(&mut self, now: f64, mode: Option<Mode>);

    /// Cancel the pending frame and end the session without a game-over
    /// event. Safe in any state, any number of times.
    fn stop(&mut self);

    /// Ask the host for exclusive pointer control. Only meaningful in 3D.
    fn request_lock(&mut self) {}

    /// Animation-frame callback. Frames other than the one this engine
    /// last requested are ignored.
    fn on_frame(&mut self, frame: FrameId, now: f64);

    fn subscribe(&self) -> broadcast::Receiver<EngineEvent>;

    fn state(&self) -> SessionState;

    fn mode(&self) -> Mode;

    fn stats(&self, now: f64) -> StatsUpdate;

    fn snapshot(&self, now: f64) -> Self::Snapshot;
}

/// Read-only view of one target for drawing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetView<P> {
    pub id: TargetId,
    pub kind: TargetKind<P>,
    pub pos: P,
    pub radius: f64,
    /// Current spawn-in multiplier for radius
    pub scale: f64,
}

impl<P: Copy> TargetView<P> {
    pub fn of(target: &Target<P>, now: f64, spawn_in_ms: f64) -> Self {
        Self {
            id: target.id,
            kind: target.kind,
            pos: target.pos,
            radius: target.radius,
            scale: spawn_in_scale(target.age(now), spawn_in_ms),
        }
    }
}

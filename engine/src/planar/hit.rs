use aimtrainer_shared::vec2::{distance, Vec2};

use crate::constants::planar::SPAWN_IN_MS;
use crate::easing::spawn_in_scale;
use crate::registry::{Target, TargetId, TargetRegistry};

/// Effective hit radius right now, shrunk while the target animates in.
pub fn effective_radius(target: &Target<Vec2>, now: f64) -> f64 {
    target.radius * spawn_in_scale(target.age(now), SPAWN_IN_MS)
}

/// First target under `point`, topmost (newest) first.
pub fn pick(registry: &TargetRegistry<Vec2>, point: Vec2, now: f64) -> Option<TargetId> {
    registry
        .iter_newest_first()
        .find(|t| distance(point, t.pos) <= effective_radius(t, now))
        .map(|t| t.id)
}

/// Tracking containment, always against the full radius.
pub fn on_target(target: &Target<Vec2>, point: Vec2) -> bool {
    distance(point, target.pos) <= target.radius
}

use aimtrainer_shared::vec3::{dot, sub, Vec3};

use crate::constants::fps::SPAWN_IN_MS;
use crate::easing::spawn_in_scale;
use crate::registry::{Target, TargetId, TargetRegistry};

/// Distance along a unit-direction ray to the first sphere surface in front
/// of the origin.
pub fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f64) -> Option<f64> {
    let to_center = sub(center, origin);
    let projection = dot(to_center, dir);
    let distance_sq = dot(to_center, to_center) - projection * projection;
    let radius_sq = radius * radius;
    if distance_sq > radius_sq {
        return None;
    }

    let half_chord = (radius_sq - distance_sq).sqrt();
    let near = projection - half_chord;
    let far = projection + half_chord;
    if near > 1e-6 {
        Some(near)
    } else if far > 1e-6 {
        // Origin inside the sphere
        Some(far)
    } else {
        None
    }
}

pub fn effective_radius(target: &Target<Vec3>, now: f64) -> f64 {
    target.radius * spawn_in_scale(target.age(now), SPAWN_IN_MS)
}

/// Nearest target along the view ray.
pub fn pick(registry: &TargetRegistry<Vec3>, origin: Vec3, dir: Vec3, now: f64) -> Option<TargetId> {
    registry
        .all()
        .iter()
        .filter_map(|t| {
            ray_sphere(origin, dir, t.pos, effective_radius(t, now)).map(|dist| (dist, t.id))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, id)| id)
}

/// Tracking containment against the full sphere.
pub fn on_target(target: &Target<Vec3>, origin: Vec3, dir: Vec3) -> bool {
    ray_sphere(origin, dir, target.pos, target.radius).is_some()
}

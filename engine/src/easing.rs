/// Ease-out-back: overshoots slightly past 1 before settling.
pub fn ease_out_back(x: f64) -> f64 {
    const C1: f64 = 1.70158;
    const C3: f64 = C1 + 1.0;
    let t = x - 1.0;
    1.0 + C3 * t * t * t + C1 * t * t
}

/// Size multiplier of a target `age_ms` after it spawned. Also scales the
/// hitbox, so young targets are harder to hit.
pub fn spawn_in_scale(age_ms: f64, window_ms: f64) -> f64 {
    if age_ms >= window_ms {
        return 1.0;
    }
    ease_out_back((age_ms / window_ms).max(0.0))
}

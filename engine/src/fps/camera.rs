use aimtrainer_shared::vec3::{forward_from_yaw_pitch, sub, yaw_pitch_toward, Vec3};

use crate::constants::fps::MAX_PITCH;

/// First-person camera. The crosshair is always the view center, so aiming
/// is rotation only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub yaw: f64,
    pub pitch: f64,
    pub sensitivity: f64,
}

impl Camera {
    pub fn new(eye: Vec3, sensitivity: f64) -> Self {
        Self {
            eye,
            yaw: 0.0,
            pitch: 0.0,
            sensitivity,
        }
    }

    pub fn reset(&mut self) {
        self.yaw = 0.0;
        self.pitch = 0.0;
    }

    /// Apply locked pointer motion in pixels. Moving right turns right,
    /// moving down looks down.
    pub fn apply_delta(&mut self, dx: f64, dy: f64) {
        self.yaw -= dx * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity).clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn forward(&self) -> Vec3 {
        forward_from_yaw_pitch(self.yaw, self.pitch)
    }

    /// Pointer deltas that would turn the camera onto `point`.
    pub fn delta_to(&self, point: Vec3) -> (f64, f64) {
        let (yaw, pitch) = yaw_pitch_toward(sub(point, self.eye));
        (
            (self.yaw - yaw) / self.sensitivity,
            (self.pitch - pitch) / self.sensitivity,
        )
    }
}

/// 3D vector utilities for world-space aiming.
/// Y is up; a camera with yaw = pitch = 0 looks down -Z.

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Shorthand constructor
pub fn vec3(x: f64, y: f64, z: f64) -> Vec3 {
    Vec3::new(x, y, z)
}

/// Dot product
pub fn dot(a: Vec3, b: Vec3) -> f64 {
    a.x * b.x + a.y * b.y + a.z * b.z
}

/// Vector length
pub fn length(v: Vec3) -> f64 {
    dot(v, v).sqrt()
}

/// Normalize vector to unit length. Zero vectors map to -Z (straight ahead).
pub fn normalize(v: Vec3) -> Vec3 {
    let len = length(v);
    if len < 1e-10 {
        return Vec3::new(0.0, 0.0, -1.0);
    }
    Vec3::new(v.x / len, v.y / len, v.z / len)
}

/// Scale vector by scalar
pub fn scale(v: Vec3, s: f64) -> Vec3 {
    Vec3::new(v.x * s, v.y * s, v.z * s)
}

/// Add two vectors
pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x + b.x, a.y + b.y, a.z + b.z)
}

/// Subtract vectors (a - b)
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x - b.x, a.y - b.y, a.z - b.z)
}

pub fn distance(a: Vec3, b: Vec3) -> f64 {
    length(sub(a, b))
}

/// Unit view direction for a yaw/pitch camera (yaw applied first, then pitch).
pub fn forward_from_yaw_pitch(yaw: f64, pitch: f64) -> Vec3 {
    let cos_pitch = pitch.cos();
    Vec3::new(
        -yaw.sin() * cos_pitch,
        pitch.sin(),
        -yaw.cos() * cos_pitch,
    )
}

/// Inverse of [`forward_from_yaw_pitch`]: (yaw, pitch) that looks along `dir`.
pub fn yaw_pitch_toward(dir: Vec3) -> (f64, f64) {
    let d = normalize(dir);
    let pitch = d.y.clamp(-1.0, 1.0).asin();
    let yaw = (-d.x).atan2(-d.z);
    (yaw, pitch)
}

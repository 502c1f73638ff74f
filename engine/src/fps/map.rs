use aimtrainer_shared::config::MapId;
use aimtrainer_shared::vec3::{vec3, Vec3};
use serde::Serialize;

/// Geometry of a first-person scene as far as the simulation cares: where
/// the player stands, the wall targets appear on, and the box the tracking
/// target roams.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLayout {
    pub eye: Vec3,
    /// Center of the target wall, straight ahead of the eye (z < eye.z)
    pub wall_center: Vec3,
    /// Half extents of the usable wall area (x, y)
    pub wall_half_width: f64,
    pub wall_half_height: f64,
    /// Gridshot cell pitch on the wall
    pub grid_spacing_x: f64,
    pub grid_spacing_y: f64,
    pub tracking_min: Vec3,
    pub tracking_max: Vec3,
}

impl MapLayout {
    pub fn for_map(map: MapId) -> Self {
        match map {
            MapId::Arena => Self {
                eye: vec3(0.0, 4.0, 0.0),
                wall_center: vec3(0.0, 4.0, -20.0),
                wall_half_width: 8.0,
                wall_half_height: 4.0,
                grid_spacing_x: 3.0,
                grid_spacing_y: 2.5,
                tracking_min: vec3(-8.0, 1.5, -22.0),
                tracking_max: vec3(8.0, 8.5, -14.0),
            },
            MapId::Range => Self {
                eye: vec3(0.0, 4.0, 0.0),
                wall_center: vec3(0.0, 5.0, -28.0),
                wall_half_width: 11.0,
                wall_half_height: 5.0,
                grid_spacing_x: 4.0,
                grid_spacing_y: 3.0,
                tracking_min: vec3(-12.0, 1.5, -32.0),
                tracking_max: vec3(12.0, 10.0, -20.0),
            },
        }
    }

    /// Point on the wall at offset (u, v) from its center.
    pub fn wall_point(&self, u: f64, v: f64) -> Vec3 {
        vec3(
            self.wall_center.x + u,
            self.wall_center.y + v,
            self.wall_center.z,
        )
    }

    /// Center of grid cell (col, row); row 0 is the top row.
    pub fn cell_center(&self, col: usize, row: usize, cols: usize, rows: usize) -> Vec3 {
        let u = (col as f64 - (cols as f64 - 1.0) / 2.0) * self.grid_spacing_x;
        let v = ((rows as f64 - 1.0) / 2.0 - row as f64) * self.grid_spacing_y;
        self.wall_point(u, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{GRID_COLS, GRID_ROWS};

    #[test]
    fn wall_is_in_front_of_eye() {
        for map in [MapId::Arena, MapId::Range] {
            let layout = MapLayout::for_map(map);
            assert!(layout.wall_center.z < layout.eye.z);
        }
    }

    #[test]
    fn grid_fits_on_wall() {
        for map in [MapId::Arena, MapId::Range] {
            let layout = MapLayout::for_map(map);
            for col in 0..GRID_COLS {
                for row in 0..GRID_ROWS {
                    let c = layout.cell_center(col, row, GRID_COLS, GRID_ROWS);
                    assert!((c.x - layout.wall_center.x).abs() <= layout.wall_half_width);
                    assert!((c.y - layout.wall_center.y).abs() <= layout.wall_half_height);
                }
            }
        }
    }

    #[test]
    fn tracking_box_contains_wall_center() {
        for map in [MapId::Arena, MapId::Range] {
            let l = MapLayout::for_map(map);
            let c = l.wall_center;
            assert!(c.x > l.tracking_min.x && c.x < l.tracking_max.x);
            assert!(c.y > l.tracking_min.y && c.y < l.tracking_max.y);
            assert!(c.z > l.tracking_min.z && c.z < l.tracking_max.z);
        }
    }
}

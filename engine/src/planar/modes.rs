use aimtrainer_shared::config::Mode;
use aimtrainer_shared::vec2::{add, distance, from_angle, normalize, scale, sub, vec2, Vec2};
use rand::Rng;

use crate::constants::planar::*;
use crate::constants::{
    GRIDSHOT_TARGETS, GRID_COLS, GRID_PLACEMENT_ATTEMPTS, GRID_ROWS, OUTER_PLACEMENT_ATTEMPTS,
    TRACKING_TURN_CHANCE,
};
use crate::registry::{Target, TargetId, TargetKind, TargetRegistry};

/// Logical canvas size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Spawning needs a real area to place targets in.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(format!("viewport width must be > 0, got {}", self.width));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(format!("viewport height must be > 0, got {}", self.height));
        }
        Ok(())
    }

    pub fn center(&self) -> Vec2 {
        vec2(self.width / 2.0, self.height / 2.0)
    }

    fn cell_size(&self) -> (f64, f64) {
        (
            self.width / GRID_COLS as f64,
            self.height / GRID_ROWS as f64,
        )
    }

    pub fn cell_center(&self, col: usize, row: usize) -> Vec2 {
        let (cw, ch) = self.cell_size();
        vec2(col as f64 * cw + cw / 2.0, row as f64 * ch + ch / 2.0)
    }
}

/// Spawn rules for a canvas session.
#[derive(Debug, Clone, Copy)]
pub struct PlanarRules {
    pub viewport: Viewport,
    pub size: f64,
    pub speed: f64,
}

impl PlanarRules {
    pub fn grid_radius(&self) -> f64 {
        let (cw, ch) = self.viewport.cell_size();
        cw.min(ch) * GRID_RADIUS_FACTOR * self.size
    }

    pub fn micro_radius(&self) -> f64 {
        self.grid_radius() * 0.5
    }

    pub fn tracking_speed(&self) -> f64 {
        TRACKING_SPEED * self.speed
    }
}

pub fn initial_spawn(
    mode: Mode,
    registry: &mut TargetRegistry<Vec2>,
    rules: &PlanarRules,
    rng: &mut impl Rng,
    now: f64,
) {
    match mode {
        Mode::Gridshot => {
            for _ in 0..GRIDSHOT_TARGETS {
                spawn_grid_target(registry, rules, rng, now);
            }
        }
        Mode::Spidershot => {
            spawn_pivot(registry, rules, now);
        }
        Mode::Microflick => {
            spawn_micro_target(registry, rules, rng, now);
        }
        Mode::Tracking => {
            spawn_tracking_target(registry, rules, rng, now);
        }
    }
}

/// Respawn after `hit` was removed from the registry.
pub fn on_hit(
    mode: Mode,
    hit: &Target<Vec2>,
    registry: &mut TargetRegistry<Vec2>,
    rules: &PlanarRules,
    rng: &mut impl Rng,
    now: f64,
) {
    match mode {
        Mode::Gridshot => {
            spawn_grid_target(registry, rules, rng, now);
        }
        Mode::Spidershot => {
            if hit.is_pivot() {
                spawn_outer_target(registry, rules, rng, now);
            } else {
                spawn_pivot(registry, rules, now);
            }
        }
        Mode::Microflick => {
            spawn_micro_target(registry, rules, rng, now);
        }
        // Scored by sampling only
        Mode::Tracking => {}
    }
}

fn cell_occupied(registry: &TargetRegistry<Vec2>, cell: Vec2) -> bool {
    registry.all().iter().any(|t| {
        (t.pos.x - cell.x).abs() < CELL_OCCUPIED_PX && (t.pos.y - cell.y).abs() < CELL_OCCUPIED_PX
    })
}

/// Random free grid cell, or None when every attempt hit an occupied one.
pub fn spawn_grid_target(
    registry: &mut TargetRegistry<Vec2>,
    rules: &PlanarRules,
    rng: &mut impl Rng,
    now: f64,
) -> Option<TargetId> {
    for _ in 0..GRID_PLACEMENT_ATTEMPTS {
        let cell = rules
            .viewport
            .cell_center(rng.gen_range(0..GRID_COLS), rng.gen_range(0..GRID_ROWS));
        if !cell_occupied(registry, cell) {
            return Some(registry.add(TargetKind::Standard, cell, rules.grid_radius(), now));
        }
    }
    tracing::debug!("gridshot placement exhausted, skipping spawn");
    None
}

pub fn spawn_pivot(
    registry: &mut TargetRegistry<Vec2>,
    rules: &PlanarRules,
    now: f64,
) -> TargetId {
    registry.add(
        TargetKind::Pivot,
        rules.viewport.center(),
        PIVOT_RADIUS * rules.size,
        now,
    )
}

/// Outer spidershot target, at least `OUTER_MIN_DISTANCE` from center.
pub fn spawn_outer_target(
    registry: &mut TargetRegistry<Vec2>,
    rules: &PlanarRules,
    rng: &mut impl Rng,
    now: f64,
) -> TargetId {
    let r = OUTER_RADIUS * rules.size;
    let center = rules.viewport.center();
    let span_x = (rules.viewport.width - 2.0 * r).max(0.0);
    let span_y = (rules.viewport.height - 2.0 * r).max(0.0);

    let mut candidate = center;
    for _ in 0..OUTER_PLACEMENT_ATTEMPTS {
        candidate = vec2(r + rng.gen::<f64>() * span_x, r + rng.gen::<f64>() * span_y);
        if distance(candidate, center) >= OUTER_MIN_DISTANCE {
            return registry.add(TargetKind::Standard, candidate, r, now);
        }
    }

    // Canvas too small for a random hit; push the last try out radially.
    let dir = normalize(sub(candidate, center));
    let pos = add(center, scale(dir, OUTER_MIN_DISTANCE));
    registry.add(TargetKind::Standard, pos, r, now)
}

pub fn spawn_micro_target(
    registry: &mut TargetRegistry<Vec2>,
    rules: &PlanarRules,
    rng: &mut impl Rng,
    now: f64,
) -> TargetId {
    let angle = rng.gen::<f64>() * std::f64::consts::TAU;
    let dist = rng.gen_range(MICRO_MIN_DISTANCE..MICRO_MAX_DISTANCE);
    let pos = add(rules.viewport.center(), scale(from_angle(angle), dist));
    registry.add(TargetKind::Standard, pos, rules.micro_radius(), now)
}

pub fn spawn_tracking_target(
    registry: &mut TargetRegistry<Vec2>,
    rules: &PlanarRules,
    rng: &mut impl Rng,
    now: f64,
) -> TargetId {
    let heading = from_angle(rng.gen::<f64>() * std::f64::consts::TAU);
    let velocity = scale(heading, rules.tracking_speed());
    registry.add(
        TargetKind::Tracking { velocity },
        rules.viewport.center(),
        TRACKING_RADIUS * rules.size,
        now,
    )
}

/// Move the tracking target one frame: integrate, bounce off the canvas
/// edges, and occasionally wander.
pub fn advance_tracking(target: &mut Target<Vec2>, rules: &PlanarRules, dt: f64, rng: &mut impl Rng) {
    let TargetKind::Tracking { velocity } = &mut target.kind else {
        return;
    };
    let r = target.radius;
    let mut pos = add(target.pos, scale(*velocity, dt));

    if pos.x - r < 0.0 {
        pos.x = r;
        velocity.x = velocity.x.abs();
    } else if pos.x + r > rules.viewport.width {
        pos.x = rules.viewport.width - r;
        velocity.x = -velocity.x.abs();
    }
    if pos.y - r < 0.0 {
        pos.y = r;
        velocity.y = velocity.y.abs();
    } else if pos.y + r > rules.viewport.height {
        pos.y = rules.viewport.height - r;
        velocity.y = -velocity.y.abs();
    }

    if rng.gen::<f64>() < TRACKING_TURN_CHANCE {
        let nudged = add(
            *velocity,
            vec2(
                (rng.gen::<f64>() - 0.5) * 2.0 * TRACKING_JITTER,
                (rng.gen::<f64>() - 0.5) * 2.0 * TRACKING_JITTER,
            ),
        );
        *velocity = scale(normalize(nudged), rules.tracking_speed());
    }

    target.pos = pos;
}

#[cfg(test)]
mod tests {
    use super::*;
    use aimtrainer_shared::vec2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rules() -> PlanarRules {
        PlanarRules {
            viewport: Viewport::new(800.0, 600.0),
            size: 1.0,
            speed: 1.0,
        }
    }

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn empty_or_broken_viewport_invalid() {
        assert!(Viewport::new(800.0, 600.0).validate().is_ok());
        assert!(Viewport::new(0.0, 0.0).validate().is_err());
        assert!(Viewport::new(800.0, -1.0).validate().is_err());
        assert!(Viewport::new(f64::NAN, 600.0).validate().is_err());
        assert!(Viewport::new(f64::INFINITY, 600.0).validate().is_err());
    }

    #[test]
    fn grid_radius_from_cell_size() {
        // 200 x 200 cells
        assert_eq!(rules().grid_radius(), 50.0);
        assert_eq!(rules().micro_radius(), 25.0);
        let small = PlanarRules { size: 0.6, ..rules() };
        assert!((small.grid_radius() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn gridshot_starts_with_three_distinct_cells() {
        let mut reg = TargetRegistry::new();
        initial_spawn(Mode::Gridshot, &mut reg, &rules(), &mut test_rng(), 0.0);
        assert_eq!(reg.len(), 3);
        let all = reg.all();
        for i in 0..all.len() {
            for j in (i + 1)..all.len() {
                assert!(distance(all[i].pos, all[j].pos) > CELL_OCCUPIED_PX);
            }
        }
    }

    #[test]
    fn grid_spawn_gives_up_when_saturated() {
        let r = rules();
        let mut reg = TargetRegistry::new();
        for col in 0..GRID_COLS {
            for row in 0..GRID_ROWS {
                reg.add(TargetKind::Standard, r.viewport.cell_center(col, row), 10.0, 0.0);
            }
        }
        assert!(spawn_grid_target(&mut reg, &r, &mut test_rng(), 0.0).is_none());
        assert_eq!(reg.len(), GRID_COLS * GRID_ROWS);
    }

    #[test]
    fn outer_targets_respect_min_distance() {
        let r = rules();
        let mut rng = test_rng();
        let mut reg = TargetRegistry::new();
        for _ in 0..200 {
            let id = spawn_outer_target(&mut reg, &r, &mut rng, 0.0);
            let t = reg.remove(id).unwrap();
            assert!(distance(t.pos, r.viewport.center()) >= OUTER_MIN_DISTANCE - 1e-9);
        }
    }

    #[test]
    fn outer_target_pushed_out_on_tiny_canvas() {
        let r = PlanarRules {
            viewport: Viewport::new(90.0, 90.0),
            ..rules()
        };
        let mut reg = TargetRegistry::new();
        let id = spawn_outer_target(&mut reg, &r, &mut test_rng(), 0.0);
        let t = reg.get(id).unwrap();
        assert!((distance(t.pos, r.viewport.center()) - OUTER_MIN_DISTANCE).abs() < 1e-6);
    }

    #[test]
    fn micro_targets_land_in_annulus() {
        let r = rules();
        let mut rng = test_rng();
        let mut reg = TargetRegistry::new();
        for _ in 0..200 {
            let id = spawn_micro_target(&mut reg, &r, &mut rng, 0.0);
            let d = distance(reg.remove(id).unwrap().pos, r.viewport.center());
            assert!((MICRO_MIN_DISTANCE..=MICRO_MAX_DISTANCE).contains(&d));
        }
    }

    #[test]
    fn spidershot_alternates_roles() {
        let r = rules();
        let mut rng = test_rng();
        let mut reg = TargetRegistry::new();
        initial_spawn(Mode::Spidershot, &mut reg, &r, &mut rng, 0.0);
        let pivot = reg.remove(reg.all()[0].id).unwrap();
        assert!(pivot.is_pivot());
        on_hit(Mode::Spidershot, &pivot, &mut reg, &r, &mut rng, 10.0);
        let outer = reg.remove(reg.all()[0].id).unwrap();
        assert!(!outer.is_pivot());
        on_hit(Mode::Spidershot, &outer, &mut reg, &r, &mut rng, 20.0);
        assert!(reg.all()[0].is_pivot());
        assert_eq!(reg.all()[0].pos, r.viewport.center());
    }

    #[test]
    fn tracking_never_respawns() {
        let r = rules();
        let mut rng = test_rng();
        let mut reg = TargetRegistry::new();
        initial_spawn(Mode::Tracking, &mut reg, &r, &mut rng, 0.0);
        let t = reg.all()[0].clone();
        on_hit(Mode::Tracking, &t, &mut reg, &r, &mut rng, 10.0);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn tracking_target_stays_in_bounds_at_cruise_speed() {
        let r = rules();
        let mut rng = test_rng();
        let mut reg = TargetRegistry::new();
        spawn_tracking_target(&mut reg, &r, &mut rng, 0.0);
        let target = reg.tracking_mut().unwrap();
        for _ in 0..5_000 {
            advance_tracking(target, &r, 0.05, &mut rng);
            assert!(target.pos.x >= target.radius - 1e-9);
            assert!(target.pos.x <= r.viewport.width - target.radius + 1e-9);
            assert!(target.pos.y >= target.radius - 1e-9);
            assert!(target.pos.y <= r.viewport.height - target.radius + 1e-9);
            let TargetKind::Tracking { velocity } = target.kind else {
                panic!("Expected tracking target");
            };
            assert!((vec2::length(velocity) - TRACKING_SPEED).abs() < 1e-6);
        }
    }

    #[test]
    fn tracking_speed_scales_with_setting() {
        let r = PlanarRules { speed: 1.5, ..rules() };
        let mut reg = TargetRegistry::new();
        spawn_tracking_target(&mut reg, &r, &mut test_rng(), 0.0);
        let TargetKind::Tracking { velocity } = reg.all()[0].kind else {
            panic!("Expected tracking target");
        };
        assert!((vec2::length(velocity) - 375.0).abs() < 1e-6);
    }
}

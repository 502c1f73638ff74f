use aimtrainer_shared::config::Mode;
use aimtrainer_shared::vec3::{add, distance, normalize, scale, sub, vec3, Vec3};
use rand::Rng;

use super::map::MapLayout;
use crate::constants::fps::*;
use crate::constants::{
    GRIDSHOT_TARGETS, GRID_COLS, GRID_PLACEMENT_ATTEMPTS, GRID_ROWS, OUTER_PLACEMENT_ATTEMPTS,
    TRACKING_TURN_CHANCE,
};
use crate::registry::{Target, TargetId, TargetKind, TargetRegistry};

/// Spawn rules for a first-person session.
#[derive(Debug, Clone, Copy)]
pub struct FpsRules {
    pub layout: MapLayout,
    pub size: f64,
    pub speed: f64,
}

impl FpsRules {
    pub fn tracking_speed(&self) -> f64 {
        TRACKING_SPEED * self.speed
    }
}

pub fn initial_spawn(
    mode: Mode,
    registry: &mut TargetRegistry<Vec3>,
    rules: &FpsRules,
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

pub fn on_hit(
    mode: Mode,
    hit: &Target<Vec3>,
    registry: &mut TargetRegistry<Vec3>,
    rules: &FpsRules,
    rng: &mut impl Rng,
    now: f64,
) {
    match mode {
        Mode::Gridshot => {
            spawn_grid_target(registry, rules, rng, now);
        }
        Mode::Spidershot if hit.is_pivot() => {
            spawn_outer_target(registry, rules, rng, now);
        }
        Mode::Spidershot => {
            spawn_pivot(registry, rules, now);
        }
        Mode::Microflick => {
            spawn_micro_target(registry, rules, rng, now);
        }
        Mode::Tracking => {}
    }
}

fn cell_occupied(registry: &TargetRegistry<Vec3>, cell: Vec3) -> bool {
    registry.all().iter().any(|t| {
        (t.pos.x - cell.x).abs() < CELL_OCCUPIED && (t.pos.y - cell.y).abs() < CELL_OCCUPIED
    })
}

pub fn spawn_grid_target(
    registry: &mut TargetRegistry<Vec3>,
    rules: &FpsRules,
    rng: &mut impl Rng,
    now: f64,
) -> Option<TargetId> {
    for _ in 0..GRID_PLACEMENT_ATTEMPTS {
        let cell = rules.layout.cell_center(
            rng.gen_range(0..GRID_COLS),
            rng.gen_range(0..GRID_ROWS),
            GRID_COLS,
            GRID_ROWS,
        );
        if !cell_occupied(registry, cell) {
            return Some(registry.add(TargetKind::Standard, cell, GRID_RADIUS * rules.size, now));
        }
    }
    tracing::debug!("fps gridshot placement exhausted, skipping spawn");
    None
}

pub fn spawn_pivot(registry: &mut TargetRegistry<Vec3>, rules: &FpsRules, now: f64) -> TargetId {
    registry.add(
        TargetKind::Pivot,
        rules.layout.wall_center,
        PIVOT_RADIUS * rules.size,
        now,
    )
}

pub fn spawn_outer_target(
    registry: &mut TargetRegistry<Vec3>,
    rules: &FpsRules,
    rng: &mut impl Rng,
    now: f64,
) -> TargetId {
    let layout = &rules.layout;
    let center = layout.wall_center;
    let mut candidate = center;
    for _ in 0..OUTER_PLACEMENT_ATTEMPTS {
        candidate = layout.wall_point(
            rng.gen_range(-layout.wall_half_width..=layout.wall_half_width),
            rng.gen_range(-layout.wall_half_height..=layout.wall_half_height),
        );
        if distance(candidate, center) >= OUTER_MIN_DISTANCE {
            return registry.add(TargetKind::Standard, candidate, OUTER_RADIUS * rules.size, now);
        }
    }

    let dir = normalize(sub(candidate, center));
    let dir = if dir.z.abs() > 0.5 { vec3(1.0, 0.0, 0.0) } else { dir };
    let pos = add(center, scale(dir, OUTER_MIN_DISTANCE));
    registry.add(TargetKind::Standard, pos, OUTER_RADIUS * rules.size, now)
}

pub fn spawn_micro_target(
    registry: &mut TargetRegistry<Vec3>,
    rules: &FpsRules,
    rng: &mut impl Rng,
    now: f64,
) -> TargetId {
    let angle = rng.gen::<f64>() * std::f64::consts::TAU;
    let dist = rng.gen_range(MICRO_MIN_DISTANCE..MICRO_MAX_DISTANCE);
    let pos = rules
        .layout
        .wall_point(angle.cos() * dist, angle.sin() * dist);
    registry.add(TargetKind::Standard, pos, MICRO_RADIUS * rules.size, now)
}

fn random_direction(rng: &mut impl Rng) -> Vec3 {
    normalize(vec3(
        rng.gen::<f64>() - 0.5,
        rng.gen::<f64>() - 0.5,
        rng.gen::<f64>() - 0.5,
    ))
}

pub fn spawn_tracking_target(
    registry: &mut TargetRegistry<Vec3>,
    rules: &FpsRules,
    rng: &mut impl Rng,
    now: f64,
) -> TargetId {
    let velocity = scale(random_direction(rng), rules.tracking_speed());
    registry.add(
        TargetKind::Tracking { velocity },
        rules.layout.wall_center,
        TRACKING_RADIUS * rules.size,
        now,
    )
}

/// Reflect one axis off [lo + r, hi - r].
fn bounce(pos: &mut f64, vel: &mut f64, lo: f64, hi: f64, r: f64) {
    if *pos - r < lo {
        *pos = lo + r;
        *vel = vel.abs();
    } else if *pos + r > hi {
        *pos = hi - r;
        *vel = -vel.abs();
    }
}

pub fn advance_tracking(target: &mut Target<Vec3>, rules: &FpsRules, dt: f64, rng: &mut impl Rng) {
    let TargetKind::Tracking { velocity } = &mut target.kind else {
        return;
    };
    let r = target.radius;
    let (min, max) = (rules.layout.tracking_min, rules.layout.tracking_max);
    let mut pos = add(target.pos, scale(*velocity, dt));

    bounce(&mut pos.x, &mut velocity.x, min.x, max.x, r);
    bounce(&mut pos.y, &mut velocity.y, min.y, max.y, r);
    bounce(&mut pos.z, &mut velocity.z, min.z, max.z, r);

    if rng.gen::<f64>() < TRACKING_TURN_CHANCE {
        let jitter = vec3(
            (rng.gen::<f64>() - 0.5) * 2.0 * TRACKING_JITTER,
            (rng.gen::<f64>() - 0.5) * 2.0 * TRACKING_JITTER,
            (rng.gen::<f64>() - 0.5) * 2.0 * TRACKING_JITTER,
        );
        *velocity = scale(normalize(add(*velocity, jitter)), rules.tracking_speed());
    }

    target.pos = pos;
}

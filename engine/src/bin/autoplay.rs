//! Headless session runner with a scripted aim bot.
//!
//! Drives an engine at a fixed 60 Hz frame cadence, lets a bot of the given
//! skill shoot at whatever is on screen, and prints the final stats as JSON.
//!
//! Usage: cargo run --bin autoplay -- [OPTIONS]
//!
//! Options:
//!   --mode M        gridshot | spidershot | microflick | tracking (default: gridshot)
//!   --fps3d         Use the first-person engine
//!   --duration S    Session length in seconds (default: 15)
//!   --skill P       Chance each shot lands, 0..1 (default: 0.8)
//!   --reaction MS   Delay between shots in ms (default: 350)
//!   --seed N        RNG seed for engine and bot (default: 1)

use aimtrainer_engine::events::{drain, EngineEvent};
use aimtrainer_engine::fps::FpsEngine;
use aimtrainer_engine::frame::ManualScheduler;
use aimtrainer_engine::planar::{PlanarEngine, Viewport};
use aimtrainer_engine::session::{Engine, SessionState};
use aimtrainer_shared::config::{GameSettings, Mode};
use aimtrainer_shared::protocol::GameStats;
use aimtrainer_shared::vec2::{self, vec2};
use aimtrainer_shared::vec3::{self, vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const FRAME_MS: f64 = 1000.0 / 60.0;

struct BotConfig {
    skill: f64,
    reaction_ms: f64,
}

fn run_planar(settings: GameSettings, mode: Mode, bot: &BotConfig, seed: u64) -> Option<GameStats> {
    let mut engine = match PlanarEngine::with_seed(
        settings,
        mode,
        Viewport::new(1280.0, 720.0),
        ManualScheduler::new(),
        seed,
    ) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("cannot build engine: {}", e);
            return None;
        }
    };
    let mut rx = engine.subscribe();
    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));

    let mut now = 0.0;
    let mut next_shot = bot.reaction_ms;
    engine.start(now, None);
    if mode == Mode::Tracking {
        engine.pointer_down(engine.snapshot(now).viewport.center(), now);
    }

    while let Some(frame) = engine.scheduler_mut().take_next() {
        now += FRAME_MS;
        let snap = engine.snapshot(now);
        if mode == Mode::Tracking {
            if let Some(t) = snap.targets.first() {
                let wobble = (1.0 - bot.skill) * 2.0 * t.radius * rng.gen::<f64>();
                let dir = vec2::from_angle(rng.gen::<f64>() * std::f64::consts::TAU);
                engine.pointer_move(vec2::add(t.pos, vec2::scale(dir, wobble)));
            }
        } else if now >= next_shot {
            next_shot = now + bot.reaction_ms;
            if let Some(t) = snap.targets.last() {
                let point = if rng.gen::<f64>() < bot.skill {
                    t.pos
                } else {
                    vec2(t.pos.x + 3.0 * t.radius, t.pos.y - 3.0 * t.radius)
                };
                engine.pointer_down(point, now);
            }
        }
        engine.on_frame(frame, now);
    }

    engine.pointer_up();
    game_over(&mut rx)
}

fn run_fps(settings: GameSettings, mode: Mode, bot: &BotConfig, seed: u64) -> Option<GameStats> {
    let mut engine = FpsEngine::with_seed(settings, mode, ManualScheduler::new(), seed);
    let mut rx = engine.subscribe();
    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));

    let mut now = 0.0;
    let mut next_shot = bot.reaction_ms;
    engine.start(now, None);
    // Host grants pointer lock right away
    engine.request_lock();
    engine.on_pointer_lock_change(true);
    if mode == Mode::Tracking {
        engine.pointer_down(now);
    }

    while let Some(frame) = engine.scheduler_mut().take_next() {
        now += FRAME_MS;
        let snap = engine.snapshot(now);
        if mode == Mode::Tracking {
            if let Some(t) = snap.targets.first() {
                let wobble = (1.0 - bot.skill) * 2.0 * t.radius;
                let offset = vec3(
                    (rng.gen::<f64>() - 0.5) * wobble,
                    (rng.gen::<f64>() - 0.5) * wobble,
                    0.0,
                );
                let (dx, dy) = engine.camera().delta_to(vec3::add(t.pos, offset));
                engine.aim_delta(dx, dy);
            }
        } else if now >= next_shot {
            next_shot = now + bot.reaction_ms;
            if let Some(t) = snap.targets.last() {
                let point = if rng.gen::<f64>() < bot.skill {
                    t.pos
                } else {
                    vec3(t.pos.x + 3.0 * t.radius, t.pos.y + 3.0 * t.radius, t.pos.z)
                };
                let (dx, dy) = engine.camera().delta_to(point);
                engine.aim_delta(dx, dy);
                engine.pointer_down(now);
            }
        }
        engine.on_frame(frame, now);
    }

    engine.pointer_up();
    debug_assert_eq!(engine.state(), SessionState::Ended);
    game_over(&mut rx)
}

fn game_over(rx: &mut tokio::sync::broadcast::Receiver<EngineEvent>) -> Option<GameStats> {
    drain(rx).into_iter().find_map(|event| match event {
        EngineEvent::GameOver(stats) => Some(stats),
        _ => None,
    })
}

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();

    let mut mode = Mode::Gridshot;
    let mut fps3d = false;
    let mut duration_secs: u32 = 15;
    let mut skill: f64 = 0.8;
    let mut reaction_ms: f64 = 350.0;
    let mut seed: u64 = 1;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--mode" => {
                i += 1;
                mode = args
                    .get(i)
                    .and_then(|s| Mode::parse(s))
                    .unwrap_or(Mode::Gridshot);
            }
            "--fps3d" => {
                fps3d = true;
            }
            "--duration" => {
                i += 1;
                duration_secs = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(15);
            }
            "--skill" => {
                i += 1;
                skill = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(0.8);
            }
            "--reaction" => {
                i += 1;
                reaction_ms = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(350.0);
            }
            "--seed" => {
                i += 1;
                seed = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(1);
            }
            _ => {}
        }
        i += 1;
    }

    let settings = GameSettings::with_duration(duration_secs);
    if let Err(e) = settings.validate() {
        eprintln!("Invalid settings: {}", e);
        std::process::exit(1);
    }
    let bot = BotConfig {
        skill: skill.clamp(0.0, 1.0),
        reaction_ms: reaction_ms.max(FRAME_MS),
    };

    tracing::info!(
        "autoplay {:?}{} for {}s, skill {:.2}",
        mode,
        if fps3d { " (fps3d)" } else { "" },
        duration_secs,
        bot.skill
    );

    let stats = if fps3d {
        run_fps(settings, mode, &bot, seed)
    } else {
        run_planar(settings, mode, &bot, seed)
    };

    match stats.map(|s| serde_json::to_string_pretty(&s)) {
        Some(Ok(json)) => println!("{}", json),
        Some(Err(e)) => {
            eprintln!("Failed to encode stats: {}", e);
            std::process::exit(1);
        }
        None => {
            eprintln!("Session ended without a result");
            std::process::exit(1);
        }
    }
}

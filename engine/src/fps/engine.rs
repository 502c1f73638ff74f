use aimtrainer_shared::config::{GameSettings, Mode};
use aimtrainer_shared::protocol::StatsUpdate;
use aimtrainer_shared::vec3::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tokio::sync::broadcast;

use super::camera::Camera;
use super::hit;
use super::map::MapLayout;
use super::modes::{self, FpsRules};
use crate::clock::SessionClock;
use crate::constants::fps::SPAWN_IN_MS;
use crate::events::{EngineEvent, EventBus};
use crate::frame::{FrameId, FrameScheduler};
use crate::registry::TargetRegistry;
use crate::session::{Engine, SessionState, TargetView};
use crate::stats::{AimSampler, ScoreTracker};

/// Who controls the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LockState {
    Released,
    /// Asked the host, waiting for confirmation
    Requested,
    Held,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FpsSnapshot {
    pub mode: Mode,
    pub state: SessionState,
    pub eye: Vec3,
    pub yaw: f64,
    pub pitch: f64,
    pub lock: LockState,
    pub targets: Vec<TargetView<Vec3>>,
    pub stats: StatsUpdate,
}

/// First-person aim trainer. Same session rules as the canvas engine, with
/// ray picking from a yaw/pitch camera and exclusive pointer control.
pub struct FpsEngine<S: FrameScheduler> {
    settings: GameSettings,
    mode: Mode,
    layout: MapLayout,
    camera: Camera,
    lock: LockState,
    registry: TargetRegistry<Vec3>,
    tracker: ScoreTracker,
    clock: SessionClock,
    sampler: AimSampler,
    state: SessionState,
    scheduler: S,
    pending_frame: Option<FrameId>,
    events: EventBus,
    rng: ChaCha8Rng,
}

impl<S: FrameScheduler> FpsEngine<S> {
    pub fn new(settings: GameSettings, mode: Mode, scheduler: S) -> Self {
        Self::with_rng(settings, mode, scheduler, ChaCha8Rng::from_entropy())
    }

    pub fn with_seed(settings: GameSettings, mode: Mode, scheduler: S, seed: u64) -> Self {
        Self::with_rng(settings, mode, scheduler, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(settings: GameSettings, mode: Mode, scheduler: S, rng: ChaCha8Rng) -> Self {
        let duration_ms = settings.duration_ms();
        let layout = MapLayout::for_map(settings.fps.map);
        Self {
            settings,
            mode,
            layout,
            camera: Camera::new(layout.eye, settings.fps.sensitivity),
            lock: LockState::Released,
            registry: TargetRegistry::new(),
            tracker: ScoreTracker::new(duration_ms),
            clock: SessionClock::new(duration_ms),
            sampler: AimSampler::default(),
            state: SessionState::Idle,
            scheduler,
            pending_frame: None,
            events: EventBus::new(),
            rng,
        }
    }

    fn rules(&self) -> FpsRules {
        FpsRules {
            layout: self.layout,
            size: self.settings.size_multiplier(),
            speed: self.settings.speed_multiplier(),
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn layout(&self) -> &MapLayout {
        &self.layout
    }

    pub fn lock_state(&self) -> LockState {
        self.lock
    }

    pub fn registry(&self) -> &TargetRegistry<Vec3> {
        &self.registry
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Host reports that pointer lock was granted or lost.
    pub fn on_pointer_lock_change(&mut self, locked: bool) {
        let next = if locked {
            LockState::Held
        } else {
            LockState::Released
        };
        if next == self.lock {
            return;
        }
        self.lock = next;
        if !locked {
            self.sampler.release();
        }
        tracing::debug!("pointer lock {:?}", next);
        self.events.emit(EngineEvent::PointerLockChanged { locked });
    }

    /// Locked pointer motion in pixels. Dropped unless we hold the lock.
    pub fn aim_delta(&mut self, dx: f64, dy: f64) {
        if self.lock != LockState::Held {
            return;
        }
        self.camera.apply_delta(dx, dy);
    }

    /// Primary button. Without the lock this only asks for it.
    pub fn pointer_down(&mut self, now: f64) {
        if self.lock != LockState::Held {
            self.request_lock();
            return;
        }
        if self.state != SessionState::Running {
            return;
        }
        if self.mode == Mode::Tracking {
            self.sampler.press();
            return;
        }

        let dir = self.camera.forward();
        match hit::pick(&self.registry, self.camera.eye, dir, now) {
            Some(id) => {
                if let Some(target) = self.registry.remove(id) {
                    let rules = self.rules();
                    modes::on_hit(self.mode, &target, &mut self.registry, &rules, &mut self.rng, now);
                    self.tracker.record_hit();
                }
            }
            None => {
                self.tracker.record_miss();
            }
        }
        self.emit_stats(now);
    }

    pub fn pointer_up(&mut self) {
        self.sampler.release();
    }

    fn release_lock(&mut self) {
        if self.lock != LockState::Released {
            self.lock = LockState::Released;
            self.events.emit(EngineEvent::ExitPointerLock);
        }
    }

    fn emit_stats(&self, now: f64) {
        self.events.emit(EngineEvent::Stats(self.stats(now)));
    }

    fn schedule(&mut self) {
        self.pending_frame = Some(self.scheduler.request_frame());
    }

    fn cancel_pending(&mut self) {
        if let Some(frame) = self.pending_frame.take() {
            self.scheduler.cancel_frame(frame);
        }
    }

    fn finish(&mut self) {
        self.state = SessionState::Ended;
        self.sampler.release();
        if let Some(stats) = self.tracker.end() {
            tracing::info!(
                "fps {:?} session over: score={} hits={} misses={} accuracy={:.1}",
                self.mode,
                stats.score,
                stats.hits,
                stats.misses,
                stats.accuracy
            );
            self.events.emit(EngineEvent::GameOver(stats));
        }
        self.release_lock();
    }
}

impl<S: FrameScheduler> Engine for FpsEngine<S> {
    type Snapshot = FpsSnapshot;

    fn start(&mut self, now: f64, mode: Option<Mode>) {
        if let Some(mode) = mode {
            self.mode = mode;
        }
        self.cancel_pending();
        self.registry.clear();
        self.tracker.reset();
        self.clock.start(now);
        self.sampler.release();
        self.camera.reset();
        self.state = SessionState::Running;

        let rules = self.rules();
        modes::initial_spawn(self.mode, &mut self.registry, &rules, &mut self.rng, now);
        tracing::debug!(
            "fps {:?} session started on {:?}: {}s",
            self.mode,
            self.settings.fps.map,
            self.settings.duration_secs
        );

        self.schedule();
    }

    fn stop(&mut self) {
        self.cancel_pending();
        self.sampler.release();
        if self.state == SessionState::Running {
            self.tracker.end();
            self.state = SessionState::Ended;
            tracing::debug!("fps {:?} session stopped", self.mode);
        }
        self.release_lock();
    }

    fn request_lock(&mut self) {
        if self.lock == LockState::Released {
            self.lock = LockState::Requested;
            self.events.emit(EngineEvent::RequestPointerLock);
        }
    }

    fn on_frame(&mut self, frame: FrameId, now: f64) {
        if self.pending_frame != Some(frame) {
            tracing::trace!("ignoring stale frame {:?}", frame);
            return;
        }
        self.pending_frame = None;
        if self.state != SessionState::Running {
            return;
        }

        let tick = self.clock.tick(now);
        if tick.expired {
            self.finish();
            return;
        }

        if self.mode == Mode::Tracking {
            let rules = self.rules();
            if let Some(target) = self.registry.tracking_mut() {
                modes::advance_tracking(target, &rules, tick.dt, &mut self.rng);
            }
            let due = self.sampler.advance(tick.dt);
            for _ in 0..due {
                let (eye, dir) = (self.camera.eye, self.camera.forward());
                let on_target = self
                    .registry
                    .tracking()
                    .is_some_and(|t| hit::on_target(t, eye, dir));
                self.tracker.record_sample(on_target);
                self.emit_stats(now);
            }
        }

        if tick.second_crossed {
            self.emit_stats(now);
        }
        self.schedule();
    }

    fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    fn state(&self) -> SessionState {
        self.state
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn stats(&self, now: f64) -> StatsUpdate {
        self.tracker.update(self.clock.time_left_ms(now))
    }

    fn snapshot(&self, now: f64) -> FpsSnapshot {
        FpsSnapshot {
            mode: self.mode,
            state: self.state,
            eye: self.camera.eye,
            yaw: self.camera.yaw,
            pitch: self.camera.pitch,
            lock: self.lock,
            targets: self
                .registry
                .all()
                .iter()
                .map(|t| TargetView::of(t, now, SPAWN_IN_MS))
                .collect(),
            stats: self.stats(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::fps::OUTER_MIN_DISTANCE;
    use crate::events::drain;
    use crate::frame::ManualScheduler;
    use aimtrainer_shared::config::MapId;
    use aimtrainer_shared::vec3::distance;

    type TestEngine = FpsEngine<ManualScheduler>;

    fn engine(mode: Mode, duration_secs: u32) -> TestEngine {
        FpsEngine::with_seed(
            GameSettings::with_duration(duration_secs),
            mode,
            ManualScheduler::new(),
            7,
        )
    }

    fn locked(mode: Mode, duration_secs: u32) -> TestEngine {
        let mut e = engine(mode, duration_secs);
        e.request_lock();
        e.on_pointer_lock_change(true);
        e
    }

    fn frame(engine: &mut TestEngine, now: f64) {
        let id = engine.scheduler_mut().take_next().expect("no frame pending");
        engine.on_frame(id, now);
    }

    fn aim_at(engine: &mut TestEngine, point: Vec3) {
        let (dx, dy) = engine.camera().delta_to(point);
        engine.aim_delta(dx, dy);
    }

    #[test]
    fn click_without_lock_requests_it() {
        let mut e = engine(Mode::Gridshot, 15);
        let mut rx = e.subscribe();
        e.start(0.0, None);
        drain(&mut rx);

        e.pointer_down(500.0);
        e.pointer_down(600.0);
        assert_eq!(e.lock_state(), LockState::Requested);
        assert_eq!(drain(&mut rx), vec![EngineEvent::RequestPointerLock]);
        let stats = e.stats(600.0);
        assert_eq!(stats.hits + stats.misses, 0);

        e.on_pointer_lock_change(true);
        assert_eq!(e.lock_state(), LockState::Held);
        assert_eq!(
            drain(&mut rx),
            vec![EngineEvent::PointerLockChanged { locked: true }]
        );
    }

    #[test]
    fn aim_ignored_without_lock() {
        let mut e = engine(Mode::Gridshot, 15);
        e.start(0.0, None);
        e.aim_delta(300.0, 100.0);
        assert_eq!(e.camera().yaw, 0.0);
        assert_eq!(e.camera().pitch, 0.0);

        e.request_lock();
        e.aim_delta(300.0, 100.0);
        assert_eq!(e.camera().yaw, 0.0);

        e.on_pointer_lock_change(true);
        e.aim_delta(300.0, 100.0);
        assert!(e.camera().yaw < 0.0);
        assert!(e.camera().pitch < 0.0);
    }

    #[test]
    fn shooting_a_grid_target_respawns_it() {
        let mut e = locked(Mode::Gridshot, 30);
        e.start(0.0, None);
        let target = e.registry().all()[0].clone();
        aim_at(&mut e, target.pos);
        e.pointer_down(1_000.0);
        assert!(e.registry().get(target.id).is_none());
        assert_eq!(e.registry().len(), 3);
        assert_eq!(e.stats(1_000.0).score, 100);
    }

    #[test]
    fn shooting_empty_wall_is_a_miss() {
        let mut e = locked(Mode::Microflick, 30);
        e.start(0.0, None);
        e.aim_delta(0.0, 500.0);
        e.pointer_down(1_000.0);
        let stats = e.stats(1_000.0);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.score, 0);
        assert_eq!(e.registry().len(), 1);
    }

    #[test]
    fn spidershot_pivot_then_outer() {
        let mut e = locked(Mode::Spidershot, 30);
        e.start(0.0, None);
        let center = e.layout().wall_center;
        e.pointer_down(1_000.0);
        let outer = e.registry().all()[0].clone();
        assert!(!outer.is_pivot());
        assert!(distance(outer.pos, center) >= OUTER_MIN_DISTANCE);

        aim_at(&mut e, outer.pos);
        e.pointer_down(2_000.0);
        let pivot = &e.registry().all()[0];
        assert!(pivot.is_pivot());
        assert_eq!(pivot.pos, center);
        assert_eq!(e.stats(2_000.0).hits, 2);
    }

    #[test]
    fn tracking_samples_ten_per_second_on_target() {
        let mut e = locked(Mode::Tracking, 15);
        e.start(0.0, None);
        e.pointer_down(0.0);
        let mut now = 0.0;
        for _ in 0..20 {
            now += 50.0;
            let pos = e.registry().tracking().unwrap().pos;
            aim_at(&mut e, pos);
            frame(&mut e, now);
        }
        let stats = e.stats(now);
        assert_eq!(stats.hits, 10);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.score, 100);
    }

    #[test]
    fn terminal_frame_neither_moves_nor_samples() {
        let mut e = locked(Mode::Tracking, 15);
        let mut rx = e.subscribe();
        e.start(0.0, None);
        e.pointer_down(0.0);

        let mut now = 0.0;
        while now < 14_980.0 {
            now += 20.0;
            let pos = e.registry().tracking().unwrap().pos;
            aim_at(&mut e, pos);
            frame(&mut e, now);
        }
        assert_eq!(e.state(), SessionState::Running);
        let last_pos = e.registry().tracking().unwrap().pos;
        aim_at(&mut e, last_pos);
        let before = e.stats(now);
        drain(&mut rx);

        frame(&mut e, 15_000.0);

        assert_eq!(e.state(), SessionState::Ended);
        assert_eq!(e.registry().tracking().unwrap().pos, last_pos);
        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        match &events[0] {
            EngineEvent::GameOver(stats) => {
                assert_eq!(
                    (stats.score, stats.hits, stats.misses),
                    (before.score, before.hits, before.misses)
                );
            }
            other => panic!("Expected GameOver, got {:?}", other),
        }
        assert_eq!(events[1], EngineEvent::ExitPointerLock);
    }

    #[test]
    fn start_emits_no_stats() {
        let mut e = locked(Mode::Gridshot, 15);
        let mut rx = e.subscribe();
        e.start(0.0, None);
        assert!(drain(&mut rx).is_empty());
        assert_eq!(e.stats(0.0).time_left, 15_000);
    }

    #[test]
    fn losing_lock_stops_tracking_samples() {
        let mut e = locked(Mode::Tracking, 15);
        e.start(0.0, None);
        e.pointer_down(0.0);
        e.on_pointer_lock_change(false);
        for i in 1..=10 {
            frame(&mut e, i as f64 * 50.0);
        }
        let stats = e.stats(500.0);
        assert_eq!(stats.hits + stats.misses, 0);
    }

    #[test]
    fn game_over_releases_lock_once() {
        let mut e = locked(Mode::Gridshot, 15);
        let mut rx = e.subscribe();
        e.start(0.0, None);
        frame(&mut e, 15_000.0);
        let events = drain(&mut rx);
        let overs = events
            .iter()
            .filter(|ev| matches!(ev, EngineEvent::GameOver(s) if s.total_time == 15_000))
            .count();
        assert_eq!(overs, 1);
        assert_eq!(events.last(), Some(&EngineEvent::ExitPointerLock));
        assert_eq!(e.lock_state(), LockState::Released);

        e.stop();
        e.stop();
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn stop_releases_lock_without_game_over() {
        let mut e = locked(Mode::Microflick, 15);
        let mut rx = e.subscribe();
        e.start(0.0, None);
        drain(&mut rx);
        e.stop();
        assert_eq!(drain(&mut rx), vec![EngineEvent::ExitPointerLock]);
        e.stop();
        assert!(drain(&mut rx).is_empty());
        assert_eq!(e.state(), SessionState::Ended);
    }

    #[test]
    fn restart_recenters_camera() {
        let mut e = locked(Mode::Gridshot, 15);
        e.start(0.0, None);
        e.aim_delta(400.0, 50.0);
        e.start(1_000.0, Some(Mode::Microflick));
        assert_eq!(e.camera().yaw, 0.0);
        assert_eq!(e.registry().len(), 1);
        assert_eq!(e.scheduler().pending(), 1);
    }

    #[test]
    fn map_choice_moves_the_wall() {
        let mut settings = GameSettings::with_duration(15);
        settings.fps.map = MapId::Range;
        let e = FpsEngine::with_seed(settings, Mode::Gridshot, ManualScheduler::new(), 1);
        assert_eq!(e.layout().wall_center.z, -28.0);
    }

    #[test]
    fn snapshot_carries_camera_and_lock() {
        let mut e = locked(Mode::Spidershot, 15);
        e.start(0.0, None);
        let snap = e.snapshot(0.0);
        assert_eq!(snap.lock, LockState::Held);
        assert_eq!(snap.eye, e.layout().eye);
        assert_eq!(snap.targets.len(), 1);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["lock"], "held");
        assert_eq!(json["targets"][0]["kind"]["role"], "pivot");
    }
}

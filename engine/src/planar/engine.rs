use aimtrainer_shared::config::{GameSettings, Mode};
use aimtrainer_shared::protocol::StatsUpdate;
use aimtrainer_shared::vec2::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tokio::sync::broadcast;

use super::hit;
use super::modes::{self, PlanarRules, Viewport};
use crate::clock::SessionClock;
use crate::constants::planar::SPAWN_IN_MS;
use crate::events::{EngineEvent, EventBus};
use crate::frame::{FrameId, FrameScheduler};
use crate::registry::TargetRegistry;
use crate::session::{Engine, SessionState, TargetView};
use crate::stats::{AimSampler, ScoreTracker};

/// What the canvas renderer needs for one frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanarSnapshot {
    pub mode: Mode,
    pub state: SessionState,
    pub viewport: Viewport,
    pub targets: Vec<TargetView<Vec2>>,
    pub stats: StatsUpdate,
}

/// Canvas aim trainer. Owns all session state; the host feeds it frames and
/// pointer events on a single thread.
pub struct PlanarEngine<S: FrameScheduler> {
    settings: GameSettings,
    mode: Mode,
    viewport: Viewport,
    registry: TargetRegistry<Vec2>,
    tracker: ScoreTracker,
    clock: SessionClock,
    sampler: AimSampler,
    pointer: Vec2,
    state: SessionState,
    scheduler: S,
    pending_frame: Option<FrameId>,
    events: EventBus,
    rng: ChaCha8Rng,
}

impl<S: FrameScheduler> PlanarEngine<S> {
    pub fn new(
        settings: GameSettings,
        mode: Mode,
        viewport: Viewport,
        scheduler: S,
    ) -> Result<Self, String> {
        Self::with_rng(settings, mode, viewport, scheduler, ChaCha8Rng::from_entropy())
    }

    /// Deterministic spawns for tests and headless runs.
    pub fn with_seed(
        settings: GameSettings,
        mode: Mode,
        viewport: Viewport,
        scheduler: S,
        seed: u64,
    ) -> Result<Self, String> {
        Self::with_rng(settings, mode, viewport, scheduler, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(
        settings: GameSettings,
        mode: Mode,
        viewport: Viewport,
        scheduler: S,
        rng: ChaCha8Rng,
    ) -> Result<Self, String> {
        settings.validate()?;
        viewport.validate()?;
        let duration_ms = settings.duration_ms();
        Ok(Self {
            settings,
            mode,
            viewport,
            registry: TargetRegistry::new(),
            tracker: ScoreTracker::new(duration_ms),
            clock: SessionClock::new(duration_ms),
            sampler: AimSampler::default(),
            pointer: viewport.center(),
            state: SessionState::Idle,
            scheduler,
            pending_frame: None,
            events: EventBus::new(),
            rng,
        })
    }

    fn rules(&self) -> PlanarRules {
        PlanarRules {
            viewport: self.viewport,
            size: self.settings.size_multiplier(),
            speed: self.settings.speed_multiplier(),
        }
    }

    pub fn registry(&self) -> &TargetRegistry<Vec2> {
        &self.registry
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Canvas resized. Live targets keep their positions; new spawns and
    /// tracking bounds use the new size. An invalid size is rejected and
    /// the previous one kept.
    pub fn resize(&mut self, viewport: Viewport) -> Result<(), String> {
        viewport.validate()?;
        self.viewport = viewport;
        Ok(())
    }

    pub fn pointer_move(&mut self, point: Vec2) {
        self.pointer = point;
    }

    pub fn pointer_down(&mut self, point: Vec2, now: f64) {
        self.pointer = point;
        if self.state != SessionState::Running {
            return;
        }
        if self.mode == Mode::Tracking {
            self.sampler.press();
            return;
        }

        match hit::pick(&self.registry, point, now) {
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
                "{:?} session over: score={} hits={} misses={} accuracy={:.1}",
                self.mode,
                stats.score,
                stats.hits,
                stats.misses,
                stats.accuracy
            );
            self.events.emit(EngineEvent::GameOver(stats));
        }
    }

    fn sample_tracking(&mut self, due: u32, now: f64) {
        for _ in 0..due {
            let on_target = self
                .registry
                .tracking()
                .is_some_and(|t| hit::on_target(t, self.pointer));
            self.tracker.record_sample(on_target);
            self.emit_stats(now);
        }
    }
}

impl<S: FrameScheduler> Engine for PlanarEngine<S> {
    type Snapshot = PlanarSnapshot;

    fn start(&mut self, now: f64, mode: Option<Mode>) {
        if let Some(mode) = mode {
            self.mode = mode;
        }
        self.cancel_pending();
        self.registry.clear();
        self.tracker.reset();
        self.clock.start(now);
        self.sampler.release();
        self.state = SessionState::Running;

        let rules = self.rules();
        modes::initial_spawn(self.mode, &mut self.registry, &rules, &mut self.rng, now);
        tracing::debug!(
            "{:?} session started: {}s, {} targets",
            self.mode,
            self.settings.duration_secs,
            self.registry.len()
        );

        self.schedule();
    }

    fn stop(&mut self) {
        self.cancel_pending();
        self.sampler.release();
        if self.state == SessionState::Running {
            self.tracker.end();
            self.state = SessionState::Ended;
            tracing::debug!("{:?} session stopped", self.mode);
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
            self.sample_tracking(due, now);
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

    fn snapshot(&self, now: f64) -> PlanarSnapshot {
        PlanarSnapshot {
            mode: self.mode,
            state: self.state,
            viewport: self.viewport,
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

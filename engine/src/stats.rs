use aimtrainer_shared::protocol::{accuracy, GameStats, StatsUpdate};

use crate::constants::{HIT_REWARD, MISS_PENALTY, SAMPLE_INTERVAL, SAMPLE_REWARD};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Active,
    /// Terminal until the next `reset`. Scoring events are ignored.
    Ended,
}

/// Score, hits and misses of one session.
#[derive(Debug)]
pub struct ScoreTracker {
    score: u32,
    hits: u32,
    misses: u32,
    duration_ms: u64,
    state: TrackerState,
}

impl ScoreTracker {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            score: 0,
            hits: 0,
            misses: 0,
            duration_ms,
            state: TrackerState::Active,
        }
    }

    pub fn reset(&mut self) {
        self.score = 0;
        self.hits = 0;
        self.misses = 0;
        self.state = TrackerState::Active;
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == TrackerState::Active
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    /// Discrete hit. Returns false if the session already ended.
    pub fn record_hit(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.score += HIT_REWARD;
        self.hits += 1;
        true
    }

    /// Discrete miss.
    pub fn record_miss(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.score = self.score.saturating_sub(MISS_PENALTY);
        self.misses += 1;
        true
    }

    /// Tracking sample. Misses count against accuracy but cost no points.
    pub fn record_sample(&mut self, on_target: bool) -> bool {
        if !self.is_active() {
            return false;
        }
        if on_target {
            self.score += SAMPLE_REWARD;
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        true
    }

    pub fn update(&self, time_left_ms: u64) -> StatsUpdate {
        StatsUpdate {
            score: self.score,
            hits: self.hits,
            misses: self.misses,
            time_left: time_left_ms,
        }
    }

    /// Active -> Ended. Yields the final stats only on the transition.
    pub fn end(&mut self) -> Option<GameStats> {
        if !self.is_active() {
            return None;
        }
        self.state = TrackerState::Ended;
        Some(GameStats {
            score: self.score,
            hits: self.hits,
            misses: self.misses,
            total_time: self.duration_ms,
            accuracy: accuracy(self.hits, self.misses),
        })
    }
}

/// Fixed-cadence sampler for held-button tracking.
#[derive(Debug, Default)]
pub struct AimSampler {
    held: bool,
    accumulated: f64,
}

impl AimSampler {
    /// Starts a fresh interval.
    pub fn press(&mut self) {
        self.held = true;
        self.accumulated = 0.0;
    }

    pub fn release(&mut self) {
        self.held = false;
    }

    /// Feed frame time; returns how many samples are due. The remainder
    /// carries over so the cadence does not drift with frame rate.
    pub fn advance(&mut self, dt: f64) -> u32 {
        if !self.held {
            return 0;
        }
        self.accumulated += dt;
        let mut due = 0;
        while self.accumulated + 1e-9 >= SAMPLE_INTERVAL {
            self.accumulated -= SAMPLE_INTERVAL;
            due += 1;
        }
        due
    }
}

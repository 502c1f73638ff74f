use crate::constants::MAX_FRAME_DT;

/// Result of advancing the clock to a frame timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Clamped seconds since the previous frame
    pub dt: f64,
    /// Milliseconds since start
    pub elapsed: f64,
    pub expired: bool,
    /// Whole-second boundary crossed since the previous frame
    pub second_crossed: bool,
}

/// Session timing on the host's millisecond clock.
#[derive(Debug)]
pub struct SessionClock {
    duration_ms: f64,
    start: Option<f64>,
    last: f64,
    last_second: u64,
}

impl SessionClock {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms: duration_ms as f64,
            start: None,
            last: 0.0,
            last_second: 0,
        }
    }

    pub fn start(&mut self, now: f64) {
        self.start = Some(now);
        self.last = now;
        self.last_second = 0;
    }

    pub fn tick(&mut self, now: f64) -> Tick {
        let start = self.start.unwrap_or(now);
        let dt = ((now - self.last) / 1000.0).clamp(0.0, MAX_FRAME_DT);
        self.last = now;

        let elapsed = (now - start).max(0.0);
        let second = (elapsed / 1000.0).floor() as u64;
        let second_crossed = second != self.last_second;
        self.last_second = second;

        Tick {
            dt,
            elapsed,
            expired: self.duration_ms - elapsed <= 0.0,
            second_crossed,
        }
    }

    pub fn time_left_ms(&self, now: f64) -> u64 {
        match self.start {
            Some(start) => (self.duration_ms - (now - start)).max(0.0).round() as u64,
            None => self.duration_ms as u64,
        }
    }
}

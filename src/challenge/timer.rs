/// Single elapsed-time clock bounding a challenge attempt
#[derive(Debug, Clone)]
pub struct ChallengeTimer {
    time_limit: f64,
    elapsed: f64,
    running: bool,
    finished: bool,
}

impl ChallengeTimer {
    pub fn new(time_limit: f64) -> Self {
        Self {
            time_limit,
            elapsed: 0.0,
            running: false,
            finished: false,
        }
    }

    pub fn start(&mut self) {
        self.elapsed = 0.0;
        self.running = true;
        self.finished = false;
    }

    /// Adds `dt` and returns the new elapsed sample. Frozen once finished.
    pub fn advance(&mut self, dt: f64) -> f64 {
        if self.is_running() {
            self.elapsed += dt;
        }
        self.elapsed
    }

    pub fn has_expired(&self) -> bool {
        self.elapsed >= self.time_limit
    }

    pub fn finish(&mut self) {
        self.running = false;
        self.finished = true;
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.running = false;
        self.finished = false;
    }

    pub fn is_running(&self) -> bool {
        self.running && !self.finished
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn time_limit(&self) -> f64 {
        self.time_limit
    }

    pub fn remaining(&self) -> f64 {
        (self.time_limit - self.elapsed).max(0.0)
    }

    /// Share of the limit still left, 1 at start and 0 at expiry
    pub fn remaining_fraction(&self) -> f64 {
        if self.time_limit <= 0.0 {
            return 0.0;
        }
        (self.remaining() / self.time_limit).clamp(0.0, 1.0)
    }
}

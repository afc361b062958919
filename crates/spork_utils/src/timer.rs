use std::time::{Duration, Instant};

/// Wall-clock timer for work that runs in consecutive phases.
///
/// Each [`PhaseTimer::lap`] returns the time since the previous lap (or since
/// the timer started), so a mark phase and a sweep phase can be measured
/// separately while [`PhaseTimer::total`] still covers the whole run.
#[derive(Debug, Clone, Copy)]
pub struct PhaseTimer {
    start: Instant,
    lap_start: Instant,
}

impl PhaseTimer {
    pub fn start() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            lap_start: now,
        }
    }

    /// Close the current phase and begin the next one.
    pub fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let phase = now.duration_since(self.lap_start);
        self.lap_start = now;
        phase
    }

    pub fn total(&self) -> Duration {
        self.start.elapsed()
    }
}

//! Garbage collection configuration

use serde::{Deserialize, Serialize};

/// Slots per chunk when nothing else is configured.
pub const DEFAULT_CHUNK_CAPACITY: usize = 1024;

/// Garbage collection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcConfig {
    /// Number of value slots in each arena chunk
    pub chunk_capacity: usize,
    /// Countdown a fresh state starts with (0 = collect on the first allocation)
    pub initial_countdown: i64,
    /// Next countdown is `survivors * threshold_factor`
    pub threshold_factor: i64,
    /// Lower bound for the countdown after a collection
    pub min_threshold: i64,
    /// Initial capacity of the root stack
    pub root_stack_capacity: usize,
    /// Maximum root stack depth (0 = unlimited)
    pub root_stack_limit: usize,
    /// Collect automatically when the countdown expires
    pub auto_gc: bool,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
            initial_countdown: 0,
            threshold_factor: 1,
            min_threshold: 0,
            root_stack_capacity: 16,
            root_stack_limit: 0,
            auto_gc: true,
        }
    }
}

impl GcConfig {
    /// Default configuration with a custom chunk size.
    pub fn with_chunk_capacity(chunk_capacity: usize) -> Self {
        Self {
            chunk_capacity: chunk_capacity.max(1),
            ..Default::default()
        }
    }

    /// Countdown to install after a cycle that left `survivors` live slots.
    pub fn next_countdown(&self, survivors: usize) -> i64 {
        let survivors = i64::try_from(survivors).unwrap_or(i64::MAX);
        survivors
            .saturating_mul(self.threshold_factor)
            .max(self.min_threshold)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields with any `SPORK_*` variables that parse.
    pub fn apply_env(&mut self) {
        if let Ok(capacity) = std::env::var("SPORK_CHUNK_CAPACITY")
            && let Ok(capacity) = capacity.parse::<usize>()
        {
            self.chunk_capacity = capacity.max(1);
        }

        if let Ok(countdown) = std::env::var("SPORK_GC_INITIAL_COUNTDOWN")
            && let Ok(countdown) = countdown.parse::<i64>()
        {
            self.initial_countdown = countdown;
        }

        if let Ok(factor) = std::env::var("SPORK_GC_THRESHOLD_FACTOR")
            && let Ok(factor) = factor.parse::<i64>()
        {
            self.threshold_factor = factor.max(0);
        }

        if let Ok(min) = std::env::var("SPORK_GC_MIN_THRESHOLD")
            && let Ok(min) = min.parse::<i64>()
        {
            self.min_threshold = min;
        }

        if let Ok(limit) = std::env::var("SPORK_ROOT_STACK_LIMIT")
            && let Ok(limit) = limit.parse::<usize>()
        {
            self.root_stack_limit = limit;
        }

        if let Ok(auto) = std::env::var("SPORK_AUTO_GC")
            && let Ok(auto) = auto.parse::<bool>()
        {
            self.auto_gc = auto;
        }
    }
}

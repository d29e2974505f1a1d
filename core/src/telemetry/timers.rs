// ## src/telemetry/timers.rs

//! telemetry/timers.rs
//! Stage timers for the decryption pipeline.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Discover,
    Decrypt,
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Discover => "discover",
            Stage::Decrypt => "decrypt",
            Stage::Persist => "persist",
        };
        f.write_str(name)
    }
}

/// Busy time accumulated per stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTimes {
    times: HashMap<Stage, Duration>,
}

impl StageTimes {
    /// Add duration to a stage (accumulates if already present).
    pub fn add(&mut self, stage: Stage, dur: Duration) {
        *self.times.entry(stage).or_insert(Duration::ZERO) += dur;
    }

    pub fn get(&self, stage: Stage) -> Duration {
        self.times.get(&stage).copied().unwrap_or(Duration::ZERO)
    }

    pub fn merge(&mut self, other: &StageTimes) {
        for (stage, dur) in &other.times {
            self.add(*stage, *dur);
        }
    }
}

/// Wall clock for one run.
#[derive(Debug, Clone)]
pub struct TelemetryTimer {
    start: Instant,
}

impl TelemetryTimer {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for TelemetryTimer {
    fn default() -> Self {
        Self::new()
    }
}

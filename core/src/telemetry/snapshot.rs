// ## src/telemetry/snapshot.rs

//! Immutable outcome of one `process_path` run.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::telemetry::counters::CounterValues;
use crate::telemetry::timers::{Stage, StageTimes};

/// One per-file diagnostic, flattened for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub rel_path: String,
    pub stage: Stage,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub files_discovered: u64,
    pub files_skipped: u64,
    pub files_decrypted: u64,
    pub files_failed: u64,
    pub bytes_ciphertext: u64,
    pub bytes_plaintext: u64,
    pub throughput_plaintext_bytes_per_sec: f64,
    pub stage_times: StageTimes,
    pub failures: Vec<FailureRecord>,
}

impl RunReport {
    pub fn new(
        started_at: DateTime<Utc>,
        elapsed: Duration,
        counters: CounterValues,
        stage_times: StageTimes,
        failures: Vec<FailureRecord>,
    ) -> Self {
        let mut failed: Vec<&str> = failures.iter().map(|f| f.rel_path.as_str()).collect();
        failed.sort_unstable();
        failed.dedup();

        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_plaintext as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            started_at,
            elapsed,
            files_discovered: counters.files_discovered,
            files_skipped: counters.files_skipped,
            files_decrypted: counters.files_decrypted,
            files_failed: failed.len() as u64,
            bytes_ciphertext: counters.bytes_ciphertext,
            bytes_plaintext: counters.bytes_plaintext,
            throughput_plaintext_bytes_per_sec: throughput,
            stage_times,
            failures,
        }
    }

    /// No file failed. Skipped files count as success.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

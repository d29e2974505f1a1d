// ### `src/telemetry/counters.rs`

//! telemetry/counters.rs
//! Run-wide counters shared by the three stages.
//!
//! Summary: each stage bumps its own counters through `&RunCounters`;
//! the orchestrator converts them into an immutable `RunReport` at the end.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RunCounters {
    files_discovered: AtomicU64,
    files_skipped: AtomicU64,
    files_decrypted: AtomicU64,
    bytes_ciphertext: AtomicU64,
    bytes_plaintext: AtomicU64,
}

/// Plain copy of the counters at one instant.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CounterValues {
    pub files_discovered: u64,
    pub files_skipped: u64,
    pub files_decrypted: u64,
    pub bytes_ciphertext: u64,
    pub bytes_plaintext: u64,
}

impl RunCounters {
    /// A regular file found under the source root.
    pub fn add_discovered(&self) {
        self.files_discovered.fetch_add(1, Ordering::Relaxed);
    }

    /// Already in the processed set, not read again.
    pub fn add_skipped(&self) {
        self.files_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Fully written and marked.
    pub fn add_decrypted(&self, plaintext_len: u64) {
        self.files_decrypted.fetch_add(1, Ordering::Relaxed);
        self.bytes_plaintext.fetch_add(plaintext_len, Ordering::Relaxed);
    }

    /// Raw envelope bytes pushed into the pipeline.
    pub fn add_ciphertext(&self, len: u64) {
        self.bytes_ciphertext.fetch_add(len, Ordering::Relaxed);
    }

    pub fn values(&self) -> CounterValues {
        CounterValues {
            files_discovered: self.files_discovered.load(Ordering::Relaxed),
            files_skipped: self.files_skipped.load(Ordering::Relaxed),
            files_decrypted: self.files_decrypted.load(Ordering::Relaxed),
            bytes_ciphertext: self.bytes_ciphertext.load(Ordering::Relaxed),
            bytes_plaintext: self.bytes_plaintext.load(Ordering::Relaxed),
        }
    }
}

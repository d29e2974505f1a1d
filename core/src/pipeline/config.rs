// ## 📂 File: `src/pipeline/config.rs`
// ## Explicit run configuration (no global knobs)

use std::fmt;

use crate::constants::{queue_caps, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE, MIN_BUFFER_SIZE};
use crate::types::StreamError;

/// Order in which Discover walks the source tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TraversalOrder {
    /// Sorted by relative path.
    #[default]
    Lexical,
    /// Ascending inode number (Unix), relative path breaks ties.
    /// Falls back to `Lexical` on other platforms.
    Inode,
}

#[derive(Clone)]
pub struct PipelineConfig {
    pub password: String,
    /// Raw chunk size read by Discover, and plaintext chunk size emitted by Decrypt.
    pub buffer_size: usize,
    /// Files queued between Discover and Decrypt.
    pub input_queue_cap: usize,
    /// Files queued between Decrypt and Persist.
    pub output_queue_cap: usize,
    /// Chunks buffered inside one file's sequence.
    pub chunk_queue_cap: usize,
    pub error_queue_cap: usize,
    pub traversal: TraversalOrder,
    /// fsync each destination file before marking it processed.
    pub sync_outputs: bool,
}

impl PipelineConfig {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            input_queue_cap: queue_caps::INPUT,
            output_queue_cap: queue_caps::OUTPUT,
            chunk_queue_cap: queue_caps::CHUNKS,
            error_queue_cap: queue_caps::ERRORS,
            traversal: TraversalOrder::default(),
            sync_outputs: true,
        }
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_queue_caps(mut self, input: usize, output: usize, chunks: usize) -> Self {
        self.input_queue_cap = input;
        self.output_queue_cap = output;
        self.chunk_queue_cap = chunks;
        self
    }

    pub fn with_traversal(mut self, traversal: TraversalOrder) -> Self {
        self.traversal = traversal;
        self
    }

    pub fn with_sync_outputs(mut self, sync_outputs: bool) -> Self {
        self.sync_outputs = sync_outputs;
        self
    }

    /// Upper bound on bytes buffered in queues for one file per stage boundary.
    pub fn inflight_bytes_per_file(&self) -> usize {
        self.chunk_queue_cap * self.buffer_size
    }

    pub fn validate(&self) -> Result<(), StreamError> {
        if self.password.is_empty() {
            return Err(StreamError::Config("password must not be empty".into()));
        }
        if self.buffer_size < MIN_BUFFER_SIZE || self.buffer_size > MAX_BUFFER_SIZE {
            return Err(StreamError::Config(format!(
                "buffer_size {} outside {}..={}",
                self.buffer_size, MIN_BUFFER_SIZE, MAX_BUFFER_SIZE
            )));
        }
        for (name, cap) in [
            ("input_queue_cap", self.input_queue_cap),
            ("output_queue_cap", self.output_queue_cap),
            ("chunk_queue_cap", self.chunk_queue_cap),
            ("error_queue_cap", self.error_queue_cap),
        ] {
            if cap == 0 {
                return Err(StreamError::Config(format!("{name} must be at least 1")));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("password", &"<redacted>")
            .field("buffer_size", &self.buffer_size)
            .field("input_queue_cap", &self.input_queue_cap)
            .field("output_queue_cap", &self.output_queue_cap)
            .field("chunk_queue_cap", &self.chunk_queue_cap)
            .field("error_queue_cap", &self.error_queue_cap)
            .field("traversal", &self.traversal)
            .field("sync_outputs", &self.sync_outputs)
            .finish()
    }
}

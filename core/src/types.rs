use std::io;

use thiserror::Error;

/// Unified stream error covering envelope parsing, CBC decryption, padding,
/// I/O, the processed-state log and configuration.
/// - `From<io::Error>` enables `?` across stages.
/// - Messages aim to be stable and contextual for logs.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Bad or short magic, or no ciphertext after the header.
    #[error("envelope error: {0}")]
    Envelope(String),

    /// Mid-stream read failure or ciphertext not block aligned.
    #[error("cipher error: {0}")]
    Cipher(String),

    /// Final padding byte outside 1..=16 or inconsistent pad bytes.
    #[error("padding error: invalid pad value {value}")]
    Padding { value: u8 },

    /// Open/create/write failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Processed-log write, flush or replay failure.
    #[error("state error: {0}")]
    State(String),

    /// Rejected pipeline configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A stage's queue peer vanished before the sequence was finished.
    #[error("pipeline error: {0}")]
    PipelineError(&'static str),
}

impl StreamError {
    /// File-scoped errors abandon one file; the run keeps going.
    pub fn is_file_scoped(&self) -> bool {
        matches!(
            self,
            StreamError::Envelope(_)
                | StreamError::Cipher(_)
                | StreamError::Padding { .. }
                | StreamError::Io(_)
                | StreamError::State(_)
                | StreamError::PipelineError(_)
        )
    }
}

pub type StreamResult<T> = Result<T, StreamError>;

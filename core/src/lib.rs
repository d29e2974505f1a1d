//! salted-core
//!
//! Resumable, pipelined decryption of OpenSSL `Salted__` envelope trees
//! (`openssl enc -aes-256-cbc -md md5`). Pure Rust, no FFI.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod logging;

pub mod crypto;
pub mod telemetry;
pub mod recovery;

// Stream adapters and the pipeline built on them
pub mod stream;
pub mod pipeline;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::crypto::{decrypt_envelope, derive_key_material, is_salted_envelope, is_salted_file};
    pub use crate::pipeline::{process_path, Orchestrator, PipelineConfig, TraversalOrder};
    pub use crate::recovery::ProcessedSet;
    pub use crate::stream::{ChunkMsg, ChunkReader, ChunkWriter};
    pub use crate::telemetry::RunReport;
    pub use crate::types::{StreamError, StreamResult};
}

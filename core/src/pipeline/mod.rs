//! pipeline: three overlapping stages joined by bounded queues.
//!
//! ```text
//! walk ─▶ Discover ──input──▶ Decrypt ──output──▶ Persist ─▶ ProcessedSet
//!             │                  │                   │
//!             └──────────────── errors ─────────────┴──▶ sink
//! ```
//!
//! Each queue carries whole files (`FileTask`); each file carries its own
//! bounded chunk sequence, so memory is bounded by queue capacity times
//! chunk size whatever the file sizes are.

pub mod config;
pub mod types;
pub mod discover;
pub mod decrypt;
pub mod persist;
pub mod sink;
pub mod orchestrator;

pub use config::{PipelineConfig, TraversalOrder};
pub use orchestrator::{process_path, Orchestrator, PipelineContext, PipelinePhase};
pub use types::{FileFailure, FileTask, SourceFile};

//! recovery: resumable run state.

pub mod log;
pub mod state;

pub use log::{decode_line, encode_line, replay_log, ProcessedLog, Replay};
pub use state::{state_path, ProcessedSet};

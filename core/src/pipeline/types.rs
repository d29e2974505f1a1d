// ## 📂 File: `src/pipeline/types.rs`

use std::path::PathBuf;

use crossbeam::channel::{Receiver, Sender};

use crate::stream::ChunkMsg;
use crate::telemetry::{FailureRecord, Stage};
use crate::types::StreamError;

/// A regular file found under the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// `/`-separated path relative to the source root; the resumability key.
    pub rel_path: String,
}

/// One file in flight between two stages.
///
/// Created by Discover (raw envelope chunks), re-created by Decrypt
/// (plaintext chunks), consumed by Persist.
#[derive(Debug)]
pub struct FileTask {
    pub source: PathBuf,
    pub rel_path: String,
    pub dest_root: PathBuf,
    pub chunks: Receiver<ChunkMsg>,
}

impl FileTask {
    pub fn dest_path(&self) -> PathBuf {
        self.dest_root.join(&self.rel_path)
    }

    /// Same file, new chunk sequence for the next stage.
    pub fn relay(&self, chunks: Receiver<ChunkMsg>) -> FileTask {
        FileTask {
            source: self.source.clone(),
            rel_path: self.rel_path.clone(),
            dest_root: self.dest_root.clone(),
            chunks,
        }
    }
}

/// Per-file diagnostic sent to the error sink.
#[derive(Debug)]
pub struct FileFailure {
    pub rel_path: String,
    pub source: PathBuf,
    pub stage: Stage,
    pub error: StreamError,
}

impl FileFailure {
    pub fn new(stage: Stage, rel_path: &str, source: impl Into<PathBuf>, error: StreamError) -> Self {
        Self {
            rel_path: rel_path.to_owned(),
            source: source.into(),
            stage,
            error,
        }
    }

    pub fn record(&self) -> FailureRecord {
        FailureRecord {
            rel_path: self.rel_path.clone(),
            stage: self.stage,
            message: self.error.to_string(),
        }
    }
}

pub type ErrorTx = Sender<FileFailure>;

/// Hand a failure to the sink. The sink outlives every stage, so a send
/// can only fail during teardown.
pub fn report(errors: &ErrorTx, failure: FileFailure) {
    if let Err(e) = errors.send(failure) {
        let f = e.into_inner();
        tracing::error!(file = %f.rel_path, stage = %f.stage, error = %f.error, "error sink closed, dropping diagnostic");
    }
}

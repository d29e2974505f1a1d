// ## 📦 `src/recovery/state.rs`
// Purpose: durable set of relative paths already written to the destination.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::info;

use crate::constants::STATE_FILE_NAME;
use crate::recovery::log::ProcessedLog;
use crate::types::StreamError;

/// Append-only, crash-safe set of processed relative paths.
///
/// Invariants:
/// - a path is added at most once and never removed
/// - an entry is in memory only after it reached stable storage
///
/// Only the Persist stage mutates it; the lock is there so the type is
/// safe to share, not because of contention.
#[derive(Debug)]
pub struct ProcessedSet {
    inner: Mutex<Inner>,
    path: PathBuf,
}

#[derive(Debug)]
struct Inner {
    entries: HashSet<String>,
    log: ProcessedLog,
}

impl ProcessedSet {
    /// Replay `<dest_root>/STATE_FILE_NAME`, creating an empty log if absent.
    pub fn load(dest_root: impl AsRef<Path>) -> Result<Self, StreamError> {
        let path = state_path(dest_root.as_ref());
        let (log, replay) = ProcessedLog::open(&path)?;
        let entries: HashSet<String> = replay.entries.into_iter().collect();

        info!(path = %path.display(), processed = entries.len(), "processed state loaded");

        Ok(Self {
            inner: Mutex::new(Inner { entries, log }),
            path,
        })
    }

    /// Empty set over an already open log.
    #[cfg(test)]
    pub(crate) fn over_log(log: ProcessedLog, path: PathBuf) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashSet::new(),
                log,
            }),
            path,
        }
    }

    pub fn is_processed(&self, rel_path: &str) -> bool {
        match self.inner.lock() {
            Ok(inner) => inner.entries.contains(rel_path),
            Err(poisoned) => poisoned.into_inner().entries.contains(rel_path),
        }
    }

    /// Durably record `rel_path`. Returns `false` when it was already present.
    pub fn mark_processed(&self, rel_path: &str) -> Result<bool, StreamError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| StreamError::State("processed set lock poisoned".into()))?;

        if inner.entries.contains(rel_path) {
            return Ok(false);
        }

        inner.log.append(rel_path)?;
        inner.entries.insert(rel_path.to_owned());
        Ok(true)
    }

    pub fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(inner) => inner.entries.len(),
            Err(poisoned) => poisoned.into_inner().entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Location of the durable log.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn state_path(dest_root: &Path) -> PathBuf {
    dest_root.join(STATE_FILE_NAME)
}

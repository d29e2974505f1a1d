// ## 📂 File: `src/pipeline/discover.rs`
// ## Stage 1: enumerate, skip processed, stream raw chunks

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crossbeam::channel::{bounded, Sender};
use tracing::debug;
use walkdir::WalkDir;

use crate::constants::STATE_FILE_NAME;
use crate::crypto::is_salted_envelope;
use crate::pipeline::config::TraversalOrder;
use crate::pipeline::orchestrator::PipelineContext;
use crate::pipeline::types::{report, ErrorTx, FileFailure, FileTask, SourceFile};
use crate::stream::io::read_exact_or_eof;
use crate::stream::ChunkMsg;
use crate::telemetry::{Stage, StageTimes};
use crate::types::StreamError;

/// Outcome of walking the source root.
#[derive(Debug, Default)]
pub struct Walk {
    pub files: Vec<SourceFile>,
    /// Entries that could not be listed or resolved (including dangling symlinks).
    pub unreadable: Vec<(PathBuf, io::Error)>,
}

/// Recursively list files under `root`.
///
/// Directory symlinks are not descended into; a symlink to a regular file
/// is listed under its own relative path and read through the link.
/// Only an unreadable `root` is an error; deeper failures land in `unreadable`.
pub fn walk_source(root: &Path, order: TraversalOrder) -> Result<Walk, StreamError> {
    let mut walk = Walk::default();
    let mut keyed: Vec<(u64, SourceFile)> = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(io::Error::from(e).into()),
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                walk.unreadable.push((path, e.into()));
                continue;
            }
        };

        let meta = if entry.file_type().is_symlink() {
            match fs::metadata(entry.path()) {
                Ok(target) if target.is_file() => target,
                Ok(_) => {
                    debug!(path = %entry.path().display(), "not following directory symlink");
                    continue;
                }
                Err(e) => {
                    walk.unreadable.push((entry.into_path(), e));
                    continue;
                }
            }
        } else if entry.file_type().is_file() {
            match entry.metadata() {
                Ok(meta) => meta,
                Err(e) => {
                    let path = entry.path().to_path_buf();
                    walk.unreadable.push((path, e.into()));
                    continue;
                }
            }
        } else {
            continue;
        };

        let rel_path = match entry.path().strip_prefix(root) {
            Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
            Err(_) => continue,
        };
        let key = match order {
            TraversalOrder::Lexical => 0,
            TraversalOrder::Inode => inode_of(&meta),
        };
        keyed.push((
            key,
            SourceFile {
                path: entry.into_path(),
                rel_path,
            },
        ));
    }

    keyed.sort_by(|(ka, a), (kb, b)| ka.cmp(kb).then_with(|| a.rel_path.cmp(&b.rel_path)));
    walk.files = keyed.into_iter().map(|(_, f)| f).collect();
    Ok(walk)
}

#[cfg(unix)]
fn inode_of(meta: &fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    meta.ino()
}

#[cfg(not(unix))]
fn inode_of(_meta: &fs::Metadata) -> u64 {
    0
}

/// Discover loop. Runs on its own thread; closing `input_tx` (by returning)
/// tells Decrypt there are no more files.
pub fn run_discover(
    ctx: &PipelineContext<'_>,
    files: Vec<SourceFile>,
    input_tx: Sender<FileTask>,
    errors: ErrorTx,
) -> StageTimes {
    let mut times = StageTimes::default();

    for file in files {
        ctx.counters.add_discovered();

        if file.rel_path == STATE_FILE_NAME && ctx.state.is_some() {
            report(
                &errors,
                FileFailure::new(
                    Stage::Discover,
                    &file.rel_path,
                    &file.path,
                    StreamError::Envelope("name collides with the reserved state file".into()),
                ),
            );
            continue;
        }

        if let Some(state) = ctx.state {
            if state.is_processed(&file.rel_path) {
                ctx.counters.add_skipped();
                debug!(file = %file.rel_path, "already processed, skipping");
                continue;
            }
        }

        let start = Instant::now();
        let keep_going = read_file(ctx, &file, &input_tx, &errors);
        times.add(Stage::Discover, start.elapsed());

        if !keep_going {
            debug!("decrypt stage gone, discover stopping");
            break;
        }
    }

    debug!("discover finished, closing input queue");
    times
}

/// Stream one file into a fresh chunk sequence.
/// Returns `false` only when the Decrypt stage is gone for good.
fn read_file(
    ctx: &PipelineContext<'_>,
    file: &SourceFile,
    input_tx: &Sender<FileTask>,
    errors: &ErrorTx,
) -> bool {
    let fail = |error: StreamError| {
        report(errors, FileFailure::new(Stage::Discover, &file.rel_path, &file.path, error));
    };

    let mut f = match File::open(&file.path) {
        Ok(f) => f,
        Err(e) => {
            fail(e.into());
            return true;
        }
    };

    let first = match read_exact_or_eof(&mut f, ctx.config.buffer_size) {
        Ok(chunk) => chunk,
        Err(e) => {
            fail(e);
            return true;
        }
    };

    if !is_salted_envelope(&first) {
        fail(StreamError::Envelope("not a salted envelope (missing Salted__ magic)".into()));
        return true;
    }

    let (chunk_tx, chunk_rx) = bounded::<ChunkMsg>(ctx.config.chunk_queue_cap);
    let task = FileTask {
        source: file.path.clone(),
        rel_path: file.rel_path.clone(),
        dest_root: ctx.dest_root.to_path_buf(),
        chunks: chunk_rx,
    };
    if input_tx.send(task).is_err() {
        return false;
    }

    let mut chunk = first;
    loop {
        if chunk.is_empty() {
            // EOF
            if chunk_tx.send(ChunkMsg::End).is_err() {
                debug!(file = %file.rel_path, "file abandoned downstream");
            }
            return true;
        }

        ctx.counters.add_ciphertext(chunk.len() as u64);
        if chunk_tx.send(ChunkMsg::Data(chunk)).is_err() {
            debug!(file = %file.rel_path, "file abandoned downstream");
            return true;
        }

        chunk = match read_exact_or_eof(&mut f, ctx.config.buffer_size) {
            Ok(next) => next,
            Err(e) => {
                // drop chunk_tx without End: Decrypt sees a truncated sequence
                fail(e);
                return true;
            }
        };
    }
}

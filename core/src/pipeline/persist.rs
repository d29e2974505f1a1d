// ## 📂 File: `src/pipeline/persist.rs`
// ## Stage 3: write plaintext, mark processed only after a complete write

use std::fs::{self, File};
use std::io::Write;
use std::time::Instant;

use crossbeam::channel::Receiver;
use tracing::{debug, info};

use crate::pipeline::orchestrator::PipelineContext;
use crate::pipeline::types::{report, ErrorTx, FileFailure, FileTask};
use crate::stream::ChunkMsg;
use crate::telemetry::{Stage, StageTimes};
use crate::types::StreamError;

/// How a file's plaintext sequence ended.
#[derive(Debug, PartialEq, Eq)]
pub enum PersistOutcome {
    /// `End` received, every byte written (and synced when configured).
    Complete { bytes: u64 },
    /// Upstream closed the sequence early; the partial output stays on disk.
    Incomplete { bytes: u64 },
}

/// Persist loop. Only this stage ever calls `mark_processed`.
pub fn run_persist(ctx: &PipelineContext<'_>, output_rx: Receiver<FileTask>, errors: ErrorTx) -> StageTimes {
    let mut times = StageTimes::default();

    for task in output_rx.iter() {
        let start = Instant::now();
        let outcome = write_file(ctx, &task);
        times.add(Stage::Persist, start.elapsed());

        match outcome {
            Ok(PersistOutcome::Complete { bytes }) => {
                if let Some(state) = ctx.state {
                    if let Err(e) = state.mark_processed(&task.rel_path) {
                        // output is fine, only resumability for this file is lost
                        report(&errors, FileFailure::new(Stage::Persist, &task.rel_path, &task.source, e));
                    }
                }
                ctx.counters.add_decrypted(bytes);
                info!(file = %task.rel_path, bytes, "written");
            }
            Ok(PersistOutcome::Incomplete { bytes }) => {
                debug!(file = %task.rel_path, bytes, "sequence ended early, not marking");
            }
            Err(e) => report(&errors, FileFailure::new(Stage::Persist, &task.rel_path, &task.source, e)),
        }
        // `task.chunks` drops here; an abandoned Decrypt sees a broken pipe.
    }

    debug!("persist finished");
    times
}

/// Write chunks in arrival order. The destination is created lazily so a
/// file rejected before its first plaintext chunk leaves nothing behind.
pub fn write_file(ctx: &PipelineContext<'_>, task: &FileTask) -> Result<PersistOutcome, StreamError> {
    let dest = task.dest_path();
    let mut out: Option<File> = None;
    let mut bytes = 0u64;

    let open = |out: &mut Option<File>| -> Result<(), StreamError> {
        if out.is_none() {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            *out = Some(File::create(&dest)?);
        }
        Ok(())
    };

    for msg in task.chunks.iter() {
        match msg {
            ChunkMsg::Data(chunk) => {
                open(&mut out)?;
                if let Some(f) = out.as_mut() {
                    f.write_all(&chunk)?;
                }
                bytes += chunk.len() as u64;
            }
            ChunkMsg::End => {
                open(&mut out)?;
                if let Some(f) = out.as_mut() {
                    f.flush()?;
                    if ctx.config.sync_outputs {
                        f.sync_all()?;
                    }
                }
                return Ok(PersistOutcome::Complete { bytes });
            }
        }
    }

    Ok(PersistOutcome::Incomplete { bytes })
}

// ## 📂 File: `src/pipeline/decrypt.rs`
// ## Stage 2: raw chunks -> plaintext chunks, one file at a time

use std::io;
use std::time::Instant;

use crossbeam::channel::{bounded, Receiver, Sender};
use tracing::debug;

use crate::crypto::decrypt_envelope;
use crate::pipeline::orchestrator::PipelineContext;
use crate::pipeline::types::{report, ErrorTx, FileFailure, FileTask};
use crate::stream::{ChunkMsg, ChunkReader, ChunkWriter};
use crate::telemetry::{Stage, StageTimes};
use crate::types::StreamError;

/// Decrypt loop. Ends when Discover closes `input_rx`; returning drops
/// `output_tx`, which ends Persist in turn.
pub fn run_decrypt(
    ctx: &PipelineContext<'_>,
    input_rx: Receiver<FileTask>,
    output_tx: Sender<FileTask>,
    errors: ErrorTx,
) -> StageTimes {
    let mut times = StageTimes::default();

    for task in input_rx.iter() {
        let (plain_tx, plain_rx) = bounded::<ChunkMsg>(ctx.config.chunk_queue_cap);

        // Hand the plaintext sequence over first so Persist writes while we decrypt.
        if output_tx.send(task.relay(plain_rx)).is_err() {
            debug!("persist stage gone, decrypt stopping");
            break;
        }

        let start = Instant::now();
        decrypt_one(ctx, task, plain_tx, &errors);
        times.add(Stage::Decrypt, start.elapsed());
    }

    debug!("decrypt finished, closing output queue");
    times
}

fn decrypt_one(ctx: &PipelineContext<'_>, task: FileTask, plain_tx: Sender<ChunkMsg>, errors: &ErrorTx) {
    let rel_path = task.rel_path.clone();
    let source = task.source.clone();

    let mut reader = ChunkReader::new(task.chunks);
    let mut writer = ChunkWriter::new(plain_tx, ctx.config.buffer_size);

    let result = decrypt_envelope(
        &mut reader,
        &mut writer,
        ctx.config.password.as_bytes(),
        ctx.config.buffer_size,
    )
    .and_then(|n| writer.finish().map(|_| n).map_err(StreamError::from));

    match result {
        Ok(n) => debug!(file = %rel_path, envelope = reader.consumed(), plaintext = n, "decrypted"),
        // Persist dropped the sequence and has reported why.
        Err(StreamError::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!(file = %rel_path, "plaintext abandoned by persist stage");
        }
        // The early return dropped the writer without End: Persist sees an incomplete file.
        Err(error) => report(errors, FileFailure::new(Stage::Decrypt, &rel_path, source, error)),
    }
}

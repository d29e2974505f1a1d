//! stream: adapters that let a classic `Read`/`Write` cipher loop run
//! across the bounded queues of the pipeline.

pub mod io;
pub mod chunk_reader;
pub mod chunk_writer;

use bytes::Bytes;

pub use chunk_reader::ChunkReader;
pub use chunk_writer::ChunkWriter;

/// One message of a per-file chunk sequence.
///
/// A sequence is complete only when `End` arrives. A channel that closes
/// without `End` means the producer abandoned the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkMsg {
    Data(Bytes),
    End,
}

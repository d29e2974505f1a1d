// ## 📂 File: `src/stream/chunk_writer.rs`
// ## Push-style writes -> chunk sequence

use std::io::{self, Write};

use bytes::Bytes;
use crossbeam::channel::Sender;

use crate::stream::ChunkMsg;

/// Collects small writes into `chunk_size` chunks before sending them
/// downstream, so the number of queue messages does not depend on the
/// cipher's 16-byte block granularity.
///
/// Sending blocks while the queue is full; that is the backpressure.
/// Dropping the writer without [`ChunkWriter::finish`] leaves the sequence
/// without its end marker, which readers treat as incomplete.
#[derive(Debug)]
pub struct ChunkWriter {
    tx: Sender<ChunkMsg>,
    buf: Vec<u8>,
    chunk_size: usize,
    bytes_sent: u64,
    chunks_sent: u64,
}

impl ChunkWriter {
    pub fn new(tx: Sender<ChunkMsg>, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            tx,
            buf: Vec::with_capacity(chunk_size),
            chunk_size,
            bytes_sent: 0,
            chunks_sent: 0,
        }
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    pub fn chunks_sent(&self) -> u64 {
        self.chunks_sent
    }

    /// Flush the tail and send the end marker.
    pub fn finish(mut self) -> io::Result<u64> {
        self.emit()?;
        self.tx
            .send(ChunkMsg::End)
            .map_err(|_| disconnected())?;
        Ok(self.bytes_sent)
    }

    fn emit(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let full = std::mem::replace(&mut self.buf, Vec::with_capacity(self.chunk_size));
        let len = full.len() as u64;
        self.tx
            .send(ChunkMsg::Data(Bytes::from(full)))
            .map_err(|_| disconnected())?;
        self.bytes_sent += len;
        self.chunks_sent += 1;
        Ok(())
    }
}

impl Write for ChunkWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut rest = data;
        while !rest.is_empty() {
            if self.buf.len() == self.chunk_size {
                self.emit()?;
            }
            let room = self.chunk_size - self.buf.len();
            let take = room.min(rest.len());
            self.buf.extend_from_slice(&rest[..take]);
            rest = &rest[take..];
        }
        if self.buf.len() == self.chunk_size {
            self.emit()?;
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit()
    }
}

fn disconnected() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "chunk sequence consumer went away")
}

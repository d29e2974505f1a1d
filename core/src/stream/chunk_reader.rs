// ## 📂 File: `src/stream/chunk_reader.rs`
// ## Chunk sequence -> pull-style byte source

use std::io::{self, Read};

use bytes::{Buf, Bytes};
use crossbeam::channel::Receiver;

use crate::stream::ChunkMsg;

/// Wraps the receiving end of a chunk sequence as a `Read`.
///
/// - Drains the current chunk, then blocks on the queue for the next one.
/// - `ChunkMsg::End` yields `Ok(0)` from then on.
/// - A queue closed before `End` yields `UnexpectedEof`, so a truncated
///   upstream is never mistaken for a complete file.
#[derive(Debug)]
pub struct ChunkReader {
    rx: Receiver<ChunkMsg>,
    current: Bytes,
    finished: bool,
    consumed: u64,
}

impl ChunkReader {
    pub fn new(rx: Receiver<ChunkMsg>) -> Self {
        Self {
            rx,
            current: Bytes::new(),
            finished: false,
            consumed: 0,
        }
    }

    /// Bytes handed out through `read` so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn is_finished(&self) -> bool {
        self.finished && self.current.is_empty()
    }
}

impl Read for ChunkReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if !self.current.is_empty() {
                let n = buf.len().min(self.current.len());
                buf[..n].copy_from_slice(&self.current[..n]);
                self.current.advance(n);
                self.consumed += n as u64;
                return Ok(n);
            }

            if self.finished {
                return Ok(0);
            }

            match self.rx.recv() {
                Ok(ChunkMsg::Data(chunk)) => self.current = chunk,
                Ok(ChunkMsg::End) => self.finished = true,
                Err(_) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "chunk sequence closed before its end marker",
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel::bounded;

    #[test]
    fn reads_across_chunk_boundaries_then_eof() {
        let (tx, rx) = bounded(4);
        tx.send(ChunkMsg::Data(Bytes::from_static(b"abc"))).unwrap();
        tx.send(ChunkMsg::Data(Bytes::new())).unwrap();
        tx.send(ChunkMsg::Data(Bytes::from_static(b"defg"))).unwrap();
        tx.send(ChunkMsg::End).unwrap();
        drop(tx);

        let mut reader = ChunkReader::new(rx);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"abcdefg");
        assert!(reader.is_finished());
        assert_eq!(reader.read(&mut [0u8; 4]).unwrap(), 0);
    }

    #[test]
    fn closed_without_end_is_unexpected_eof() {
        let (tx, rx) = bounded(2);
        tx.send(ChunkMsg::Data(Bytes::from_static(b"partial"))).unwrap();
        drop(tx);

        let mut reader = ChunkReader::new(rx);
        let mut out = Vec::new();
        let err = reader.read_to_end(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(out, b"partial");
    }
}

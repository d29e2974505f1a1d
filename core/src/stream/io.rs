// ## 📂 File: `src/stream/io.rs`
// ## Normalized reads

use std::io::{ErrorKind, Read};

use bytes::Bytes;

use crate::types::StreamError;

/// Fill up to `len` bytes, stopping early only at EOF.
/// We need this to cut files into fixed-size chunks regardless of how
/// short the underlying reads are.
pub fn read_exact_or_eof<R: Read>(r: &mut R, len: usize) -> Result<Bytes, StreamError> {
    let mut buf = vec![0u8; len];
    let mut off = 0;

    while off < len {
        match r.read(&mut buf[off..]) {
            Ok(0) => break,
            Ok(n) => off += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    buf.truncate(off);
    Ok(Bytes::from(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Hands out at most 3 bytes per call.
    struct Trickle(Cursor<Vec<u8>>);

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = buf.len().min(3);
            self.0.read(&mut buf[..n])
        }
    }

    #[test]
    fn fills_across_short_reads() {
        let mut r = Trickle(Cursor::new((0u8..20).collect()));
        let first = read_exact_or_eof(&mut r, 16).unwrap();
        assert_eq!(first.len(), 16);
        let rest = read_exact_or_eof(&mut r, 16).unwrap();
        assert_eq!(&rest[..], &[16, 17, 18, 19]);
        assert!(read_exact_or_eof(&mut r, 16).unwrap().is_empty());
    }
}

// ## 📂 File: `src/crypto/envelope.rs`
// ## Salted envelope header: magic + salt

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::constants::{ENVELOPE_HEADER_LEN, MAGIC_LEN, MAGIC_SALTED, SALT_LEN};
use crate::crypto::types::EnvelopeHeader;
use crate::stream::io::read_exact_or_eof;
use crate::types::StreamError;

/// True when `bytes` starts with the `Salted__` literal.
#[inline]
pub fn is_salted_envelope(bytes: &[u8]) -> bool {
    bytes.len() >= MAGIC_LEN && bytes[..MAGIC_LEN] == MAGIC_SALTED
}

/// Sniff the first bytes of a file on disk.
pub fn is_salted_file(path: impl AsRef<Path>) -> Result<bool, StreamError> {
    let mut file = File::open(path)?;
    let head = read_exact_or_eof(&mut file, MAGIC_LEN)?;
    Ok(is_salted_envelope(&head))
}

/// Split a header-sized slice into its salt, validating the magic.
pub fn parse_envelope_header(bytes: &[u8]) -> Result<EnvelopeHeader, StreamError> {
    if bytes.len() < ENVELOPE_HEADER_LEN {
        return Err(StreamError::Envelope(format!(
            "short envelope header: {} of {} bytes",
            bytes.len(),
            ENVELOPE_HEADER_LEN
        )));
    }
    if !is_salted_envelope(bytes) {
        return Err(StreamError::Envelope("missing Salted__ magic".into()));
    }

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&bytes[MAGIC_LEN..ENVELOPE_HEADER_LEN]);
    Ok(EnvelopeHeader { salt })
}

/// Consume exactly the envelope header from `r`.
/// A read failure here is a cipher-stream failure, a short read is an envelope failure.
pub fn read_envelope_header<R: Read>(r: &mut R) -> Result<EnvelopeHeader, StreamError> {
    let mut buf = [0u8; ENVELOPE_HEADER_LEN];
    let mut off = 0;

    while off < buf.len() {
        match r.read(&mut buf[off..]) {
            Ok(0) => break,
            Ok(n) => off += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(StreamError::Cipher(format!("reading envelope header: {e}"))),
        }
    }

    parse_envelope_header(&buf[..off])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn accepts_magic_and_extracts_salt() {
        let mut raw = b"Salted__".to_vec();
        raw.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        raw.extend_from_slice(&[0u8; 16]);

        let mut cursor = Cursor::new(raw);
        let header = read_envelope_header(&mut cursor).unwrap();
        assert_eq!(header.salt, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(cursor.position(), ENVELOPE_HEADER_LEN as u64);
    }

    #[test]
    fn rejects_wrong_magic() {
        let raw = b"NotSalt_12345678".to_vec();
        let err = read_envelope_header(&mut Cursor::new(raw)).unwrap_err();
        assert!(matches!(err, StreamError::Envelope(_)));
    }

    #[test]
    fn rejects_short_header() {
        let err = read_envelope_header(&mut Cursor::new(b"Salted__12".to_vec())).unwrap_err();
        assert!(matches!(err, StreamError::Envelope(_)));
    }

    #[test]
    fn sniffing_needs_full_magic() {
        assert!(is_salted_envelope(b"Salted__"));
        assert!(!is_salted_envelope(b"Salted_"));
        assert!(!is_salted_envelope(b""));
    }
}

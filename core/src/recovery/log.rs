// ## 📦 `src/recovery/log.rs`

//! Append-only processed log.
//!
//! One line per finished file:
//!
//! ```text
//! DONE|<base64 relative path>|<first 8 hex chars of blake3(DONE|<base64>)>
//! ```
//!
//! - Base64 keeps separators and newlines inside file names from breaking lines.
//! - The checksum lets replay drop a line torn by a crash mid-append.
//! - Every append is written, flushed and `sync_data`'d before returning.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::{debug, warn};

use crate::types::StreamError;

const ENTRY_TAG: &str = "DONE";
const CHECKSUM_HEX_LEN: usize = 8;

/// Result of replaying a log from the start.
#[derive(Debug, Default)]
pub struct Replay {
    pub entries: Vec<String>,
    /// Lines that failed to parse or verify.
    pub rejected: usize,
    /// The file ends without a newline (torn final append).
    pub torn_tail: bool,
}

#[derive(Debug)]
pub struct ProcessedLog {
    path: PathBuf,
    file: File,
    /// Next append must start with a newline to close a torn tail.
    needs_newline: bool,
}

impl ProcessedLog {
    /// Replay the log at `path` (if any) and reopen it for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<(Self, Replay), StreamError> {
        let path = path.as_ref().to_path_buf();

        let replay = if path.exists() {
            replay_log(&path)?
        } else {
            Replay::default()
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StreamError::State(format!("open {}: {e}", path.display())))?;

        if replay.rejected > 0 {
            warn!(path = %path.display(), rejected = replay.rejected, "processed log had unreadable lines");
        }
        debug!(path = %path.display(), entries = replay.entries.len(), "processed log opened");

        Ok((
            Self {
                path,
                file,
                needs_newline: replay.torn_tail,
            },
            replay,
        ))
    }

    /// Durably append one relative path.
    pub fn append(&mut self, rel_path: &str) -> Result<(), StreamError> {
        let mut line = String::new();
        if self.needs_newline {
            line.push('\n');
        }
        line.push_str(&encode_line(rel_path));
        line.push('\n');

        let written = self
            .file
            .write_all(line.as_bytes())
            .and_then(|_| self.file.flush())
            .and_then(|_| self.file.sync_data());

        if let Err(e) = written {
            // part of the line may be on disk; the next append must not extend it
            self.needs_newline = true;
            return Err(StreamError::State(format!("append to {}: {e}", self.path.display())));
        }

        self.needs_newline = false;
        Ok(())
    }

    /// Wrap an already open handle, skipping replay.
    #[cfg(test)]
    pub(crate) fn with_file(path: PathBuf, file: File) -> Self {
        Self {
            path,
            file,
            needs_newline: false,
        }
    }
}

/// Stream the log from disk, one line at a time.
pub fn replay_log(path: &Path) -> Result<Replay, StreamError> {
    let file = File::open(path)
        .map_err(|e| StreamError::State(format!("open {}: {e}", path.display())))?;
    let mut reader = BufReader::new(file);
    let mut replay = Replay::default();
    let mut raw = Vec::new();

    loop {
        raw.clear();
        let n = reader
            .read_until(b'\n', &mut raw)
            .map_err(|e| StreamError::State(format!("read {}: {e}", path.display())))?;
        if n == 0 {
            break;
        }

        if raw.last() != Some(&b'\n') {
            // torn final append, never acknowledged
            replay.torn_tail = true;
            break;
        }

        let line = match std::str::from_utf8(&raw[..raw.len() - 1]) {
            Ok(l) => l.trim_end_matches('\r'),
            Err(_) => {
                replay.rejected += 1;
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        match decode_line(line) {
            Some(rel) => replay.entries.push(rel),
            None => replay.rejected += 1,
        }
    }

    Ok(replay)
}

pub fn encode_line(rel_path: &str) -> String {
    let body = format!("{}|{}", ENTRY_TAG, STANDARD.encode(rel_path.as_bytes()));
    let hash = blake3::hash(body.as_bytes());
    format!("{}|{}", body, &hash.to_hex()[..CHECKSUM_HEX_LEN])
}

/// Verify and unpack one line (without its newline).
pub fn decode_line(line: &str) -> Option<String> {
    let (body, checksum) = line.rsplit_once('|')?;
    if &blake3::hash(body.as_bytes()).to_hex()[..CHECKSUM_HEX_LEN] != checksum {
        return None;
    }

    let encoded = body.strip_prefix(ENTRY_TAG)?.strip_prefix('|')?;
    let bytes = STANDARD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn line_survives_awkward_names() {
        for name in ["a/b.txt", "with|pipe", "new\nline", "ünïcode/ファイル"] {
            let line = encode_line(name);
            assert!(!line.contains('\n'));
            assert_eq!(decode_line(&line).as_deref(), Some(name));
        }
    }

    #[test]
    fn tampered_line_is_rejected() {
        let mut line = encode_line("docs/report.pdf");
        line.replace_range(5..6, "A");
        assert_eq!(decode_line(&line), None);
    }

    #[test]
    fn torn_tail_is_ignored_and_repaired() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");

        let mut content = encode_line("one");
        content.push('\n');
        content.push_str(&encode_line("two")[..7]); // crash mid-append
        fs::write(&path, content).unwrap();

        let (mut log, replay) = ProcessedLog::open(&path).unwrap();
        assert_eq!(replay.entries, vec!["one".to_string()]);
        assert!(replay.torn_tail);

        log.append("three").unwrap();
        drop(log);

        let again = replay_log(&path).unwrap();
        assert_eq!(again.entries, vec!["one".to_string(), "three".to_string()]);
        assert_eq!(again.rejected, 1); // the torn fragment, now newline-terminated
        assert!(!again.torn_tail);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_append_does_not_swallow_the_next_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");

        let (mut log, _) = ProcessedLog::open(&path).unwrap();
        log.append("first").unwrap();

        // bytes a short write left behind before failing
        let mut raw = OpenOptions::new().append(true).open(&path).unwrap();
        raw.write_all(&encode_line("failed").as_bytes()[..10]).unwrap();
        drop(raw);

        // every write to /dev/full fails with ENOSPC
        let healthy = std::mem::replace(&mut log.file, OpenOptions::new().write(true).open("/dev/full").unwrap());
        assert!(matches!(log.append("failed"), Err(StreamError::State(_))));
        assert!(log.needs_newline);

        log.file = healthy;
        log.append("second").unwrap();
        drop(log);

        let replay = replay_log(&path).unwrap();
        assert_eq!(replay.entries, vec!["first".to_string(), "second".to_string()]);
        assert_eq!(replay.rejected, 1);
    }
}

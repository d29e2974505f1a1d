// ## 📂 File: `src/constants.rs`

/// Magic literal written by `openssl enc` in front of every salted envelope.
/// - Fixed width `[u8; 8]` so the type enforces the header layout.
pub const MAGIC_SALTED: [u8; 8] = *b"Salted__";
pub const MAGIC_LEN: usize = 8;
pub const SALT_LEN: usize = 8;

/// Magic + salt, everything after this offset is ciphertext.
pub const ENVELOPE_HEADER_LEN: usize = MAGIC_LEN + SALT_LEN;

/// AES block size, also the IV length.
pub const BLOCK_SIZE: usize = 16;
/// AES-256 key length in bytes.
pub const KEY_LEN_32: usize = 32;
pub const IV_LEN_16: usize = BLOCK_SIZE;

/// EVP_BytesToKey iteration count used by legacy `openssl enc`.
pub const KDF_ITERATIONS: usize = 1;

/// Defaults when the caller does not override the pipeline config
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024; // 1 MiB
/// Smallest accepted chunk: the first chunk must carry the whole envelope header.
pub const MIN_BUFFER_SIZE: usize = ENVELOPE_HEADER_LEN;
/// Max chunk size sanity bound (32 MiB).
pub const MAX_BUFFER_SIZE: usize = 32 * 1024 * 1024;

/// Queue capacities (bounded channels between stages).
pub mod queue_caps {
    /// Files read ahead by Discover while Decrypt is busy.
    pub const INPUT: usize = 4;
    /// Files decrypted ahead of Persist.
    pub const OUTPUT: usize = 16;
    /// Chunks buffered inside one file's sequence.
    pub const CHUNKS: usize = 8;
    /// Diagnostics waiting for the error sink.
    pub const ERRORS: usize = 100;
}

/// Reserved file under the destination root holding the processed log.
pub const STATE_FILE_NAME: &str = ".salted_decrypt_state";

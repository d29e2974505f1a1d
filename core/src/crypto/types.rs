// ## 📂 File: `src/crypto/types.rs`

use std::fmt;

use crate::constants::{IV_LEN_16, KEY_LEN_32, SALT_LEN};

/// Key + IV pair derived from (password, salt).
/// Recomputed for every file, never written anywhere.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DerivedKeyMaterial {
    pub key: [u8; KEY_LEN_32],
    pub iv: [u8; IV_LEN_16],
}

// Key bytes stay out of logs.
impl fmt::Debug for DerivedKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKeyMaterial")
            .field("key", &"<redacted>")
            .field("iv", &"<redacted>")
            .finish()
    }
}

impl Drop for DerivedKeyMaterial {
    fn drop(&mut self) {
        self.key.fill(0);
        self.iv.fill(0);
    }
}

/// Parsed fixed-size prefix of a salted envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeHeader {
    pub salt: [u8; SALT_LEN],
}

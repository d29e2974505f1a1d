// ## src/crypto/kdf.rs

//! crypto/kdf.rs
//! Legacy OpenSSL `EVP_BytesToKey` (MD5) key + IV derivation.
//!
//! Design:
//! - D_0 = empty, D_i = MD5(D_{i-1} || password || salt), rehashed `count - 1` more times.
//! - Concatenate D_1 || D_2 || ... until `key_len + iv_len` bytes are available.
//! - First `key_len` bytes are the key, the next `iv_len` bytes the IV.
//!
//! Notes:
//! - This is what `openssl enc` used before `-pbkdf2`; it is weak, we only read it.
//! - Output is a pure function of (password, salt); nothing is cached or persisted.

use md5::{Digest, Md5};

use crate::constants::{IV_LEN_16, KDF_ITERATIONS, KEY_LEN_32};
use crate::crypto::types::DerivedKeyMaterial;

/// Generic `EVP_BytesToKey` with MD5 as the digest.
/// Returns `(key, iv)` of exactly `key_len` and `iv_len` bytes.
pub fn evp_bytes_to_key(
    password: &[u8],
    salt: &[u8],
    key_len: usize,
    iv_len: usize,
    count: usize,
) -> (Vec<u8>, Vec<u8>) {
    let needed = key_len + iv_len;
    let mut material = Vec::with_capacity(needed + 16);
    let mut prev: Option<[u8; 16]> = None;

    while material.len() < needed {
        let mut hasher = Md5::new();
        if let Some(d) = prev {
            hasher.update(d);
        }
        hasher.update(password);
        hasher.update(salt);
        let mut digest = [0u8; 16];
        digest.copy_from_slice(&hasher.finalize());

        for _ in 1..count.max(1) {
            let again = Md5::digest(digest);
            digest.copy_from_slice(&again);
        }

        material.extend_from_slice(&digest);
        prev = Some(digest);
    }

    let iv = material[key_len..needed].to_vec();
    material.truncate(key_len);
    (material, iv)
}

/// Summary: Derive the AES-256 key and CBC IV for one envelope.
/// Fixed to the parameters `openssl enc -aes-256-cbc -md md5` uses.
#[inline]
pub fn derive_key_material(password: &[u8], salt: &[u8]) -> DerivedKeyMaterial {
    let (key, iv) = evp_bytes_to_key(password, salt, KEY_LEN_32, IV_LEN_16, KDF_ITERATIONS);

    let mut out = DerivedKeyMaterial::default();
    out.key.copy_from_slice(&key);
    out.iv.copy_from_slice(&iv);
    out
}

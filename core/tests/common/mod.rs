//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes256Enc;

use salted_core::crypto::derive_key_material;

/// `openssl enc -aes-256-cbc -md md5 -S 46bb2cc8ea4a98b8 -k "correct horse"`
pub const FOX_PASSWORD: &str = "correct horse";
pub const FOX_PLAINTEXT: &[u8] = b"The quick brown fox jumps over the lazy dog";
pub const FOX_ENVELOPE_HEX: &str = "53616c7465645f5f46bb2cc8ea4a98b841c15d29a44c857422db6cf78291d100d7a0fa68f0edc05f76c4d1ba9256d5ebde0eec9206eba58741cb5de7a01ef2c5";

/// Empty plaintext, password `pw`: one block of pure padding.
pub const EMPTY_ENVELOPE_HEX: &str = "53616c7465645f5fd10973a9c3e2cfdcac6b9a5faa4d122eec9d9552d9d12ce2";

/// Sixteen `A`s, password `pw`: a full block of data plus a full padding block.
pub const SIXTEEN_A_ENVELOPE_HEX: &str =
    "53616c7465645f5fc81cae988066297e2178cc48369946f2e02c2b9c94f0596874e6474a762e35b02cdf69d5e641ab20";

pub fn unhex(s: &str) -> Vec<u8> {
    hex::decode(s).unwrap()
}

/// Reference producer: `Salted__` + salt + AES-256-CBC(PKCS#7(plaintext)).
pub fn encrypt_envelope(plaintext: &[u8], password: &str, salt: [u8; 8]) -> Vec<u8> {
    let material = derive_key_material(password.as_bytes(), &salt);
    let cipher = Aes256Enc::new(GenericArray::from_slice(&material.key));

    let pad = 16 - plaintext.len() % 16;
    let mut padded = plaintext.to_vec();
    padded.extend(std::iter::repeat(pad as u8).take(pad));

    let mut out = b"Salted__".to_vec();
    out.extend_from_slice(&salt);

    let mut chain = material.iv;
    for block in padded.chunks_exact(16) {
        let mut b = [0u8; 16];
        for i in 0..16 {
            b[i] = block[i] ^ chain[i];
        }
        let mut ga = GenericArray::clone_from_slice(&b);
        cipher.encrypt_block(&mut ga);
        chain.copy_from_slice(&ga);
        out.extend_from_slice(&ga);
    }
    out
}

/// Deterministic, non-repeating filler.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i.wrapping_mul(31) ^ (i >> 8)) as u8).collect()
}

/// Write `files` as envelopes under `root`, creating subdirectories.
pub fn write_tree(root: &Path, files: &[(&str, Vec<u8>)], password: &str) {
    for (i, (rel, plain)) in files.iter().enumerate() {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let salt = [i as u8, 1, 2, 3, 4, 5, 6, 7];
        fs::write(path, encrypt_envelope(plain, password, salt)).unwrap();
    }
}

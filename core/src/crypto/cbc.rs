// ## 📂 File: `src/crypto/cbc.rs`
// ## AES-256-CBC stream decryption with deferred padding removal

//! The decryptor holds exactly one decrypted block back. Only once the
//! input is known to be exhausted can the held block be treated as the
//! final one and have its PKCS#7 padding stripped.

use std::io::{ErrorKind, Read, Write};

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, KeyInit};
use aes::{Aes256Dec, Block as AesBlock};

use crate::constants::BLOCK_SIZE;
use crate::crypto::envelope::read_envelope_header;
use crate::crypto::kdf::derive_key_material;
use crate::crypto::types::DerivedKeyMaterial;
use crate::types::StreamError;

pub struct CbcStreamDecryptor {
    cipher: Aes256Dec,
    /// Previous ciphertext block (IV for the first one).
    chain: [u8; BLOCK_SIZE],
    /// Decrypted block not yet emitted.
    held: Option<[u8; BLOCK_SIZE]>,
    /// Ciphertext bytes waiting for a full block.
    partial: [u8; BLOCK_SIZE],
    partial_len: usize,
    blocks: u64,
}

impl CbcStreamDecryptor {
    pub fn new(material: &DerivedKeyMaterial) -> Self {
        Self {
            cipher: Aes256Dec::new(GenericArray::from_slice(&material.key)),
            chain: material.iv,
            held: None,
            partial: [0u8; BLOCK_SIZE],
            partial_len: 0,
            blocks: 0,
        }
    }

    /// Ciphertext blocks consumed so far.
    pub fn blocks(&self) -> u64 {
        self.blocks
    }

    /// Feed ciphertext. Plaintext that is certain not to be the final block
    /// is appended to `out`.
    pub fn update(&mut self, mut input: &[u8], out: &mut Vec<u8>) {
        if self.partial_len > 0 {
            let take = (BLOCK_SIZE - self.partial_len).min(input.len());
            self.partial[self.partial_len..self.partial_len + take].copy_from_slice(&input[..take]);
            self.partial_len += take;
            input = &input[take..];

            if self.partial_len < BLOCK_SIZE {
                return;
            }
            let block = self.partial;
            self.partial_len = 0;
            self.push_block(&block, out);
        }

        let mut blocks = input.chunks_exact(BLOCK_SIZE);
        for block in &mut blocks {
            let mut ct = [0u8; BLOCK_SIZE];
            ct.copy_from_slice(block);
            self.push_block(&ct, out);
        }

        let rest = blocks.remainder();
        self.partial[..rest.len()].copy_from_slice(rest);
        self.partial_len = rest.len();
    }

    /// End of input: strip padding from the held block and emit the remainder.
    pub fn finish(mut self, out: &mut Vec<u8>) -> Result<(), StreamError> {
        if self.partial_len != 0 {
            return Err(StreamError::Cipher(format!(
                "ciphertext not block aligned: {} trailing bytes",
                self.partial_len
            )));
        }

        let last = self
            .held
            .take()
            .ok_or_else(|| StreamError::Envelope("no ciphertext after envelope header".into()))?;

        let kept = strip_pkcs7(&last)?;
        out.extend_from_slice(kept);
        Ok(())
    }

    fn push_block(&mut self, ct: &[u8; BLOCK_SIZE], out: &mut Vec<u8>) {
        if let Some(prev_plain) = self.held.take() {
            out.extend_from_slice(&prev_plain);
        }

        let mut block = AesBlock::clone_from_slice(ct);
        self.cipher.decrypt_block(&mut block);

        let mut plain = [0u8; BLOCK_SIZE];
        for (i, p) in plain.iter_mut().enumerate() {
            *p = block[i] ^ self.chain[i];
        }

        self.chain = *ct;
        self.held = Some(plain);
        self.blocks += 1;
    }
}

/// PKCS#5/#7: last byte `p` in 1..=16, and the last `p` bytes all equal `p`.
pub fn strip_pkcs7(block: &[u8; BLOCK_SIZE]) -> Result<&[u8], StreamError> {
    let pad = block[BLOCK_SIZE - 1];
    if pad == 0 || pad as usize > BLOCK_SIZE {
        return Err(StreamError::Padding { value: pad });
    }

    let cut = BLOCK_SIZE - pad as usize;
    if block[cut..].iter().any(|&b| b != pad) {
        return Err(StreamError::Padding { value: pad });
    }
    Ok(&block[..cut])
}

/// Decrypt one whole envelope from `input` into `output`.
///
/// Reads in `chunk_size` pieces; `output` sees plaintext in the same order.
/// Returns the number of plaintext bytes written.
///
/// Errors:
/// - `Envelope` for a missing/short magic or no ciphertext
/// - `Cipher` for read failures and misaligned ciphertext
/// - `Padding` for a bad final block
/// - `Io` when `output` refuses a write
pub fn decrypt_envelope<R, W>(
    mut input: R,
    output: &mut W,
    password: &[u8],
    chunk_size: usize,
) -> Result<u64, StreamError>
where
    R: Read,
    W: Write,
{
    let header = read_envelope_header(&mut input)?;
    let material = derive_key_material(password, &header.salt);
    let mut decryptor = CbcStreamDecryptor::new(&material);

    let mut buf = vec![0u8; chunk_size.max(BLOCK_SIZE)];
    let mut plain = Vec::with_capacity(buf.len() + BLOCK_SIZE);
    let mut written = 0u64;

    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(StreamError::Cipher(format!("reading ciphertext: {e}"))),
        };

        decryptor.update(&buf[..n], &mut plain);
        if !plain.is_empty() {
            output.write_all(&plain)?;
            written += plain.len() as u64;
            plain.clear();
        }
    }

    decryptor.finish(&mut plain)?;
    output.write_all(&plain)?;
    output.flush()?;
    written += plain.len() as u64;

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_valid_padding() {
        let mut block = [0xAAu8; BLOCK_SIZE];
        block[12..].copy_from_slice(&[4, 4, 4, 4]);
        assert_eq!(strip_pkcs7(&block).unwrap().len(), 12);

        let full = [BLOCK_SIZE as u8; BLOCK_SIZE];
        assert!(strip_pkcs7(&full).unwrap().is_empty());
    }

    #[test]
    fn rejects_zero_and_oversized_pad() {
        let mut block = [0u8; BLOCK_SIZE];
        assert!(matches!(strip_pkcs7(&block), Err(StreamError::Padding { value: 0 })));
        block[BLOCK_SIZE - 1] = 17;
        assert!(matches!(strip_pkcs7(&block), Err(StreamError::Padding { value: 17 })));
    }

    #[test]
    fn rejects_inconsistent_pad_bytes() {
        let mut block = [0u8; BLOCK_SIZE];
        block[BLOCK_SIZE - 1] = 3;
        block[BLOCK_SIZE - 2] = 3;
        block[BLOCK_SIZE - 3] = 9;
        assert!(matches!(strip_pkcs7(&block), Err(StreamError::Padding { value: 3 })));
    }

    #[test]
    fn holds_back_exactly_one_block() {
        let material = DerivedKeyMaterial::default();
        let mut dec = CbcStreamDecryptor::new(&material);
        let mut out = Vec::new();

        dec.update(&[0u8; BLOCK_SIZE], &mut out);
        assert!(out.is_empty());

        // split the second block across two calls
        dec.update(&[0u8; 5], &mut out);
        assert!(out.is_empty());
        dec.update(&[0u8; BLOCK_SIZE - 5], &mut out);
        assert_eq!(out.len(), BLOCK_SIZE);
        assert_eq!(dec.blocks(), 2);
    }

    #[test]
    fn misaligned_tail_is_cipher_error() {
        let material = DerivedKeyMaterial::default();
        let mut dec = CbcStreamDecryptor::new(&material);
        let mut out = Vec::new();
        dec.update(&[0u8; BLOCK_SIZE + 3], &mut out);
        assert!(matches!(dec.finish(&mut out), Err(StreamError::Cipher(_))));
    }

    #[test]
    fn empty_ciphertext_is_envelope_error() {
        let dec = CbcStreamDecryptor::new(&DerivedKeyMaterial::default());
        let mut out = Vec::new();
        assert!(matches!(dec.finish(&mut out), Err(StreamError::Envelope(_))));
    }
}

//! AES-256-GCM authenticated encryption.
//!
//! Each call to `encrypt` generates a fresh random 12-byte iv and returns
//! it alongside the ciphertext. The vault container stores the iv in its
//! own field, so nothing is prepended to the ciphertext; the 16-byte GCM
//! auth tag rides appended to the ciphertext bytes.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use crate::errors::{Result, VaultError};

/// Size of the AES-256-GCM iv (nonce) in bytes.
pub const IV_LEN: usize = 12;

/// Encrypt `plaintext` with a 32-byte `key`.
///
/// Returns the fresh iv and the ciphertext (auth tag appended).
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<([u8; IV_LEN], Vec<u8>)> {
    // Build the cipher from the raw key bytes.
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| VaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    // Generate a random 12-byte iv. Never reused: a fresh one per call.
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    // Encrypt and authenticate the plaintext.
    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| VaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    Ok((nonce.into(), ciphertext))
}

/// Decrypt ciphertext produced by `encrypt`, given the stored iv.
///
/// Any failure (bad key, bad iv, flipped bit anywhere in the ciphertext
/// or tag) collapses into `DecryptionFailed`.
pub fn decrypt(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if iv.len() != IV_LEN {
        return Err(VaultError::DecryptionFailed);
    }
    let nonce = Nonce::from_slice(iv);

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| VaultError::DecryptionFailed)?;

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| VaultError::DecryptionFailed)?;

    Ok(plaintext)
}

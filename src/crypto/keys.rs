//! In-memory handling of the derived vault key.

use zeroize::Zeroize;

/// Length of the vault key (256 bits).
const KEY_LEN: usize = 32;

/// A wrapper around the 32-byte vault key that automatically zeroes
/// its memory when dropped.
///
/// The key exists only between unlock and lock; it is never persisted
/// anywhere.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct VaultKey {
    bytes: [u8; KEY_LEN],
}

impl VaultKey {
    /// Create a new `VaultKey` from raw derived bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to pass to the cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! The vault key is derived from the master password and the per-device
//! secret, combined as `"{password}::{device_secret}"`. Binding the device
//! secret into the KDF input means a stolen container plus the correct
//! password still fails to decrypt on an unknown machine.
//!
//! The iteration count is part of the container's implicit scheme: new
//! vaults are written at [`CURRENT_ITERATIONS`], older ones were written
//! at the counts in [`LEGACY_ITERATIONS`] (and without device binding).
//! The codec walks those candidates on unlock; this module only derives.

use hmac::Hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

/// Length of the salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Length of the derived key in bytes (256 bits, for AES-256).
const KEY_LEN: usize = 32;

/// Iteration count for newly written vaults.
pub const CURRENT_ITERATIONS: u32 = 1_000_000;

/// Iteration counts older vaults were written at, newest first.
pub const LEGACY_ITERATIONS: [u32; 2] = [700_000, 600_000];

/// Lowest iteration count accepted from configuration.
///
/// Enforced by `Settings::validate`, not here, so tests can drive the
/// real derivation path with small counts.
pub const MIN_ITERATIONS: u32 = 100_000;

/// Derive a 32-byte vault key from the password and device secret.
///
/// The same password + device secret + salt + iteration count always
/// produces the same key. Pass an empty `device_secret` to re-derive the
/// unbound keys legacy containers were written with.
///
/// This call is CPU-bound and blocks for its full duration; at production
/// iteration counts that is a noticeable pause. Run it off any thread that
/// must stay responsive.
pub fn derive_key(
    password: &str,
    device_secret: &str,
    salt: &[u8],
    iterations: u32,
) -> Result<[u8; KEY_LEN]> {
    if salt.len() != SALT_LEN {
        return Err(VaultError::KeyDerivationFailed(format!(
            "salt must be {SALT_LEN} bytes (got {})",
            salt.len()
        )));
    }
    if iterations == 0 {
        return Err(VaultError::KeyDerivationFailed(
            "iteration count must be at least 1".into(),
        ));
    }

    // Combined secret material; wiped once derivation is done.
    let combined = Zeroizing::new(format!("{password}::{device_secret}"));

    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(combined.as_bytes(), salt, iterations, &mut key)
        .map_err(|e| VaultError::KeyDerivationFailed(format!("PBKDF2 failed: {e}")))?;

    Ok(key)
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

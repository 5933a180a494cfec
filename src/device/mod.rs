//! Per-installation device identity.
//!
//! Each machine keeps a random 32-byte secret, hex-encoded, in a file
//! under the OS data directory. The secret feeds key derivation (device
//! binding); only its SHA-256 fingerprint ever appears inside a vault
//! document, so reading a decrypted vault never reveals the secret.

use std::fs;
use std::path::{Path, PathBuf};

use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

/// Length of the raw device secret in bytes (hex doubles it on disk).
const SECRET_LEN: usize = 32;

/// Default location of the secret: `<OS data dir>/ironvault/device.secret`.
pub fn default_secret_path() -> Result<PathBuf> {
    let base = dirs::data_dir().ok_or_else(|| {
        VaultError::DeviceSecretError("cannot determine the OS data directory".into())
    })?;
    Ok(base.join("ironvault").join("device.secret"))
}

/// Load this machine's device secret, generating it on first use.
///
/// The file is written with owner-only permissions. An existing file
/// that does not hold 64 hex characters is rejected rather than
/// silently replaced.
pub fn get_or_create_secret(path: &Path) -> Result<Zeroizing<String>> {
    if path.exists() {
        let raw = fs::read_to_string(path).map_err(|e| {
            VaultError::DeviceSecretError(format!("failed to read device secret: {e}"))
        })?;
        let secret = Zeroizing::new(raw.trim().to_string());
        validate_secret(&secret)?;
        return Ok(secret);
    }

    let mut bytes = [0u8; SECRET_LEN];
    rand::rng().fill_bytes(&mut bytes);
    let secret = Zeroizing::new(hex::encode(bytes));

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                VaultError::DeviceSecretError(format!(
                    "cannot create device secret directory: {e}"
                ))
            })?;
        }
    }

    fs::write(path, secret.as_bytes()).map_err(|e| {
        VaultError::DeviceSecretError(format!("failed to write device secret: {e}"))
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| {
            VaultError::DeviceSecretError(format!(
                "failed to set device secret permissions: {e}"
            ))
        })?;
    }

    Ok(secret)
}

fn validate_secret(secret: &str) -> Result<()> {
    if secret.len() != SECRET_LEN * 2 || !secret.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(VaultError::DeviceSecretError(format!(
            "device secret must be {} hex characters, got {} — the file may be corrupt",
            SECRET_LEN * 2,
            secret.len()
        )));
    }
    Ok(())
}

/// Hex SHA-256 of the device secret. This is what vault documents store.
pub fn fingerprint(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Human-readable name for this machine, used when the device takes its
/// slot at vault creation.
pub fn device_name() -> String {
    format!("Desktop ({})", std::env::consts::OS)
}

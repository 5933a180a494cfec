use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in IronVault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Wrong-password and wrong-device failures land here, as does tampered
    /// ciphertext. Callers must not be able to tell which one it was.
    #[error("Decryption failed — invalid password or unrecognized device")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Vault errors ---
    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    #[error("Malformed vault container: {0}")]
    MalformedContainer(String),

    #[error("Vault is locked — try again in {remaining_minutes} minute(s)")]
    VaultLocked { remaining_minutes: i64 },

    #[error("Session auto-locked after inactivity")]
    SessionExpired,

    #[error("Device limit reached — this vault already trusts {limit} device(s)")]
    DeviceLimitExceeded { limit: usize },

    #[error("Entry '{0}' not found")]
    EntryNotFound(String),

    #[error("Folder '{0}' not found")]
    FolderNotFound(String),

    #[error("Device '{0}' not found")]
    DeviceNotFound(String),

    // --- Device identity errors ---
    #[error("Device secret error: {0}")]
    DeviceSecretError(String),

    // --- Keyring errors ---
    #[error("Keyring error: {0}")]
    KeyringError(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("Password mismatch — passwords do not match")]
    PasswordMismatch,

    // --- Audit errors ---
    #[error("Audit error: {0}")]
    AuditError(String),
}

/// Convenience type alias for IronVault results.
pub type Result<T> = std::result::Result<T, VaultError>;

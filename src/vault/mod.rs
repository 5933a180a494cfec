//! Vault module — encrypted password storage.
//!
//! This module provides:
//! - The decrypted document model: entries, folders, cards, devices,
//!   activity log (`document`)
//! - The JSON container that goes on disk (`format`)
//! - Sealing and the multi-candidate unlock walk (`codec`)
//! - Failed-attempt counting and soft locks (`lockout`)
//! - Device slot admission (`devices`)
//! - Idle timeout tracking (`autolock`)
//! - Storage backends (`storage`)
//! - The high-level `VaultSession` tying it all together (`session`)

pub mod autolock;
pub mod codec;
pub mod devices;
pub mod document;
pub mod format;
pub mod lockout;
pub mod session;
pub mod storage;

// Re-export the most commonly used items.
pub use autolock::{AutoLock, DEFAULT_AUTO_LOCK_MINUTES};
pub use codec::{KeySchedule, UnlockOutcome};
pub use devices::DEFAULT_DEVICE_CAPACITY;
pub use document::{
    ActivityEvent, ActivityKind, CardEntry, CardType, DeviceSlot, Folder, PasswordEntry,
    SecuritySettings, VaultDocument, CURRENT_DOCUMENT_VERSION, DEFAULT_ACTIVITY_LIMIT,
};
pub use format::EncryptedContainer;
pub use lockout::LockStatus;
pub use session::{
    ActivitySink, CardDraft, DeviceProfile, FolderChanges, PasswordDraft, SessionConfig,
    UnlockReport, VaultSession,
};
pub use storage::{FileStorage, MemoryStorage, VaultStorage};

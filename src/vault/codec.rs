//! Sealing and opening vault documents.
//!
//! `seal` serializes a [`VaultDocument`] and encrypts it under the
//! current key scheme (device-bound, current iteration count, fresh salt
//! and iv). `open` walks an ordered, finite list of key-scheme candidates
//! so containers written by older releases still decrypt: the current
//! scheme first, then each known legacy scheme. Every attempt costs one
//! full PBKDF2 derivation plus one GCM pass, whether it succeeds or not.
//!
//! The candidate walk is a migration shim, not a security feature. Once
//! no pre-current containers remain in the wild, delete the legacy
//! entries from [`KeySchedule`] and this module shrinks to a single
//! derivation per open.

use zeroize::Zeroizing;

use crate::crypto::{self, derive_key, generate_salt, VaultKey, CURRENT_ITERATIONS, LEGACY_ITERATIONS};
use crate::errors::{Result, VaultError};

use super::document::{VaultDocument, CURRENT_DOCUMENT_VERSION};
use super::format::EncryptedContainer;

// ---------------------------------------------------------------------------
// Key schedule
// ---------------------------------------------------------------------------

/// Whether a key candidate mixes the device secret into derivation.
///
/// Early containers were written with an empty device secret; those only
/// open through the `Unbound` candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Device,
    Unbound,
}

/// One (binding, iteration-count) combination to try at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCandidate {
    pub binding: Binding,
    pub iterations: u32,
}

impl KeyCandidate {
    /// True for the scheme `seal` writes today.
    pub fn is_current(&self, schedule: &KeySchedule) -> bool {
        self.binding == Binding::Device && self.iterations == schedule.current_iterations
    }
}

/// The iteration counts this build knows how to derive with.
///
/// `current_iterations` is used for every write; the legacy list exists
/// only so old containers keep opening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchedule {
    pub current_iterations: u32,
    pub legacy_iterations: Vec<u32>,
}

impl KeySchedule {
    pub fn new(current_iterations: u32) -> Self {
        Self {
            current_iterations,
            legacy_iterations: LEGACY_ITERATIONS.to_vec(),
        }
    }

    /// All candidates in attempt order: device-bound first (current
    /// count, then legacy counts), unbound after.
    pub fn candidates(&self) -> Vec<KeyCandidate> {
        let per_binding = 1 + self.legacy_iterations.len();
        let mut out = Vec::with_capacity(2 * per_binding);
        for binding in [Binding::Device, Binding::Unbound] {
            out.push(KeyCandidate {
                binding,
                iterations: self.current_iterations,
            });
            for &iterations in &self.legacy_iterations {
                out.push(KeyCandidate { binding, iterations });
            }
        }
        out
    }
}

impl Default for KeySchedule {
    fn default() -> Self {
        Self::new(CURRENT_ITERATIONS)
    }
}

// ---------------------------------------------------------------------------
// Seal / open
// ---------------------------------------------------------------------------

/// Result of a successful `open`.
#[derive(Debug)]
pub struct UnlockOutcome {
    pub document: VaultDocument,

    /// True when a legacy candidate decrypted the container. The
    /// document's version has already been bumped in memory, so the next
    /// `seal` persists only the current scheme.
    pub upgraded: bool,

    /// The candidate that authenticated.
    pub candidate: KeyCandidate,
}

/// Serialize and encrypt a document under the current scheme.
///
/// Salt and iv are freshly random on every call; sealing the same
/// document twice never produces the same container bytes.
pub fn seal(
    document: &VaultDocument,
    password: &str,
    device_secret: &str,
    schedule: &KeySchedule,
) -> Result<EncryptedContainer> {
    let payload = Zeroizing::new(
        serde_json::to_vec(document)
            .map_err(|e| VaultError::SerializationError(format!("vault document: {e}")))?,
    );

    let salt = generate_salt();
    let key = VaultKey::new(derive_key(
        password,
        device_secret,
        &salt,
        schedule.current_iterations,
    )?);
    let (iv, ciphertext) = crypto::encrypt(key.as_bytes(), &payload)?;

    Ok(EncryptedContainer::new(ciphertext, iv, salt))
}

/// Decrypt a container, walking the schedule's candidates in order and
/// accepting the first key that authenticates.
///
/// A wrong password, an unrecognized device and a tampered container all
/// exhaust the walk and come back as the same [`VaultError::DecryptionFailed`];
/// callers cannot tell which it was. Structural problems in the container
/// or its decrypted payload surface as [`VaultError::MalformedContainer`].
pub fn open(
    container: &EncryptedContainer,
    password: &str,
    device_secret: &str,
    schedule: &KeySchedule,
) -> Result<UnlockOutcome> {
    container.validate()?;

    for candidate in schedule.candidates() {
        let secret = match candidate.binding {
            Binding::Device => device_secret,
            Binding::Unbound => "",
        };

        let key = VaultKey::new(derive_key(
            password,
            secret,
            &container.salt,
            candidate.iterations,
        )?);

        let plaintext = match crypto::decrypt(key.as_bytes(), &container.iv, &container.ciphertext)
        {
            Ok(bytes) => Zeroizing::new(bytes),
            Err(VaultError::DecryptionFailed) => continue,
            Err(e) => return Err(e),
        };

        let mut document: VaultDocument = serde_json::from_slice(&plaintext)
            .map_err(|e| VaultError::MalformedContainer(format!("decrypted payload: {e}")))?;

        let upgraded = !candidate.is_current(schedule);
        if upgraded {
            document.version = CURRENT_DOCUMENT_VERSION.to_string();
        }

        return Ok(UnlockOutcome {
            document,
            upgraded,
            candidate,
        });
    }

    Err(VaultError::DecryptionFailed)
}

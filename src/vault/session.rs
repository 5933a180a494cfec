//! Vault session orchestration.
//!
//! A [`VaultSession`] owns the storage collaborator, the device
//! identity, the lockout ledger and (while unlocked) the decrypted
//! document plus the master password. It is the only place plaintext
//! vault data lives.
//!
//! State machine: `NoVault -> Unlocked -> NoVault`, with a `LockedOut`
//! branch when an unlock runs into a persisted lock. Every mutation
//! re-encrypts and writes the whole container before it returns; there
//! is no deferred save.
//!
//! Unlock failures are counted in an in-session ledger *before* any key
//! derivation happens, so a locked vault costs nothing to refuse. The
//! matching activity events are parked in `pending_events` until a
//! successful unlock (or a lockout with usable credentials) lets them be
//! written into the encrypted log.

use std::path::PathBuf;

use uuid::Uuid;
use zeroize::Zeroizing;

use crate::device;
use crate::errors::{Result, VaultError};

use super::autolock::{AutoLock, DEFAULT_AUTO_LOCK_MINUTES};
use super::codec::{self, KeySchedule};
use super::devices::{self, Registration, DEFAULT_DEVICE_CAPACITY};
use super::document::{
    ActivityEvent, ActivityKind, CardEntry, CardType, DeviceSlot, Folder, PasswordEntry,
    SecuritySettings, VaultDocument, LOCAL_IP_PLACEHOLDER,
};
use super::format::EncryptedContainer;
use super::lockout::{self, LockStatus};
use super::storage::VaultStorage;

/// Out-of-band mirror for activity events (the SQLite audit trail in
/// the CLI). Never sees plaintext entries, only event metadata, and
/// must not fail the operation that feeds it.
pub trait ActivitySink {
    fn record(&self, kind: ActivityKind, details: &str, device_fingerprint: &str);
}

/// This machine's identity as the vault sees it.
pub struct DeviceProfile {
    secret: Zeroizing<String>,
    pub name: String,
    pub fingerprint: String,
}

impl DeviceProfile {
    /// Build a profile from the device secret; the fingerprint is
    /// derived, never supplied.
    pub fn new(secret: Zeroizing<String>, name: impl Into<String>) -> Self {
        let fingerprint = device::fingerprint(&secret);
        Self {
            secret,
            name: name.into(),
            fingerprint,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

/// Tunables the embedder (CLI config) supplies.
pub struct SessionConfig {
    pub schedule: KeySchedule,
    pub device_capacity: usize,
    pub max_failed_attempts: u32,
    pub lockout_duration_minutes: i64,
    pub auto_lock_minutes: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            schedule: KeySchedule::default(),
            device_capacity: DEFAULT_DEVICE_CAPACITY,
            max_failed_attempts: 3,
            lockout_duration_minutes: 30,
            auto_lock_minutes: DEFAULT_AUTO_LOCK_MINUTES,
        }
    }
}

/// What a successful [`VaultSession::unlock`] wants the caller to know.
#[derive(Debug, Clone, Copy)]
pub struct UnlockReport {
    /// The container was written by an older scheme and has been
    /// re-saved under the current one.
    pub upgraded: bool,
    /// This device took a new slot during the unlock.
    pub device_registered: bool,
}

/// Input for creating or replacing a password entry.
#[derive(Debug, Clone, Default)]
pub struct PasswordDraft {
    pub folder_id: Option<String>,
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: Option<String>,
    pub notes: Option<String>,
}

/// Input for creating or replacing a card entry.
#[derive(Debug, Clone)]
pub struct CardDraft {
    pub folder_id: Option<String>,
    pub card_name: String,
    pub card_holder: String,
    pub card_number: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: String,
    pub card_type: CardType,
    pub company: String,
    pub billing_address: Option<String>,
    pub notes: Option<String>,
}

/// Partial update for a folder. `parent_id: Some(None)` moves the
/// folder to the top level; `None` leaves the parent alone.
#[derive(Debug, Clone, Default)]
pub struct FolderChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub parent_id: Option<Option<String>>,
}

enum SessionState {
    NoVault,
    LockedOut {
        document: Box<VaultDocument>,
        password: Zeroizing<String>,
    },
    Unlocked {
        document: Box<VaultDocument>,
        password: Zeroizing<String>,
    },
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub struct VaultSession<S: VaultStorage> {
    storage: S,
    config: SessionConfig,
    device: DeviceProfile,
    sink: Option<Box<dyn ActivitySink>>,
    state: SessionState,
    /// Failed-attempt bookkeeping for this session, consulted before any
    /// key derivation. Adopts the document's persisted settings when a
    /// decrypt reveals them.
    ledger: SecuritySettings,
    /// Events recorded while no decrypted document was available.
    pending_events: Vec<ActivityEvent>,
    auto_lock: AutoLock,
    /// Set when best-effort lockout persistence fails; drained by the
    /// caller for display.
    save_warning: Option<String>,
}

impl<S: VaultStorage> VaultSession<S> {
    pub fn new(storage: S, device: DeviceProfile, config: SessionConfig) -> Self {
        let ledger = SecuritySettings {
            max_failed_attempts: config.max_failed_attempts,
            lockout_duration_minutes: config.lockout_duration_minutes,
            ..SecuritySettings::default()
        };
        let auto_lock = AutoLock::new(config.auto_lock_minutes, now_millis());
        Self {
            storage,
            config,
            device,
            sink: None,
            state: SessionState::NoVault,
            ledger,
            pending_events: Vec::new(),
            auto_lock,
            save_warning: None,
        }
    }

    pub fn with_sink(
        storage: S,
        device: DeviceProfile,
        config: SessionConfig,
        sink: Box<dyn ActivitySink>,
    ) -> Self {
        let mut session = Self::new(storage, device, config);
        session.sink = Some(sink);
        session
    }

    // -- metadata ----------------------------------------------------------

    pub fn vault_exists(&self) -> bool {
        self.storage.exists()
    }

    pub fn location(&self) -> PathBuf {
        self.storage.location()
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self.state, SessionState::Unlocked { .. })
    }

    pub fn device(&self) -> &DeviceProfile {
        &self.device
    }

    /// Current lockout view as this session knows it.
    pub fn lock_status(&self) -> LockStatus {
        lockout::check_status(&self.ledger, now_millis())
    }

    pub fn failed_attempts(&self) -> u32 {
        self.ledger.failed_attempt_count
    }

    /// A warning produced by best-effort persistence after a failed
    /// unlock, if any. Draining it is the caller's job; the primary
    /// error has already been surfaced.
    pub fn take_save_warning(&mut self) -> Option<String> {
        self.save_warning.take()
    }

    // -- lifecycle ---------------------------------------------------------

    /// Create a brand-new vault and leave the session unlocked on it.
    ///
    /// The creating device takes the first slot and the only event in
    /// the fresh log is its `device_registered`; `login_success` is
    /// reserved for real unlocks.
    pub fn create(&mut self, password: &str) -> Result<()> {
        if self.storage.exists() {
            return Err(VaultError::VaultAlreadyExists(self.storage.location()));
        }

        let now = now_millis();
        let mut document = VaultDocument::empty(now);
        document.security_settings.max_failed_attempts = self.config.max_failed_attempts;
        document.security_settings.lockout_duration_minutes = self.config.lockout_duration_minutes;

        devices::register(
            &mut document.device_slots,
            &self.device.name,
            &self.device.fingerprint,
            self.config.device_capacity,
            now,
        )?;
        let details = format!("Device \"{}\" registered", self.device.name);
        document.log_activity(
            ActivityKind::DeviceRegistered,
            &details,
            &self.device.fingerprint,
            now,
        );
        self.mirror(ActivityKind::DeviceRegistered, &details);

        let container = codec::seal(&document, password, self.device.secret(), &self.config.schedule)?;
        self.storage.write_bytes(&container.to_bytes()?)?;

        self.state = SessionState::Unlocked {
            document: Box::new(document),
            password: Zeroizing::new(password.to_string()),
        };
        self.auto_lock = AutoLock::new(self.config.auto_lock_minutes, now);
        Ok(())
    }

    /// Unlock the vault.
    ///
    /// Checks the lockout ledger before any key derivation; a locked
    /// vault is refused in constant time. On success the device slot is
    /// registered or refreshed, counters reset, `login_success` logged
    /// and the whole document re-saved (which also completes any legacy
    /// format upgrade). On failure the ledger advances and the generic
    /// [`VaultError::DecryptionFailed`] comes back, or
    /// [`VaultError::VaultLocked`] when this failure left the vault
    /// locked.
    pub fn unlock(&mut self, password: &str) -> Result<UnlockReport> {
        let now = now_millis();

        let status = lockout::check_status(&self.ledger, now);
        if status.locked {
            return Err(VaultError::VaultLocked {
                remaining_minutes: status.remaining_minutes,
            });
        }

        let bytes = self.storage.read_bytes()?;
        let container = EncryptedContainer::from_bytes(&bytes)?;

        let outcome =
            match codec::open(&container, password, self.device.secret(), &self.config.schedule) {
                Ok(outcome) => outcome,
                Err(VaultError::DecryptionFailed) => return Err(self.note_failed_attempt(now)),
                Err(e) => return Err(e),
            };
        let mut document = outcome.document;

        // A lock persisted by an earlier process survives a correct
        // password: adopt it and refuse without clearing anything.
        let doc_status = lockout::check_status(&document.security_settings, now);
        if doc_status.locked {
            self.ledger = document.security_settings.clone();
            self.state = SessionState::LockedOut {
                document: Box::new(document),
                password: Zeroizing::new(password.to_string()),
            };
            self.try_persist_lockout(now);
            return Err(VaultError::VaultLocked {
                remaining_minutes: doc_status.remaining_minutes,
            });
        }

        if !devices::can_access(
            &document.device_slots,
            &self.device.fingerprint,
            self.config.device_capacity,
        ) {
            return Err(VaultError::DeviceLimitExceeded {
                limit: self.config.device_capacity,
            });
        }

        // Failures noted earlier in this session become part of the log.
        let pending: Vec<ActivityEvent> = self.pending_events.drain(..).collect();
        document.activity_log.extend(pending);

        let slot_name = format!("Device {}", document.device_slots.len() + 1);
        let registration = devices::register(
            &mut document.device_slots,
            &slot_name,
            &self.device.fingerprint,
            self.config.device_capacity,
            now,
        )?;
        let device_registered = registration == Registration::New;
        if device_registered {
            let details = format!("New device registered: {slot_name}");
            document.log_activity(
                ActivityKind::DeviceRegistered,
                &details,
                &self.device.fingerprint,
                now,
            );
            self.mirror(ActivityKind::DeviceRegistered, &details);
        }

        lockout::record_success(&mut document.security_settings);
        lockout::record_success(&mut self.ledger);

        document.log_activity(
            ActivityKind::LoginSuccess,
            "Successful vault unlock",
            &self.device.fingerprint,
            now,
        );
        self.mirror(ActivityKind::LoginSuccess, "Successful vault unlock");

        let container = codec::seal(&document, password, self.device.secret(), &self.config.schedule)?;
        self.storage.write_bytes(&container.to_bytes()?)?;

        self.state = SessionState::Unlocked {
            document: Box::new(document),
            password: Zeroizing::new(password.to_string()),
        };
        self.auto_lock = AutoLock::new(self.config.auto_lock_minutes, now);

        Ok(UnlockReport {
            upgraded: outcome.upgraded,
            device_registered,
        })
    }

    /// Scrub the decrypted document and password and return to
    /// `NoVault`. The lockout ledger survives.
    pub fn lock(&mut self) {
        if let SessionState::Unlocked { document, .. } | SessionState::LockedOut { document, .. } =
            &mut self.state
        {
            document.scrub();
        }
        self.state = SessionState::NoVault;
    }

    // -- passwords ---------------------------------------------------------

    pub fn add_password(&mut self, draft: PasswordDraft) -> Result<PasswordEntry> {
        let now = now_millis();
        self.ensure_active(now)?;
        let (document, password) = Self::require_unlocked(&mut self.state)?;

        Self::require_folder(document, draft.folder_id.as_deref())?;

        let entry = PasswordEntry {
            id: Uuid::new_v4().to_string(),
            folder_id: draft.folder_id,
            title: draft.title,
            username: draft.username,
            password: draft.password,
            url: draft.url,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
            view_count: 0,
        };
        document.passwords.push(entry.clone());

        let details = format!("Password \"{}\" created", entry.title);
        Self::commit(
            &mut self.storage,
            &self.config,
            &self.device,
            self.sink.as_deref(),
            document,
            password,
            ActivityKind::PasswordCreate,
            &details,
            now,
        )?;
        Ok(entry)
    }

    pub fn update_password(&mut self, id: &str, draft: PasswordDraft) -> Result<PasswordEntry> {
        let now = now_millis();
        self.ensure_active(now)?;
        let (document, password) = Self::require_unlocked(&mut self.state)?;

        Self::require_folder(document, draft.folder_id.as_deref())?;

        let entry = document
            .password_mut(id)
            .ok_or_else(|| VaultError::EntryNotFound(id.to_string()))?;
        entry.folder_id = draft.folder_id;
        entry.title = draft.title;
        entry.username = draft.username;
        entry.password = draft.password;
        entry.url = draft.url;
        entry.notes = draft.notes;
        entry.updated_at = now;
        let updated = entry.clone();

        let details = format!("Password \"{}\" updated", updated.title);
        Self::commit(
            &mut self.storage,
            &self.config,
            &self.device,
            self.sink.as_deref(),
            document,
            password,
            ActivityKind::PasswordUpdate,
            &details,
            now,
        )?;
        Ok(updated)
    }

    pub fn delete_password(&mut self, id: &str) -> Result<PasswordEntry> {
        let now = now_millis();
        self.ensure_active(now)?;
        let (document, password) = Self::require_unlocked(&mut self.state)?;

        let index = document
            .passwords
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| VaultError::EntryNotFound(id.to_string()))?;
        let removed = document.passwords.remove(index);

        let details = format!("Password \"{}\" deleted", removed.title);
        Self::commit(
            &mut self.storage,
            &self.config,
            &self.device,
            self.sink.as_deref(),
            document,
            password,
            ActivityKind::PasswordDelete,
            &details,
            now,
        )?;
        Ok(removed)
    }

    /// Reveal an entry, bumping its view counter.
    pub fn view_password(&mut self, id: &str) -> Result<PasswordEntry> {
        let now = now_millis();
        self.ensure_active(now)?;
        let (document, password) = Self::require_unlocked(&mut self.state)?;

        let entry = document
            .password_mut(id)
            .ok_or_else(|| VaultError::EntryNotFound(id.to_string()))?;
        entry.view_count += 1;
        let viewed = entry.clone();

        let details = format!("Password \"{}\" viewed", viewed.title);
        Self::commit(
            &mut self.storage,
            &self.config,
            &self.device,
            self.sink.as_deref(),
            document,
            password,
            ActivityKind::PasswordView,
            &details,
            now,
        )?;
        Ok(viewed)
    }

    // -- cards -------------------------------------------------------------

    pub fn add_card(&mut self, draft: CardDraft) -> Result<CardEntry> {
        let now = now_millis();
        self.ensure_active(now)?;
        let (document, password) = Self::require_unlocked(&mut self.state)?;

        Self::require_folder(document, draft.folder_id.as_deref())?;

        let card = CardEntry {
            id: Uuid::new_v4().to_string(),
            folder_id: draft.folder_id,
            card_name: draft.card_name,
            card_holder: draft.card_holder,
            card_number: draft.card_number,
            expiry_month: draft.expiry_month,
            expiry_year: draft.expiry_year,
            cvv: draft.cvv,
            card_type: draft.card_type,
            company: draft.company,
            billing_address: draft.billing_address,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        };
        document.cards.push(card.clone());

        let details = format!("Card \"{}\" created", card.card_name);
        Self::commit(
            &mut self.storage,
            &self.config,
            &self.device,
            self.sink.as_deref(),
            document,
            password,
            ActivityKind::CardCreate,
            &details,
            now,
        )?;
        Ok(card)
    }

    pub fn update_card(&mut self, id: &str, draft: CardDraft) -> Result<CardEntry> {
        let now = now_millis();
        self.ensure_active(now)?;
        let (document, password) = Self::require_unlocked(&mut self.state)?;

        Self::require_folder(document, draft.folder_id.as_deref())?;

        let card = document
            .card_mut(id)
            .ok_or_else(|| VaultError::EntryNotFound(id.to_string()))?;
        card.folder_id = draft.folder_id;
        card.card_name = draft.card_name;
        card.card_holder = draft.card_holder;
        card.card_number = draft.card_number;
        card.expiry_month = draft.expiry_month;
        card.expiry_year = draft.expiry_year;
        card.cvv = draft.cvv;
        card.card_type = draft.card_type;
        card.company = draft.company;
        card.billing_address = draft.billing_address;
        card.notes = draft.notes;
        card.updated_at = now;
        let updated = card.clone();

        let details = format!("Card \"{}\" updated", updated.card_name);
        Self::commit(
            &mut self.storage,
            &self.config,
            &self.device,
            self.sink.as_deref(),
            document,
            password,
            ActivityKind::CardUpdate,
            &details,
            now,
        )?;
        Ok(updated)
    }

    pub fn delete_card(&mut self, id: &str) -> Result<CardEntry> {
        let now = now_millis();
        self.ensure_active(now)?;
        let (document, password) = Self::require_unlocked(&mut self.state)?;

        let index = document
            .cards
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| VaultError::EntryNotFound(id.to_string()))?;
        let removed = document.cards.remove(index);

        let details = format!("Card \"{}\" deleted", removed.card_name);
        Self::commit(
            &mut self.storage,
            &self.config,
            &self.device,
            self.sink.as_deref(),
            document,
            password,
            ActivityKind::CardDelete,
            &details,
            now,
        )?;
        Ok(removed)
    }

    /// Reveal a card's full details.
    pub fn view_card(&mut self, id: &str) -> Result<CardEntry> {
        let now = now_millis();
        self.ensure_active(now)?;
        let (document, password) = Self::require_unlocked(&mut self.state)?;

        let card = document
            .card(id)
            .ok_or_else(|| VaultError::EntryNotFound(id.to_string()))?
            .clone();

        let details = format!("Card \"{}\" viewed", card.card_name);
        Self::commit(
            &mut self.storage,
            &self.config,
            &self.device,
            self.sink.as_deref(),
            document,
            password,
            ActivityKind::CardView,
            &details,
            now,
        )?;
        Ok(card)
    }

    // -- folders -----------------------------------------------------------

    pub fn add_folder(
        &mut self,
        name: &str,
        description: Option<String>,
        color: Option<String>,
        parent_id: Option<String>,
    ) -> Result<Folder> {
        let now = now_millis();
        self.ensure_active(now)?;
        let (document, password) = Self::require_unlocked(&mut self.state)?;

        Self::require_folder(document, parent_id.as_deref())?;

        let folder = Folder {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description,
            color: color.unwrap_or_else(|| "bg-blue-500".to_string()),
            parent_id,
            created_at: now,
            updated_at: now,
        };
        document.folders.push(folder.clone());

        let details = format!("Folder \"{}\" created", folder.name);
        Self::commit(
            &mut self.storage,
            &self.config,
            &self.device,
            self.sink.as_deref(),
            document,
            password,
            ActivityKind::FolderCreate,
            &details,
            now,
        )?;
        Ok(folder)
    }

    pub fn update_folder(&mut self, id: &str, changes: FolderChanges) -> Result<Folder> {
        let now = now_millis();
        self.ensure_active(now)?;
        let (document, password) = Self::require_unlocked(&mut self.state)?;

        if document.folder(id).is_none() {
            return Err(VaultError::FolderNotFound(id.to_string()));
        }

        if let Some(new_parent) = &changes.parent_id {
            Self::require_folder(document, new_parent.as_deref())?;
            if let Some(parent_id) = new_parent.as_deref() {
                Self::ensure_no_cycle(document, id, parent_id)?;
            }
        }

        // Lookup repeated after the validation borrows are done.
        let folder = match document.folder_mut(id) {
            Some(folder) => folder,
            None => return Err(VaultError::FolderNotFound(id.to_string())),
        };
        if let Some(name) = changes.name {
            folder.name = name;
        }
        if let Some(description) = changes.description {
            folder.description = Some(description);
        }
        if let Some(color) = changes.color {
            folder.color = color;
        }
        if let Some(parent_id) = changes.parent_id {
            folder.parent_id = parent_id;
        }
        folder.updated_at = now;
        let updated = folder.clone();

        let details = format!("Folder \"{}\" updated", updated.name);
        Self::commit(
            &mut self.storage,
            &self.config,
            &self.device,
            self.sink.as_deref(),
            document,
            password,
            ActivityKind::FolderUpdate,
            &details,
            now,
        )?;
        Ok(updated)
    }

    /// Delete a folder. Child folders, password entries and card entries
    /// re-parent to the deleted folder's own parent, never left dangling.
    pub fn delete_folder(&mut self, id: &str) -> Result<Folder> {
        let now = now_millis();
        self.ensure_active(now)?;
        let (document, password) = Self::require_unlocked(&mut self.state)?;

        let index = document
            .folders
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| VaultError::FolderNotFound(id.to_string()))?;
        let removed = document.folders.remove(index);
        let new_parent = removed.parent_id.clone();

        for folder in &mut document.folders {
            if folder.parent_id.as_deref() == Some(id) {
                folder.parent_id = new_parent.clone();
            }
        }
        for entry in &mut document.passwords {
            if entry.folder_id.as_deref() == Some(id) {
                entry.folder_id = new_parent.clone();
            }
        }
        for card in &mut document.cards {
            if card.folder_id.as_deref() == Some(id) {
                card.folder_id = new_parent.clone();
            }
        }

        let details = format!("Folder \"{}\" deleted", removed.name);
        Self::commit(
            &mut self.storage,
            &self.config,
            &self.device,
            self.sink.as_deref(),
            document,
            password,
            ActivityKind::FolderDelete,
            &details,
            now,
        )?;
        Ok(removed)
    }

    // -- devices -----------------------------------------------------------

    /// Free another device's slot. The current device cannot revoke
    /// itself; lock the vault instead.
    pub fn revoke_device(&mut self, device_id: &str) -> Result<DeviceSlot> {
        let now = now_millis();
        self.ensure_active(now)?;
        let (document, password) = Self::require_unlocked(&mut self.state)?;

        if let Some(slot) = document.device_slots.iter().find(|s| s.id == device_id) {
            if slot.fingerprint == self.device.fingerprint {
                return Err(VaultError::CommandFailed(
                    "cannot revoke the device you are using — lock the vault instead".into(),
                ));
            }
        }

        let removed = devices::revoke(&mut document.device_slots, device_id)?;
        document.updated_at = now;

        // No activity kind exists for revocation in the document format;
        // the save itself is the record.
        Self::persist(&mut self.storage, &self.config, &self.device, document, password)?;
        Ok(removed)
    }

    // -- queries -----------------------------------------------------------

    pub fn passwords(&mut self) -> Result<&[PasswordEntry]> {
        let now = now_millis();
        self.ensure_active(now)?;
        let (document, _) = Self::require_unlocked(&mut self.state)?;
        Ok(&document.passwords)
    }

    pub fn cards(&mut self) -> Result<&[CardEntry]> {
        let now = now_millis();
        self.ensure_active(now)?;
        let (document, _) = Self::require_unlocked(&mut self.state)?;
        Ok(&document.cards)
    }

    pub fn folders(&mut self) -> Result<&[Folder]> {
        let now = now_millis();
        self.ensure_active(now)?;
        let (document, _) = Self::require_unlocked(&mut self.state)?;
        Ok(&document.folders)
    }

    pub fn devices(&mut self) -> Result<&[DeviceSlot]> {
        let now = now_millis();
        self.ensure_active(now)?;
        let (document, _) = Self::require_unlocked(&mut self.state)?;
        Ok(&document.device_slots)
    }

    /// Newest activity first.
    pub fn recent_activity(&mut self, limit: usize) -> Result<Vec<ActivityEvent>> {
        let now = now_millis();
        self.ensure_active(now)?;
        let (document, _) = Self::require_unlocked(&mut self.state)?;
        Ok(document.recent_activity(limit))
    }

    pub fn activity_by_kind(&mut self, kind: ActivityKind) -> Result<Vec<ActivityEvent>> {
        let now = now_millis();
        self.ensure_active(now)?;
        let (document, _) = Self::require_unlocked(&mut self.state)?;
        Ok(document.activity_by_kind(kind))
    }

    pub fn activity_by_device(&mut self, device_id: &str) -> Result<Vec<ActivityEvent>> {
        let now = now_millis();
        self.ensure_active(now)?;
        let (document, _) = Self::require_unlocked(&mut self.state)?;
        Ok(document.activity_by_device(device_id))
    }

    // -- internals ---------------------------------------------------------

    fn require_unlocked(
        state: &mut SessionState,
    ) -> Result<(&mut VaultDocument, &Zeroizing<String>)> {
        match state {
            SessionState::Unlocked { document, password } => Ok((document, password)),
            SessionState::LockedOut { .. } | SessionState::NoVault => Err(
                VaultError::CommandFailed("vault is not unlocked".into()),
            ),
        }
    }

    fn require_folder(document: &VaultDocument, folder_id: Option<&str>) -> Result<()> {
        if let Some(folder_id) = folder_id {
            if document.folder(folder_id).is_none() {
                return Err(VaultError::FolderNotFound(folder_id.to_string()));
            }
        }
        Ok(())
    }

    /// Refuse a parent change that would make `folder_id` its own
    /// ancestor.
    fn ensure_no_cycle(document: &VaultDocument, folder_id: &str, new_parent: &str) -> Result<()> {
        let mut current = Some(new_parent.to_string());
        let mut hops = 0;
        while let Some(id) = current {
            if id == folder_id {
                return Err(VaultError::CommandFailed(
                    "cannot move a folder into its own subtree".into(),
                ));
            }
            hops += 1;
            if hops > document.folders.len() {
                break;
            }
            current = document.folder(&id).and_then(|f| f.parent_id.clone());
        }
        Ok(())
    }

    /// Auto-lock check at the top of every document operation. An
    /// expired idle window scrubs the session before refusing.
    fn ensure_active(&mut self, now_ms: i64) -> Result<()> {
        if matches!(self.state, SessionState::Unlocked { .. }) && self.auto_lock.expired(now_ms) {
            self.lock();
            return Err(VaultError::SessionExpired);
        }
        self.auto_lock.touch(now_ms);
        Ok(())
    }

    fn mirror(&self, kind: ActivityKind, details: &str) {
        if let Some(sink) = &self.sink {
            sink.record(kind, details, &self.device.fingerprint);
        }
    }

    fn push_pending(&mut self, kind: ActivityKind, details: &str, now_ms: i64) {
        self.pending_events.push(ActivityEvent {
            id: Uuid::new_v4().to_string(),
            timestamp: now_ms,
            kind,
            details: details.to_string(),
            device_id: self.device.fingerprint.clone(),
            ip_address: LOCAL_IP_PLACEHOLDER.to_string(),
        });
    }

    /// Advance the ledger after a failed decrypt and shape the error the
    /// caller sees: the failure that locks the vault reports the lock,
    /// earlier ones stay generic.
    fn note_failed_attempt(&mut self, now_ms: i64) -> VaultError {
        let transitioned = lockout::record_failure(&mut self.ledger, now_ms);

        self.push_pending(ActivityKind::LoginFail, "Failed login attempt", now_ms);
        self.mirror(ActivityKind::LoginFail, "Failed login attempt");

        let status = lockout::check_status(&self.ledger, now_ms);
        if transitioned {
            let details = format!("Vault locked for {} minutes", status.remaining_minutes);
            self.push_pending(ActivityKind::SoftLock, &details, now_ms);
            self.mirror(ActivityKind::SoftLock, &details);
        }

        self.try_persist_lockout(now_ms);

        if status.locked {
            VaultError::VaultLocked {
                remaining_minutes: status.remaining_minutes,
            }
        } else {
            VaultError::DecryptionFailed
        }
    }

    /// Best-effort write of the ledger into the persisted document,
    /// possible only while re-encryption credentials are held. A failure
    /// here never escalates; the caller already has the primary error.
    fn try_persist_lockout(&mut self, now_ms: i64) {
        let (document, password) = match &mut self.state {
            SessionState::LockedOut { document, password }
            | SessionState::Unlocked { document, password } => (document, password),
            SessionState::NoVault => return,
        };

        document.security_settings = self.ledger.clone();
        let drained: Vec<ActivityEvent> = self.pending_events.drain(..).collect();
        document.activity_log.extend(drained);
        document.updated_at = now_ms;

        let result = codec::seal(document, password, self.device.secret(), &self.config.schedule)
            .and_then(|container| container.to_bytes())
            .and_then(|bytes| self.storage.write_bytes(&bytes));

        if let Err(e) = result {
            self.save_warning = Some(format!("failed to persist lockout state: {e}"));
        }
    }

    /// Log the operation's event, mirror it to the sink, re-encrypt and
    /// write. One call per logical mutation.
    #[allow(clippy::too_many_arguments)]
    fn commit(
        storage: &mut S,
        config: &SessionConfig,
        device: &DeviceProfile,
        sink: Option<&dyn ActivitySink>,
        document: &mut VaultDocument,
        password: &str,
        kind: ActivityKind,
        details: &str,
        now_ms: i64,
    ) -> Result<()> {
        document.log_activity(kind, details, &device.fingerprint, now_ms);
        if let Some(sink) = sink {
            sink.record(kind, details, &device.fingerprint);
        }
        Self::persist(storage, config, device, document, password)
    }

    fn persist(
        storage: &mut S,
        config: &SessionConfig,
        device: &DeviceProfile,
        document: &VaultDocument,
        password: &str,
    ) -> Result<()> {
        let container = codec::seal(document, password, device.secret(), &config.schedule)?;
        storage.write_bytes(&container.to_bytes()?)
    }
}

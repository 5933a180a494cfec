//! Integration tests for the vault session: the unlock protocol, failed
//! attempts and lockout, device slots, and the entry/folder/card
//! operations with their activity log records.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tempfile::TempDir;
use zeroize::Zeroizing;

use ironvault::device;
use ironvault::errors::{Result, VaultError};
use ironvault::vault::{
    codec, devices, ActivityKind, CardDraft, CardType, DeviceProfile, EncryptedContainer,
    FileStorage, FolderChanges, KeySchedule, MemoryStorage, PasswordDraft, SessionConfig,
    VaultDocument, VaultSession, VaultStorage,
};

const PASSWORD: &str = "correct-horse-battery-staple!";
const SECRET_A: &str = "aaaa1111aaaa1111aaaa1111aaaa1111";
const SECRET_B: &str = "bbbb2222bbbb2222bbbb2222bbbb2222";

/// Small iteration counts keep each PBKDF2 call fast; the derivation
/// path is identical to production.
fn fast_schedule() -> KeySchedule {
    KeySchedule {
        current_iterations: 16,
        legacy_iterations: vec![8, 4],
    }
}

fn fast_config() -> SessionConfig {
    SessionConfig {
        schedule: fast_schedule(),
        device_capacity: 2,
        max_failed_attempts: 3,
        lockout_duration_minutes: 30,
        auto_lock_minutes: 15,
    }
}

fn profile(secret: &str) -> DeviceProfile {
    DeviceProfile::new(Zeroizing::new(secret.to_string()), "Test Device")
}

fn session_at(path: &Path, secret: &str) -> VaultSession<FileStorage> {
    VaultSession::new(FileStorage::new(path), profile(secret), fast_config())
}

fn vault_file(dir: &TempDir) -> PathBuf {
    dir.path().join("vault.json")
}

/// Create a vault at `dir` and lock it again, returning its path.
fn seeded_vault(dir: &TempDir) -> PathBuf {
    let path = vault_file(dir);
    let mut session = session_at(&path, SECRET_A);
    session.create(PASSWORD).unwrap();
    session.lock();
    path
}

/// Decrypt the on-disk container directly, bypassing the session.
fn read_document(path: &Path, secret: &str) -> VaultDocument {
    let bytes = fs::read(path).unwrap();
    let container = EncryptedContainer::from_bytes(&bytes).unwrap();
    codec::open(&container, PASSWORD, secret, &fast_schedule())
        .unwrap()
        .document
}

fn draft(title: &str) -> PasswordDraft {
    PasswordDraft {
        folder_id: None,
        title: title.to_string(),
        username: "user@example.com".to_string(),
        password: "hunter2".to_string(),
        url: None,
        notes: None,
    }
}

fn card_draft(name: &str) -> CardDraft {
    CardDraft {
        folder_id: None,
        card_name: name.to_string(),
        card_holder: "A Person".to_string(),
        card_number: "4111111111111111".to_string(),
        expiry_month: "04".to_string(),
        expiry_year: "2030".to_string(),
        cvv: "123".to_string(),
        card_type: CardType::Credit,
        company: "Some Bank".to_string(),
        billing_address: None,
        notes: None,
    }
}

// ---------------------------------------------------------------------------
// Lifecycle: create, lock, unlock
// ---------------------------------------------------------------------------

#[test]
fn create_unlocks_and_registers_this_device() {
    let dir = TempDir::new().unwrap();
    let path = vault_file(&dir);
    let mut session = session_at(&path, SECRET_A);
    assert!(!session.vault_exists());

    session.create(PASSWORD).unwrap();

    assert!(session.is_unlocked());
    assert!(session.vault_exists());
    assert!(path.exists());

    // The only event in a fresh vault is this device taking its slot;
    // creation is not an unlock.
    let events = session.recent_activity(10).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, ActivityKind::DeviceRegistered);
    assert_eq!(events[0].details, "Device \"Test Device\" registered");
    assert_eq!(events[0].ip_address, "local");
    assert!(session
        .activity_by_kind(ActivityKind::LoginSuccess)
        .unwrap()
        .is_empty());

    let slots = session.devices().unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].name, "Test Device");
    assert_eq!(slots[0].fingerprint, device::fingerprint(SECRET_A));
}

#[test]
fn create_refuses_an_existing_vault() {
    let dir = TempDir::new().unwrap();
    let path = seeded_vault(&dir);

    let mut session = session_at(&path, SECRET_A);
    assert!(matches!(
        session.create(PASSWORD),
        Err(VaultError::VaultAlreadyExists(_))
    ));
}

#[test]
fn unlock_missing_vault_is_not_a_failed_attempt() {
    let dir = TempDir::new().unwrap();
    let mut session = session_at(&vault_file(&dir), SECRET_A);

    let err = session.unlock(PASSWORD).unwrap_err();
    assert!(matches!(err, VaultError::VaultNotFound(_)));
    assert_eq!(session.failed_attempts(), 0);
}

#[test]
fn lock_then_unlock_round_trips_entries_and_logs_the_login() {
    let dir = TempDir::new().unwrap();
    let path = vault_file(&dir);

    let mut first = session_at(&path, SECRET_A);
    first.create(PASSWORD).unwrap();
    first.add_password(draft("GitHub")).unwrap();
    first.lock();

    assert!(!first.is_unlocked());
    assert!(matches!(first.passwords(), Err(VaultError::CommandFailed(_))));

    let mut second = session_at(&path, SECRET_A);
    let report = second.unlock(PASSWORD).unwrap();
    assert!(!report.upgraded);
    assert!(!report.device_registered);

    assert_eq!(second.passwords().unwrap()[0].title, "GitHub");
    assert_eq!(second.passwords().unwrap()[0].password, "hunter2");

    let logins = second.activity_by_kind(ActivityKind::LoginSuccess).unwrap();
    assert_eq!(logins.len(), 1);
    assert_eq!(logins[0].details, "Successful vault unlock");
}

// ---------------------------------------------------------------------------
// Failed attempts and lockout
// ---------------------------------------------------------------------------

#[test]
fn wrong_password_counts_and_stays_generic() {
    let dir = TempDir::new().unwrap();
    let path = seeded_vault(&dir);

    let mut session = session_at(&path, SECRET_A);
    let err = session.unlock("not-the-password").unwrap_err();

    // The error names neither the password nor the device as the cause.
    assert_eq!(
        err.to_string(),
        "Decryption failed — invalid password or unrecognized device"
    );
    assert!(matches!(err, VaultError::DecryptionFailed));
    assert_eq!(session.failed_attempts(), 1);
}

#[test]
fn third_failure_locks_and_the_lock_gates_every_attempt() {
    let dir = TempDir::new().unwrap();
    let path = seeded_vault(&dir);

    let mut session = session_at(&path, SECRET_A);
    for _ in 0..2 {
        assert!(matches!(
            session.unlock("bad"),
            Err(VaultError::DecryptionFailed)
        ));
    }

    let err = session.unlock("bad").unwrap_err();
    assert!(matches!(
        err,
        VaultError::VaultLocked {
            remaining_minutes: 30
        }
    ));
    assert!(session.lock_status().locked);
    assert_eq!(session.failed_attempts(), 3);

    // Even the correct password is refused, before any key derivation.
    let err = session.unlock(PASSWORD).unwrap_err();
    assert!(matches!(err, VaultError::VaultLocked { .. }));
}

#[test]
fn lockout_is_persisted_while_credentials_are_held() {
    let dir = TempDir::new().unwrap();
    let path = vault_file(&dir);

    // A session that created the vault still holds the document and
    // password, so its failed attempts reach the encrypted log.
    let mut session = session_at(&path, SECRET_A);
    session.create(PASSWORD).unwrap();
    for _ in 0..2 {
        assert!(matches!(
            session.unlock("bad"),
            Err(VaultError::DecryptionFailed)
        ));
    }
    assert!(matches!(
        session.unlock("bad"),
        Err(VaultError::VaultLocked { .. })
    ));
    assert!(session.take_save_warning().is_none());

    let doc = read_document(&path, SECRET_A);
    assert!(doc.security_settings.is_locked);
    assert_eq!(doc.security_settings.failed_attempt_count, 3);
    assert!(doc.security_settings.lock_until > 0);

    let fails = doc.activity_by_kind(ActivityKind::LoginFail);
    assert_eq!(fails.len(), 3);
    assert_eq!(fails[0].details, "Failed login attempt");

    // The unlocked-to-locked edge is logged exactly once.
    let soft_locks = doc.activity_by_kind(ActivityKind::SoftLock);
    assert_eq!(soft_locks.len(), 1);
    assert_eq!(soft_locks[0].details, "Vault locked for 30 minutes");
}

#[test]
fn persisted_lockout_survives_a_new_session() {
    let dir = TempDir::new().unwrap();
    let path = vault_file(&dir);

    let mut first = session_at(&path, SECRET_A);
    first.create(PASSWORD).unwrap();
    for _ in 0..3 {
        let _ = first.unlock("bad");
    }

    // A fresh session decrypts fine with the correct password, finds the
    // persisted lock and adopts it instead of clearing it.
    let mut second = session_at(&path, SECRET_A);
    let err = second.unlock(PASSWORD).unwrap_err();
    assert!(matches!(
        err,
        VaultError::VaultLocked {
            remaining_minutes: 30
        }
    ));
    assert!(second.lock_status().locked);

    // From here the adopted ledger refuses before any derivation.
    let err = second.unlock(PASSWORD).unwrap_err();
    assert!(matches!(err, VaultError::VaultLocked { .. }));
}

#[test]
fn failures_in_a_fresh_session_merge_into_the_log_on_success() {
    let dir = TempDir::new().unwrap();
    let path = seeded_vault(&dir);

    // Without a decrypted document the failures can only be parked.
    let mut session = session_at(&path, SECRET_A);
    assert!(matches!(
        session.unlock("wrong-1"),
        Err(VaultError::DecryptionFailed)
    ));
    assert!(matches!(
        session.unlock("wrong-2"),
        Err(VaultError::DecryptionFailed)
    ));
    assert_eq!(session.failed_attempts(), 2);

    session.unlock(PASSWORD).unwrap();
    assert_eq!(session.failed_attempts(), 0);

    let fails = session.activity_by_kind(ActivityKind::LoginFail).unwrap();
    assert_eq!(fails.len(), 2);
    assert_eq!(fails[0].details, "Failed login attempt");

    // The merged events are in the persisted document, not just in memory.
    session.lock();
    let doc = read_document(&path, SECRET_A);
    assert_eq!(doc.activity_by_kind(ActivityKind::LoginFail).len(), 2);
    assert_eq!(doc.activity_by_kind(ActivityKind::LoginSuccess).len(), 1);
    assert_eq!(doc.security_settings.failed_attempt_count, 0);
}

#[test]
fn custom_thresholds_flow_from_the_config() {
    let dir = TempDir::new().unwrap();
    let path = vault_file(&dir);

    let mut config = fast_config();
    config.max_failed_attempts = 2;
    config.lockout_duration_minutes = 5;
    let mut session = VaultSession::new(FileStorage::new(&path), profile(SECRET_A), config);
    session.create(PASSWORD).unwrap();

    assert!(matches!(
        session.unlock("bad"),
        Err(VaultError::DecryptionFailed)
    ));
    let err = session.unlock("bad").unwrap_err();
    assert!(matches!(
        err,
        VaultError::VaultLocked {
            remaining_minutes: 5
        }
    ));

    let doc = read_document(&path, SECRET_A);
    assert_eq!(doc.security_settings.max_failed_attempts, 2);
    assert_eq!(doc.security_settings.lockout_duration_minutes, 5);
    let soft_locks = doc.activity_by_kind(ActivityKind::SoftLock);
    assert_eq!(soft_locks.len(), 1);
    assert_eq!(soft_locks[0].details, "Vault locked for 5 minutes");
}

// ---------------------------------------------------------------------------
// Device slots and binding
// ---------------------------------------------------------------------------

#[test]
fn wrong_device_secret_reads_as_wrong_password() {
    let dir = TempDir::new().unwrap();
    let path = seeded_vault(&dir);

    let mut session = session_at(&path, SECRET_B);
    let err = session.unlock(PASSWORD).unwrap_err();
    assert!(matches!(err, VaultError::DecryptionFailed));
    assert_eq!(session.failed_attempts(), 1);
}

#[test]
fn unbound_legacy_container_enrolls_and_binds_this_device() {
    let dir = TempDir::new().unwrap();
    let path = vault_file(&dir);

    // Written by an older build: no device binding, legacy iteration count.
    let old_schedule = KeySchedule {
        current_iterations: 8,
        legacy_iterations: vec![],
    };
    let doc = VaultDocument::empty(1_000);
    let container = codec::seal(&doc, PASSWORD, "", &old_schedule).unwrap();
    fs::write(&path, container.to_bytes().unwrap()).unwrap();

    // First unlock goes through the unbound candidate, takes slot 1 and
    // reseals under the current device-bound scheme.
    let mut first = session_at(&path, SECRET_A);
    let report = first.unlock(PASSWORD).unwrap();
    assert!(report.upgraded);
    assert!(report.device_registered);

    let registered = first
        .activity_by_kind(ActivityKind::DeviceRegistered)
        .unwrap();
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0].details, "New device registered: Device 1");
    first.lock();

    // Same device: opens at the current scheme, slot refreshed not re-added.
    let mut again = session_at(&path, SECRET_A);
    let report = again.unlock(PASSWORD).unwrap();
    assert!(!report.upgraded);
    assert!(!report.device_registered);
    assert_eq!(again.devices().unwrap().len(), 1);
    again.lock();

    // Any other machine is locked out by the binding now.
    let mut other = session_at(&path, SECRET_B);
    assert!(matches!(
        other.unlock(PASSWORD),
        Err(VaultError::DecryptionFailed)
    ));
}

#[test]
fn device_refusal_is_not_a_failed_attempt() {
    // A vault whose two slots belong to other machines, but sealed under
    // this device's key: it decrypts, then the slot check refuses it.
    let mut doc = VaultDocument::empty(1_000);
    devices::register(
        &mut doc.device_slots,
        "Laptop",
        &device::fingerprint("other-1"),
        2,
        1_000,
    )
    .unwrap();
    devices::register(
        &mut doc.device_slots,
        "Phone",
        &device::fingerprint("other-2"),
        2,
        1_000,
    )
    .unwrap();
    let container = codec::seal(&doc, PASSWORD, SECRET_A, &fast_schedule()).unwrap();

    let storage = MemoryStorage::with_bytes(container.to_bytes().unwrap());
    let mut session = VaultSession::new(storage, profile(SECRET_A), fast_config());
    let err = session.unlock(PASSWORD).unwrap_err();
    assert!(matches!(err, VaultError::DeviceLimitExceeded { limit: 2 }));
    assert_eq!(session.failed_attempts(), 0);
    assert!(!session.lock_status().locked);
}

#[test]
fn revoke_frees_a_foreign_slot_but_never_our_own() {
    let dir = TempDir::new().unwrap();
    let path = seeded_vault(&dir);

    // Plant a second trusted device, resealing under this device's key.
    let mut doc = read_document(&path, SECRET_A);
    devices::register(
        &mut doc.device_slots,
        "Laptop",
        &device::fingerprint("other"),
        2,
        2_000,
    )
    .unwrap();
    let container = codec::seal(&doc, PASSWORD, SECRET_A, &fast_schedule()).unwrap();
    fs::write(&path, container.to_bytes().unwrap()).unwrap();

    let mut session = session_at(&path, SECRET_A);
    session.unlock(PASSWORD).unwrap();

    let slots = session.devices().unwrap().to_vec();
    assert_eq!(slots.len(), 2);
    let own_fingerprint = session.device().fingerprint.clone();
    let own = slots.iter().find(|s| s.fingerprint == own_fingerprint).unwrap();
    let other = slots.iter().find(|s| s.fingerprint != own_fingerprint).unwrap();

    let err = session.revoke_device(&own.id).unwrap_err();
    assert!(matches!(err, VaultError::CommandFailed(_)));

    let removed = session.revoke_device(&other.id).unwrap();
    assert_eq!(removed.name, "Laptop");
    assert_eq!(session.devices().unwrap().len(), 1);

    // The freed slot is gone from the persisted vault too.
    session.lock();
    let doc = read_document(&path, SECRET_A);
    assert_eq!(doc.device_slots.len(), 1);
    assert_eq!(doc.device_slots[0].fingerprint, own_fingerprint);
}

// ---------------------------------------------------------------------------
// Passwords, cards, folders
// ---------------------------------------------------------------------------

#[test]
fn password_crud_round_trip_with_activity() {
    let dir = TempDir::new().unwrap();
    let mut session = session_at(&vault_file(&dir), SECRET_A);
    session.create(PASSWORD).unwrap();

    let entry = session.add_password(draft("GitHub")).unwrap();
    assert_eq!(entry.view_count, 0);
    assert_eq!(session.passwords().unwrap().len(), 1);

    // Revealing bumps the counter each time.
    let viewed = session.view_password(&entry.id).unwrap();
    assert_eq!(viewed.view_count, 1);
    assert_eq!(viewed.password, "hunter2");
    let viewed = session.view_password(&entry.id).unwrap();
    assert_eq!(viewed.view_count, 2);

    let mut changes = draft("GitHub (work)");
    changes.username = "work@example.com".to_string();
    let updated = session.update_password(&entry.id, changes).unwrap();
    assert_eq!(updated.title, "GitHub (work)");
    assert_eq!(updated.username, "work@example.com");
    assert!(updated.updated_at >= updated.created_at);
    assert_eq!(updated.view_count, 2);

    let removed = session.delete_password(&entry.id).unwrap();
    assert_eq!(removed.title, "GitHub (work)");
    assert!(session.passwords().unwrap().is_empty());
    assert!(matches!(
        session.delete_password(&entry.id),
        Err(VaultError::EntryNotFound(_))
    ));

    // Every step left its event in the log.
    assert_eq!(
        session
            .activity_by_kind(ActivityKind::PasswordCreate)
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        session
            .activity_by_kind(ActivityKind::PasswordView)
            .unwrap()
            .len(),
        2
    );
    assert_eq!(
        session
            .activity_by_kind(ActivityKind::PasswordUpdate)
            .unwrap()
            .len(),
        1
    );
    let deletes = session
        .activity_by_kind(ActivityKind::PasswordDelete)
        .unwrap();
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].details, "Password \"GitHub (work)\" deleted");
}

#[test]
fn card_crud_round_trip_with_activity() {
    let dir = TempDir::new().unwrap();
    let mut session = session_at(&vault_file(&dir), SECRET_A);
    session.create(PASSWORD).unwrap();

    let card = session.add_card(card_draft("Personal Visa")).unwrap();
    let viewed = session.view_card(&card.id).unwrap();
    assert_eq!(viewed.card_number, "4111111111111111");
    assert_eq!(viewed.cvv, "123");

    let mut changes = card_draft("Personal Visa");
    changes.expiry_year = "2031".to_string();
    let updated = session.update_card(&card.id, changes).unwrap();
    assert_eq!(updated.expiry_year, "2031");

    let removed = session.delete_card(&card.id).unwrap();
    assert_eq!(removed.card_name, "Personal Visa");
    assert!(session.cards().unwrap().is_empty());

    for kind in [
        ActivityKind::CardCreate,
        ActivityKind::CardView,
        ActivityKind::CardUpdate,
        ActivityKind::CardDelete,
    ] {
        assert_eq!(
            session.activity_by_kind(kind).unwrap().len(),
            1,
            "missing event for {kind}"
        );
    }
}

#[test]
fn unknown_folder_is_refused_before_the_entry_lands() {
    let dir = TempDir::new().unwrap();
    let mut session = session_at(&vault_file(&dir), SECRET_A);
    session.create(PASSWORD).unwrap();

    let mut dangling = draft("Dangling");
    dangling.folder_id = Some("no-such-folder".to_string());
    assert!(matches!(
        session.add_password(dangling),
        Err(VaultError::FolderNotFound(_))
    ));
    assert!(session.passwords().unwrap().is_empty());
}

#[test]
fn deleting_a_folder_reparents_its_contents() {
    let dir = TempDir::new().unwrap();
    let mut session = session_at(&vault_file(&dir), SECRET_A);
    session.create(PASSWORD).unwrap();

    let work = session
        .add_folder("Work", Some("Office accounts".to_string()), None, None)
        .unwrap();
    assert_eq!(work.color, "bg-blue-500");

    let projects = session
        .add_folder("Projects", None, None, Some(work.id.clone()))
        .unwrap();
    let archive = session
        .add_folder("Archive", None, None, Some(projects.id.clone()))
        .unwrap();

    let mut entry = draft("Jira");
    entry.folder_id = Some(projects.id.clone());
    let entry = session.add_password(entry).unwrap();

    let mut card = card_draft("Corp Card");
    card.folder_id = Some(projects.id.clone());
    let card = session.add_card(card).unwrap();

    // Deleting the middle folder moves children and entries up one level.
    session.delete_folder(&projects.id).unwrap();
    assert_eq!(
        session.passwords().unwrap()[0].folder_id.as_deref(),
        Some(work.id.as_str())
    );
    assert_eq!(
        session.cards().unwrap()[0].folder_id.as_deref(),
        Some(work.id.as_str())
    );
    {
        let folders = session.folders().unwrap();
        let archive_now = folders.iter().find(|f| f.id == archive.id).unwrap();
        assert_eq!(archive_now.parent_id.as_deref(), Some(work.id.as_str()));
    }

    // Deleting a top-level folder moves everything to the top level.
    session.delete_folder(&work.id).unwrap();
    assert_eq!(session.folders().unwrap().len(), 1);
    assert_eq!(session.passwords().unwrap()[0].id, entry.id);
    assert_eq!(session.passwords().unwrap()[0].folder_id, None);
    assert_eq!(session.cards().unwrap()[0].id, card.id);
    assert_eq!(session.cards().unwrap()[0].folder_id, None);
}

#[test]
fn a_folder_cannot_move_into_its_own_subtree() {
    let dir = TempDir::new().unwrap();
    let mut session = session_at(&vault_file(&dir), SECRET_A);
    session.create(PASSWORD).unwrap();

    let a = session.add_folder("A", None, None, None).unwrap();
    let b = session
        .add_folder("B", None, None, Some(a.id.clone()))
        .unwrap();

    let err = session
        .update_folder(
            &a.id,
            FolderChanges {
                parent_id: Some(Some(b.id.clone())),
                ..FolderChanges::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, VaultError::CommandFailed(_)));

    let err = session
        .update_folder(
            &a.id,
            FolderChanges {
                parent_id: Some(Some(a.id.clone())),
                ..FolderChanges::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, VaultError::CommandFailed(_)));

    // Moving to the top level is always allowed.
    let moved = session
        .update_folder(
            &b.id,
            FolderChanges {
                parent_id: Some(None),
                ..FolderChanges::default()
            },
        )
        .unwrap();
    assert_eq!(moved.parent_id, None);
}

// ---------------------------------------------------------------------------
// Auto-lock
// ---------------------------------------------------------------------------

#[test]
fn idle_session_auto_locks() {
    let dir = TempDir::new().unwrap();
    let mut config = fast_config();
    config.auto_lock_minutes = 0; // the window is already over
    let mut session = VaultSession::new(
        FileStorage::new(vault_file(&dir)),
        profile(SECRET_A),
        config,
    );

    session.create(PASSWORD).unwrap();
    assert!(session.is_unlocked());

    let err = session.passwords().unwrap_err();
    assert!(matches!(err, VaultError::SessionExpired));
    assert!(!session.is_unlocked());

    // After the expiry the session is simply locked.
    assert!(matches!(
        session.add_password(draft("Late")),
        Err(VaultError::CommandFailed(_))
    ));
}

// ---------------------------------------------------------------------------
// Storage failures
// ---------------------------------------------------------------------------

/// Memory-backed storage whose writes can be made to fail mid-test.
struct FlakyStorage {
    inner: MemoryStorage,
    fail_writes: Rc<Cell<bool>>,
}

impl FlakyStorage {
    fn new() -> (Self, Rc<Cell<bool>>) {
        let flag = Rc::new(Cell::new(false));
        let storage = Self {
            inner: MemoryStorage::new(),
            fail_writes: Rc::clone(&flag),
        };
        (storage, flag)
    }
}

impl VaultStorage for FlakyStorage {
    fn exists(&self) -> bool {
        self.inner.exists()
    }

    fn location(&self) -> PathBuf {
        PathBuf::from(":flaky:")
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        self.inner.read_bytes()
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.fail_writes.get() {
            return Err(VaultError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        self.inner.write_bytes(bytes)
    }
}

#[test]
fn lockout_save_failure_surfaces_as_a_warning() {
    let (storage, fail_writes) = FlakyStorage::new();
    let mut session = VaultSession::new(storage, profile(SECRET_A), fast_config());
    session.create(PASSWORD).unwrap();

    fail_writes.set(true);
    assert!(matches!(
        session.unlock("bad"),
        Err(VaultError::DecryptionFailed)
    ));

    // The failed attempt was counted; only its persistence failed.
    assert_eq!(session.failed_attempts(), 1);
    let warning = session.take_save_warning().unwrap();
    assert!(warning.contains("failed to persist lockout state"));
    assert!(session.take_save_warning().is_none());
}

#[test]
fn mutation_save_failure_propagates() {
    let (storage, fail_writes) = FlakyStorage::new();
    let mut session = VaultSession::new(storage, profile(SECRET_A), fast_config());
    session.create(PASSWORD).unwrap();

    fail_writes.set(true);
    assert!(matches!(
        session.add_password(draft("Unsaved")),
        Err(VaultError::Io(_))
    ));
}

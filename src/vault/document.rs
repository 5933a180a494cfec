//! Plaintext vault document model.
//!
//! This is the JSON that lives *inside* the encrypted container. Field
//! names and timestamp encoding (epoch milliseconds) are fixed by the
//! version-1 wire format, so every struct here serializes with camelCase
//! keys. Collections an older document may lack deserialize as empty, so
//! downstream code never observes a partial document.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroize;

use crate::errors::VaultError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Version string written by the first release of the document format.
pub const LEGACY_DOCUMENT_VERSION: &str = "1.0.0";

/// Version string written by current code. Documents decrypted through a
/// legacy key scheme are bumped to this in memory so the next save
/// persists only the new format.
pub const CURRENT_DOCUMENT_VERSION: &str = "2.0.0";

/// Default number of events returned by [`VaultDocument::recent_activity`].
pub const DEFAULT_ACTIVITY_LIMIT: usize = 50;

/// The activity log records no real network information; every event
/// carries this placeholder.
pub const LOCAL_IP_PLACEHOLDER: &str = "local";

// ---------------------------------------------------------------------------
// Activity log
// ---------------------------------------------------------------------------

/// Every kind of event the in-vault activity log records.
///
/// The wire strings (`login_fail`, `card_view`, ...) are part of the
/// document format and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    LoginSuccess,
    LoginFail,
    PasswordView,
    PasswordCreate,
    PasswordUpdate,
    PasswordDelete,
    DeviceRegistered,
    SoftLock,
    FolderCreate,
    FolderUpdate,
    FolderDelete,
    CardView,
    CardCreate,
    CardUpdate,
    CardDelete,
}

impl ActivityKind {
    /// The wire string for this kind, identical to its JSON encoding.
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::LoginSuccess => "login_success",
            ActivityKind::LoginFail => "login_fail",
            ActivityKind::PasswordView => "password_view",
            ActivityKind::PasswordCreate => "password_create",
            ActivityKind::PasswordUpdate => "password_update",
            ActivityKind::PasswordDelete => "password_delete",
            ActivityKind::DeviceRegistered => "device_registered",
            ActivityKind::SoftLock => "soft_lock",
            ActivityKind::FolderCreate => "folder_create",
            ActivityKind::FolderUpdate => "folder_update",
            ActivityKind::FolderDelete => "folder_delete",
            ActivityKind::CardView => "card_view",
            ActivityKind::CardCreate => "card_create",
            ActivityKind::CardUpdate => "card_update",
            ActivityKind::CardDelete => "card_delete",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login_success" => Ok(ActivityKind::LoginSuccess),
            "login_fail" => Ok(ActivityKind::LoginFail),
            "password_view" => Ok(ActivityKind::PasswordView),
            "password_create" => Ok(ActivityKind::PasswordCreate),
            "password_update" => Ok(ActivityKind::PasswordUpdate),
            "password_delete" => Ok(ActivityKind::PasswordDelete),
            "device_registered" => Ok(ActivityKind::DeviceRegistered),
            "soft_lock" => Ok(ActivityKind::SoftLock),
            "folder_create" => Ok(ActivityKind::FolderCreate),
            "folder_update" => Ok(ActivityKind::FolderUpdate),
            "folder_delete" => Ok(ActivityKind::FolderDelete),
            "card_view" => Ok(ActivityKind::CardView),
            "card_create" => Ok(ActivityKind::CardCreate),
            "card_update" => Ok(ActivityKind::CardUpdate),
            "card_delete" => Ok(ActivityKind::CardDelete),
            other => Err(VaultError::CommandFailed(format!(
                "unknown activity kind '{other}' (expected e.g. login_fail, password_view)"
            ))),
        }
    }
}

/// One entry in the in-vault activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    pub id: String,

    /// Epoch milliseconds.
    pub timestamp: i64,

    #[serde(rename = "type")]
    pub kind: ActivityKind,

    pub details: String,

    /// Fingerprint of the device that performed the action.
    pub device_id: String,

    /// Always [`LOCAL_IP_PLACEHOLDER`]; kept for wire compatibility.
    pub ip_address: String,
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// A folder grouping password and card entries. Folders nest via
/// `parent_id`; `None` means top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A stored login credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordEntry {
    pub id: String,
    pub folder_id: Option<String>,
    pub title: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    /// Incremented every time the plaintext password is revealed.
    #[serde(default)]
    pub view_count: u64,
}

/// Payment card category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Credit,
    Debit,
    Prepaid,
}

impl CardType {
    pub fn as_str(self) -> &'static str {
        match self {
            CardType::Credit => "credit",
            CardType::Debit => "debit",
            CardType::Prepaid => "prepaid",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardType {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(CardType::Credit),
            "debit" => Ok(CardType::Debit),
            "prepaid" => Ok(CardType::Prepaid),
            other => Err(VaultError::CommandFailed(format!(
                "unknown card type '{other}' (expected credit, debit or prepaid)"
            ))),
        }
    }
}

/// A stored payment card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardEntry {
    pub id: String,
    pub folder_id: Option<String>,
    pub card_name: String,
    pub card_holder: String,
    pub card_number: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: String,
    pub card_type: CardType,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

// ---------------------------------------------------------------------------
// Devices and security settings
// ---------------------------------------------------------------------------

/// One trusted device occupying a slot in the vault's device registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSlot {
    pub id: String,
    pub name: String,
    /// Hex SHA-256 of the device secret; never the secret itself.
    pub fingerprint: String,
    pub registered_at: i64,
    pub last_access: i64,
}

/// Failed-attempt counters and lockout state, persisted inside the
/// ciphertext so tampering with them requires breaking the encryption.
///
/// `last_failed_attempt` and `lock_until` use `0` for "never", matching
/// the wire format. They are epoch milliseconds otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: u32,

    #[serde(default = "default_lockout_duration_minutes")]
    pub lockout_duration_minutes: i64,

    #[serde(default)]
    pub last_failed_attempt: i64,

    #[serde(default)]
    pub failed_attempt_count: u32,

    #[serde(default)]
    pub is_locked: bool,

    #[serde(default)]
    pub lock_until: i64,
}

fn default_max_failed_attempts() -> u32 {
    3
}

fn default_lockout_duration_minutes() -> i64 {
    30
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            max_failed_attempts: default_max_failed_attempts(),
            lockout_duration_minutes: default_lockout_duration_minutes(),
            last_failed_attempt: 0,
            failed_attempt_count: 0,
            is_locked: false,
            lock_until: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// VaultDocument
// ---------------------------------------------------------------------------

/// The whole decrypted vault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultDocument {
    pub version: String,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub device_slots: Vec<DeviceSlot>,
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default)]
    pub passwords: Vec<PasswordEntry>,
    #[serde(default)]
    pub cards: Vec<CardEntry>,
    #[serde(default)]
    pub activity_log: Vec<ActivityEvent>,
    #[serde(default)]
    pub security_settings: SecuritySettings,
}

impl VaultDocument {
    /// A fresh document with no entries and default security settings.
    pub fn empty(now_ms: i64) -> Self {
        Self {
            version: CURRENT_DOCUMENT_VERSION.to_string(),
            created_at: now_ms,
            updated_at: now_ms,
            device_slots: Vec::new(),
            folders: Vec::new(),
            passwords: Vec::new(),
            cards: Vec::new(),
            activity_log: Vec::new(),
            security_settings: SecuritySettings::default(),
        }
    }

    /// Append an event to the activity log and bump `updated_at`.
    pub fn log_activity(&mut self, kind: ActivityKind, details: &str, device_id: &str, now_ms: i64) {
        self.activity_log.push(ActivityEvent {
            id: Uuid::new_v4().to_string(),
            timestamp: now_ms,
            kind,
            details: details.to_string(),
            device_id: device_id.to_string(),
            ip_address: LOCAL_IP_PLACEHOLDER.to_string(),
        });
        self.updated_at = now_ms;
    }

    /// The most recent `limit` events, newest first.
    pub fn recent_activity(&self, limit: usize) -> Vec<ActivityEvent> {
        let mut events = self.activity_log.clone();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events.truncate(limit);
        events
    }

    /// All events of one kind, in log order.
    pub fn activity_by_kind(&self, kind: ActivityKind) -> Vec<ActivityEvent> {
        self.activity_log
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    /// All events recorded by one device, in log order.
    pub fn activity_by_device(&self, device_id: &str) -> Vec<ActivityEvent> {
        self.activity_log
            .iter()
            .filter(|e| e.device_id == device_id)
            .cloned()
            .collect()
    }

    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }

    pub fn folder_mut(&mut self, id: &str) -> Option<&mut Folder> {
        self.folders.iter_mut().find(|f| f.id == id)
    }

    pub fn password(&self, id: &str) -> Option<&PasswordEntry> {
        self.passwords.iter().find(|p| p.id == id)
    }

    pub fn password_mut(&mut self, id: &str) -> Option<&mut PasswordEntry> {
        self.passwords.iter_mut().find(|p| p.id == id)
    }

    pub fn card(&self, id: &str) -> Option<&CardEntry> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn card_mut(&mut self, id: &str) -> Option<&mut CardEntry> {
        self.cards.iter_mut().find(|c| c.id == id)
    }

    /// Overwrite secret-bearing fields. Called when a session discards
    /// its decrypted document at lock/logout.
    pub fn scrub(&mut self) {
        for entry in &mut self.passwords {
            entry.username.zeroize();
            entry.password.zeroize();
        }
        for card in &mut self.cards {
            card.card_holder.zeroize();
            card.card_number.zeroize();
            card.cvv.zeroize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_current_version_and_defaults() {
        let doc = VaultDocument::empty(1_000);
        assert_eq!(doc.version, CURRENT_DOCUMENT_VERSION);
        assert_eq!(doc.created_at, 1_000);
        assert_eq!(doc.updated_at, 1_000);
        assert!(doc.passwords.is_empty());
        assert_eq!(doc.security_settings.max_failed_attempts, 3);
        assert_eq!(doc.security_settings.lockout_duration_minutes, 30);
        assert!(!doc.security_settings.is_locked);
    }

    #[test]
    fn document_serializes_with_wire_field_names() {
        let mut doc = VaultDocument::empty(5);
        doc.log_activity(ActivityKind::LoginFail, "Failed login attempt", "fp-1", 6);

        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("deviceSlots").is_some());
        assert!(json.get("activityLog").is_some());
        assert!(json.get("securitySettings").is_some());

        let event = &json["activityLog"][0];
        assert_eq!(event["type"], "login_fail");
        assert_eq!(event["deviceId"], "fp-1");
        assert_eq!(event["ipAddress"], "local");
        assert_eq!(json["securitySettings"]["maxFailedAttempts"], 3);
    }

    #[test]
    fn partial_document_backfills_collections() {
        // A trimmed-down older document without cards or settings.
        let json = r#"{
            "version": "1.0.0",
            "createdAt": 1,
            "updatedAt": 2,
            "folders": [],
            "passwords": []
        }"#;

        let doc: VaultDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.version, "1.0.0");
        assert!(doc.cards.is_empty());
        assert!(doc.device_slots.is_empty());
        assert!(doc.activity_log.is_empty());
        assert_eq!(doc.security_settings.max_failed_attempts, 3);
        assert_eq!(doc.security_settings.lock_until, 0);
    }

    #[test]
    fn recent_activity_sorts_newest_first_and_truncates() {
        let mut doc = VaultDocument::empty(0);
        doc.log_activity(ActivityKind::LoginSuccess, "a", "fp", 10);
        doc.log_activity(ActivityKind::PasswordView, "b", "fp", 30);
        doc.log_activity(ActivityKind::LoginFail, "c", "fp", 20);

        let recent = doc.recent_activity(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].timestamp, 30);
        assert_eq!(recent[1].timestamp, 20);
    }

    #[test]
    fn activity_filters_by_kind_and_device() {
        let mut doc = VaultDocument::empty(0);
        doc.log_activity(ActivityKind::LoginFail, "x", "fp-a", 1);
        doc.log_activity(ActivityKind::LoginFail, "y", "fp-b", 2);
        doc.log_activity(ActivityKind::PasswordView, "z", "fp-a", 3);

        assert_eq!(doc.activity_by_kind(ActivityKind::LoginFail).len(), 2);
        assert_eq!(doc.activity_by_device("fp-a").len(), 2);
        assert_eq!(doc.activity_by_device("fp-c").len(), 0);
    }

    #[test]
    fn scrub_blanks_secret_fields() {
        let mut doc = VaultDocument::empty(0);
        doc.passwords.push(PasswordEntry {
            id: "p1".into(),
            folder_id: None,
            title: "Email".into(),
            username: "user@example.com".into(),
            password: "s3cret".into(),
            url: None,
            notes: None,
            created_at: 0,
            updated_at: 0,
            view_count: 0,
        });
        doc.cards.push(CardEntry {
            id: "c1".into(),
            folder_id: None,
            card_name: "Main".into(),
            card_holder: "A Person".into(),
            card_number: "4111111111111111".into(),
            expiry_month: "01".into(),
            expiry_year: "30".into(),
            cvv: "123".into(),
            card_type: CardType::Credit,
            company: "visa".into(),
            billing_address: None,
            notes: None,
            created_at: 0,
            updated_at: 0,
        });

        doc.scrub();

        assert!(doc.passwords[0].password.is_empty());
        assert!(doc.passwords[0].username.is_empty());
        assert!(doc.cards[0].card_number.is_empty());
        assert!(doc.cards[0].cvv.is_empty());
        assert_eq!(doc.passwords[0].title, "Email");
    }

    #[test]
    fn activity_kind_round_trips_through_wire_strings() {
        for kind in [
            ActivityKind::LoginSuccess,
            ActivityKind::SoftLock,
            ActivityKind::CardDelete,
            ActivityKind::DeviceRegistered,
        ] {
            let parsed: ActivityKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("not_a_kind".parse::<ActivityKind>().is_err());
    }
}

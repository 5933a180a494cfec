//! Audit log — SQLite-based operation history.
//!
//! Mirrors vault activity events (unlocks, entry changes, lockouts)
//! into a local SQLite database at `<vault_dir>/audit.db`, next to the
//! vault file. Only event metadata lands here, never entry plaintext.
//!
//! Designed for graceful degradation: if the database can't be opened or
//! written to, operations silently continue without logging.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::errors::{Result, VaultError};
use crate::vault::{ActivityKind, ActivitySink};

/// A single audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub kind: String,
    pub details: String,
    pub device: String,
}

/// SQLite-backed audit log.
pub struct AuditLog {
    conn: Connection,
}

impl AuditLog {
    /// Open (or create) the audit database at `<vault_dir>/audit.db`.
    ///
    /// Returns `None` if the database can't be opened — callers should
    /// treat this as "audit logging unavailable" and continue normally.
    pub fn open(vault_dir: &Path) -> Option<Self> {
        let db_path = vault_dir.join("audit.db");
        let conn = Connection::open(&db_path).ok()?;

        // Set restrictive permissions on the audit database (owner-only).
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&db_path, perms);
        }

        // Create the table if it doesn't exist.
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS audit_log (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                kind      TEXT NOT NULL,
                details   TEXT NOT NULL,
                device    TEXT NOT NULL
            );",
        )
        .ok()?;

        Some(Self { conn })
    }

    /// Record an event. Fire-and-forget — errors are silently ignored.
    pub fn log(&self, kind: &str, details: &str, device: &str) {
        let now = Utc::now().to_rfc3339();
        let _ = self.conn.execute(
            "INSERT INTO audit_log (timestamp, kind, details, device)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![now, kind, details, device],
        );
    }

    /// Query recent audit entries.
    ///
    /// - `limit`: maximum number of entries to return (most recent first).
    /// - `since`: if provided, only return entries newer than this timestamp.
    pub fn query(&self, limit: usize, since: Option<DateTime<Utc>>) -> Result<Vec<AuditEntry>> {
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let (sql, params): (&str, Vec<Box<dyn rusqlite::types::ToSql>>) = match since {
            Some(ref ts) => (
                "SELECT id, timestamp, kind, details, device
                 FROM audit_log
                 WHERE timestamp >= ?1
                 ORDER BY id DESC
                 LIMIT ?2",
                vec![
                    Box::new(ts.to_rfc3339()) as Box<dyn rusqlite::types::ToSql>,
                    Box::new(limit_i64),
                ],
            ),
            None => (
                "SELECT id, timestamp, kind, details, device
                 FROM audit_log
                 ORDER BY id DESC
                 LIMIT ?1",
                vec![Box::new(limit_i64) as Box<dyn rusqlite::types::ToSql>],
            ),
        };

        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| VaultError::AuditError(format!("query prepare: {e}")))?;

        let params_refs: Vec<&dyn rusqlite::types::ToSql> = params.iter().map(|p| &**p).collect();

        let rows = stmt
            .query_map(params_refs.as_slice(), |row| {
                let ts_str: String = row.get(1)?;
                let timestamp = DateTime::parse_from_rfc3339(&ts_str)
                    .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp,
                    kind: row.get(2)?,
                    details: row.get(3)?,
                    device: row.get(4)?,
                })
            })
            .map_err(|e| VaultError::AuditError(format!("query exec: {e}")))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| VaultError::AuditError(format!("row parse: {e}")))?);
        }

        Ok(entries)
    }

    /// Return the path to the audit database (for testing/display).
    pub fn db_path(vault_dir: &Path) -> PathBuf {
        vault_dir.join("audit.db")
    }
}

impl ActivitySink for AuditLog {
    fn record(&self, kind: ActivityKind, details: &str, device_fingerprint: &str) {
        self.log(kind.as_str(), details, device_fingerprint);
    }
}

/// Open the audit log that belongs to the vault at `vault_path`.
///
/// The database lives in the vault file's directory, which is created
/// if missing. Returns `None` when the log is unavailable; sessions run
/// fine without one.
pub fn sink_for(vault_path: &Path) -> Option<AuditLog> {
    let dir = match vault_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::env::current_dir().ok()?,
    };
    std::fs::create_dir_all(&dir).ok()?;
    AuditLog::open(&dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_creates_database() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(dir.path());
        assert!(audit.is_some(), "should open successfully");
        assert!(dir.path().join("audit.db").exists());
    }

    #[test]
    fn log_and_query_roundtrip() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(dir.path()).unwrap();

        audit.log("login_success", "Successful vault unlock", "fp-1");
        audit.log("password_create", "Password \"GitHub\" created", "fp-1");
        audit.log("password_delete", "Password \"Old\" deleted", "fp-1");

        let entries = audit.query(10, None).unwrap();
        assert_eq!(entries.len(), 3);

        // Most recent first.
        assert_eq!(entries[0].kind, "password_delete");
        assert_eq!(entries[1].kind, "password_create");
        assert_eq!(entries[2].kind, "login_success");
    }

    #[test]
    fn query_with_limit() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(dir.path()).unwrap();

        for i in 0..10 {
            audit.log("password_view", &format!("Password \"P{i}\" viewed"), "fp-1");
        }

        let entries = audit.query(3, None).unwrap();
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn query_with_since_filter() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(dir.path()).unwrap();

        audit.log("login_fail", "Failed login attempt", "fp-1");

        // Query with a timestamp in the past should return the entry.
        let past = Utc::now() - chrono::Duration::hours(1);
        let entries = audit.query(10, Some(past)).unwrap();
        assert_eq!(entries.len(), 1);

        // Query with a timestamp in the future should return nothing.
        let future = Utc::now() + chrono::Duration::hours(1);
        let entries = audit.query(10, Some(future)).unwrap();
        assert_eq!(entries.len(), 0);
    }

    #[test]
    fn log_records_device_fingerprint() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(dir.path()).unwrap();

        audit.log("device_registered", "Device \"Desktop (linux)\" registered", "fp-laptop");

        let entries = audit.query(1, None).unwrap();
        assert_eq!(entries[0].kind, "device_registered");
        assert_eq!(entries[0].device, "fp-laptop");
        assert_eq!(entries[0].details, "Device \"Desktop (linux)\" registered");
    }

    #[test]
    fn record_via_sink_trait_uses_wire_names() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(dir.path()).unwrap();

        let sink: &dyn ActivitySink = &audit;
        sink.record(ActivityKind::SoftLock, "Vault locked for 30 minutes", "fp-1");

        let entries = audit.query(1, None).unwrap();
        assert_eq!(entries[0].kind, "soft_lock");
    }

    #[test]
    fn open_returns_none_on_bad_path() {
        // A path that doesn't exist as a directory should fail gracefully.
        let result = AuditLog::open(Path::new("/nonexistent/path/that/does/not/exist"));
        assert!(result.is_none());
    }

    #[test]
    fn sink_for_creates_the_vault_directory() {
        let dir = TempDir::new().unwrap();
        let vault_path = dir.path().join("nested").join("vault.json");

        let audit = sink_for(&vault_path);
        assert!(audit.is_some());
        assert!(dir.path().join("nested").join("audit.db").exists());
    }

    #[cfg(unix)]
    #[test]
    fn audit_db_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let _audit = AuditLog::open(dir.path()).unwrap();

        let db_path = dir.path().join("audit.db");
        let perms = std::fs::metadata(&db_path).unwrap().permissions();
        assert_eq!(
            perms.mode() & 0o777,
            0o600,
            "audit.db should have 0o600 permissions"
        );
    }
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::{CURRENT_ITERATIONS, MIN_ITERATIONS};
use crate::errors::{Result, VaultError};
use crate::vault::{KeySchedule, SessionConfig, DEFAULT_DEVICE_CAPACITY};

/// User-level configuration, loaded from `.ironvault.toml`.
///
/// Every field has a sensible default so IronVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the vault file. Defaults to the platform data directory
    /// (`~/.local/share/ironvault/vault.json` on Linux).
    #[serde(default)]
    pub vault_path: Option<String>,

    /// Path to the device secret file. Defaults to the platform data
    /// directory next to the vault.
    #[serde(default)]
    pub device_secret_path: Option<String>,

    /// PBKDF2-HMAC-SHA256 iteration count for new writes (default: 1M).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Failed unlock attempts before the vault soft-locks (default: 3).
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: u32,

    /// How long a soft lock lasts, in minutes (default: 30).
    #[serde(default = "default_lockout_duration_minutes")]
    pub lockout_duration_minutes: i64,

    /// Maximum number of trusted device slots (default: 2).
    #[serde(default = "default_device_capacity")]
    pub device_capacity: usize,

    /// Idle minutes before an unlocked session locks itself (default: 15).
    #[serde(default = "default_auto_lock_minutes")]
    pub auto_lock_minutes: i64,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_kdf_iterations() -> u32 {
    CURRENT_ITERATIONS
}

fn default_max_failed_attempts() -> u32 {
    3
}

fn default_lockout_duration_minutes() -> i64 {
    30
}

fn default_device_capacity() -> usize {
    DEFAULT_DEVICE_CAPACITY
}

fn default_auto_lock_minutes() -> i64 {
    15
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_path: None,
            device_secret_path: None,
            kdf_iterations: default_kdf_iterations(),
            max_failed_attempts: default_max_failed_attempts(),
            lockout_duration_minutes: default_lockout_duration_minutes(),
            device_capacity: default_device_capacity(),
            auto_lock_minutes: default_auto_lock_minutes(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the working directory.
    const FILE_NAME: &'static str = ".ironvault.toml";

    /// Load settings from `<dir>/.ironvault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed or fails validation,
    /// an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_file(&config_path)
    }

    /// Load settings from an explicit config file path.
    ///
    /// Unlike [`Settings::load`], a missing file is an error here; the
    /// caller asked for this exact file.
    pub fn load_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            VaultError::ConfigError(format!("Failed to read {}: {e}", path.display()))
        })?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject configurations that would weaken or wedge the vault.
    pub fn validate(&self) -> Result<()> {
        if self.kdf_iterations < MIN_ITERATIONS {
            return Err(VaultError::ConfigError(format!(
                "kdf_iterations must be at least {MIN_ITERATIONS} (got {})",
                self.kdf_iterations
            )));
        }
        if self.max_failed_attempts == 0 {
            return Err(VaultError::ConfigError(
                "max_failed_attempts must be at least 1".to_string(),
            ));
        }
        if self.lockout_duration_minutes < 1 {
            return Err(VaultError::ConfigError(
                "lockout_duration_minutes must be at least 1".to_string(),
            ));
        }
        if self.device_capacity == 0 {
            return Err(VaultError::ConfigError(
                "device_capacity must be at least 1".to_string(),
            ));
        }
        if self.auto_lock_minutes < 1 {
            return Err(VaultError::ConfigError(
                "auto_lock_minutes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The vault file this configuration points at.
    pub fn resolve_vault_path(&self) -> Result<PathBuf> {
        match &self.vault_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => {
                let base = dirs::data_dir().ok_or_else(|| {
                    VaultError::ConfigError(
                        "could not determine the platform data directory".to_string(),
                    )
                })?;
                Ok(base.join("ironvault").join("vault.json"))
            }
        }
    }

    /// The device secret file this configuration points at.
    pub fn resolve_device_secret_path(&self) -> Result<PathBuf> {
        match &self.device_secret_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => crate::device::default_secret_path(),
        }
    }

    /// Convert the lockout and key-derivation settings into a session
    /// configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            schedule: KeySchedule::new(self.kdf_iterations),
            device_capacity: self.device_capacity,
            max_failed_attempts: self.max_failed_attempts,
            lockout_duration_minutes: self.lockout_duration_minutes,
            auto_lock_minutes: self.auto_lock_minutes,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert!(s.vault_path.is_none());
        assert!(s.device_secret_path.is_none());
        assert_eq!(s.kdf_iterations, 1_000_000);
        assert_eq!(s.max_failed_attempts, 3);
        assert_eq!(s.lockout_duration_minutes, 30);
        assert_eq!(s.device_capacity, 2);
        assert_eq!(s.auto_lock_minutes, 15);
        s.validate().unwrap();
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.kdf_iterations, 1_000_000);
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
vault_path = "/tmp/my.vault"
device_secret_path = "/tmp/device.secret"
kdf_iterations = 600000
max_failed_attempts = 5
lockout_duration_minutes = 10
device_capacity = 4
auto_lock_minutes = 5
"#;
        fs::write(tmp.path().join(".ironvault.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_path.as_deref(), Some("/tmp/my.vault"));
        assert_eq!(
            settings.device_secret_path.as_deref(),
            Some("/tmp/device.secret")
        );
        assert_eq!(settings.kdf_iterations, 600_000);
        assert_eq!(settings.max_failed_attempts, 5);
        assert_eq!(settings.lockout_duration_minutes, 10);
        assert_eq!(settings.device_capacity, 4);
        assert_eq!(settings.auto_lock_minutes, 5);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        let config = "max_failed_attempts = 5\n";
        fs::write(tmp.path().join(".ironvault.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.max_failed_attempts, 5);
        // Rest should be defaults
        assert_eq!(settings.kdf_iterations, 1_000_000);
        assert_eq!(settings.device_capacity, 2);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".ironvault.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(result.is_err());
    }

    #[test]
    fn load_rejects_weak_kdf_iterations() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".ironvault.toml"), "kdf_iterations = 50000\n").unwrap();

        let err = Settings::load(tmp.path()).unwrap_err();
        assert!(matches!(err, VaultError::ConfigError(_)));
        assert!(err.to_string().contains("kdf_iterations"));
    }

    #[test]
    fn load_rejects_zero_device_capacity() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".ironvault.toml"), "device_capacity = 0\n").unwrap();

        let result = Settings::load(tmp.path());
        assert!(result.is_err());
    }

    #[test]
    fn load_file_errors_on_missing_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let result = Settings::load_file(&tmp.path().join("nope.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn resolve_vault_path_respects_override() {
        let s = Settings {
            vault_path: Some("/data/vaults/main.json".to_string()),
            ..Settings::default()
        };
        assert_eq!(
            s.resolve_vault_path().unwrap(),
            PathBuf::from("/data/vaults/main.json")
        );
    }

    #[test]
    fn session_config_carries_the_schedule() {
        let s = Settings {
            kdf_iterations: 250_000,
            ..Settings::default()
        };
        let config = s.session_config();
        assert_eq!(config.schedule.current_iterations, 250_000);
        assert!(!config.schedule.legacy_iterations.is_empty());
        assert_eq!(config.device_capacity, 2);
    }
}

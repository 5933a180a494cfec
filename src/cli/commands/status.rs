//! `ironvault status` — show vault state without unlocking it.

use crate::cli::output;
use crate::cli::{load_settings, vault_path, Cli};
use crate::device;
use crate::errors::Result;

/// Execute the `status` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = vault_path(cli, &settings)?;

    output::field("Vault", &path.display().to_string());

    if !path.exists() {
        output::info("No vault found at this location.");
        output::tip("Run `ironvault init` to create one.");
        return Ok(());
    }

    let metadata = std::fs::metadata(&path)?;
    output::field("Size", &format!("{} bytes", metadata.len()));
    if let Ok(modified) = metadata.modified() {
        let dt: chrono::DateTime<chrono::Local> = modified.into();
        output::field("Modified", &dt.format("%Y-%m-%d %H:%M").to_string());
    }

    let secret_path = settings.resolve_device_secret_path()?;
    if secret_path.exists() {
        let secret = device::get_or_create_secret(&secret_path)?;
        output::field(
            "Device",
            &format!(
                "{} ({})",
                device::device_name(),
                output::short_fingerprint(&device::fingerprint(&secret))
            ),
        );
    } else {
        output::field("Device", "not yet enrolled");
    }

    output::field(
        "KDF",
        &format!("PBKDF2-HMAC-SHA256, {} iterations", settings.kdf_iterations),
    );
    output::field(
        "Lockout",
        &format!(
            "{} attempts, then {} min",
            settings.max_failed_attempts, settings.lockout_duration_minutes
        ),
    );
    output::field("Auto-lock", &format!("{} min idle", settings.auto_lock_minutes));

    #[cfg(feature = "audit-log")]
    if let Some(dir) = path.parent() {
        let db_path = crate::audit::AuditLog::db_path(dir);
        if db_path.exists() {
            output::field("Audit log", &db_path.display().to_string());
        }
    }

    Ok(())
}

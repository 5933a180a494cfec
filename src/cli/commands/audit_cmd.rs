//! `ironvault audit` — display the audit log.
//!
//! The audit log is the unencrypted mirror of vault activity kept in
//! SQLite next to the vault file. Unlike `ironvault logs` it can be
//! read without unlocking the vault.
//!
//! Usage:
//!   ironvault audit               # show last 50 entries
//!   ironvault audit --last 20     # show last 20
//!   ironvault audit --since 7d    # entries from last 7 days

use crate::cli::Cli;
use crate::errors::Result;

/// Execute the `audit` command.
pub fn execute(cli: &Cli, last: usize, since: Option<&str>) -> Result<()> {
    #[cfg(feature = "audit-log")]
    {
        use crate::cli::output;
        use crate::errors::VaultError;

        let settings = crate::cli::load_settings(cli)?;
        let path = crate::cli::vault_path(cli, &settings)?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => std::env::current_dir()?,
        };

        let audit = crate::audit::AuditLog::open(&dir)
            .ok_or_else(|| VaultError::AuditError("failed to open audit database".into()))?;

        let since_dt = match since {
            Some(s) => Some(parse_duration(s)?),
            None => None,
        };

        let entries = audit.query(last, since_dt)?;

        if entries.is_empty() {
            output::info("No audit entries found.");
            return Ok(());
        }

        print_audit_table(&entries);

        Ok(())
    }

    #[cfg(not(feature = "audit-log"))]
    {
        let _ = (cli, last, since);
        Err(crate::errors::VaultError::AuditError(
            "audit log support not compiled — rebuild with `cargo build --features audit-log`"
                .into(),
        ))
    }
}

/// Parse a human-friendly duration string like "7d", "24h", "30m".
#[cfg(feature = "audit-log")]
fn parse_duration(input: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    use crate::errors::VaultError;
    use chrono::Utc;

    let input = input.trim();

    let (num_str, unit) = if let Some(s) = input.strip_suffix('d') {
        (s, 'd')
    } else if let Some(s) = input.strip_suffix('h') {
        (s, 'h')
    } else if let Some(s) = input.strip_suffix('m') {
        (s, 'm')
    } else {
        return Err(VaultError::CommandFailed(format!(
            "invalid duration '{input}' — use format like 7d, 24h, or 30m"
        )));
    };

    let num: i64 = num_str.parse().map_err(|_| {
        VaultError::CommandFailed(format!(
            "invalid duration '{input}' — number part is not valid"
        ))
    })?;

    let duration = match unit {
        'd' => chrono::Duration::days(num),
        'h' => chrono::Duration::hours(num),
        'm' => chrono::Duration::minutes(num),
        _ => unreachable!(),
    };

    Ok(Utc::now() - duration)
}

/// Print audit entries in a formatted table.
#[cfg(feature = "audit-log")]
pub fn print_audit_table(entries: &[crate::audit::AuditEntry]) {
    use comfy_table::{ContentArrangement, Table};
    use console::style;

    use crate::cli::output;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Event", "Details", "Device"]);

    for entry in entries {
        let time = entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        table.add_row(vec![
            time,
            colorize_kind(&entry.kind),
            entry.details.clone(),
            output::short_fingerprint(&entry.device),
        ]);
    }

    println!(
        "{}",
        style(format!("{} audit entries:", entries.len())).bold()
    );
    println!("{table}");
}

/// Colorize event kinds for display.
#[cfg(feature = "audit-log")]
fn colorize_kind(kind: &str) -> String {
    use console::style;

    match kind {
        "login_success" => style(kind).green().to_string(),
        "login_fail" | "soft_lock" => style(kind).red().to_string(),
        "password_create" | "card_create" | "folder_create" => style(kind).green().to_string(),
        "password_update" | "card_update" | "folder_update" => style(kind).blue().to_string(),
        "password_delete" | "card_delete" | "folder_delete" => style(kind).red().to_string(),
        "password_view" | "card_view" => style(kind).cyan().to_string(),
        "device_registered" => style(kind).yellow().to_string(),
        _ => kind.to_string(),
    }
}

//! `ironvault logs` — display the vault's encrypted activity log.
//!
//! Usage:
//!   ironvault logs                        # last 50 events
//!   ironvault logs --last 20              # last 20
//!   ironvault logs --kind login_fail      # only failed unlock attempts
//!   ironvault logs --device "Device 2"    # only one device's events

use crate::cli::output;
use crate::cli::{unlock_session, Cli};
use crate::errors::{Result, VaultError};
use crate::vault::{ActivityKind, DeviceSlot};

/// Execute the `logs` command.
pub fn execute(cli: &Cli, last: usize, kind: Option<&str>, device: Option<&str>) -> Result<()> {
    let mut session = unlock_session(cli)?;

    let mut events = match device {
        Some(needle) => {
            let fingerprint = resolve_fingerprint(session.devices()?, needle)?;
            let mut events = session.activity_by_device(&fingerprint)?;
            if let Some(k) = kind {
                let kind: ActivityKind = k.parse()?;
                events.retain(|e| e.kind == kind);
            }
            events
        }
        None => match kind {
            Some(k) => session.activity_by_kind(k.parse()?)?,
            None => session.recent_activity(last)?,
        },
    };

    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    events.truncate(last);

    output::print_activity_table(&events);

    Ok(())
}

/// Match a device slot by name (case-insensitive) or fingerprint prefix.
fn resolve_fingerprint(devices: &[DeviceSlot], needle: &str) -> Result<String> {
    devices
        .iter()
        .find(|d| d.name.eq_ignore_ascii_case(needle) || d.fingerprint.starts_with(needle))
        .map(|d| d.fingerprint.clone())
        .ok_or_else(|| VaultError::DeviceNotFound(needle.to_string()))
}

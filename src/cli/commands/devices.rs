//! `ironvault devices` — manage trusted device slots.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{unlock_session, Cli};
use crate::errors::{Result, VaultError};
use crate::vault::DeviceSlot;

/// Execute `devices list`.
pub fn execute_list(cli: &Cli) -> Result<()> {
    let mut session = unlock_session(cli)?;

    let current = session.device().fingerprint.clone();
    let devices = session.devices()?.to_vec();

    output::print_devices_table(&devices, &current);

    Ok(())
}

/// Execute `devices revoke`.
pub fn execute_revoke(cli: &Cli, device: &str, force: bool) -> Result<()> {
    // Unless --force is set, ask for confirmation before revoking.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Revoke device '{device}'? It will need a free slot to unlock again."
            ))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let mut session = unlock_session(cli)?;

    let id = resolve_device_id(session.devices()?, device)?;
    let removed = session.revoke_device(&id)?;

    output::success(&format!("Revoked device \"{}\"", removed.name));

    Ok(())
}

/// Resolve a device slot by id or name. Returns the slot's id.
fn resolve_device_id(devices: &[DeviceSlot], needle: &str) -> Result<String> {
    if let Some(slot) = devices.iter().find(|d| d.id == needle) {
        return Ok(slot.id.clone());
    }

    let matches: Vec<&DeviceSlot> = devices
        .iter()
        .filter(|d| d.name.eq_ignore_ascii_case(needle))
        .collect();

    match matches.len() {
        0 => Err(VaultError::DeviceNotFound(needle.to_string())),
        1 => Ok(matches[0].id.clone()),
        n => Err(VaultError::CommandFailed(format!(
            "'{needle}' matches {n} devices — use the device id"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: &str, name: &str) -> DeviceSlot {
        DeviceSlot {
            id: id.to_string(),
            name: name.to_string(),
            fingerprint: format!("fp-{id}"),
            registered_at: 0,
            last_access: 0,
        }
    }

    #[test]
    fn resolve_device_by_id() {
        let devices = vec![slot("d-1", "Desktop (linux)"), slot("d-2", "Device 2")];
        assert_eq!(resolve_device_id(&devices, "d-2").unwrap(), "d-2");
    }

    #[test]
    fn resolve_device_by_name() {
        let devices = vec![slot("d-1", "Desktop (linux)"), slot("d-2", "Device 2")];
        assert_eq!(resolve_device_id(&devices, "device 2").unwrap(), "d-2");
    }

    #[test]
    fn resolve_device_unknown_fails() {
        let devices = vec![slot("d-1", "Desktop (linux)")];
        assert!(matches!(
            resolve_device_id(&devices, "Laptop"),
            Err(VaultError::DeviceNotFound(_))
        ));
    }
}

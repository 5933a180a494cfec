//! `ironvault rm` — remove a password entry from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{resolve_entry_id, unlock_session, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `rm` command.
pub fn execute(cli: &Cli, entry: &str, force: bool) -> Result<()> {
    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete password entry '{entry}'?"))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let mut session = unlock_session(cli)?;

    let id = resolve_entry_id(session.passwords()?, entry)?;
    let removed = session.delete_password(&id)?;

    output::success(&format!("Deleted password \"{}\"", removed.title));

    Ok(())
}

//! `ironvault init` — create a new vault.

use crate::cli::output;
use crate::cli::{build_session, load_settings, prompt_new_password, vault_path, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = vault_path(cli, &settings)?;

    // 1. Refuse to clobber an existing vault.
    if path.exists() {
        output::tip("Use `ironvault add` to store entries in the existing vault.");
        return Err(VaultError::VaultAlreadyExists(path));
    }

    // 2. Prompt for a new master password (with confirmation).
    let password = prompt_new_password()?;

    // 3. Create the vault; this device takes the first trusted slot.
    let mut session = build_session(cli)?;
    session.create(&password)?;

    output::success(&format!("Vault created at {}", path.display()));
    output::info(&format!(
        "This device is registered as \"{}\".",
        session.device().name
    ));

    // 4. Show helpful tips.
    output::tip("Run `ironvault add <title>` to store a password.");
    output::tip("Run `ironvault gen` to generate a strong password.");
    #[cfg(feature = "keyring-store")]
    output::tip("Run `ironvault auth keyring` to unlock without typing the password.");

    Ok(())
}

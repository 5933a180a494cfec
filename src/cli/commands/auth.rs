//! `ironvault auth` — manage authentication methods.
//!
//! Subcommands:
//! - `ironvault auth keyring`          — save the master password to the OS keyring
//! - `ironvault auth keyring --delete` — remove it from the keyring
//!
//! When the keyring feature is not compiled in, keyring commands return
//! a helpful error message.

use crate::cli::Cli;
use crate::errors::{Result, VaultError};

/// Execute `ironvault auth keyring` — save or delete the master password
/// in the OS keyring.
pub fn execute_keyring(cli: &Cli, delete: bool) -> Result<()> {
    #[cfg(feature = "keyring-store")]
    {
        use crate::cli::output;

        let settings = crate::cli::load_settings(cli)?;
        let path = crate::cli::vault_path(cli, &settings)?;
        let vault_id = path.to_string_lossy().to_string();

        if delete {
            crate::keyring::delete_password(&vault_id)?;
            output::success("Master password removed from OS keyring.");
        } else {
            if !path.exists() {
                return Err(VaultError::VaultNotFound(path));
            }

            // Verify the password works before storing it.
            // Don't use keyring lookup here — the user is explicitly setting it.
            let password = crate::cli::prompt_password_for_vault(None)?;
            let mut session = crate::cli::build_session(cli)?;
            session.unlock(&password)?;
            session.lock();

            crate::keyring::store_password(&vault_id, &password)?;
            output::success("Master password saved to OS keyring. Future unlocks will be automatic.");
        }

        Ok(())
    }

    #[cfg(not(feature = "keyring-store"))]
    {
        let _ = (cli, delete);
        Err(VaultError::KeyringError(
            "keyring support not compiled — rebuild with `cargo build --features keyring-store`"
                .into(),
        ))
    }
}

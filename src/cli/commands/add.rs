//! `ironvault add` — add a password entry to the vault.

use std::io::{self, IsTerminal, Read};

use crate::cli::output;
use crate::cli::{resolve_folder_id, unlock_session, Cli};
use crate::crypto::generator;
use crate::errors::{Result, VaultError};
use crate::vault::PasswordDraft;

/// Execute the `add` command.
#[allow(clippy::too_many_arguments)] // Mirrors the Clap variant one-to-one.
pub fn execute(
    cli: &Cli,
    title: &str,
    username: Option<&str>,
    password: Option<&str>,
    generate: bool,
    length: usize,
    url: Option<&str>,
    folder: Option<&str>,
    notes: Option<&str>,
) -> Result<()> {
    // Determine the password value from one of four sources.
    let value = if generate {
        // Source 1: Generated locally.
        generator::generate_password(length)
    } else if let Some(v) = password {
        // Source 2: Inline value on the command line.
        output::warning("Password provided on command line — it may appear in shell history.");
        v.to_string()
    } else if !io::stdin().is_terminal() {
        // Source 3: Piped input (stdin is not a terminal).
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf.trim_end().to_string()
    } else {
        // Source 4: Interactive secure prompt (default).
        dialoguer::Password::new()
            .with_prompt(format!("Enter password for {title}"))
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))?
    };

    let mut session = unlock_session(cli)?;

    let folder_id = match folder {
        Some(needle) => Some(resolve_folder_id(session.folders()?, needle)?),
        None => None,
    };

    let entry = session.add_password(PasswordDraft {
        folder_id,
        title: title.to_string(),
        username: username.unwrap_or_default().to_string(),
        password: value,
        url: url.map(str::to_string),
        notes: notes.map(str::to_string),
    })?;

    let total = session.passwords()?.len();
    output::success(&format!("Password \"{}\" added ({total} total)", entry.title));

    if generate {
        // Print the generated value once so it can be copied or piped.
        println!("{}", entry.password);
    } else {
        output::tip(&format!("Run `ironvault show {}` to view it.", entry.title));
    }

    Ok(())
}

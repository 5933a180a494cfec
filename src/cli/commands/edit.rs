//! `ironvault edit` — change fields of an existing password entry.
//!
//! Only the fields passed as flags change; everything else keeps its
//! current value.

use crate::cli::output;
use crate::cli::{resolve_entry_id, resolve_folder_id, unlock_session, Cli};
use crate::crypto::generator;
use crate::errors::{Result, VaultError};
use crate::vault::PasswordDraft;

/// Execute the `edit` command.
#[allow(clippy::too_many_arguments)] // Mirrors the Clap variant one-to-one.
pub fn execute(
    cli: &Cli,
    entry: &str,
    title: Option<&str>,
    username: Option<&str>,
    password: Option<&str>,
    generate: bool,
    length: usize,
    url: Option<&str>,
    folder: Option<&str>,
    notes: Option<&str>,
) -> Result<()> {
    let mut session = unlock_session(cli)?;

    let id = resolve_entry_id(session.passwords()?, entry)?;
    let existing = session
        .passwords()?
        .iter()
        .find(|e| e.id == id)
        .cloned()
        .ok_or_else(|| VaultError::EntryNotFound(id.clone()))?;

    let folder_id = match folder {
        Some(needle) => Some(resolve_folder_id(session.folders()?, needle)?),
        None => existing.folder_id.clone(),
    };

    let new_password = if generate {
        generator::generate_password(length)
    } else if let Some(p) = password {
        output::warning("Password provided on command line — it may appear in shell history.");
        p.to_string()
    } else {
        existing.password.clone()
    };

    let draft = PasswordDraft {
        folder_id,
        title: title.map_or(existing.title, str::to_string),
        username: username.map_or(existing.username, str::to_string),
        password: new_password,
        url: url.map(str::to_string).or(existing.url),
        notes: notes.map(str::to_string).or(existing.notes),
    };

    let updated = session.update_password(&id, draft)?;
    output::success(&format!("Updated password \"{}\"", updated.title));

    if generate {
        // Print the new value once so it can be copied or piped.
        println!("{}", updated.password);
    }

    Ok(())
}

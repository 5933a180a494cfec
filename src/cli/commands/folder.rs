//! `ironvault folder` — manage folders in the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{resolve_folder_id, unlock_session, Cli};
use crate::errors::{Result, VaultError};
use crate::vault::FolderChanges;

/// Execute `folder add`.
pub fn execute_add(
    cli: &Cli,
    name: &str,
    description: Option<&str>,
    color: Option<&str>,
    parent: Option<&str>,
) -> Result<()> {
    let mut session = unlock_session(cli)?;

    let parent_id = match parent {
        Some(needle) => Some(resolve_folder_id(session.folders()?, needle)?),
        None => None,
    };

    let folder = session.add_folder(
        name,
        description.map(str::to_string),
        color.map(str::to_string),
        parent_id,
    )?;

    output::success(&format!("Folder \"{}\" created", folder.name));

    Ok(())
}

/// Execute `folder list`.
pub fn execute_list(cli: &Cli) -> Result<()> {
    let mut session = unlock_session(cli)?;

    let mut folders = session.folders()?.to_vec();
    folders.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    output::print_folders_table(&folders);

    Ok(())
}

/// Execute `folder rename`.
pub fn execute_rename(cli: &Cli, folder: &str, new_name: &str) -> Result<()> {
    let mut session = unlock_session(cli)?;

    let id = resolve_folder_id(session.folders()?, folder)?;
    let updated = session.update_folder(
        &id,
        FolderChanges {
            name: Some(new_name.to_string()),
            ..FolderChanges::default()
        },
    )?;

    output::success(&format!("Folder renamed to \"{}\"", updated.name));

    Ok(())
}

/// Execute `folder rm`.
pub fn execute_rm(cli: &Cli, folder: &str, force: bool) -> Result<()> {
    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete folder '{folder}'? Its entries move to the parent folder."
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

    let id = resolve_folder_id(session.folders()?, folder)?;
    let removed = session.delete_folder(&id)?;

    output::success(&format!("Deleted folder \"{}\"", removed.name));

    Ok(())
}

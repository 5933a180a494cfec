//! `ironvault list` — display password entries in a table.

use crate::cli::output;
use crate::cli::{resolve_folder_id, unlock_session, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli, folder: Option<&str>) -> Result<()> {
    let mut session = unlock_session(cli)?;

    let folders = session.folders()?.to_vec();
    let mut entries = session.passwords()?.to_vec();

    if let Some(needle) = folder {
        let folder_id = resolve_folder_id(&folders, needle)?;
        entries.retain(|e| e.folder_id.as_deref() == Some(folder_id.as_str()));
    }

    entries.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
    output::print_passwords_table(&entries, &folders);

    Ok(())
}

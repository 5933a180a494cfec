//! `ironvault show` — reveal a single password entry.

use crate::cli::output;
use crate::cli::{resolve_entry_id, unlock_session, Cli};
use crate::errors::Result;

/// Execute the `show` command.
pub fn execute(cli: &Cli, entry: &str) -> Result<()> {
    let mut session = unlock_session(cli)?;

    let id = resolve_entry_id(session.passwords()?, entry)?;
    let folders = session.folders()?.to_vec();

    // Viewing bumps the entry's counter and is logged in the vault.
    let viewed = session.view_password(&id)?;

    output::field("Title", &viewed.title);
    output::field("Username", &viewed.username);
    output::field("Password", &viewed.password);
    if let Some(url) = &viewed.url {
        output::field("URL", url);
    }
    if let Some(folder_id) = &viewed.folder_id {
        if let Some(folder) = folders.iter().find(|f| &f.id == folder_id) {
            output::field("Folder", &folder.name);
        }
    }
    if let Some(notes) = &viewed.notes {
        output::field("Notes", notes);
    }
    output::field("Viewed", &format!("{} times", viewed.view_count));
    output::field("Updated", &output::format_timestamp(viewed.updated_at));

    Ok(())
}

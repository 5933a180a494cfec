//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::device;
use crate::errors::{Result, VaultError};
use crate::vault::{CardEntry, DeviceProfile, FileStorage, Folder, PasswordEntry, VaultSession};

/// Minimum password length to prevent trivially weak master passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// IronVault CLI: encrypted password manager.
#[derive(Parser)]
#[command(
    name = "ironvault",
    about = "Encrypted password manager for the terminal",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the vault file (overrides the config file)
    #[arg(long, global = true)]
    pub vault: Option<String>,

    /// Path to a config file (default: ./.ironvault.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Initialize a new vault
    Init,

    /// Add a password entry
    Add {
        /// Entry title (e.g. GitHub)
        title: String,

        /// Username or email for the entry
        #[arg(short, long)]
        username: Option<String>,

        /// Password value (omit for interactive prompt)
        #[arg(short, long)]
        password: Option<String>,

        /// Generate a random password instead of prompting
        #[arg(short, long)]
        generate: bool,

        /// Length of the generated password
        #[arg(long, default_value_t = crate::crypto::DEFAULT_PASSWORD_LENGTH)]
        length: usize,

        /// Website URL
        #[arg(long)]
        url: Option<String>,

        /// Folder (name or id) to file the entry under
        #[arg(long)]
        folder: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show a password entry, revealing the password
    Show {
        /// Entry id or title
        entry: String,
    },

    /// List password entries
    List {
        /// Only show entries in this folder (name or id)
        #[arg(long)]
        folder: Option<String>,
    },

    /// Remove a password entry
    Rm {
        /// Entry id or title
        entry: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Edit a password entry (only the given fields change)
    Edit {
        /// Entry id or title
        entry: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New username
        #[arg(short, long)]
        username: Option<String>,

        /// New password value
        #[arg(short, long)]
        password: Option<String>,

        /// Generate a new random password
        #[arg(short, long)]
        generate: bool,

        /// Length of the generated password
        #[arg(long, default_value_t = crate::crypto::DEFAULT_PASSWORD_LENGTH)]
        length: usize,

        /// New website URL
        #[arg(long)]
        url: Option<String>,

        /// New folder (name or id)
        #[arg(long)]
        folder: Option<String>,

        /// New notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Manage payment cards
    Card {
        #[command(subcommand)]
        action: CardAction,
    },

    /// Manage folders
    Folder {
        #[command(subcommand)]
        action: FolderAction,
    },

    /// Manage trusted devices
    Devices {
        #[command(subcommand)]
        action: DeviceAction,
    },

    /// View the vault's encrypted activity log
    Logs {
        /// Number of events to show
        #[arg(long, default_value_t = crate::vault::DEFAULT_ACTIVITY_LIMIT)]
        last: usize,

        /// Only events of this kind (e.g. login_success, password_view)
        #[arg(long)]
        kind: Option<String>,

        /// Only events from this device (slot name or fingerprint prefix)
        #[arg(long)]
        device: Option<String>,
    },

    /// Show vault status without unlocking
    Status,

    /// Generate random passwords
    Gen {
        /// Password length
        #[arg(long, default_value_t = crate::crypto::DEFAULT_PASSWORD_LENGTH)]
        length: usize,

        /// How many passwords to generate
        #[arg(short, long, default_value = "1")]
        count: usize,
    },

    /// Manage authentication methods (keyring)
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// View the audit log of vault operations
    Audit {
        /// Number of entries to show
        #[arg(long, default_value_t = crate::vault::DEFAULT_ACTIVITY_LIMIT)]
        last: usize,

        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

/// Card subcommands.
#[derive(clap::Subcommand)]
pub enum CardAction {
    /// Add a payment card
    Add {
        /// Card label (e.g. "Personal Visa")
        name: String,

        /// Cardholder name as printed on the card
        #[arg(long)]
        holder: Option<String>,

        /// Card number (omit for interactive prompt)
        #[arg(long)]
        number: Option<String>,

        /// Expiry month (MM)
        #[arg(long)]
        month: Option<String>,

        /// Expiry year (YYYY)
        #[arg(long)]
        year: Option<String>,

        /// Card type: credit, debit, or prepaid
        #[arg(long, default_value = "credit")]
        card_type: String,

        /// Issuing company or bank
        #[arg(long)]
        company: Option<String>,

        /// Billing address
        #[arg(long)]
        address: Option<String>,

        /// Folder (name or id) to file the card under
        #[arg(long)]
        folder: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List cards with masked numbers
    List,

    /// Show a card's full details
    Show {
        /// Card id or name
        card: String,
    },

    /// Remove a card
    Rm {
        /// Card id or name
        card: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Folder subcommands.
#[derive(clap::Subcommand)]
pub enum FolderAction {
    /// Create a folder
    Add {
        /// Folder name
        name: String,

        /// Folder description
        #[arg(long)]
        description: Option<String>,

        /// Display color tag
        #[arg(long)]
        color: Option<String>,

        /// Parent folder (name or id)
        #[arg(long)]
        parent: Option<String>,
    },

    /// List folders
    List,

    /// Rename a folder
    Rename {
        /// Folder name or id
        folder: String,

        /// New name
        new_name: String,
    },

    /// Delete a folder (contents move to its parent)
    Rm {
        /// Folder name or id
        folder: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Device subcommands.
#[derive(clap::Subcommand)]
pub enum DeviceAction {
    /// List trusted devices
    List,

    /// Revoke a device's slot
    Revoke {
        /// Device id or name
        device: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Auth subcommands for keyring management.
#[derive(clap::Subcommand)]
pub enum AuthAction {
    /// Save the master password to the OS keyring (auto-unlock)
    Keyring {
        /// Remove the password from the keyring instead of saving
        #[arg(long)]
        delete: bool,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load settings, honoring an explicit `--config` path.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    match &cli.config {
        Some(path) => Settings::load_file(Path::new(path)),
        None => {
            let cwd = std::env::current_dir()?;
            Settings::load(&cwd)
        }
    }
}

/// The vault file to operate on: `--vault` flag, then config, then the
/// platform default.
pub fn vault_path(cli: &Cli, settings: &Settings) -> Result<PathBuf> {
    match &cli.vault {
        Some(path) => Ok(PathBuf::from(path)),
        None => settings.resolve_vault_path(),
    }
}

/// Assemble a session for the configured vault: file storage, this
/// machine's device profile, and the audit sink when compiled in.
pub fn build_session(cli: &Cli) -> Result<VaultSession<FileStorage>> {
    let settings = load_settings(cli)?;
    let path = vault_path(cli, &settings)?;

    let secret_path = settings.resolve_device_secret_path()?;
    let secret = device::get_or_create_secret(&secret_path)?;
    let profile = DeviceProfile::new(secret, device::device_name());

    let storage = FileStorage::new(&path);
    let config = settings.session_config();

    #[cfg(feature = "audit-log")]
    if let Some(audit) = crate::audit::sink_for(&path) {
        return Ok(VaultSession::with_sink(
            storage,
            profile,
            config,
            Box::new(audit),
        ));
    }

    Ok(VaultSession::new(storage, profile, config))
}

/// Build a session and unlock it, prompting for the password.
///
/// Prints the standard notices (re-encryption upgrades, new device
/// registration) so individual commands don't have to.
pub fn unlock_session(cli: &Cli) -> Result<VaultSession<FileStorage>> {
    let mut session = build_session(cli)?;

    if !session.vault_exists() {
        output::tip("Run `ironvault init` to create a vault.");
        return Err(VaultError::VaultNotFound(session.location()));
    }

    let vault_id = session.location().to_string_lossy().to_string();
    let password = prompt_password_for_vault(Some(&vault_id))?;

    let report = match session.unlock(&password) {
        Ok(report) => report,
        Err(e) => {
            if let Some(warning) = session.take_save_warning() {
                output::warning(&warning);
            }
            return Err(e);
        }
    };

    if report.upgraded {
        output::info("Vault re-encrypted with current security parameters.");
    }
    if report.device_registered {
        output::info("This device now holds a trusted device slot.");
    }

    Ok(session)
}

/// Get the master password, trying in order:
/// 1. `IRONVAULT_PASSWORD` env var (CI/scripting)
/// 2. OS keyring (if compiled with `keyring-store` feature)
/// 3. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password_for_vault(vault_id: Option<&str>) -> Result<Zeroizing<String>> {
    // 1. Check the environment variable first (CI friendly).
    if let Ok(pw) = std::env::var("IRONVAULT_PASSWORD") {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    // 2. Try the OS keyring (if feature enabled and vault_id provided).
    #[cfg(feature = "keyring-store")]
    if let Some(id) = vault_id {
        match crate::keyring::get_password(id) {
            Ok(Some(pw)) => return Ok(Zeroizing::new(pw)),
            Ok(None) => {} // No stored password, continue to prompt.
            Err(_) => {}   // Keyring unavailable, continue to prompt.
        }
    }

    // Suppress unused variable warning when keyring feature is off.
    #[cfg(not(feature = "keyring-store"))]
    let _ = vault_id;

    // 3. Fall back to interactive prompt.
    let pw = dialoguer::Password::new()
        .with_prompt("Enter master password")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation (used during `init`).
///
/// Also respects `IRONVAULT_PASSWORD` for scripted/CI usage.
/// Enforces a minimum password length.
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    // Check the environment variable first (CI friendly).
    if let Ok(pw) = std::env::var("IRONVAULT_PASSWORD") {
        if !pw.is_empty() {
            if pw.len() < MIN_PASSWORD_LEN {
                return Err(VaultError::CommandFailed(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Resolve a password entry by id or title.
///
/// Exact id wins; otherwise a case-insensitive title match must be
/// unique. Returns the entry's id.
pub fn resolve_entry_id(entries: &[PasswordEntry], needle: &str) -> Result<String> {
    if let Some(entry) = entries.iter().find(|e| e.id == needle) {
        return Ok(entry.id.clone());
    }

    let matches: Vec<&PasswordEntry> = entries
        .iter()
        .filter(|e| e.title.eq_ignore_ascii_case(needle))
        .collect();

    match matches.len() {
        0 => Err(VaultError::EntryNotFound(needle.to_string())),
        1 => Ok(matches[0].id.clone()),
        n => Err(VaultError::CommandFailed(format!(
            "'{needle}' matches {n} entries — use the entry id"
        ))),
    }
}

/// Resolve a card by id or name. Returns the card's id.
pub fn resolve_card_id(cards: &[CardEntry], needle: &str) -> Result<String> {
    if let Some(card) = cards.iter().find(|c| c.id == needle) {
        return Ok(card.id.clone());
    }

    let matches: Vec<&CardEntry> = cards
        .iter()
        .filter(|c| c.card_name.eq_ignore_ascii_case(needle))
        .collect();

    match matches.len() {
        0 => Err(VaultError::EntryNotFound(needle.to_string())),
        1 => Ok(matches[0].id.clone()),
        n => Err(VaultError::CommandFailed(format!(
            "'{needle}' matches {n} cards — use the card id"
        ))),
    }
}

/// Resolve a folder by id or name. Returns the folder's id.
pub fn resolve_folder_id(folders: &[Folder], needle: &str) -> Result<String> {
    if let Some(folder) = folders.iter().find(|f| f.id == needle) {
        return Ok(folder.id.clone());
    }

    let matches: Vec<&Folder> = folders
        .iter()
        .filter(|f| f.name.eq_ignore_ascii_case(needle))
        .collect();

    match matches.len() {
        0 => Err(VaultError::FolderNotFound(needle.to_string())),
        1 => Ok(matches[0].id.clone()),
        n => Err(VaultError::CommandFailed(format!(
            "'{needle}' matches {n} folders — use the folder id"
        ))),
    }
}

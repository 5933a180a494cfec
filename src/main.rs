use clap::Parser;
use ironvault::cli::{AuthAction, CardAction, Cli, Commands, DeviceAction, FolderAction};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => ironvault::cli::commands::init::execute(&cli),
        Commands::Add {
            ref title,
            ref username,
            ref password,
            generate,
            length,
            ref url,
            ref folder,
            ref notes,
        } => ironvault::cli::commands::add::execute(
            &cli,
            title,
            username.as_deref(),
            password.as_deref(),
            generate,
            length,
            url.as_deref(),
            folder.as_deref(),
            notes.as_deref(),
        ),
        Commands::Show { ref entry } => ironvault::cli::commands::show::execute(&cli, entry),
        Commands::List { ref folder } => {
            ironvault::cli::commands::list::execute(&cli, folder.as_deref())
        }
        Commands::Rm { ref entry, force } => {
            ironvault::cli::commands::rm::execute(&cli, entry, force)
        }
        Commands::Edit {
            ref entry,
            ref title,
            ref username,
            ref password,
            generate,
            length,
            ref url,
            ref folder,
            ref notes,
        } => ironvault::cli::commands::edit::execute(
            &cli,
            entry,
            title.as_deref(),
            username.as_deref(),
            password.as_deref(),
            generate,
            length,
            url.as_deref(),
            folder.as_deref(),
            notes.as_deref(),
        ),
        Commands::Card { ref action } => match action {
            CardAction::Add {
                ref name,
                ref holder,
                ref number,
                ref month,
                ref year,
                ref card_type,
                ref company,
                ref address,
                ref folder,
                ref notes,
            } => ironvault::cli::commands::card::execute_add(
                &cli,
                name,
                holder.as_deref(),
                number.as_deref(),
                month.as_deref(),
                year.as_deref(),
                card_type,
                company.as_deref(),
                address.as_deref(),
                folder.as_deref(),
                notes.as_deref(),
            ),
            CardAction::List => ironvault::cli::commands::card::execute_list(&cli),
            CardAction::Show { ref card } => {
                ironvault::cli::commands::card::execute_show(&cli, card)
            }
            CardAction::Rm { ref card, force } => {
                ironvault::cli::commands::card::execute_rm(&cli, card, *force)
            }
        },
        Commands::Folder { ref action } => match action {
            FolderAction::Add {
                ref name,
                ref description,
                ref color,
                ref parent,
            } => ironvault::cli::commands::folder::execute_add(
                &cli,
                name,
                description.as_deref(),
                color.as_deref(),
                parent.as_deref(),
            ),
            FolderAction::List => ironvault::cli::commands::folder::execute_list(&cli),
            FolderAction::Rename {
                ref folder,
                ref new_name,
            } => ironvault::cli::commands::folder::execute_rename(&cli, folder, new_name),
            FolderAction::Rm { ref folder, force } => {
                ironvault::cli::commands::folder::execute_rm(&cli, folder, *force)
            }
        },
        Commands::Devices { ref action } => match action {
            DeviceAction::List => ironvault::cli::commands::devices::execute_list(&cli),
            DeviceAction::Revoke { ref device, force } => {
                ironvault::cli::commands::devices::execute_revoke(&cli, device, *force)
            }
        },
        Commands::Logs {
            last,
            ref kind,
            ref device,
        } => ironvault::cli::commands::logs::execute(&cli, last, kind.as_deref(), device.as_deref()),
        Commands::Status => ironvault::cli::commands::status::execute(&cli),
        Commands::Gen { length, count } => ironvault::cli::commands::gen::execute(length, count),
        Commands::Auth { ref action } => match action {
            AuthAction::Keyring { delete } => {
                ironvault::cli::commands::auth::execute_keyring(&cli, *delete)
            }
        },
        Commands::Audit { last, ref since } => {
            ironvault::cli::commands::audit_cmd::execute(&cli, last, since.as_deref())
        }
        Commands::Completions { ref shell } => {
            ironvault::cli::commands::completions::execute(shell)
        }
    };

    if let Err(e) = result {
        ironvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

//! `ironvault card` — manage payment cards in the vault.

use std::str::FromStr;

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{resolve_card_id, resolve_folder_id, unlock_session, Cli};
use crate::errors::{Result, VaultError};
use crate::vault::{CardDraft, CardType};

/// Execute `card add`.
#[allow(clippy::too_many_arguments)] // Mirrors the Clap variant one-to-one.
pub fn execute_add(
    cli: &Cli,
    name: &str,
    holder: Option<&str>,
    number: Option<&str>,
    month: Option<&str>,
    year: Option<&str>,
    card_type: &str,
    company: Option<&str>,
    address: Option<&str>,
    folder: Option<&str>,
    notes: Option<&str>,
) -> Result<()> {
    let card_type = CardType::from_str(card_type)?;

    // Collect the card details, prompting for anything not given as a flag.
    let holder = prompt_missing(holder, "Cardholder name")?;
    let number = prompt_missing(number, "Card number")?;
    let month = prompt_missing(month, "Expiry month (MM)")?;
    let year = prompt_missing(year, "Expiry year (YYYY)")?;

    // The CVV is never accepted as a flag; it would end up in shell history.
    let cvv = dialoguer::Password::new()
        .with_prompt("CVV")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))?;

    let mut session = unlock_session(cli)?;

    let folder_id = match folder {
        Some(needle) => Some(resolve_folder_id(session.folders()?, needle)?),
        None => None,
    };

    let card = session.add_card(CardDraft {
        folder_id,
        card_name: name.to_string(),
        card_holder: holder,
        card_number: number,
        expiry_month: month,
        expiry_year: year,
        cvv,
        card_type,
        company: company.unwrap_or_default().to_string(),
        billing_address: address.map(str::to_string),
        notes: notes.map(str::to_string),
    })?;

    let total = session.cards()?.len();
    output::success(&format!("Card \"{}\" added ({total} total)", card.card_name));
    output::tip(&format!("Run `ironvault card show {}` to view it.", card.card_name));

    Ok(())
}

/// Execute `card list`.
pub fn execute_list(cli: &Cli) -> Result<()> {
    let mut session = unlock_session(cli)?;

    let folders = session.folders()?.to_vec();
    let mut cards = session.cards()?.to_vec();
    cards.sort_by(|a, b| a.card_name.to_lowercase().cmp(&b.card_name.to_lowercase()));

    output::print_cards_table(&cards, &folders);

    Ok(())
}

/// Execute `card show`.
pub fn execute_show(cli: &Cli, card: &str) -> Result<()> {
    let mut session = unlock_session(cli)?;

    let id = resolve_card_id(session.cards()?, card)?;

    // Viewing a card is logged in the vault.
    let viewed = session.view_card(&id)?;

    output::field("Name", &viewed.card_name);
    output::field("Type", viewed.card_type.as_str());
    output::field("Holder", &viewed.card_holder);
    output::field("Number", &viewed.card_number);
    output::field("Expires", &format!("{}/{}", viewed.expiry_month, viewed.expiry_year));
    output::field("CVV", &viewed.cvv);
    if !viewed.company.is_empty() {
        output::field("Company", &viewed.company);
    }
    if let Some(address) = &viewed.billing_address {
        output::field("Billing", address);
    }
    if let Some(notes) = &viewed.notes {
        output::field("Notes", notes);
    }

    Ok(())
}

/// Execute `card rm`.
pub fn execute_rm(cli: &Cli, card: &str, force: bool) -> Result<()> {
    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete card '{card}'?"))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let mut session = unlock_session(cli)?;

    let id = resolve_card_id(session.cards()?, card)?;
    let removed = session.delete_card(&id)?;

    output::success(&format!("Deleted card \"{}\"", removed.card_name));

    Ok(())
}

/// Prompt for a value unless it was already given as a flag.
fn prompt_missing(value: Option<&str>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v.to_string()),
        None => dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()
            .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}"))),
    }
}

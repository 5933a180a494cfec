//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::{ActivityEvent, CardEntry, DeviceSlot, Folder, PasswordEntry};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a labeled detail line: "       Label:  value"
pub fn field(label: &str, value: &str) {
    println!("{} {}", style(format!("{label:>12}:")).dim(), value);
}

/// Render an epoch-milliseconds timestamp in local time.
pub fn format_timestamp(ms: i64) -> String {
    match chrono::DateTime::from_timestamp_millis(ms) {
        Some(dt) => dt
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => "-".to_string(),
    }
}

/// First 12 characters of a device fingerprint, enough to tell slots apart.
pub fn short_fingerprint(fingerprint: &str) -> String {
    fingerprint.chars().take(12).collect()
}

/// Mask a card number down to its last four digits.
pub fn mask_card_number(number: &str) -> String {
    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 4 {
        return "\u{2022}\u{2022}\u{2022}\u{2022}".to_string();
    }
    let last4 = &digits[digits.len() - 4..];
    format!("\u{2022}\u{2022}\u{2022}\u{2022} \u{2022}\u{2022}\u{2022}\u{2022} \u{2022}\u{2022}\u{2022}\u{2022} {last4}")
}

fn folder_name<'a>(folders: &'a [Folder], id: Option<&str>) -> &'a str {
    id.and_then(|id| folders.iter().find(|f| f.id == id))
        .map_or("-", |f| f.name.as_str())
}

/// Print a table of password entries (passwords themselves stay hidden).
pub fn print_passwords_table(entries: &[PasswordEntry], folders: &[Folder]) {
    if entries.is_empty() {
        info("No passwords in this vault yet.");
        tip("Run `ironvault add <title>` to add your first entry.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Title", "Username", "URL", "Folder", "Updated"]);

    for e in entries {
        table.add_row(vec![
            e.title.clone(),
            e.username.clone(),
            e.url.clone().unwrap_or_else(|| "-".to_string()),
            folder_name(folders, e.folder_id.as_deref()).to_string(),
            format_timestamp(e.updated_at),
        ]);
    }

    println!("{table}");
}

/// Print a table of cards with masked numbers.
pub fn print_cards_table(cards: &[CardEntry], folders: &[Folder]) {
    if cards.is_empty() {
        info("No cards in this vault yet.");
        tip("Run `ironvault card add <name>` to add one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Type", "Number", "Holder", "Expires", "Folder"]);

    for c in cards {
        table.add_row(vec![
            c.card_name.clone(),
            c.card_type.as_str().to_string(),
            mask_card_number(&c.card_number),
            c.card_holder.clone(),
            format!("{}/{}", c.expiry_month, c.expiry_year),
            folder_name(folders, c.folder_id.as_deref()).to_string(),
        ]);
    }

    println!("{table}");
}

/// Print a table of folders.
pub fn print_folders_table(folders: &[Folder]) {
    if folders.is_empty() {
        info("No folders in this vault yet.");
        tip("Run `ironvault folder add <name>` to create one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Description", "Parent", "Created"]);

    for f in folders {
        table.add_row(vec![
            f.name.clone(),
            f.description.clone().unwrap_or_else(|| "-".to_string()),
            folder_name(folders, f.parent_id.as_deref()).to_string(),
            format_timestamp(f.created_at),
        ]);
    }

    println!("{table}");
}

/// Print a table of trusted device slots, marking the current device.
pub fn print_devices_table(devices: &[DeviceSlot], current_fingerprint: &str) {
    if devices.is_empty() {
        info("No devices registered yet.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Fingerprint", "Registered", "Last access"]);

    for d in devices {
        let name = if d.fingerprint == current_fingerprint {
            format!("{} (this device)", d.name)
        } else {
            d.name.clone()
        };
        table.add_row(vec![
            name,
            short_fingerprint(&d.fingerprint),
            format_timestamp(d.registered_at),
            format_timestamp(d.last_access),
        ]);
    }

    println!("{table}");
}

/// Print a table of activity events, newest first.
pub fn print_activity_table(events: &[ActivityEvent]) {
    if events.is_empty() {
        info("No activity recorded yet.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Event", "Details", "Device"]);

    for e in events {
        table.add_row(vec![
            format_timestamp(e.timestamp),
            e.kind.as_str().to_string(),
            e.details.clone(),
            short_fingerprint(&e.device_id),
        ]);
    }

    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_keeps_last_four_digits() {
        let masked = mask_card_number("4111 1111 1111 1234");
        assert!(masked.ends_with("1234"));
        assert!(!masked.contains("4111"));
    }

    #[test]
    fn mask_handles_short_numbers() {
        assert_eq!(mask_card_number("12"), "\u{2022}\u{2022}\u{2022}\u{2022}");
    }

    #[test]
    fn short_fingerprint_truncates() {
        let fp = "abcdef0123456789abcdef";
        assert_eq!(short_fingerprint(fp), "abcdef012345");
    }

    #[test]
    fn format_timestamp_renders_a_date() {
        // 2024-06-15T12:00:00Z, rendered in local time.
        let rendered = format_timestamp(1_718_452_800_000);
        assert!(rendered.contains("2024-06"));
    }

    #[test]
    fn format_timestamp_rejects_out_of_range() {
        assert_eq!(format_timestamp(i64::MAX), "-");
    }
}

//! Subcommand implementations, one module per command.

pub mod add;
pub mod audit_cmd;
pub mod auth;
pub mod card;
pub mod completions;
pub mod devices;
pub mod edit;
pub mod folder;
pub mod gen;
pub mod init;
pub mod list;
pub mod logs;
pub mod rm;
pub mod show;
pub mod status;

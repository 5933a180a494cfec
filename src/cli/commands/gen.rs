//! `ironvault gen` — generate random passwords.
//!
//! Prints to stdout, one per line, so the output can be piped:
//!   ironvault gen --length 32
//!   ironvault gen -c 5

use crate::crypto::generator;
use crate::errors::{Result, VaultError};

/// Execute the `gen` command.
pub fn execute(length: usize, count: usize) -> Result<()> {
    if length == 0 {
        return Err(VaultError::CommandFailed(
            "password length must be at least 1".into(),
        ));
    }

    for _ in 0..count {
        println!("{}", generator::generate_password(length));
    }

    Ok(())
}

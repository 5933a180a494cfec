//! Random password generation.
//!
//! Uniform sampling over a fixed 88-character set, using the OS-seeded
//! thread CSPRNG.

use rand::Rng;

/// Characters eligible for generated passwords.
const CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Default length for generated passwords.
pub const DEFAULT_PASSWORD_LENGTH: usize = 20;

/// Generate a random password of `length` characters.
///
/// `random_range` samples without modulo bias, so every charset member is
/// equally likely.
pub fn generate_password(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

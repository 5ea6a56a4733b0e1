//! Random salt generation.

use crate::error::{RandomSnafu, Result};
use snafu::ResultExt;

/// Characters a generated salt is drawn from.
pub const SALT_ALPHABET: &[u8; 62] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Largest multiple of the alphabet size that fits in a byte. Bytes at or
/// above it are discarded so every character stays equally likely.
const REJECTION_LIMIT: u8 = (256 / SALT_ALPHABET.len() * SALT_ALPHABET.len()) as u8;

/// A source of random alphanumeric salts.
///
/// [`generate_with`](crate::generate_with) takes one of these so tests (or
/// callers with their own entropy) can replace the operating system source.
pub trait SaltSource {
    /// Produce `len` characters, each drawn independently and uniformly from
    /// [`SALT_ALPHABET`].
    fn alphanumeric(&mut self, len: usize) -> Result<String>;
}

/// Salt source backed by the operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSaltSource;

impl SaltSource for OsSaltSource {
    fn alphanumeric(&mut self, len: usize) -> Result<String> {
        let mut salt = String::with_capacity(len);
        // Roughly 3% of bytes are rejected, so one extra refill is rare.
        let mut buf = [0u8; 32];
        while salt.len() < len {
            getrandom::fill(&mut buf).context(RandomSnafu)?;
            for &byte in buf.iter().filter(|&&b| b < REJECTION_LIMIT) {
                if salt.len() == len {
                    break;
                }
                salt.push(SALT_ALPHABET[usize::from(byte) % SALT_ALPHABET.len()] as char);
            }
        }
        Ok(salt)
    }
}

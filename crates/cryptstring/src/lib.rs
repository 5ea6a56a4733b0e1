#![warn(missing_docs)]

//! Shadow-file compatible password strings.
//!
//! This library builds the `$5$` (SHA-256) and `$6$` (SHA-512) crypt strings
//! found in `/etc/shadow`, byte-for-byte identical to what `crypt(3)`
//! produces for the same secret, salt and rounds.
//!
//! Verification works by reproduction: the salt and rounds are read back out
//! of a known string, the candidate is hashed with them, and the two strings
//! are compared.
//!
//! # Example
//!
//! ```
//! use cryptstring::{Algorithm, Rounds, generate, is_empty_secret, verify};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Fresh random salt, default 5000 rounds
//! let hash = generate("hunter2", Algorithm::Sha512, None, None)?;
//! assert!(hash.starts_with("$6$"));
//! assert!(verify("hunter2", &hash)?);
//! assert!(!is_empty_secret(&hash)?);
//!
//! // Pinned salt and explicit rounds, below-minimum counts are raised
//! let hash = generate("hunter2", Algorithm::Sha256, Some("abcdefgh"), Some(Rounds::new(500)))?;
//! assert!(hash.starts_with("$5$rounds=1000$abcdefgh$"));
//! # Ok(())
//! # }
//! ```

mod crypt_string;
mod error;
mod hash;
mod salt;
mod sha_crypt;

pub use crypt_string::CryptString;
pub use error::{Error, Result};
pub use hash::{
    Algorithm, Rounds, detect_algorithm, generate, generate_with, is_empty_secret, verify,
};
pub use salt::{OsSaltSource, SALT_ALPHABET, SaltSource};

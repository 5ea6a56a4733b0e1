//! SHA-crypt (`$5$` / `$6$`) password hashing.
//!
//! This module implements the SHA-256 and SHA-512 based crypt scheme used by
//! glibc/libxcrypt `crypt(3)` and stored in `/etc/shadow`. The format is:
//! `$<id>$[rounds=<N>$]<salt>$<hash>`
//!
//! # Algorithm Source
//!
//! Ulrich Drepper, "Unix crypt using SHA-256 and SHA-512":
//! https://www.akkadia.org/drepper/SHA-crypt.txt
//!
//! # Salt handling
//!
//! The salt stops at the first `$` and is cut to 16 bytes, exactly as
//! `crypt(3)` reads it. libxcrypt additionally refuses salts with bytes outside
//! the crypt alphabet `./0-9A-Za-z` and so does this module, reporting
//! [`Error::UnsupportedSalt`] where `crypt(3)` would hand back a `*0` failure
//! token.
//!
//! The key stretching and the crypt base64 encoding of the digest come from
//! the `sha-crypt` crate. This module only decides which salt it sees and
//! assembles the setting around the encoded digest.

use crate::error::{Error, Result, UnsupportedSaltSnafu};
use crate::hash::{Algorithm, Rounds};
use ::sha_crypt::{Sha256Params, Sha512Params, sha256_crypt_b64, sha512_crypt_b64};
use snafu::ensure;
use std::fmt;

/// The crypt base64 alphabet (`itoa64`), the only bytes a salt may hold.
const ITOA64: &[u8; 64] = b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Longest salt `crypt(3)` takes into account.
pub(crate) const SALT_MAX_LEN: usize = 16;

/// Hash `password` into a complete crypt string.
///
/// `rounds` of `None` runs the default 5000 rounds and leaves the `rounds=`
/// clause out of the result, like `crypt(3)` does for a setting without one.
pub(crate) fn crypt(
    algorithm: Algorithm,
    password: &[u8],
    salt: &str,
    rounds: Option<Rounds>,
) -> Result<String> {
    let salt = effective_salt(salt)?;
    let count = rounds.map_or(Rounds::DEFAULT, Rounds::get) as usize;

    let encoded = match algorithm {
        Algorithm::Sha256 => {
            let params = Sha256Params::new(count).map_err(digest_error)?;
            sha256_crypt_b64(password, salt.as_bytes(), &params).map_err(digest_error)?
        }
        Algorithm::Sha512 => {
            let params = Sha512Params::new(count).map_err(digest_error)?;
            sha512_crypt_b64(password, salt.as_bytes(), &params).map_err(digest_error)?
        }
    };

    let mut result = String::from(algorithm.prefix());
    if let Some(rounds) = rounds {
        result.push_str(&format!("rounds={}$", rounds.get()));
    }
    result.push_str(salt);
    result.push('$');
    result.push_str(&encoded);
    Ok(result)
}

fn digest_error(err: impl fmt::Debug) -> Error {
    Error::Digest {
        message: format!("{err:?}"),
    }
}

/// The part of `salt` that `crypt(3)` actually uses.
fn effective_salt(salt: &str) -> Result<&str> {
    let end = salt.find('$').unwrap_or(salt.len()).min(SALT_MAX_LEN);
    let bytes = &salt.as_bytes()[..end];
    ensure!(
        bytes.iter().all(|b| ITOA64.contains(b)),
        UnsupportedSaltSnafu { salt }
    );
    // Every byte is ASCII at this point, so `end` is a char boundary.
    Ok(&salt[..end])
}

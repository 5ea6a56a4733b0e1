use crate::error::{MalformedHashSnafu, Result};
use crate::hash::{Algorithm, detect_algorithm};
use snafu::OptionExt;
use std::fmt;

/// A crypt string split into its fields.
///
/// Borrows from the string it was parsed from. Displaying it reproduces that
/// string exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CryptString<'a> {
    /// Which SHA-crypt variant the `$5$`/`$6$` prefix names.
    pub algorithm: Algorithm,
    /// The `rounds=N` value, if the string carries that clause.
    pub rounds: Option<u32>,
    /// Salt field, between the prefix (or rounds clause) and the next `$`.
    pub salt: &'a str,
    /// Encoded digest, everything after the salt terminator.
    pub hash: &'a str,
}

impl<'a> CryptString<'a> {
    /// Split `s` into its fields.
    ///
    /// Only the layout is checked. Whether the hash has the right length or
    /// alphabet is left to whoever compares it.
    pub fn parse(s: &'a str) -> Result<Self> {
        let algorithm = detect_algorithm(s).context(MalformedHashSnafu {
            reason: "expected a $5$ or $6$ prefix",
        })?;
        let rest = &s[algorithm.prefix().len()..];

        let (rounds, rest) = match rest.strip_prefix("rounds=") {
            Some(clause) => {
                let (count, rest) = clause.split_once('$').context(MalformedHashSnafu {
                    reason: "rounds clause is not terminated by '$'",
                })?;
                let count = count.parse::<u32>().ok().context(MalformedHashSnafu {
                    reason: "rounds clause is not a number",
                })?;
                (Some(count), rest)
            }
            None => (None, rest),
        };

        let (salt, hash) = rest.split_once('$').context(MalformedHashSnafu {
            reason: "salt is not terminated by '$'",
        })?;

        Ok(Self {
            algorithm,
            rounds,
            salt,
            hash,
        })
    }
}

impl fmt::Display for CryptString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.algorithm.prefix())?;
        if let Some(rounds) = self.rounds {
            write!(f, "rounds={rounds}$")?;
        }
        write!(f, "{}${}", self.salt, self.hash)
    }
}

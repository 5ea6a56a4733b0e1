//! Getting a password from the user and turning it into a crypt string.

use crate::Result;
use cryptstring::{Algorithm, Rounds, generate, is_empty_secret, verify};
use snafu::ResultExt;
use std::io::{self, Write};
use tracing::debug;
use zeroize::Zeroizing;

/// How crypt strings are built and which passwords are acceptable.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub algorithm: Algorithm,
    pub salt: Option<String>,
    pub rounds: Option<Rounds>,
    pub allow_empty: bool,
}

/// Something that can ask for a secret.
pub(crate) trait SecretSource {
    fn read_secret(&mut self, prompt: &str) -> io::Result<Zeroizing<String>>;
}

/// Prompts on the controlling terminal without echoing input.
pub(crate) struct TerminalPrompt;

impl SecretSource for TerminalPrompt {
    fn read_secret(&mut self, prompt: &str) -> io::Result<Zeroizing<String>> {
        rpassword::prompt_password(prompt).map(Zeroizing::new)
    }
}

impl Settings {
    fn generate(&self, secret: &str) -> Result<String> {
        generate(secret, self.algorithm, self.salt.as_deref(), self.rounds)
            .whatever_context("Can't generate crypt string")
    }
}

/// Hash a secret that was handed over non-interactively.
pub(crate) fn scripted(secret: &str, settings: &Settings) -> Result<String> {
    let attempt = settings.generate(secret)?;
    if !settings.allow_empty {
        let empty = is_empty_secret(&attempt)
            .whatever_context("Can't check for an empty password")?;
        snafu::ensure_whatever!(!empty, "Empty passwords not allowed");
    }
    Ok(attempt)
}

/// Prompt until the user enters an acceptable password twice.
///
/// Rejections are reported on `diagnostics` and the loop starts over. The
/// confirmation and the empty-password check both rehash with the salt and
/// rounds of the first attempt and compare the resulting strings.
pub(crate) fn interactive<S, W>(
    source: &mut S,
    prompt: &str,
    confirm_prompt: &str,
    settings: &Settings,
    diagnostics: &mut W,
) -> Result<String>
where
    S: SecretSource + ?Sized,
    W: Write + ?Sized,
{
    loop {
        let secret = source
            .read_secret(prompt)
            .whatever_context("Can't prompt for password")?;
        let attempt = settings.generate(&secret)?;

        if !settings.allow_empty
            && is_empty_secret(&attempt).whatever_context("Can't check for an empty password")?
        {
            debug!("empty password rejected");
            writeln!(diagnostics, "Empty passwords not allowed. Try again.")
                .whatever_context("Can't write to stderr")?;
            continue;
        }

        let confirm = source
            .read_secret(confirm_prompt)
            .whatever_context("Can't prompt for password confirmation")?;
        if !verify(&confirm, &attempt).whatever_context("Can't check password confirmation")? {
            debug!("confirmation mismatch");
            writeln!(diagnostics, "Passwords do not match. Try again.")
                .whatever_context("Can't write to stderr")?;
            continue;
        }

        return Ok(attempt);
    }
}

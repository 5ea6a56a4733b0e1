use snafu::Snafu;

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while building or checking crypt strings.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// The algorithm name does not match SHA-256 or SHA-512.
    #[snafu(display("Unknown hash algorithm '{name}', expected 256 or 512"))]
    UnknownAlgorithm { name: String },

    /// The string is not a `$5$`/`$6$` crypt string.
    #[snafu(display("Malformed crypt string: {reason}"))]
    MalformedHash { reason: &'static str },

    /// The salt holds characters the SHA-crypt scheme can't represent.
    #[snafu(display("Salt '{salt}' contains characters outside [./0-9A-Za-z]"))]
    UnsupportedSalt { salt: String },

    /// The SHA-crypt digest could not be computed.
    #[snafu(display("Can't compute SHA-crypt digest: {message}"))]
    Digest { message: String },

    /// The operating system random source failed.
    #[snafu(display("Can't read from the system random source"))]
    Random { source: getrandom::Error },
}

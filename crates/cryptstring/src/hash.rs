use crate::crypt_string::CryptString;
use crate::error::{Error, Result};
use crate::salt::{OsSaltSource, SaltSource};
use crate::sha_crypt;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const SHA256_PREFIX: &str = "$5$";
const SHA512_PREFIX: &str = "$6$";

/// SHA-crypt variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// SHA-256 crypt, `$5$`.
    Sha256,
    /// SHA-512 crypt, `$6$`.
    #[default]
    Sha512,
}

impl Algorithm {
    /// The `$<id>$` prefix that opens crypt strings of this variant.
    pub const fn prefix(self) -> &'static str {
        match self {
            Algorithm::Sha256 => SHA256_PREFIX,
            Algorithm::Sha512 => SHA512_PREFIX,
        }
    }

    /// Length of a salt generated for this variant.
    pub const fn salt_len(self) -> usize {
        match self {
            Algorithm::Sha256 => 8,
            Algorithm::Sha512 => 16,
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "256" | "5" | "sha256" | "sha-256" => Ok(Algorithm::Sha256),
            "512" | "6" | "sha512" | "sha-512" => Ok(Algorithm::Sha512),
            _ => Err(Error::UnknownAlgorithm {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Sha256 => write!(f, "sha256"),
            Algorithm::Sha512 => write!(f, "sha512"),
        }
    }
}

/// An explicit round count, always within `[Rounds::MIN, Rounds::MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rounds(u32);

impl Rounds {
    /// Smallest accepted round count.
    pub const MIN: u32 = 1000;
    /// Largest accepted round count.
    pub const MAX: u32 = 999_999_999;
    /// Round count `crypt(3)` uses when none is given.
    pub const DEFAULT: u32 = 5000;

    /// Clamp `requested` into the accepted range.
    ///
    /// Out-of-range values are not an error: anything below [`Rounds::MIN`]
    /// is raised to it and anything above [`Rounds::MAX`] is lowered to it.
    /// A request of `0` means "unspecified" and yields [`Rounds::DEFAULT`].
    pub fn new(requested: u64) -> Self {
        if requested == 0 {
            return Self(Self::DEFAULT);
        }
        let clamped = requested.clamp(u64::from(Self::MIN), u64::from(Self::MAX));
        // Fits: MAX is a u32.
        Self(clamped as u32)
    }

    /// The effective round count.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for Rounds {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl fmt::Display for Rounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Generate a crypt string for `secret`.
///
/// The output is `$5$[rounds=N$]salt$hash` for SHA-256 and
/// `$6$[rounds=N$]salt$hash` for SHA-512. With `salt` of `None` a fresh
/// alphanumeric salt of [`Algorithm::salt_len`] characters is drawn from the
/// operating system. An explicit salt is handed to the digest untouched.
/// With `rounds` of `None` the default 5000 rounds are used and the
/// `rounds=` clause is left out.
///
/// The same inputs always produce the same string, which is what
/// [`verify`] relies on.
pub fn generate(
    secret: &str,
    algorithm: Algorithm,
    salt: Option<&str>,
    rounds: Option<Rounds>,
) -> Result<String> {
    generate_with(&mut OsSaltSource, secret, algorithm, salt, rounds)
}

/// Like [`generate`], drawing missing salts from `source`.
pub fn generate_with<S: SaltSource + ?Sized>(
    source: &mut S,
    secret: &str,
    algorithm: Algorithm,
    salt: Option<&str>,
    rounds: Option<Rounds>,
) -> Result<String> {
    let (salt, salt_generated) = match salt {
        Some(salt) => (Cow::Borrowed(salt), false),
        None => (Cow::Owned(source.alphanumeric(algorithm.salt_len())?), true),
    };

    debug!(
        %algorithm,
        salt_generated,
        rounds = rounds.map_or(Rounds::DEFAULT, Rounds::get),
        rounds_clause = rounds.is_some(),
        "generating crypt string"
    );
    sha_crypt::crypt(algorithm, secret.as_bytes(), &salt, rounds)
}

/// Check `candidate` against `known_hash` by regenerating it.
///
/// The algorithm, salt and rounds clause are taken from `known_hash` and
/// `candidate` is hashed with them. The result is compared with
/// `known_hash` as a whole. There is no separate verification algorithm.
pub fn verify(candidate: &str, known_hash: &str) -> Result<bool> {
    let known = CryptString::parse(known_hash)?;
    let rounds = known.rounds.map(|count| Rounds::new(u64::from(count)));
    let computed = generate(candidate, known.algorithm, Some(known.salt), rounds)?;

    // Don't stop at the first differing byte.
    Ok(computed.len() == known_hash.len()
        && computed
            .bytes()
            .zip(known_hash.bytes())
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0)
}

/// Whether `known_hash` is the hash of an empty secret.
pub fn is_empty_secret(known_hash: &str) -> Result<bool> {
    verify("", known_hash)
}

/// Detect the SHA-crypt variant from a crypt string prefix.
pub fn detect_algorithm(hash: &str) -> Option<Algorithm> {
    if hash.starts_with(SHA256_PREFIX) {
        Some(Algorithm::Sha256)
    } else if hash.starts_with(SHA512_PREFIX) {
        Some(Algorithm::Sha512)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::salt::SALT_ALPHABET;

    const HUNTER2_SHA512: &str = "$6$abcdefghijklmnop$EC.xeLW9zNWcX0r23FSpQaV7PG.Ibd4QnLe3w6UC47i3/vkPQouEDwvUpGtqFiad5mzQG96cD/LywQiXv9WfH/";

    /// Hands out salts from a fixed list, in order.
    struct ScriptedSalts {
        salts: Vec<&'static str>,
        requested: Vec<usize>,
    }

    impl ScriptedSalts {
        fn new(salts: &[&'static str]) -> Self {
            Self {
                salts: salts.iter().rev().copied().collect(),
                requested: Vec::new(),
            }
        }
    }

    impl SaltSource for ScriptedSalts {
        fn alphanumeric(&mut self, len: usize) -> Result<String> {
            self.requested.push(len);
            Ok(self.salts.pop().expect("ran out of scripted salts").to_string())
        }
    }

    fn salt_of(hash: &str) -> &str {
        CryptString::parse(hash).unwrap().salt
    }

    #[test]
    fn test_generate_known_vector() {
        let hash = generate("hunter2", Algorithm::Sha512, Some("abcdefghijklmnop"), None).unwrap();
        assert_eq!(hash, HUNTER2_SHA512);
    }

    #[test]
    fn test_generate_is_deterministic() {
        for algorithm in [Algorithm::Sha256, Algorithm::Sha512] {
            for rounds in [None, Some(Rounds::new(1000))] {
                let first = generate("s3cret", algorithm, Some("pinnedsalt"), rounds).unwrap();
                let second = generate("s3cret", algorithm, Some("pinnedsalt"), rounds).unwrap();
                assert_eq!(first, second);
            }
        }
    }

    #[test]
    fn test_salt_only_changes_salt_and_hash() {
        let rounds = Some(Rounds::new(2000));
        let a = generate("s3cret", Algorithm::Sha512, Some("saltAAAA"), rounds).unwrap();
        let b = generate("s3cret", Algorithm::Sha512, Some("saltBBBB"), rounds).unwrap();
        let a = CryptString::parse(&a).unwrap();
        let b = CryptString::parse(&b).unwrap();
        assert_eq!(a.algorithm, b.algorithm);
        assert_eq!(a.rounds, b.rounds);
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_algorithm_prefixes() {
        let sha256 = generate("pw", Algorithm::Sha256, None, None).unwrap();
        let sha512 = generate("pw", Algorithm::Sha512, None, None).unwrap();
        assert!(sha256.starts_with("$5$"));
        assert!(sha512.starts_with("$6$"));
    }

    #[test]
    fn test_default_algorithm_is_sha512() {
        assert_eq!(Algorithm::default(), Algorithm::Sha512);
    }

    #[test]
    fn test_rounds_clamping() {
        assert_eq!(Rounds::new(500).get(), 1000);
        assert_eq!(Rounds::new(1).get(), 1000);
        assert_eq!(Rounds::new(1000).get(), 1000);
        assert_eq!(Rounds::new(12345).get(), 12345);
        assert_eq!(Rounds::new(999_999_999).get(), 999_999_999);
        assert_eq!(Rounds::new(2_000_000_000).get(), 999_999_999);
        assert_eq!(Rounds::new(u64::MAX).get(), 999_999_999);
    }

    #[test]
    fn test_zero_rounds_means_default() {
        assert_eq!(Rounds::new(0).get(), Rounds::DEFAULT);
        assert_eq!(Rounds::default().get(), 5000);
    }

    #[test]
    fn test_low_rounds_are_raised_in_output() {
        let hash = generate(
            "hunter2",
            Algorithm::Sha512,
            Some("abcdefghijklmnop"),
            Some(Rounds::new(500)),
        )
        .unwrap();
        assert_eq!(
            hash,
            "$6$rounds=1000$abcdefghijklmnop$1Zo6e5gKWP0lmwe.29MVR9eJxZv7o0Wxw.pGP/ohm9lfXpkkzLUuPXzHT7aytyKl.9XrFxNghw.0sHe0pyVPT."
        );
    }

    #[test]
    fn test_no_rounds_clause_without_rounds() {
        let hash = generate("pw", Algorithm::Sha256, Some("abcdefgh"), None).unwrap();
        assert!(!hash.contains("rounds="));
        assert_eq!(CryptString::parse(&hash).unwrap().rounds, None);
    }

    #[test]
    fn test_explicit_default_rounds_keeps_clause() {
        let hash = generate(
            "hunter2",
            Algorithm::Sha512,
            Some("abcdefghijklmnop"),
            Some(Rounds::default()),
        )
        .unwrap();
        assert_eq!(
            hash,
            "$6$rounds=5000$abcdefghijklmnop$EC.xeLW9zNWcX0r23FSpQaV7PG.Ibd4QnLe3w6UC47i3/vkPQouEDwvUpGtqFiad5mzQG96cD/LywQiXv9WfH/"
        );
    }

    #[test]
    fn test_generated_salt_shape() {
        for (algorithm, len) in [(Algorithm::Sha256, 8), (Algorithm::Sha512, 16)] {
            let hash = generate("pw", algorithm, None, None).unwrap();
            let salt = salt_of(&hash);
            assert_eq!(salt.len(), len);
            assert!(salt.bytes().all(|b| SALT_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_generated_salts_differ() {
        let first = generate("pw", Algorithm::Sha512, None, None).unwrap();
        let second = generate("pw", Algorithm::Sha512, None, None).unwrap();
        assert_ne!(salt_of(&first), salt_of(&second));
    }

    #[test]
    fn test_injected_salt_source() {
        let mut source = ScriptedSalts::new(&["abcdefghijklmnop", "AAAAAAAA"]);
        let sha512 = generate_with(&mut source, "hunter2", Algorithm::Sha512, None, None).unwrap();
        let sha256 = generate_with(&mut source, "hunter2", Algorithm::Sha256, None, None).unwrap();
        assert_eq!(sha512, HUNTER2_SHA512);
        assert_eq!(
            sha256,
            "$5$AAAAAAAA$hjbMRf1l9GUYRAviFnPTp9P6sAmJAZhCElWDXx/xKC5"
        );
        assert_eq!(source.requested, vec![16, 8]);
    }

    #[test]
    fn test_explicit_salt_skips_source() {
        let mut source = ScriptedSalts::new(&[]);
        generate_with(&mut source, "pw", Algorithm::Sha512, Some("given"), None).unwrap();
        assert!(source.requested.is_empty());
    }

    #[test]
    fn test_explicit_salt_is_not_length_checked() {
        let short = generate("pw", Algorithm::Sha512, Some("x"), None).unwrap();
        assert!(short.starts_with("$6$x$"));
        let long =
            generate("pw", Algorithm::Sha256, Some("abcdefghijklmnopqrstuvwxyz"), None).unwrap();
        assert!(long.starts_with("$5$abcdefghijklmnop$"));
    }

    #[test]
    fn test_unsupported_salt_is_a_digest_failure() {
        let result = generate("pw", Algorithm::Sha512, Some("not:valid"), None);
        assert!(matches!(result, Err(Error::UnsupportedSalt { .. })));
    }

    #[test]
    fn test_verify() {
        assert!(verify("hunter2", HUNTER2_SHA512).unwrap());
        assert!(!verify("hunter3", HUNTER2_SHA512).unwrap());
        assert!(!verify("", HUNTER2_SHA512).unwrap());
    }

    #[test]
    fn test_verify_honours_rounds_clause() {
        let rounds = Some(Rounds::new(1500));
        let hash = generate("pw", Algorithm::Sha256, Some("abcdefgh"), rounds).unwrap();
        assert!(verify("pw", &hash).unwrap());
        assert!(!verify("pw2", &hash).unwrap());
    }

    #[test]
    fn test_verify_generated_hashes() {
        for algorithm in [Algorithm::Sha256, Algorithm::Sha512] {
            let hash = generate("test_password_123", algorithm, None, None).unwrap();
            assert!(verify("test_password_123", &hash).unwrap());
            assert!(!verify("wrong_password", &hash).unwrap());
        }
    }

    #[test]
    fn test_verify_rejects_out_of_range_rounds_text() {
        // crypt(3) would have written rounds=1000, so this can never match.
        let hash = "$6$rounds=500$abcdefghijklmnop$1Zo6e5gKWP0lmwe.29MVR9eJxZv7o0Wxw.pGP/ohm9lfXpkkzLUuPXzHT7aytyKl.9XrFxNghw.0sHe0pyVPT.";
        assert!(!verify("hunter2", hash).unwrap());
    }

    #[test]
    fn test_verify_malformed() {
        assert!(matches!(
            verify("pw", "$2b$12$abc"),
            Err(Error::MalformedHash { .. })
        ));
        assert!(matches!(verify("pw", "nope"), Err(Error::MalformedHash { .. })));
    }

    #[test]
    fn test_empty_secret_detection() {
        let empty = generate("", Algorithm::Sha512, Some("abcdefghijklmnop"), None).unwrap();
        assert_eq!(
            empty,
            "$6$abcdefghijklmnop$6.vC8ffobuN7AxcHvesxeeksF2DXFfpYyFt3PFU8pYpEQPhWFSN7hwaUQRfHg/LkfB3jIPEitUcU7ZTqjaQUp1"
        );
        assert_eq!(
            generate("", Algorithm::Sha512, Some(salt_of(&empty)), None).unwrap(),
            empty
        );
        assert!(is_empty_secret(&empty).unwrap());
        assert!(!is_empty_secret(HUNTER2_SHA512).unwrap());
    }

    #[test]
    fn test_detect_algorithm() {
        assert_eq!(
            detect_algorithm("$5$rounds=5000$salt$hash"),
            Some(Algorithm::Sha256)
        );
        assert_eq!(detect_algorithm("$5$salt$hash"), Some(Algorithm::Sha256));
        assert_eq!(
            detect_algorithm("$6$rounds=5000$salt$hash"),
            Some(Algorithm::Sha512)
        );
        assert_eq!(detect_algorithm("$6$salt$hash"), Some(Algorithm::Sha512));
        assert_eq!(detect_algorithm("$2b$12$abc"), None);
        assert_eq!(detect_algorithm("$apr1$salt$hash"), None);
        assert_eq!(detect_algorithm("invalid"), None);
    }

    #[test]
    fn test_algorithm_from_str() {
        for name in ["256", "5", "sha256", "SHA256", "sha-256"] {
            assert_eq!(Algorithm::from_str(name).unwrap(), Algorithm::Sha256);
        }
        for name in ["512", "6", "sha512", "SHA-512"] {
            assert_eq!(Algorithm::from_str(name).unwrap(), Algorithm::Sha512);
        }
        for name in ["", "md5", "bcrypt", "384", "sha1"] {
            assert!(matches!(
                Algorithm::from_str(name),
                Err(Error::UnknownAlgorithm { .. })
            ));
        }
    }

    #[test]
    fn test_algorithm_display_parses_back() {
        for algorithm in [Algorithm::Sha256, Algorithm::Sha512] {
            assert_eq!(algorithm.to_string().parse::<Algorithm>().unwrap(), algorithm);
        }
    }
}

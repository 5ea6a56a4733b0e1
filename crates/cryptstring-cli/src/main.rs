use clap::{ArgAction, Parser};
use cryptstring::{Algorithm, Rounds};
use snafu::ResultExt;
use std::io::{self, BufRead, IsTerminal};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use zeroize::Zeroizing;

mod acquire;

/// Retrieve a secret string, print a shadow-style Unix crypt-string result.
///
/// When standard input is not a terminal, script mode is switched on
/// automatically.
#[derive(Parser)]
#[command(name = "cryptstring")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Hash algorithm to use (512 or 256)
    #[arg(short, long, default_value = "512")]
    algorithm: String,

    /// Expect to be called from a script: allow empty passwords, disable
    /// all prompts and confirmation, and read the password from stdin
    #[arg(short, long)]
    script: bool,

    /// Prompt to display
    #[arg(short, long, default_value = "Enter a password: ")]
    prompt: String,

    /// Prompt to display for confirmation
    #[arg(
        short,
        long,
        default_value = "Confirm password: ",
        value_name = "PROMPT"
    )]
    confirm_prompt: String,

    /// Allow selection of empty passwords
    #[arg(short, long)]
    empty_allowed: bool,

    /// Reject empty passwords, even in script mode
    #[arg(long, conflicts_with = "empty_allowed")]
    no_empty: bool,

    /// Use the specified salt
    #[arg(short = 'S', long)]
    salt: Option<String>,

    /// Use an explicit round count, clamped to 1000..=999999999
    #[arg(short, long)]
    rounds: Option<u64>,

    /// Log more to stderr (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

type Result<T> = ::std::result::Result<T, snafu::Whatever>;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(io::stderr)
                .compact(),
        )
        .init();
}

fn read_password_from_stdin() -> Result<Zeroizing<String>> {
    let mut line = Zeroizing::new(String::new());
    io::stdin()
        .lock()
        .read_line(&mut line)
        .whatever_context("Can't read password from stdin")?;
    Ok(Zeroizing::new(line.trim_end().to_string()))
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let algorithm: Algorithm = cli
        .algorithm
        .parse()
        .whatever_context("Can't parse algorithm name")?;
    let script = cli.script || !io::stdin().is_terminal();
    let allow_empty = !cli.no_empty && (script || cli.empty_allowed);

    let settings = acquire::Settings {
        algorithm,
        salt: cli.salt,
        rounds: cli.rounds.map(Rounds::new),
        allow_empty,
    };
    info!(
        %algorithm,
        script,
        allow_empty,
        salt_supplied = settings.salt.is_some(),
        rounds = ?settings.rounds.map(Rounds::get),
        "acquiring password"
    );

    let crypt_string = if script {
        let password = read_password_from_stdin()?;
        acquire::scripted(&password, &settings)?
    } else {
        acquire::interactive(
            &mut acquire::TerminalPrompt,
            &cli.prompt,
            &cli.confirm_prompt,
            &settings,
            &mut io::stderr(),
        )?
    };

    println!("{}", crypt_string);
    Ok(())
}

#[snafu::report]
fn main() -> Result<()> {
    run()
}

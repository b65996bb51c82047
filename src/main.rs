use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ledger_cli::cli::Shell;
use ledger_cli::config::{paths::normalize_username, LedgerPaths, Settings};
use ledger_cli::crypto::SecureString;
use ledger_cli::services::AccountService;
use ledger_cli::storage::LedgerStore;

const LOG_ENV: &str = "LEDGER_LOG";
const PASSPHRASE_ENV: &str = "LEDGER_PASSPHRASE";

#[derive(Parser)]
#[command(
    name = "ledger",
    version,
    about = "Encrypted personal ledger shell",
    long_about = "ledger keeps named accounts with signed transactions in an \
                  encrypted per-user database and lets you work with them \
                  from an interactive prompt. Type 'help' at the prompt for \
                  the list of commands."
)]
struct Cli {
    /// Username owning the database (prompted when omitted)
    #[arg(short, long)]
    user: Option<String>,

    /// Base directory for settings and databases
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[arg(long, env = PASSPHRASE_ENV, hide = true, hide_env_values = true)]
    passphrase: Option<String>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn prompt_line(prompt: &str) -> Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", prompt)?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read username")?;
    Ok(line.trim().to_string())
}

fn main() -> Result<()> {
    init_tracing();
    let mut cli = Cli::parse();

    // Initialize paths and settings
    let paths = match cli.data_dir.take() {
        Some(dir) => LedgerPaths::with_base_dir(dir),
        None => LedgerPaths::new()?,
    };
    let settings = Settings::load_or_create(&paths)?;
    if !paths.settings_file().exists() {
        settings.save(&paths)?;
    }

    let username = match cli.user.take().or_else(|| settings.default_user.clone()) {
        Some(user) => user,
        None => prompt_line("Username: ")?,
    };
    let username = normalize_username(&username)?;

    let passphrase = match cli.passphrase.take() {
        Some(passphrase) => SecureString::from(passphrase),
        None => SecureString::from(
            rpassword::prompt_password("Passphrase: ").context("Failed to read passphrase")?,
        ),
    };
    if passphrase.is_empty() {
        bail!("Passphrase must not be empty");
    }

    // Open (or create) the user's database
    let db_path = paths.database_file(&username)?;
    let store = LedgerStore::open(&db_path, &passphrase, &settings.kdf)
        .with_context(|| format!("Failed to open ledger for '{}'", username))?;
    drop(passphrase);
    info!(user = %username, "Ledger opened");

    let color = io::stdout().is_terminal();
    let mut shell = Shell::new(AccountService::new(store), &settings, color);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    shell.run(stdin.lock(), &mut stdout)?;

    Ok(())
}

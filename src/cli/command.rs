//! Shell command grammar
//!
//! Each input line is split on whitespace and parsed with clap, so the shell
//! gets the same argument handling and generated help as a regular CLI.

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};

use crate::error::{LedgerError, LedgerResult};
use crate::models::TransactionId;
use crate::services::ShowLimit;

#[derive(Parser, Debug)]
#[command(
    name = "ledger",
    no_binary_name = true,
    disable_version_flag = true,
    disable_help_flag = true,
    help_template = "Commands:\n{subcommands}"
)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

/// Commands accepted at the ledger prompt
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    /// Select an account, creating it if needed
    Use {
        /// Account name
        name: String,
    },
    /// Add a transaction to the active account
    Add {
        /// Signed amount (e.g., "50" or "-12.5")
        #[arg(allow_negative_numbers = true)]
        amount: String,
        /// Free-text comment
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
        comment: Vec<String>,
    },
    /// Show recent transactions of the active account
    Show {
        /// Number of transactions, or "all"
        limit: ShowLimit,
    },
    /// List all accounts
    #[command(name = "list_accounts")]
    ListAccounts,
    /// Count transactions of an account
    Inspect {
        /// Account name (defaults to the active account)
        name: Option<String>,
    },
    /// Leave the active account
    Out,
    /// Delete a transaction of the active account
    Delete {
        /// Transaction id
        id: TransactionId,
    },
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

/// Outcome of parsing one input line
#[derive(Debug, PartialEq, Eq)]
pub enum ParsedLine {
    Empty,
    Command(ShellCommand),
    /// Rendered help text requested by the user
    Help(String),
}

/// Parse a shell line
///
/// Grammar errors map to `InvalidArgument` carrying clap's message.
pub fn parse_line(line: &str) -> LedgerResult<ParsedLine> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(ParsedLine::Empty);
    }

    match ShellLine::try_parse_from(words) {
        Ok(parsed) => Ok(ParsedLine::Command(parsed.command)),
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                Ok(ParsedLine::Help(e.render().to_string()))
            }
            _ => Err(LedgerError::InvalidArgument(clap_message(&e))),
        },
    }
}

/// First line of a clap error without its `error: ` prefix
fn clap_message(e: &clap::Error) -> String {
    let rendered = e.render().to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

//! Transaction display formatting
//!
//! Renders transaction history as a table and formats signed amounts.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use crossterm::style::{style, Stylize};
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::models::{Money, Transaction, TransactionId};

const FALLBACK_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "ID")]
    id: TransactionId,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Amount")]
    amount: Money,
    #[tabled(rename = "Comment")]
    comment: String,
}

/// Format a UTC timestamp in local time
///
/// An invalid strftime pattern falls back to the default layout instead of
/// failing at render time.
pub fn format_timestamp(timestamp: DateTime<Utc>, datetime_format: &str) -> String {
    let valid = !StrftimeItems::new(datetime_format).any(|item| matches!(item, Item::Error));
    let pattern = if valid {
        datetime_format
    } else {
        FALLBACK_DATETIME_FORMAT
    };

    timestamp.with_timezone(&Local).format(pattern).to_string()
}

/// Format an amount, green when positive and red otherwise
pub fn format_amount(amount: Money, color: bool) -> String {
    let text = amount.to_string();
    if !color {
        return text;
    }

    if amount.is_positive() {
        style(text).green().to_string()
    } else {
        style(text).red().to_string()
    }
}

/// Format a list of transactions as a table
pub fn format_transaction_table(transactions: &[Transaction], datetime_format: &str) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let rows = transactions.iter().map(|txn| TransactionRow {
        id: txn.id,
        time: format_timestamp(txn.timestamp, datetime_format),
        amount: txn.amount,
        comment: txn.comment.clone(),
    });

    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .modify(Columns::single(0), Alignment::right())
        .modify(Columns::single(2), Alignment::right());

    format!("{}\n", table)
}

/// One-line confirmation after a transaction was added or removed
pub fn format_balance_change(
    verb: &str,
    txn: &Transaction,
    balance: Money,
    color: bool,
) -> String {
    format!(
        "{} transaction {} ({}). Balance: {}\n",
        verb,
        txn.id,
        format_amount(txn.amount, color),
        format_amount(balance, color)
    )
}

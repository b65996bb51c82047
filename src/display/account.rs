//! Account display formatting

use crate::models::Money;
use crate::services::Inspection;

use super::transaction::format_amount;

/// Format the list of known accounts, marking the active one
pub fn format_account_list(names: &[String], active: Option<&str>) -> String {
    if names.is_empty() {
        return "No accounts found.\n".to_string();
    }

    let mut output = String::new();
    for name in names {
        let marker = if Some(name.as_str()) == active { "*" } else { " " };
        output.push_str(&format!("{} {}\n", marker, name));
    }
    output
}

/// Format the active account and its balance after `use`
pub fn format_selection(name: &str, balance: Money, created: bool, color: bool) -> String {
    let status = if created { "Created" } else { "Using" };
    format!(
        "{} account '{}'. Balance: {}\n",
        status,
        name,
        format_amount(balance, color)
    )
}

pub fn format_inspection(inspection: &Inspection) -> String {
    let noun = if inspection.transaction_count == 1 {
        "transaction"
    } else {
        "transactions"
    };
    format!(
        "{} {} on account '{}'\n",
        inspection.transaction_count, noun, inspection.account_name
    )
}

/// Shell prompt: `ledger> ` or `ledger [alice 37.50]> `
pub fn format_prompt(active: Option<(&str, Money)>, color: bool) -> String {
    match active {
        Some((name, balance)) => {
            format!("ledger [{} {}]> ", name, format_amount(balance, color))
        }
        None => "ledger> ".to_string(),
    }
}

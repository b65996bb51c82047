//! Interactive ledger shell
//!
//! Reads one command per line, runs it against the account service and
//! prints the result. Command errors are reported and the loop continues;
//! only I/O failures on the shell's own streams end it.

use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::config::Settings;
use crate::display::{
    format_account_list, format_balance_change, format_inspection, format_prompt,
    format_selection, format_transaction_table,
};
use crate::error::{LedgerError, LedgerResult};
use crate::models::Money;
use crate::services::AccountService;

use super::command::{parse_line, ParsedLine, ShellCommand};

/// Whether the shell keeps reading after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct Shell {
    service: AccountService,
    datetime_format: String,
    color: bool,
}

impl Shell {
    pub fn new(service: AccountService, settings: &Settings, color: bool) -> Self {
        Self {
            service,
            datetime_format: settings.datetime_format.clone(),
            color,
        }
    }

    pub fn service(&self) -> &AccountService {
        &self.service
    }

    /// Run until `quit` or end of input
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> LedgerResult<()> {
        let mut lines = input.lines();

        loop {
            write!(output, "{}", self.prompt())?;
            output.flush()?;

            let line = match lines.next() {
                Some(line) => line?,
                None => {
                    writeln!(output)?;
                    break;
                }
            };

            match self.execute_line(&line, output) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => {
                    if matches!(e, LedgerError::Io(_)) {
                        warn!(error = %e, "Command failed");
                    }
                    writeln!(output, "Error: {}", e)?;
                }
            }
        }

        debug!("Shell finished");
        Ok(())
    }

    fn prompt(&self) -> String {
        let active = self
            .service
            .active_account()
            .map(|name| (name, self.service.balance().unwrap_or_else(|_| Money::zero())));
        format_prompt(active, self.color)
    }

    fn execute_line<W: Write>(&mut self, line: &str, output: &mut W) -> LedgerResult<Flow> {
        match parse_line(line)? {
            ParsedLine::Empty => Ok(Flow::Continue),
            ParsedLine::Help(text) => {
                write!(output, "{}", text)?;
                Ok(Flow::Continue)
            }
            ParsedLine::Command(cmd) => self.execute(cmd, output),
        }
    }

    fn execute<W: Write>(&mut self, cmd: ShellCommand, output: &mut W) -> LedgerResult<Flow> {
        match cmd {
            ShellCommand::Use { name } => {
                let selection = self.service.select_or_create_account(&name)?;
                write!(
                    output,
                    "{}",
                    format_selection(
                        &selection.account.name,
                        selection.account.balance,
                        selection.created,
                        self.color
                    )
                )?;
            }

            ShellCommand::Add { amount, comment } => {
                let amount = Money::parse(&amount).map_err(|e| {
                    LedgerError::InvalidArgument(format!(
                        "{}. Use a number like '50' or '-12.5'",
                        e
                    ))
                })?;
                let change = self.service.add_transaction(amount, &comment.join(" "))?;
                write!(
                    output,
                    "{}",
                    format_balance_change("Added", &change.transaction, change.balance, self.color)
                )?;
            }

            ShellCommand::Show { limit } => {
                let transactions = self.service.list_recent(limit)?;
                write!(
                    output,
                    "{}",
                    format_transaction_table(&transactions, &self.datetime_format)
                )?;
            }

            ShellCommand::ListAccounts => {
                let names = self.service.list_accounts();
                write!(
                    output,
                    "{}",
                    format_account_list(&names, self.service.active_account())
                )?;
            }

            ShellCommand::Inspect { name } => {
                let inspection = self.service.inspect(name.as_deref())?;
                write!(output, "{}", format_inspection(&inspection))?;
            }

            ShellCommand::Out => {
                let name = self.service.deselect()?;
                writeln!(output, "Left account '{}'", name)?;
            }

            ShellCommand::Delete { id } => {
                let change = self.service.delete_transaction(id)?;
                write!(
                    output,
                    "{}",
                    format_balance_change("Deleted", &change.transaction, change.balance, self.color)
                )?;
            }

            ShellCommand::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::key_derivation::test_kdf;
    use crate::storage::LedgerStore;
    use tempfile::TempDir;

    fn create_test_shell() -> (TempDir, Shell) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("alice_ledger.db");
        let store = LedgerStore::open(path, "pw", &test_kdf()).unwrap();
        let shell = Shell::new(AccountService::new(store), &Settings::default(), false);
        (temp_dir, shell)
    }

    fn run_script(shell: &mut Shell, script: &str) -> String {
        let mut output = Vec::new();
        shell.run(script.as_bytes(), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_scenario_session() {
        let (_temp_dir, mut shell) = create_test_shell();
        let output = run_script(
            &mut shell,
            "use alice\nadd 50 salary\nadd -12.5 lunch\ndelete 2\nquit\n",
        );

        assert!(output.contains("Created account 'alice'. Balance: 0.00"));
        assert!(output.contains("Added transaction 1 (50.00). Balance: 50.00"));
        assert!(output.contains("Added transaction 2 (-12.50). Balance: 37.50"));
        assert!(output.contains("Deleted transaction 2 (-12.50). Balance: 50.00"));
        assert_eq!(
            shell.service().balance().unwrap(),
            Money::from_cents(5000)
        );
    }

    #[test]
    fn test_errors_do_not_stop_the_shell() {
        let (_temp_dir, mut shell) = create_test_shell();
        let output = run_script(
            &mut shell,
            "add 5\nbogus\nuse alice\nadd abc\ndelete 42\nadd 1 ok\n",
        );

        assert!(output.contains("Error: No account selected"));
        assert!(output.contains("Error: Invalid argument"));
        assert!(output.contains("Error: Transaction not found: 42"));
        assert!(output.contains("Balance: 1.00"));
    }

    #[test]
    fn test_prompt_shows_active_account() {
        let (_temp_dir, mut shell) = create_test_shell();
        let output = run_script(&mut shell, "use alice\nadd 2.5\nout\n");

        assert!(output.starts_with("ledger> "));
        assert!(output.contains("ledger [alice 0.00]> "));
        assert!(output.contains("ledger [alice 2.50]> "));
        assert!(output.contains("Left account 'alice'"));
        assert!(output.ends_with("ledger> \n"));
        assert!(shell.service().active_account().is_none());
    }

    #[test]
    fn test_show_list_and_inspect() {
        let (_temp_dir, mut shell) = create_test_shell();
        let output = run_script(
            &mut shell,
            "use bob\nuse alice\nadd 1 first\nadd 2 second\nshow 1\ninspect\ninspect bob\nlist_accounts\n",
        );

        assert!(output.contains("second"));
        assert!(output.contains("2 transactions on account 'alice'"));
        assert!(output.contains("0 transactions on account 'bob'"));
        assert!(output.contains("* alice\n"));
        assert!(output.contains("  bob\n"));
    }

    #[test]
    fn test_quit_stops_reading() {
        let (_temp_dir, mut shell) = create_test_shell();
        run_script(&mut shell, "exit\nuse alice\n");
        assert!(shell.service().list_accounts().is_empty());
    }
}

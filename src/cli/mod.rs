//! CLI command handlers
//!
//! The interactive shell and the grammar of its commands.

pub mod command;
pub mod repl;

pub use command::{parse_line, ParsedLine, ShellCommand};
pub use repl::Shell;

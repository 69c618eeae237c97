//! Child process execution with concurrent capture of stdout and stderr

pub mod result;
pub mod shell_command;

// Re-export commonly used types
pub use result::ShellCommandResult;
pub use shell_command::{CommandType, DEFAULT_SHELL, ShellCommand, quote_arg};

use crate::error::Result;

/// Run `command` through `shell` (or `/bin/sh`), echoing its output live
/// unless `quiet`.
pub fn run_cmd(command: &str, shell: Option<&str>, quiet: bool) -> Result<ShellCommandResult> {
    ShellCommand::new(command)
        .with_shell(shell.unwrap_or(DEFAULT_SHELL))
        .quiet(quiet)
        .run()
}

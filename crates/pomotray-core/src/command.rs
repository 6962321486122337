//! Task hook execution.
//!
//! A hook is a block of text with one shell command per line. Lines run in
//! order and the first failure aborts the rest of the block.

use std::process::Command;

use tracing::{debug, error};

use crate::error::CommandError;

/// Executes task hook commands.
///
/// Implementors provide [`CommandRunner::execute`] for a single line; the
/// provided [`CommandRunner::run`] handles splitting and ordering.
pub trait CommandRunner: Send {
    /// Run one command line to completion.
    fn execute(&mut self, command: &str) -> Result<(), CommandError>;

    /// Run every non-blank line of `commands`, stopping at the first failure.
    fn run(&mut self, commands: &str) -> Result<(), CommandError> {
        for command in command_lines(commands) {
            if let Err(e) = self.execute(command) {
                error!("Command failed: {}", e);
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Trimmed, non-blank lines of a hook.
pub fn command_lines(commands: &str) -> impl Iterator<Item = &str> {
    commands.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Runs each line through the platform shell and waits for it.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }

    fn shell(command: &str) -> Command {
        if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(command);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(command);
            cmd
        }
    }
}

impl CommandRunner for ShellRunner {
    fn execute(&mut self, command: &str) -> Result<(), CommandError> {
        debug!("Running: {}", command);
        let status = Self::shell(command)
            .status()
            .map_err(|source| CommandError::Launch {
                command: command.to_string(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(CommandError::Failed {
                command: command.to_string(),
                status,
            })
        }
    }
}

//! Shell context, dispatch, and the error types shared by command handlers.

use std::io;

use rustyline::error::ReadlineError;
use strsim::levenshtein;
use thiserror::Error;

use crate::config::{AppConfig, ConfigError};
use crate::core::LedgerStore;
use crate::errors::{LedgerError, ValidationError};

use super::commands;
use super::output;
use super::registry::{CommandEntry, CommandRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("exit requested")]
    ExitRequested,
}

impl From<ValidationError> for CommandError {
    fn from(err: ValidationError) -> Self {
        CommandError::Ledger(LedgerError::Validation(err))
    }
}

impl CommandError {
    pub(crate) fn usage(usage: &str) -> Self {
        CommandError::InvalidArguments(format!("usage: {usage}"))
    }
}

/// Errors that end the shell.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
}

pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) registry: CommandRegistry,
    pub(crate) store: LedgerStore,
    pub(crate) running: bool,
    pub(crate) last_command: Option<String>,
}

impl ShellContext {
    pub fn new(mode: CliMode, config: &AppConfig) -> Result<Self, CliError> {
        output::set_color_enabled(config.ui_color_enabled && mode == CliMode::Interactive);
        let store = LedgerStore::from_config(config)?;
        Ok(Self::with_store(mode, store))
    }

    pub fn with_store(mode: CliMode, store: LedgerStore) -> Self {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);
        Self {
            mode,
            registry,
            store,
            running: true,
            last_command: None,
        }
    }

    pub fn mode(&self) -> CliMode {
        self.mode
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut LedgerStore {
        &mut self.store
    }

    pub(crate) fn prompt(&self) -> String {
        format!("ledgerwise [{}]> ", self.store.settings().currency)
    }

    pub(crate) fn commands(&self) -> Vec<&CommandEntry> {
        self.registry.list()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    /// Runs one shell line the same way the interactive loop does.
    pub fn execute_line(&mut self, line: &str) -> Result<bool, CliError> {
        match super::shell::handle_line(self, line) {
            Ok(LoopControl::Continue) => Ok(true),
            Ok(LoopControl::Exit) => Ok(false),
            Err(err) => {
                self.report_error(err);
                Ok(true)
            }
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let mut suggestions: Vec<_> = self
            .registry
            .names()
            .map(|key| (levenshtein(key, input), key))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                output::info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            CommandError::Ledger(LedgerError::Persistence(message)) => {
                output::warning(format!("Change kept in memory but not saved: {message}"));
            }
            CommandError::Ledger(other) => output::error(other),
        }
        if self.mode == CliMode::Script {
            if let Some(line) = &self.last_command {
                output::hint(format!("while running `{line}`"));
            }
        }
    }
}

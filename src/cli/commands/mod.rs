pub mod budget;
pub mod dashboard;
pub mod goal;
pub mod recurring;
pub mod settings;
pub mod system;
pub mod transaction;

use crate::cli::core::CommandError;
use crate::cli::registry::{CommandEntry, CommandRegistry};

pub(crate) fn all_definitions() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(system::definitions());
    commands.extend(dashboard::definitions());
    commands.extend(transaction::definitions());
    commands.extend(budget::definitions());
    commands.extend(recurring::definitions());
    commands.extend(goal::definitions());
    commands.extend(settings::definitions());
    commands
}

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    for entry in all_definitions() {
        registry.register(entry);
    }
}

/// Splits `args` into a lowercase subcommand and its arguments, falling back
/// to `default` when none was given.
pub(crate) fn split_subcommand<'a, 'b>(
    args: &'b [&'a str],
    default: &'static str,
) -> (String, &'b [&'a str]) {
    match args.split_first() {
        Some((first, rest)) => (first.to_ascii_lowercase(), rest),
        None => (default.to_string(), args),
    }
}

pub(crate) fn unknown_subcommand(command: &str, subcommand: &str) -> CommandError {
    CommandError::InvalidArguments(format!("unknown {command} subcommand `{subcommand}`"))
}

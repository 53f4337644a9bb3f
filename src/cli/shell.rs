use std::collections::BTreeMap;
use std::io::{self, BufRead};

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Cmd, Context, Editor, Helper, Highlighter, Hinter, KeyEvent, Validator};

use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::config::AppConfig;

/// Environment variable switching the shell to line-by-line stdin mode.
pub const SCRIPT_ENV: &str = "LEDGERWISE_CLI_SCRIPT";

pub fn run_cli(config: &AppConfig) -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };
    let mut context = ShellContext::new(mode, config)?;
    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<Vocabulary, DefaultHistory>::new()?;
    editor.set_helper(Some(Vocabulary::from_entries(&context.commands())));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
    output::info("Type `help` to list commands, `exit` to quit.");

    while context.running {
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    editor.add_history_entry(line.trim()).ok();
                }
                if execute(context, &line) == LoopControl::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => output::info("Interrupted. Type `exit` to quit."),
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    for line in io::stdin().lock().lines() {
        if !context.running || execute(context, &line?) == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

/// Runs one line and reports any failure; only `exit` stops the loop.
fn execute(context: &mut ShellContext, line: &str) -> LoopControl {
    match handle_line(context, line) {
        Ok(control) => control,
        Err(err) => {
            context.report_error(err);
            LoopControl::Continue
        }
    }
}

pub(crate) fn handle_line(
    context: &mut ShellContext,
    line: &str,
) -> Result<LoopControl, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(LoopControl::Continue);
    }
    let tokens = match shell_words::split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(format!("could not parse command: {err}"));
            return Ok(LoopControl::Continue);
        }
    };
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    context.last_command = Some(line.to_string());
    let control = context.dispatch(&raw.to_lowercase(), raw, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}

/// Tab completion for command names and, after a command, its subcommands.
/// Subcommands are read from the second word of each usage line.
#[derive(Helper, Hinter, Highlighter, Validator)]
struct Vocabulary {
    commands: BTreeMap<&'static str, Vec<&'static str>>,
}

impl Vocabulary {
    fn from_entries(entries: &[&CommandEntry]) -> Self {
        let commands = entries
            .iter()
            .map(|entry| {
                let mut subcommands: Vec<&'static str> = entry
                    .usage
                    .lines()
                    .filter_map(|usage| {
                        let mut words = usage.split_whitespace();
                        (words.next() == Some(entry.name)).then(|| words.next()).flatten()
                    })
                    .filter(|word| word.chars().all(|c| c.is_ascii_lowercase() || c == '-'))
                    .collect();
                subcommands.dedup();
                (entry.name, subcommands)
            })
            .collect();
        Self { commands }
    }

    fn candidates(&self, line: &str) -> (usize, Vec<&'static str>) {
        let start = line.rfind(char::is_whitespace).map_or(0, |idx| idx + 1);
        let needle = line[start..].to_ascii_lowercase();
        let words: Vec<&str> = line[..start].split_whitespace().collect();
        let pool: Vec<&'static str> = match words.as_slice() {
            [] => self.commands.keys().copied().collect(),
            [command] => self
                .commands
                .get(command.to_ascii_lowercase().as_str())
                .cloned()
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        let matches = pool
            .into_iter()
            .filter(|word| word.starts_with(&needle))
            .collect();
        (start, matches)
    }
}

impl Completer for Vocabulary {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, words) = self.candidates(&line[..pos]);
        let pairs = words
            .into_iter()
            .map(|word| Pair {
                display: word.to_string(),
                replacement: word.to_string(),
            })
            .collect();
        Ok((start, pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::core::CommandResult;

    fn noop(_: &mut ShellContext, _: &[&str]) -> CommandResult {
        Ok(())
    }

    fn vocabulary() -> Vocabulary {
        let goal = CommandEntry::new(
            "goal",
            "",
            "goal add <name>\ngoal list\ngoal select <ref>",
            noop,
        );
        let exit = CommandEntry::new("exit", "", "exit", noop);
        Vocabulary::from_entries(&[&goal, &exit])
    }

    #[test]
    fn completes_command_names_then_subcommands() {
        let vocabulary = vocabulary();
        assert_eq!(vocabulary.candidates("ex"), (0, vec!["exit"]));
        assert_eq!(vocabulary.candidates("goal "), (5, vec!["add", "list", "select"]));
        assert_eq!(vocabulary.candidates("GOAL s"), (5, vec!["select"]));
        assert_eq!(vocabulary.candidates("goal add Tr"), (9, Vec::<&str>::new()));
        assert_eq!(vocabulary.candidates("exit "), (5, Vec::<&str>::new()));
    }
}

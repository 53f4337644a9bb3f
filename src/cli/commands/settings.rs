use crate::cli::args::ParsedArgs;
use crate::cli::commands::{split_subcommand, unknown_subcommand};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::validation::SettingsForm;
use crate::ledger::Currency;

const USAGE: &str = "settings show
settings set [--theme light|dark] [--currency CODE] [--first-name TEXT] [--last-name TEXT] [--email TEXT]
settings reset";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "settings",
            "Show or change theme, currency and personal details",
            USAGE,
            cmd_settings,
        ),
        CommandEntry::new(
            "clear-data",
            "Delete every record and restore default settings",
            "clear-data --yes",
            cmd_clear_data,
        ),
    ]
}

fn cmd_settings(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (subcommand, rest) = split_subcommand(args, "show");
    match subcommand.as_str() {
        "show" => handle_show(context),
        "set" => handle_set(context, rest),
        "reset" => {
            context.store_mut().reset_settings()?;
            output::success("Settings restored to defaults");
            Ok(())
        }
        other => Err(unknown_subcommand("settings", other)),
    }
}

fn handle_show(context: &mut ShellContext) -> CommandResult {
    let settings = context.store().settings();
    let details = &settings.personal_details;
    output::section("Settings");
    output::info(format!("  Theme    : {}", settings.theme));
    output::info(format!(
        "  Currency : {} ({})",
        settings.currency,
        settings.currency.symbol()
    ));
    output::info(format!("  Name     : {}", details.full_name()));
    output::info(format!("  Email    : {}", details.email));
    let codes: Vec<&str> = Currency::SUPPORTED.iter().map(|currency| currency.code()).collect();
    output::hint(format!("Supported currencies: {}", codes.join(", ")));
    Ok(())
}

fn handle_set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(
        args,
        &["theme", "currency", "first-name", "last-name", "email"],
        &[],
    )?;
    if !parsed.positionals().is_empty() {
        return Err(CommandError::usage(
            "settings set [--theme light|dark] [--currency CODE] [--first-name TEXT] [--last-name TEXT] [--email TEXT]",
        ));
    }
    let form = SettingsForm {
        theme: parsed.value("theme").map(str::to_string),
        currency: parsed.value("currency").map(str::to_string),
        first_name: parsed.value("first-name").map(str::to_string),
        last_name: parsed.value("last-name").map(str::to_string),
        email: parsed.value("email").map(str::to_string),
    };
    let patch = form.parse()?;
    if patch.is_empty() {
        output::info("Nothing to change.");
        return Ok(());
    }
    context.store_mut().update_settings(patch)?;
    output::success("Settings saved");
    Ok(())
}

fn cmd_clear_data(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[], &["yes"])?;
    if !parsed.has("yes") {
        output::warning("This deletes every transaction, budget, recurring expense and goal.");
        output::hint("Run `clear-data --yes` to confirm.");
        return Ok(());
    }
    context.store_mut().clear_all_data()?;
    output::success("All data cleared");
    Ok(())
}

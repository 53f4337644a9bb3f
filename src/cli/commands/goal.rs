use uuid::Uuid;

use crate::cli::args::{resolve_reference, short_id, ParsedArgs};
use crate::cli::commands::{split_subcommand, unknown_subcommand};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::validation::{parse_goal_progress, GoalForm};

const USAGE: &str = "goal add <name> <target> <deadline YYYY-MM-DD> [--current N]
goal list
goal show [ref]
goal progress <ref> <saved-amount>
goal select <ref>
goal delete <ref>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "goal",
        "Track savings goals",
        USAGE,
        cmd_goal,
    )]
}

fn cmd_goal(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (subcommand, rest) = split_subcommand(args, "show");
    match subcommand.as_str() {
        "add" | "create" => handle_add(context, rest),
        "list" | "ls" => handle_list(context),
        "show" => handle_show(context, rest),
        "progress" | "save" => handle_progress(context, rest),
        "select" | "use" => handle_select(context, rest),
        "delete" | "remove" | "rm" => handle_delete(context, rest),
        other => Err(unknown_subcommand("goal", other)),
    }
}

fn handle_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["current"], &[])?;
    let [name, target, deadline] = parsed.positionals() else {
        return Err(CommandError::usage(
            "goal add <name> <target> <deadline YYYY-MM-DD> [--current N]",
        ));
    };
    let form = GoalForm {
        name: name.to_string(),
        target_amount: target.to_string(),
        current_amount: parsed.value("current").unwrap_or_default().to_string(),
        deadline: deadline.to_string(),
    };
    let draft = form.parse()?;
    let id = context.store_mut().add_goal(draft)?;
    output::success(format!("Created goal {} ({}) and made it current", name, short_id(id)));
    Ok(())
}

fn handle_list(context: &mut ShellContext) -> CommandResult {
    let store = context.store();
    if store.goals().is_empty() {
        output::info("No goals yet.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = store
        .goals()
        .iter()
        .enumerate()
        .map(|(idx, goal)| {
            vec![
                (idx + 1).to_string(),
                if goal.is_active { "*" } else { "" }.to_string(),
                short_id(goal.id),
                goal.name.clone(),
                store.format_money(goal.current_amount),
                store.format_money(goal.target_amount),
                format!("{}%", store.goal_progress(goal.id).unwrap_or_default().round_dp(1)),
                goal.deadline.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect();
    output::table(
        &["#", "", "Id", "Name", "Saved", "Target", "Progress", "Deadline"],
        &rows,
    );
    Ok(())
}

fn handle_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let store = context.store();
    let goal = match args {
        [] => store.current_goal(),
        [reference] => store.goal(resolve_reference(&ids(context), reference)?),
        _ => return Err(CommandError::usage("goal show [ref]")),
    };
    let Some(goal) = goal else {
        output::info("No goal yet. Create one with `goal add`.");
        return Ok(());
    };

    output::section(format!("Goal: {}", goal.name));
    output::info(format!("  Saved        : {}", store.format_money(goal.current_amount)));
    output::info(format!("  Target       : {}", store.format_money(goal.target_amount)));
    output::info(format!("  Remaining    : {}", store.format_money(goal.remaining())));
    output::info(format!(
        "  Progress     : {}%",
        store.goal_progress(goal.id).unwrap_or_default().round_dp(1)
    ));
    output::info(format!("  Deadline     : {}", goal.deadline.format("%Y-%m-%d")));
    if let Some(eta) = store.time_to_goal(goal.id) {
        output::info(format!("  Time to goal : {}", eta.label()));
    }
    Ok(())
}

fn handle_progress(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [reference, amount] = args else {
        return Err(CommandError::usage("goal progress <ref> <saved-amount>"));
    };
    let id = resolve_reference(&ids(context), reference)?;
    let amount = parse_goal_progress(amount)?;
    context.store_mut().update_goal_progress(id, amount)?;
    output::success(format!(
        "Saved amount for goal {} is now {}",
        short_id(id),
        context.store().format_money(amount)
    ));
    Ok(())
}

fn handle_select(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [reference] = args else {
        return Err(CommandError::usage("goal select <ref>"));
    };
    let id = resolve_reference(&ids(context), reference)?;
    context.store_mut().select_goal(id)?;
    output::success(format!("Goal {} is now current", short_id(id)));
    Ok(())
}

fn handle_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [reference] = args else {
        return Err(CommandError::usage("goal delete <ref>"));
    };
    let id = resolve_reference(&ids(context), reference)?;
    context.store_mut().delete_goal(id)?;
    output::success(format!("Deleted goal {}", short_id(id)));
    Ok(())
}

fn ids(context: &ShellContext) -> Vec<Uuid> {
    context.store().goals().iter().map(|goal| goal.id).collect()
}

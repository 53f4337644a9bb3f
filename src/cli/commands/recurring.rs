use uuid::Uuid;

use crate::cli::args::{resolve_reference, resolve_references, short_id, ParsedArgs};
use crate::cli::commands::{split_subcommand, unknown_subcommand};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::{RecurringQuery, RecurringSort};
use crate::core::validation::RecurringExpenseForm;
use crate::errors::ValidationError;
use crate::ledger::{
    canonical_recurring_category, ExpenseStatus, Frequency, RecurringExpense, RECURRING_CATEGORIES,
};

const USAGE: &str = "recurring add <name> <amount> <category> <next-due YYYY-MM-DD> [--frequency weekly|monthly|yearly]
recurring list [--search TEXT] [--category NAME] [--frequency F] [--sort due|amount|name]
recurring edit <ref> [--name TEXT] [--amount N] [--category NAME] [--due YYYY-MM-DD] [--frequency F]
recurring pause <ref> | recurring resume <ref>
recurring delete <ref>...
recurring upcoming | recurring totals | recurring categories";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "recurring",
        "Track subscriptions and bills",
        USAGE,
        cmd_recurring,
    )]
}

fn cmd_recurring(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (subcommand, rest) = split_subcommand(args, "list");
    match subcommand.as_str() {
        "add" => handle_add(context, rest),
        "list" | "ls" => handle_list(context, rest),
        "edit" => handle_edit(context, rest),
        "pause" => handle_status(context, rest, ExpenseStatus::Inactive),
        "resume" => handle_status(context, rest, ExpenseStatus::Active),
        "delete" | "remove" | "rm" => handle_delete(context, rest),
        "upcoming" => handle_upcoming(context),
        "totals" => handle_totals(context),
        "categories" => {
            output::info(RECURRING_CATEGORIES.join(", "));
            Ok(())
        }
        other => Err(unknown_subcommand("recurring", other)),
    }
}

fn handle_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["frequency"], &[])?;
    let [name, amount, category, due] = parsed.positionals() else {
        return Err(CommandError::usage(
            "recurring add <name> <amount> <category> <next-due YYYY-MM-DD> [--frequency weekly|monthly|yearly]",
        ));
    };
    let form = RecurringExpenseForm {
        name: name.to_string(),
        category: category.to_string(),
        amount: amount.to_string(),
        frequency: parsed.value("frequency").unwrap_or_default().to_string(),
        next_due_date: due.to_string(),
    };
    let draft = form.parse()?;
    let id = context.store_mut().add_recurring_expense(draft)?;
    output::success(format!("Tracking {} ({})", name, short_id(id)));
    Ok(())
}

fn handle_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["search", "category", "frequency", "sort"], &[])?;
    if !parsed.positionals().is_empty() {
        return Err(CommandError::usage(
            "recurring list [--search TEXT] [--category NAME] [--frequency F] [--sort due|amount|name]",
        ));
    }
    let query = RecurringQuery {
        search: parsed.value("search").map(str::to_string),
        category: parsed
            .value("category")
            .map(|raw| canonical_recurring_category(raw).unwrap_or(raw).to_string()),
        frequency: parsed
            .value("frequency")
            .map(|raw| {
                Frequency::parse(raw).ok_or_else(|| ValidationError::UnknownFrequency(raw.to_string()))
            })
            .transpose()?,
        sort: match parsed.value("sort") {
            None | Some("due") => RecurringSort::NextDueDate,
            Some("amount") => RecurringSort::Amount,
            Some("name") => RecurringSort::Name,
            Some(other) => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown sort `{other}`; use due, amount or name"
                )))
            }
        },
    };

    let order = ids(context);
    let matches = context.store().filter_recurring(&query);
    if matches.is_empty() {
        output::info("No recurring expenses match.");
        return Ok(());
    }
    print_expenses(context, &order, &matches);
    Ok(())
}

fn handle_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(
        args,
        &["name", "amount", "category", "due", "frequency"],
        &[],
    )?;
    let [reference] = parsed.positionals() else {
        return Err(CommandError::usage(
            "recurring edit <ref> [--name TEXT] [--amount N] [--category NAME] [--due YYYY-MM-DD] [--frequency F]",
        ));
    };
    let id = resolve_reference(&ids(context), reference)?;
    let Some(existing) = context.store().recurring_expense(id) else {
        return Err(CommandError::InvalidArguments(format!("no record matches `{reference}`")));
    };
    let form = RecurringExpenseForm {
        name: pick(parsed.value("name"), &existing.name),
        category: pick(parsed.value("category"), &existing.category),
        amount: pick(parsed.value("amount"), &existing.amount.to_string()),
        frequency: pick(parsed.value("frequency"), &existing.frequency.to_string()),
        next_due_date: pick(
            parsed.value("due"),
            &existing.next_due_date.format("%Y-%m-%d").to_string(),
        ),
    };
    let draft = form.parse()?;
    context.store_mut().update_recurring_expense(id, draft)?;
    output::success(format!("Updated recurring expense {}", short_id(id)));
    Ok(())
}

fn handle_status(context: &mut ShellContext, args: &[&str], status: ExpenseStatus) -> CommandResult {
    let [reference] = args else {
        return Err(CommandError::usage("recurring pause|resume <ref>"));
    };
    let id = resolve_reference(&ids(context), reference)?;
    context.store_mut().set_recurring_status(id, status)?;
    output::success(format!("Recurring expense {} is now {status}", short_id(id)));
    Ok(())
}

fn handle_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::usage("recurring delete <ref>..."));
    }
    let targets = resolve_references(&ids(context), args)?;
    let removed = context.store_mut().delete_recurring_expenses(&targets)?;
    output::success(format!("Deleted {removed} recurring expense(s)"));
    Ok(())
}

fn handle_upcoming(context: &mut ShellContext) -> CommandResult {
    let order = ids(context);
    let bills = context.store().upcoming_bills();
    if bills.is_empty() {
        output::info("Nothing due in the next 30 days.");
        return Ok(());
    }
    print_expenses(context, &order, &bills);
    Ok(())
}

fn handle_totals(context: &mut ShellContext) -> CommandResult {
    let store = context.store();
    let totals = store.recurring_totals();
    output::info(format!("Active expenses : {}", totals.active_count));
    output::info(format!("Monthly total   : {}", store.format_money(totals.total_monthly)));
    output::info(format!("Yearly total    : {}", store.format_money(totals.total_yearly)));
    Ok(())
}

fn print_expenses(context: &ShellContext, order: &[Uuid], expenses: &[&RecurringExpense]) {
    let store = context.store();
    let rows: Vec<Vec<String>> = expenses
        .iter()
        .map(|expense| {
            vec![
                order
                    .iter()
                    .position(|id| *id == expense.id)
                    .map(|idx| (idx + 1).to_string())
                    .unwrap_or_default(),
                short_id(expense.id),
                expense.name.clone(),
                expense.category.clone(),
                store.format_money(expense.amount),
                expense.frequency.to_string(),
                expense.next_due_date.format("%Y-%m-%d").to_string(),
                expense.status.to_string(),
            ]
        })
        .collect();
    output::table(
        &["#", "Id", "Name", "Category", "Amount", "Frequency", "Next due", "Status"],
        &rows,
    );
}

fn pick(flag: Option<&str>, current: &str) -> String {
    flag.unwrap_or(current).to_string()
}

fn ids(context: &ShellContext) -> Vec<Uuid> {
    context
        .store()
        .recurring_expenses()
        .iter()
        .map(|expense| expense.id)
        .collect()
}

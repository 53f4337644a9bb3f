use uuid::Uuid;

use crate::cli::args::{resolve_reference, short_id, ParsedArgs};
use crate::cli::commands::{split_subcommand, unknown_subcommand};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::{BudgetProgress, SpendingScope};
use crate::core::validation::{BudgetCategoryForm, BudgetForm};
use crate::ledger::Budget;

const USAGE: &str = "budget add <limit> <Category=percent>... [--month YYYY-MM-DD]
budget list
budget show [ref]
budget edit <ref> <limit> <Category=percent>... [--month YYYY-MM-DD]
budget select <ref>
budget delete <ref>
budget scope [all|month]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "budget",
        "Plan monthly budgets split by category percentages",
        USAGE,
        cmd_budget,
    )]
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (subcommand, rest) = split_subcommand(args, "show");
    match subcommand.as_str() {
        "add" | "create" => handle_add(context, rest),
        "list" | "ls" => handle_list(context),
        "show" => handle_show(context, rest),
        "edit" => handle_edit(context, rest),
        "select" | "use" => handle_select(context, rest),
        "delete" | "remove" | "rm" => handle_delete(context, rest),
        "scope" => handle_scope(context, rest),
        other => Err(unknown_subcommand("budget", other)),
    }
}

fn handle_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["month"], &[])?;
    let Some((limit, allocations)) = parsed.positionals().split_first() else {
        return Err(CommandError::usage(
            "budget add <limit> <Category=percent>... [--month YYYY-MM-DD]",
        ));
    };
    let draft = budget_form(limit, allocations, parsed.value("month"))?.parse()?;
    let id = context.store_mut().create_budget(draft)?;
    output::success(format!("Created budget {} and made it current", short_id(id)));
    Ok(())
}

fn handle_list(context: &mut ShellContext) -> CommandResult {
    let store = context.store();
    if store.budgets().is_empty() {
        output::info("No budgets yet.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = store
        .budgets()
        .iter()
        .enumerate()
        .map(|(idx, budget)| {
            vec![
                (idx + 1).to_string(),
                if budget.is_active { "*" } else { "" }.to_string(),
                short_id(budget.id),
                budget.month.format("%B %Y").to_string(),
                store.format_money(budget.limit),
                budget.categories.len().to_string(),
            ]
        })
        .collect();
    output::table(&["#", "", "Id", "Month", "Limit", "Categories"], &rows);
    Ok(())
}

fn handle_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let store = context.store();
    let budget = match args {
        [] => store.current_budget(),
        [reference] => store.budget(resolve_reference(&ids(context), reference)?),
        _ => return Err(CommandError::usage("budget show [ref]")),
    };
    let Some(budget) = budget else {
        output::info("No budget yet. Create one with `budget add`.");
        return Ok(());
    };
    let progress = store.budget_progress(budget.id);
    print_progress(context, budget, &progress);
    Ok(())
}

fn handle_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["month"], &[])?;
    let [reference, limit, allocations @ ..] = parsed.positionals() else {
        return Err(CommandError::usage(
            "budget edit <ref> <limit> <Category=percent>... [--month YYYY-MM-DD]",
        ));
    };
    let id = resolve_reference(&ids(context), reference)?;
    let draft = budget_form(limit, allocations, parsed.value("month"))?.parse()?;
    context.store_mut().update_budget(id, draft)?;
    output::success(format!("Updated budget {}", short_id(id)));
    Ok(())
}

fn handle_select(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [reference] = args else {
        return Err(CommandError::usage("budget select <ref>"));
    };
    let id = resolve_reference(&ids(context), reference)?;
    context.store_mut().select_budget(id)?;
    output::success(format!("Budget {} is now current", short_id(id)));
    Ok(())
}

fn handle_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [reference] = args else {
        return Err(CommandError::usage("budget delete <ref>"));
    };
    let id = resolve_reference(&ids(context), reference)?;
    context.store_mut().delete_budget(id)?;
    output::success(format!("Deleted budget {}", short_id(id)));
    Ok(())
}

fn handle_scope(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let scope = match args {
        [] => {
            output::info(format!("Spending scope: {}", scope_label(context.store().spending_scope())));
            return Ok(());
        }
        ["all"] => SpendingScope::AllTime,
        ["month"] => SpendingScope::BudgetMonth,
        _ => return Err(CommandError::usage("budget scope [all|month]")),
    };
    context.store_mut().set_spending_scope(scope);
    output::success(format!("Spending scope: {}", scope_label(scope)));
    Ok(())
}

fn budget_form(
    limit: &str,
    allocations: &[&str],
    month: Option<&str>,
) -> Result<BudgetForm, CommandError> {
    let categories = allocations
        .iter()
        .map(|allocation| {
            allocation
                .rsplit_once('=')
                .map(|(name, percentage)| BudgetCategoryForm::new(name, percentage))
                .ok_or_else(|| {
                    CommandError::InvalidArguments(format!(
                        "expected Category=percent, got `{allocation}`"
                    ))
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(BudgetForm {
        limit: limit.to_string(),
        categories,
        month: month.unwrap_or_default().to_string(),
    })
}

fn print_progress(context: &ShellContext, budget: &Budget, progress: &BudgetProgress) {
    let store = context.store();
    output::section(format!("Budget {}", budget.month.format("%B %Y")));
    let rows: Vec<Vec<String>> = progress
        .categories
        .iter()
        .map(|category| {
            vec![
                category.name.clone(),
                format!("{}%", category.percentage),
                store.format_money(category.budgeted),
                store.format_money(category.spent),
                store.format_money(category.remaining),
                format!("{:?}", category.status).to_lowercase(),
            ]
        })
        .collect();
    output::table(
        &["Category", "Share", "Budgeted", "Spent", "Remaining", "Status"],
        &rows,
    );
    output::info(format!(
        "Total: {} of {} ({}%)",
        store.format_money(progress.total_spent),
        store.format_money(progress.total_budget),
        progress.overall_progress.round_dp(1)
    ));
}

fn scope_label(scope: SpendingScope) -> &'static str {
    match scope {
        SpendingScope::AllTime => "all transactions",
        SpendingScope::BudgetMonth => "budget month only",
    }
}

fn ids(context: &ShellContext) -> Vec<Uuid> {
    context.store().budgets().iter().map(|budget| budget.id).collect()
}

use uuid::Uuid;

use crate::cli::args::{resolve_reference, resolve_references, short_id, ParsedArgs};
use crate::cli::commands::{split_subcommand, unknown_subcommand};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::{TransactionQuery, TransactionSort};
use crate::core::validation::{TransactionForm, TransactionUpdateForm};
use crate::errors::ValidationError;
use crate::ledger::{canonical_category, TransactionKind, TRANSACTION_CATEGORIES};

const USAGE: &str = "tx add <description> <amount> <category> [--income] [--date YYYY-MM-DD]
tx list [--search TEXT] [--category NAME] [--type income|expense] [--sort date|amount]
tx edit <ref> [--description TEXT] [--amount N] [--category NAME] [--type income|expense] [--date YYYY-MM-DD]
tx delete <ref>...
tx categories";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "tx",
        "Record, list, edit and delete transactions",
        USAGE,
        cmd_transaction,
    )]
}

fn cmd_transaction(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (subcommand, rest) = split_subcommand(args, "list");
    match subcommand.as_str() {
        "add" => handle_add(context, rest),
        "list" | "ls" => handle_list(context, rest),
        "edit" => handle_edit(context, rest),
        "delete" | "remove" | "rm" => handle_delete(context, rest),
        "categories" => {
            output::info(TRANSACTION_CATEGORIES.join(", "));
            Ok(())
        }
        other => Err(unknown_subcommand("tx", other)),
    }
}

fn handle_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["date"], &["income"])?;
    let [description, amount, category] = parsed.positionals() else {
        return Err(CommandError::usage(
            "tx add <description> <amount> <category> [--income] [--date YYYY-MM-DD]",
        ));
    };
    let kind = if parsed.has("income") {
        TransactionKind::Income
    } else {
        TransactionKind::Expense
    };
    let form = TransactionForm {
        description: description.to_string(),
        amount: amount.to_string(),
        category: category.to_string(),
        kind,
        date: parsed.value("date").unwrap_or_default().to_string(),
    };
    let draft = form.parse()?;
    let id = context.store_mut().add_transaction(draft)?;
    output::success(format!("Recorded {kind} {} ({})", description, short_id(id)));
    Ok(())
}

fn handle_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["search", "category", "type", "sort"], &[])?;
    if !parsed.positionals().is_empty() {
        return Err(CommandError::usage(
            "tx list [--search TEXT] [--category NAME] [--type income|expense] [--sort date|amount]",
        ));
    }
    let query = TransactionQuery {
        search: parsed.value("search").map(str::to_string),
        category: parsed
            .value("category")
            .map(|raw| canonical_category(raw).unwrap_or(raw).to_string()),
        kind: parsed.value("type").map(parse_kind).transpose()?,
        sort: match parsed.value("sort") {
            None | Some("date") => TransactionSort::Date,
            Some("amount") => TransactionSort::Amount,
            Some(other) => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown sort `{other}`; use date or amount"
                )))
            }
        },
    };

    let store = context.store();
    let order = ids(context);
    let matches = store.filter_transactions(&query);
    if matches.is_empty() {
        output::info("No transactions match.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = matches
        .iter()
        .map(|tx| {
            vec![
                row_number(&order, tx.id),
                short_id(tx.id),
                tx.date.format("%Y-%m-%d").to_string(),
                tx.description.clone(),
                tx.category.clone(),
                tx.kind().to_string(),
                store.format_money(tx.amount),
            ]
        })
        .collect();
    output::table(
        &["#", "Id", "Date", "Description", "Category", "Type", "Amount"],
        &rows,
    );
    Ok(())
}

fn handle_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(
        args,
        &["description", "amount", "category", "type", "date"],
        &[],
    )?;
    let [reference] = parsed.positionals() else {
        return Err(CommandError::usage("tx edit <ref> [--description TEXT] [--amount N] [--category NAME] [--type income|expense] [--date YYYY-MM-DD]"));
    };
    let id = resolve_reference(&ids(context), reference)?;
    let form = TransactionUpdateForm {
        description: parsed.value("description").map(str::to_string),
        amount: parsed.value("amount").map(str::to_string),
        category: parsed.value("category").map(str::to_string),
        kind: parsed.value("type").map(parse_kind).transpose()?,
        date: parsed.value("date").map(str::to_string),
    };
    let patch = form.parse()?;
    if patch.is_empty() {
        output::info("Nothing to change.");
        return Ok(());
    }
    context.store_mut().update_transaction(id, patch)?;
    output::success(format!("Updated transaction {}", short_id(id)));
    Ok(())
}

fn handle_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::usage("tx delete <ref>..."));
    }
    let targets = resolve_references(&ids(context), args)?;
    let removed = context.store_mut().delete_transactions(&targets)?;
    output::success(format!("Deleted {removed} transaction(s)"));
    Ok(())
}

fn parse_kind(raw: &str) -> Result<TransactionKind, ValidationError> {
    TransactionKind::parse(raw).ok_or_else(|| ValidationError::UnknownKind(raw.to_string()))
}

fn ids(context: &ShellContext) -> Vec<Uuid> {
    context.store().transactions().iter().map(|tx| tx.id).collect()
}

fn row_number(order: &[Uuid], id: Uuid) -> String {
    order
        .iter()
        .position(|candidate| *candidate == id)
        .map(|idx| (idx + 1).to_string())
        .unwrap_or_default()
}

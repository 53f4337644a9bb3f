use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "dashboard",
        "Show balances, recent activity, bills, budget and goal",
        "dashboard",
        cmd_dashboard,
    )]
}

fn cmd_dashboard(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let store = context.store();
    let money = |amount| store.format_money(amount);

    output::section("Overview");
    output::info(format!("  Total balance  : {}", money(store.total_balance())));
    output::info(format!("  Income (month) : {}", money(store.total_income())));
    output::info(format!("  Expenses (month): {}", money(store.total_expenses())));
    output::info(format!("  Net (month)    : {}", money(store.monthly_net_balance())));

    output::section("Recent transactions");
    let recent = store.recent_transactions();
    if recent.is_empty() {
        output::info("No transactions yet.");
    } else {
        let rows: Vec<Vec<String>> = recent
            .iter()
            .map(|tx| {
                vec![
                    tx.date.format("%Y-%m-%d").to_string(),
                    tx.description.clone(),
                    tx.category.clone(),
                    money(tx.amount),
                ]
            })
            .collect();
        output::table(&["Date", "Description", "Category", "Amount"], &rows);
    }

    output::section("Upcoming bills");
    let bills = store.upcoming_bills();
    if bills.is_empty() {
        output::info("Nothing due in the next 30 days.");
    } else {
        let rows: Vec<Vec<String>> = bills
            .iter()
            .map(|bill| {
                vec![
                    bill.next_due_date.format("%Y-%m-%d").to_string(),
                    bill.name.clone(),
                    money(bill.amount),
                ]
            })
            .collect();
        output::table(&["Due", "Name", "Amount"], &rows);
    }

    output::section("Budget");
    match store.current_budget() {
        Some(budget) => {
            let progress = store.current_budget_progress();
            output::info(format!(
                "  {} budget: {} of {} spent ({}%)",
                budget.month.format("%B %Y"),
                money(progress.total_spent),
                money(progress.total_budget),
                progress.overall_progress.round_dp(1)
            ));
        }
        None => output::info("No budget yet. Create one with `budget add`."),
    }

    output::section("Goal");
    match store.current_goal() {
        Some(goal) => {
            let percent = store.goal_progress(goal.id).unwrap_or_default();
            let eta = store
                .time_to_goal(goal.id)
                .map(|eta| eta.label())
                .unwrap_or_default();
            output::info(format!(
                "  {}: {} of {} ({}%), time to goal: {}",
                goal.name,
                money(goal.current_amount),
                money(goal.target_amount),
                percent.round_dp(1),
                eta
            ));
        }
        None => output::info("No goal yet. Create one with `goal add`."),
    }
    Ok(())
}

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;

fn shell(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("ledgerwise_cli").unwrap();
    cmd.env("LEDGERWISE_CLI_SCRIPT", "1")
        .env("LEDGERWISE_HOME", home)
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn script_mode_records_and_lists_transactions() {
    let home = common::temp_dir();
    let input = "tx add \"Coffee beans\" 4.50 \"food & dining\" --date 2025-06-10\n\
                 tx add Paycheck 2500 Income --income --date 2025-06-01\n\
                 exit\n";

    shell(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Recorded expense Coffee beans"))
        .stdout(contains("Recorded income Paycheck"));

    shell(&home)
        .write_stdin("tx list --type expense\n")
        .assert()
        .success()
        .stdout(contains("-$4.50"))
        .stdout(contains("Paycheck").not());

    let stored = std::fs::read_to_string(home.join("data").join("transactions.json")).unwrap();
    assert!(stored.contains("\"Food & Dining\""));
    assert!(stored.contains("\"createdAt\""));
}

#[test]
fn unbalanced_budget_is_rejected_with_a_message() {
    let home = common::temp_dir();
    shell(&home)
        .write_stdin("budget add 2000 Rent=50 Food=45\nbudget list\n")
        .assert()
        .success()
        .stderr(contains("95"))
        .stdout(contains("No budgets yet."));
}

#[test]
fn budget_show_reports_category_split() {
    let home = common::temp_dir();
    shell(&home)
        .write_stdin("budget add 2000 Rent=50 Food=50\nbudget show\n")
        .assert()
        .success()
        .stdout(contains("Created budget"))
        .stdout(contains("$1,000.00"))
        .stdout(contains("$2,000.00"));
}

#[test]
fn goals_and_settings_flow_through_the_shell() {
    let home = common::temp_dir();
    let input = "goal add \"Emergency fund\" 1000 2030-01-01 --current 1200\n\
                 goal show\n\
                 settings set --currency eur --theme dark\n\
                 settings show\n";

    shell(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Progress     : 100"))
        .stdout(contains("Time to goal : Reached"))
        .stdout(contains("Currency : EUR"))
        .stdout(contains("Theme    : dark"));
}

#[test]
fn state_survives_a_restart() {
    let home = common::temp_dir();
    shell(&home)
        .write_stdin("recurring add Netflix 15.99 entertainment 2030-01-05\n")
        .assert()
        .success();

    shell(&home)
        .write_stdin("recurring list\nrecurring totals\n")
        .assert()
        .success()
        .stdout(contains("Netflix"))
        .stdout(contains("monthly"))
        .stdout(contains("Active expenses : 1"));
}

#[test]
fn clear_data_requires_confirmation() {
    let home = common::temp_dir();
    let input = "tx add Lunch 12 Other\n\
                 clear-data\n\
                 tx list\n\
                 clear-data --yes\n\
                 tx list\n";

    shell(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Run `clear-data --yes` to confirm."))
        .stdout(contains("All data cleared"))
        .stdout(contains("No transactions match."));
}

#[test]
fn unknown_commands_get_a_suggestion() {
    let home = common::temp_dir();
    shell(&home)
        .write_stdin("budgte\nhelp goal\n")
        .assert()
        .success()
        .stdout(contains("Unknown command `budgte`"))
        .stdout(contains("Suggestion: `budget`?"))
        .stdout(contains("goal progress <ref> <saved-amount>"));
}

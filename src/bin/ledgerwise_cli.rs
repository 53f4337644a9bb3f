use ledgerwise::{cli::run_cli, config::ConfigManager, init_with};

fn main() {
    let config = match ConfigManager::from_env().load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };
    init_with(config.log_filter.as_deref());

    if let Err(err) = run_cli(&config) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

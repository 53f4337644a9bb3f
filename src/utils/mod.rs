pub mod paths;

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVE: &str = "ledgerwise=info";

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    init_tracing_with(None);
}

/// Like [`init_tracing`], adding `extra` (e.g. `ledgerwise=debug`) on top of
/// `RUST_LOG`. Output goes to stderr so command output stays clean.
pub fn init_tracing_with(extra: Option<&str>) {
    TRACING_INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        for directive in [Some(DEFAULT_DIRECTIVE), extra].into_iter().flatten() {
            match directive.parse() {
                Ok(parsed) => filter = filter.add_directive(parsed),
                Err(err) => eprintln!("ignoring log directive `{directive}`: {err}"),
            }
        }
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

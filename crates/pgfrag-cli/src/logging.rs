use tracing_subscriber::EnvFilter;

/// Env var holding a `tracing` filter directive, e.g. `pgfrag.sql=debug`.
pub const LOG_ENV: &str = "PGFRAG_LOG";

/// Install the stderr subscriber. `verbose` turns on generated-SQL events
/// unless `PGFRAG_LOG` says otherwise.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("warn,pgfrag.sql=debug,pgfrag_cli=debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    // A second init (e.g. from tests) is harmless; keep the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

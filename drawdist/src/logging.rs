use std::sync::Once;

static INIT: Once = Once::new();

/// Installs the global `tracing` subscriber. Later calls are no-ops.
///
/// `level` takes precedence over `RUST_LOG`, both accept any `EnvFilter` directive. Without
/// either, only warnings are shown so the progress bars stay readable.
pub fn init_with_level(level: Option<&str>) {
    INIT.call_once(|| {
        let directive = match level {
            Some(l) if !l.is_empty() => l.to_string(),
            _ => std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()),
        };

        let filter = tracing_subscriber::EnvFilter::try_new(&directive).unwrap_or_else(|e| {
            eprintln!("invalid log level '{}': {}; falling back to 'warn'", directive, e);
            tracing_subscriber::EnvFilter::new("warn")
        });

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .try_init();
    });
}

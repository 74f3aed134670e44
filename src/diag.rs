use tracing_subscriber::EnvFilter;

/// Install the process-wide diagnostics subscriber.
///
/// The bridge runs inside a host process that may already own one, so
/// installation failure is ignored. Filtering follows `RUST_LOG` and
/// defaults to `info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

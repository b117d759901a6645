//! Opt-in tracing setup for the `metrics-chart` binary and embedding hosts.
//!
//! The library only emits `tracing` events. Installing a subscriber is left to
//! the host, or to [`init_tracing`] when the `telemetry` feature is on.

/// Filter used when `RUST_LOG` is unset and no verbosity was requested.
pub const DEFAULT_FILTER: &str = "metrics_chart=info";

/// Filter used by hosts that ask for per-stage detail (loader, composer, export).
pub const VERBOSE_FILTER: &str = "metrics_chart=debug";

/// Installs a compact stderr subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Returns `false` when the feature is
/// disabled or a global subscriber is already set.
#[must_use]
pub fn init_tracing(default_filter: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .try_init()
            .is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = default_filter;
        false
    }
}

/// [`init_tracing`] with [`DEFAULT_FILTER`].
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing(DEFAULT_FILTER)
}

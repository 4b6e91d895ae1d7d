//! Tracing setup for hosts embedding `chart-svg`.
//!
//! Render passes log through `tracing`; whether anything is printed is up to
//! the host. These helpers install a subscriber only when the `telemetry`
//! feature is enabled.

/// Filter directive used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER_DIRECTIVE: &str = "info";

/// Installs a compact `tracing` subscriber using `RUST_LOG` or `info`.
///
/// Returns `false` when the feature is disabled or a global subscriber is
/// already installed.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing_with_filter(DEFAULT_FILTER_DIRECTIVE)
}

/// Installs a compact `tracing` subscriber with an explicit fallback filter.
///
/// `RUST_LOG` still takes precedence over `fallback_directive`, e.g.
/// `chart_svg=debug` to see per-render element counts.
#[must_use]
pub fn init_tracing_with_filter(fallback_directive: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback_directive));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact();

        return builder.try_init().is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = fallback_directive;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::{init_default_tracing, init_tracing_with_filter};

    #[test]
    fn second_install_is_rejected() {
        let _ = init_default_tracing();
        assert!(!init_tracing_with_filter("chart_svg=debug"));
    }
}

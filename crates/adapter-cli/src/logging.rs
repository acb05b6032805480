//! Tracing setup for the binary.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "channel_adapter=info,adapter_cli=info,adapter_core=info,\
adapter_http=info,adapter_voice=info,adapter_axum=info,tower_http=info";

/// Filter used with `--verbose` when `RUST_LOG` is not set.
pub const VERBOSE_FILTER: &str = "channel_adapter=debug,adapter_cli=debug,adapter_core=debug,\
adapter_http=debug,adapter_voice=debug,adapter_axum=debug,tower_http=debug";

/// Install the global subscriber. `RUST_LOG` wins over the built-in filters.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .init();
}

// Subscriber setup for hosts that do not install their own
//
// The library only emits `tracing` events. Rust hosts normally wire up their
// own subscriber; C hosts call `idlvisit_init_logging` once at startup.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable read before falling back to `RUST_LOG`.
pub const LOG_ENV: &str = "IDLVISIT_LOG";

/// Filter applied when neither variable is set.
pub const DEFAULT_FILTER: &str = "warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a stderr subscriber filtered by `IDLVISIT_LOG`, then `RUST_LOG`.
///
/// Returns `false` when a global subscriber was already set, in which case
/// nothing changes. Safe to call more than once.
pub fn init() -> bool {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .compact(),
        )
        .try_init()
        .is_ok()
}

/// C entry point for [`init`].
#[unsafe(no_mangle)]
pub extern "C" fn idlvisit_init_logging() -> bool {
    init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_no_op() {
        init();
        assert!(!init());
        assert!(!idlvisit_init_logging());
    }
}

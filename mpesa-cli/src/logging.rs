use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt};

static TRACING_INIT: Once = Once::new();

fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "mpesa_ingest=debug,mpesa=debug,info",
        _ => "trace",
    }
}

/// Log to stderr. `RUST_LOG` wins over `-v` when set.
pub fn init_tracing(verbose: u8) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(default_directive(0), "warn");
        assert!(default_directive(1).contains("mpesa_ingest=debug"));
        assert_eq!(default_directive(5), "trace");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_tracing(0);
        init_tracing(2);
    }
}

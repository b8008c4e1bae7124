use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "tagwatch=info";
const VERBOSE_LOG_FILTER: &str = "tagwatch=debug";

/// Initialize tracing on stderr. Stdout belongs to the console status surface.
///
/// `RUST_LOG` wins over the defaults when it is set.
pub fn init_logging(verbose: bool) {
    let default = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A subscriber may already be installed (tests); keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

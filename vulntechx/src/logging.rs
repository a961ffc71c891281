use tracing_subscriber::EnvFilter;

const VERBOSE_FILTER: &str =
    "warn,vulntechx=debug,vulntechx_core=debug,tech_list=debug,record_source=debug,command_builder=debug,job_runner=debug";

/// Install the stderr subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

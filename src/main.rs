use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tabdeck::cli::{self, Cli};
use tokio::runtime::Runtime;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Routes all log::info!() etc. to the debug log file; mirrors to stderr when
    // RUST_LOG is set. CLI --log-level wins over RUST_LOG, which wins over config.
    tabdeck::debug::init_log_bridge(cli.log_level);

    log::info!("Starting tabdeck {}", tabdeck::VERSION);

    // Runtime for file I/O, shell sessions and the debounced snapshot writer
    let runtime = Arc::new(Runtime::new()?);

    let result = cli::run(cli, &runtime);

    // Use `shutdown_timeout` so a hung background task cannot block exit
    log::info!("Shutting down runtime");
    if let Ok(rt) = Arc::try_unwrap(runtime) {
        rt.shutdown_timeout(std::time::Duration::from_secs(2));
    }
    log::logger().flush();

    if let Err(ref e) = result {
        eprintln!("tabdeck: error: {e:#}");
    }
    result
}

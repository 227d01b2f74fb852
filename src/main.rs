use anyhow::Result;
use clap::Parser;
use theme_manager::cli::{self, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Routes all log::info!() etc. to the debug log file; mirrored to stderr
    // when RUST_LOG is set. --log-level takes precedence over DEBUG_LEVEL.
    theme_manager::debug::init_log_bridge(cli.log_level.map(|l| l.to_level_filter()));
    log::info!("theme-manager {} starting: {:?}", theme_manager::VERSION, cli.command);

    let stdout = std::io::stdout();
    let result = cli::commands::run(&cli, &mut stdout.lock());
    if let Err(ref e) = result {
        log::error!("Command failed: {e:#}");
        eprintln!("theme-manager: error: {e:#}");
        // Exit directly so the error is not printed a second time.
        std::process::exit(1);
    }
    result
}

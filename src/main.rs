//! Command-line entry point.
//!
//! ```bash
//! apidoc-from-source ./my-service -o api.yaml
//! apidoc-from-source ./my-service -f json --strict -c apidoc.yaml
//! apidoc-from-source ./my-service --package-filters 'api::orders,api::*::admin' -v
//! ```

use anyhow::Result;
use apidoc_from_source::cli;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // Parse once up front so the verbose flag can configure the logger
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("apidoc-from-source starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("API documentation generation completed successfully");
    Ok(())
}

//! BVPRO CLI entrypoint.
//!
//! Provides a thin wrapper over the `cli` module: parse args, open the
//! product, derive its RSR files and band stack, and exit with appropriate
//! status. For programmatic use, prefer the library API (`bvpro::api`).

use clap::Parser;

mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::CliArgs::parse();
    cli::run(args)
}

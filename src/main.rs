//! Provides the main entry point to the program.
use anyhow::Result;
use gridplan::cli::run_cli;
use human_panic::setup_panic;

fn main() -> Result<()> {
    setup_panic!();

    run_cli()
}

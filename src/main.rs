//! neotags - Exact tag lookup rendered for fuzzy pickers
//!
//! neotags provides:
//! - Exact-name search in ctags tag files
//! - Per-file tag listings via ctags
//! - GNU global / pglobal queries
//! - Aligned, colorized picker lines with a machine-readable prefix

use anyhow::Result;
use clap::Parser;

mod backends;
mod cli;
mod core;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .format_timestamp(None)
        .init();

    cli::run(cli)
}

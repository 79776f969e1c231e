use anyhow::Result;
use clap::Parser;

use jstrument::cli::{self, args::CliArgs};

fn main() -> Result<()> {
    // RUST_LOG=debug traces each pipeline phase; default is warnings only.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = CliArgs::parse();
    let exit_code = cli::run(&args)?;
    std::process::exit(exit_code);
}

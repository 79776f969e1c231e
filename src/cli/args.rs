use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the jstrument binary.
#[derive(Parser, Debug)]
#[command(
    name = "jstrument",
    version,
    about = "Rewrite JavaScript sources to report every execution event to a dynamic-analysis hook table"
)]
pub struct CliArgs {
    /// Print instrumented output to stdout instead of writing files.
    #[arg(long)]
    pub print: bool,

    /// Directory for instrumented files (default: beside each input).
    #[arg(long = "outDir", alias = "out-dir")]
    pub out_dir: Option<PathBuf>,

    /// Indentation width in spaces for emitted code.
    #[arg(long, default_value_t = 4)]
    pub indent: usize,

    /// Emit Windows (CRLF) line endings.
    #[arg(long)]
    pub crlf: bool,

    /// Input files to instrument.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

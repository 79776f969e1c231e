//! Native CLI support for the jstrument binary.

pub mod args;
pub mod reporter;

use std::io::IsTerminal;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info_span;

use crate::driver::{self, InstrumentOptions};
use crate::source_writer::NewLineKind;

use args::CliArgs;
use reporter::Reporter;

/// Instrument every input file. Returns the process exit code: 0 when all
/// files transformed, 1 when any failed.
pub fn run(args: &CliArgs) -> Result<i32> {
    let options = InstrumentOptions {
        indent: " ".repeat(args.indent),
        newline: if args.crlf {
            NewLineKind::CarriageReturnLineFeed
        } else {
            NewLineKind::LineFeed
        },
    };
    let reporter = Reporter::new(std::io::stderr().is_terminal());

    let mut failures = 0usize;
    for file in &args.files {
        let _span = info_span!("instrument", file = %file.display()).entered();
        match instrument_one(file, args, &options) {
            Ok(()) => {}
            Err(err) => {
                failures += 1;
                match err.downcast_ref::<crate::TransformError>() {
                    Some(transform_err) => eprintln!("{}", reporter.render(transform_err)),
                    None => eprintln!("error: {err:#}"),
                }
            }
        }
    }

    Ok(if failures > 0 { 1 } else { 0 })
}

fn instrument_one(file: &Path, args: &CliArgs, options: &InstrumentOptions) -> Result<()> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let derived = driver::derived_path(file);
    let out_path = match &args.out_dir {
        Some(dir) => match derived.file_name() {
            Some(name) => dir.join(name),
            None => derived.clone(),
        },
        None => derived,
    };

    let instrumented = driver::instrument_source(
        &source,
        &file.to_string_lossy(),
        &out_path.to_string_lossy(),
        options,
    )?;

    if args.print {
        print!("{instrumented}");
        return Ok(());
    }

    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    std::fs::write(&out_path, instrumented)
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    tracing::info!(out = %out_path.display(), "wrote instrumented file");
    Ok(())
}

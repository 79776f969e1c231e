//! The per-file driver: parse, walk, assemble the preamble.
//!
//! Data flow: source text -> parse tree with locations -> scope pre-pass
//! per region -> visitor walk into the output buffer -> preamble +
//! instrumented body. A source carrying the no-instrument marker skips the
//! walk entirely; a source that is already this tool's output is returned
//! unchanged, so instrumenting twice equals instrumenting once.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::diagnostics::TransformError;
use crate::instrument::hooks::{NO_INSTRUMENT_MARKER, RUNTIME_GLOBAL, TOOL_NAME};
use crate::instrument::registry::Registry;
use crate::instrument::Instrumenter;
use crate::parser;

pub use crate::instrument::InstrumentOptions;

/// Instrument one source file's text.
///
/// `orig_path` and `inst_path` are emitted into the script-enter hook so
/// the runtime can report where the trace came from.
pub fn instrument_source(
    source: &str,
    orig_path: &str,
    inst_path: &str,
    options: &InstrumentOptions,
) -> Result<String, TransformError> {
    // Our own output begins with the bare marker line: hand it back
    // untouched.
    if source.starts_with(&format!("{}\n", marker_line())) {
        debug!(file = orig_path, "already instrumented, passing through");
        return Ok(source.to_string());
    }

    // A user-placed marker anywhere disables the walk; the file is emitted
    // unchanged except for the preamble (whose marker keeps this stable).
    if source.contains(NO_INSTRUMENT_MARKER) {
        debug!(file = orig_path, "no-instrument marker found, skipping walk");
        let mut out = preamble(&Registry::new());
        out.push_str(source);
        return Ok(out);
    }

    let program = parser::parse(source, orig_path)?;
    debug!(file = orig_path, statements = program.body.len(), "parsed");

    let mut instrumenter = Instrumenter::new(orig_path, inst_path, options);
    instrumenter.run(&program)?;
    let (body, registry) = instrumenter.finish();
    debug!(
        file = orig_path,
        ids = registry.allocated(),
        located = registry.table_len(),
        "instrumented"
    );

    let mut out = preamble(&registry);
    out.push_str(&body);
    Ok(out)
}

/// The derived file name: `<stem>__jstrument__.<ext>` beside the input.
pub fn derived_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}__{TOOL_NAME}__.{}", ext.to_string_lossy()),
        None => format!("{stem}__{TOOL_NAME}__"),
    };
    path.with_file_name(name)
}

fn marker_line() -> String {
    format!("// {NO_INSTRUMENT_MARKER}")
}

/// The preamble: the marker (so re-instrumentation is a no-op), the
/// id-to-location table published on the runtime global, and the tool tag.
fn preamble(registry: &Registry) -> String {
    format!(
        "// {NO_INSTRUMENT_MARKER}\n{RUNTIME_GLOBAL}.ids = {};\n// INSTRUMENTED BY {TOOL_NAME}\n",
        registry.serialize_table()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn derived_path_keeps_extension_and_directory() {
        assert_eq!(
            derived_path(Path::new("/tmp/app.js")),
            Path::new("/tmp/app__jstrument__.js")
        );
        assert_eq!(
            derived_path(Path::new("script")),
            Path::new("script__jstrument__")
        );
    }

    #[test]
    fn marker_skips_the_walk() {
        let src = "// NO_INSTRUMENT is set for this fixture\nvar x = unparseable(((;\n";
        let out = instrument_source(src, "a.js", "a__jstrument__.js", &Default::default())
            .expect("marker sources never parse");
        assert!(out.starts_with("// NO_INSTRUMENT\n"));
        assert!(out.ends_with(src));
        assert!(out.contains("D$.ids = {};"));
    }

    #[test]
    fn instrumenting_twice_equals_once() {
        let opts = InstrumentOptions::default();
        let once = instrument_source("var x = 1;", "a.js", "a__jstrument__.js", &opts).unwrap();
        let twice = instrument_source(&once, "a.js", "a__jstrument__.js", &opts).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn preamble_precedes_instrumented_body() {
        let out =
            instrument_source("var x = 1;", "a.js", "a__jstrument__.js", &Default::default())
                .unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("// NO_INSTRUMENT"));
        assert!(lines.next().unwrap().starts_with("D$.ids = {"));
        assert_eq!(lines.next(), Some("// INSTRUMENTED BY jstrument"));
        assert_eq!(lines.next(), Some("try {"));
    }

    #[test]
    fn transform_errors_carry_the_original_position() {
        let err = instrument_source(
            "var ok = 1;\nclass Nope {}\n",
            "bad.js",
            "bad__jstrument__.js",
            &Default::default(),
        )
        .unwrap_err();
        assert_eq!(err.message, "not yet implemented: class declaration");
        assert_eq!((err.line, err.col), (2, 0));
        assert_eq!(err.file, "bad.js");
    }
}
